//! Concurrency Gate (§4.5).
//!
//! Bounds the number of in-flight executions with a counting semaphore, in
//! the resource-pool-wrapper style of the teacher's `orchestrator::pool`.
//! Exposes an `active_count()` observable for the `/api/v1/executions/active`
//! endpoint (§6).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;

use crate::error::AdmissionError;

/// A bound on concurrent [`crate::sandbox::SandboxExecutor::execute`] calls.
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
}

/// An admitted slot. Releases the semaphore permit and decrements the
/// active count when dropped, regardless of how the execution ended.
pub struct Permit<'a> {
    _inner: SemaphorePermit<'a>,
    active: Arc<AtomicUsize>,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyGate {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Acquires a slot, respecting `cancel`. If `cancel` fires before a slot
    /// is free, returns [`AdmissionError::CapacityExhausted`] without ever
    /// touching the runtime — admission is observable before any runtime
    /// call is issued (§9 Design Notes).
    pub async fn acquire(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Permit<'_>, AdmissionError> {
        if cancel.is_cancelled() {
            return Err(AdmissionError::CapacityExhausted);
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(AdmissionError::CapacityExhausted),
            permit = self.semaphore.acquire() => {
                let permit = permit.map_err(|_| AdmissionError::CapacityExhausted)?;
                self.active.fetch_add(1, Ordering::SeqCst);
                Ok(Permit { _inner: permit, active: Arc::clone(&self.active) })
            }
        }
    }

    /// Monotonic-integer sample of in-flight executions.
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn admits_up_to_the_bound() {
        let gate = ConcurrencyGate::new(2);
        let token = CancellationToken::new();

        let a = gate.acquire(&token).await.unwrap();
        let b = gate.acquire(&token).await.unwrap();
        assert_eq!(gate.active_count(), 2);

        drop(a);
        assert_eq!(gate.active_count(), 1);
        drop(b);
        assert_eq!(gate.active_count(), 0);
    }

    #[tokio::test]
    async fn cancelled_context_fails_fast_without_admission() {
        let gate = ConcurrencyGate::new(1);
        let token = CancellationToken::new();
        token.cancel();

        let result = gate.acquire(&token).await;
        assert!(matches!(result, Err(AdmissionError::CapacityExhausted)));
        assert_eq!(gate.active_count(), 0);
    }

    #[tokio::test]
    async fn cancellation_while_waiting_unblocks_the_caller() {
        let gate = ConcurrencyGate::new(1);
        let token = CancellationToken::new();

        let _held = gate.acquire(&token).await.unwrap();

        let waiter_token = CancellationToken::new();
        let waiter_token_clone = waiter_token.clone();
        let gate_ref = &gate;
        let waiter = async move { gate_ref.acquire(&waiter_token_clone).await };

        tokio::pin!(waiter);
        tokio::select! {
            _ = &mut waiter => panic!("should not admit while at capacity"),
            _ = tokio::time::sleep(std::time::Duration::from_millis(20)) => {}
        }

        waiter_token.cancel();
        let result = waiter.await;
        assert!(matches!(result, Err(AdmissionError::CapacityExhausted)));
    }
}
