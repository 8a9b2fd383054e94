//! Messaging seam (§6 inbound/outbound messages).
//!
//! The RPC/message bus is an external collaborator (§1 Non-goals): this
//! module only defines the trait boundary the Request Handler programs
//! against, plus an in-process channel-backed implementation so the worker
//! is runnable and testable without a real broker wired in. A deployment
//! swaps in an adapter over its actual queue (SQS, NATS, etc.) behind the
//! same two traits.

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::model::{ExecutionRequest, ExecutionResult};

/// Source of inbound execution requests.
#[async_trait]
pub trait RequestSource: Send + Sync {
    /// Returns the next request, or `None` once the source is exhausted
    /// (e.g. the channel was closed during shutdown).
    async fn recv(&self) -> Option<ExecutionRequest>;
}

/// Sink for outbound execution results.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn send(&self, result: ExecutionResult);
}

/// An in-process, bounded-channel [`RequestSource`].
pub struct ChannelRequestSource {
    rx: Mutex<mpsc::Receiver<ExecutionRequest>>,
}

#[async_trait]
impl RequestSource for ChannelRequestSource {
    async fn recv(&self) -> Option<ExecutionRequest> {
        self.rx.lock().await.recv().await
    }
}

/// An in-process, bounded-channel [`ResultSink`].
pub struct ChannelResultSink {
    tx: mpsc::Sender<ExecutionResult>,
}

#[async_trait]
impl ResultSink for ChannelResultSink {
    async fn send(&self, result: ExecutionResult) {
        if self.tx.send(result).await.is_err() {
            tracing::warn!("result sink closed; dropping result");
        }
    }
}

/// Builds a request channel, returning the producer-side sender alongside
/// the [`RequestSource`] the handler consumes.
pub fn request_channel(buffer: usize) -> (mpsc::Sender<ExecutionRequest>, ChannelRequestSource) {
    let (tx, rx) = mpsc::channel(buffer);
    (tx, ChannelRequestSource { rx: Mutex::new(rx) })
}

/// Builds a result channel, returning the [`ResultSink`] the handler
/// publishes into alongside the consumer-side receiver.
pub fn result_channel(buffer: usize) -> (ChannelResultSink, mpsc::Receiver<ExecutionResult>) {
    let (tx, rx) = mpsc::channel(buffer);
    (ChannelResultSink { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExecutionId, RawResult, ResourceLimits, TestResult};

    fn sample_request() -> ExecutionRequest {
        ExecutionRequest {
            execution_id: ExecutionId::new("exec-1"),
            language: "go".into(),
            command_override: None,
            workspace_path: None,
            limits: ResourceLimits {
                memory_limit_mb: 512,
                cpu_limit: 1.0,
                network_enabled: false,
                sandbox_timeout_seconds: 30,
            },
        }
    }

    #[tokio::test]
    async fn request_channel_round_trips() {
        let (tx, source) = request_channel(4);
        tx.send(sample_request()).await.unwrap();
        let received = source.recv().await.unwrap();
        assert_eq!(received.execution_id, ExecutionId::new("exec-1"));
    }

    #[tokio::test]
    async fn result_channel_round_trips() {
        let (sink, mut rx) = result_channel(4);
        let result = ExecutionResult {
            execution_id: ExecutionId::new("exec-1"),
            raw_result: RawResult { output: "ok".into(), exit_code: 0, duration_ms: 1 },
            test_result: TestResult::empty(),
        };
        sink.send(result).await;
        let received = rx.recv().await.unwrap();
        assert_eq!(received.execution_id, ExecutionId::new("exec-1"));
    }

    #[tokio::test]
    async fn recv_returns_none_once_closed() {
        let (tx, source) = request_channel(1);
        drop(tx);
        assert!(source.recv().await.is_none());
    }
}
