//! Request Handler (§4.7, §2 data flow).
//!
//! Binds queue delivery to the Concurrency Gate, the Sandbox Executor, and
//! the Parser Bank, then publishes to the result sink. One task is spawned
//! per delivery so the inbound stream is never blocked by a slow execution;
//! the gate (not an unbounded spawn) is what actually bounds concurrency
//! (§9 Design Notes — "do not implement with unbounded task spawning").
//!
//! A result is emitted for every *admitted* request (§7, §8 Testable
//! Property 1). Admission failures short-circuit before a container is
//! ever created and publish nothing — there is no request to report a
//! result for.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::AdmissionError;
use crate::gate::ConcurrencyGate;
use crate::model::{ExecutionResult, RawResult};
use crate::parsers;
use crate::queue::{RequestSource, ResultSink};
use crate::runtime::RuntimeAdapter;
use crate::sandbox::SandboxExecutor;

pub struct RequestHandler<R: RuntimeAdapter> {
    executor: SandboxExecutor<R>,
    gate: Arc<ConcurrencyGate>,
    shutdown: CancellationToken,
}

impl<R: RuntimeAdapter + Send + Sync + 'static> RequestHandler<R> {
    pub fn new(executor: SandboxExecutor<R>, gate: Arc<ConcurrencyGate>, shutdown: CancellationToken) -> Self {
        Self { executor, gate, shutdown }
    }

    pub fn active_count(&self) -> usize {
        self.gate.active_count()
    }

    /// Drains `source` until it closes or shutdown is signalled, spawning
    /// one bounded task per delivery.
    pub async fn run(self: Arc<Self>, source: Arc<dyn RequestSource>, sink: Arc<dyn ResultSink>) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("request handler shutting down");
                    break;
                }
                delivery = source.recv() => {
                    match delivery {
                        None => {
                            tracing::info!("request source closed");
                            break;
                        }
                        Some(request) => {
                            let this = Arc::clone(&self);
                            let sink = Arc::clone(&sink);
                            tokio::spawn(async move {
                                this.handle_one(request, sink).await;
                            });
                        }
                    }
                }
            }
        }
    }

    async fn handle_one(
        &self,
        request: crate::model::ExecutionRequest,
        sink: Arc<dyn ResultSink>,
    ) {
        if !self.executor.sandbox_enabled() {
            tracing::warn!(
                execution_id = %request.execution_id,
                error = %AdmissionError::SandboxDisabled,
                "admission failed"
            );
            return;
        }

        let permit = match self.gate.acquire(&self.shutdown).await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::warn!(execution_id = %request.execution_id, error = %e, "admission failed");
                return;
            }
        };

        // Once admitted, exactly one result is published regardless of how
        // execution fails (§7, §8 Testable Property 1) — a `create` failure
        // is converted into a synthesized result here the same way
        // `SandboxExecutor::execute` itself converts start/wait/log-fetch
        // failures.
        let raw = match self.executor.execute(&request, &self.shutdown).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(execution_id = %request.execution_id, error = %e, "sandbox execution failed");
                RawResult {
                    output: format!("Execution error: {e}"),
                    exit_code: -1,
                    duration_ms: 0,
                }
            }
        };

        let test_result = parsers::parse(&request.language, &raw.output, raw.exit_code);

        sink.send(ExecutionResult {
            execution_id: request.execution_id,
            raw_result: raw,
            test_result,
        })
        .await;

        drop(permit);
    }
}
