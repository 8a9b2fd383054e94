//! Sandbox Executor (§4.4).
//!
//! Orchestrates one execution end to end: resolve profile → create/start
//! container → race `wait` against a timeout-bound cancellation token →
//! fetch and demux logs → guarantee cleanup on every exit path. Grounded on
//! the teacher's `orchestrator::runner::TestRunner::exec_with_streaming`
//! `select!`/`CancellationToken` idiom and `provider::docker`'s
//! create/start/cleanup sequencing, generalized from "run one test batch"
//! to "run one isolated, resource-capped execution".
//!
//! Cleanup is the dominant correctness concern (§4.4 Rationale): every exit
//! path — normal, timeout, wait error — funnels through the same
//! `stop`-then-`remove` tail so a crashing executor never leaks containers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::config::ExecutorConfig;
use crate::error::SandboxError;
use crate::logs;
use crate::model::{ExecutionRequest, RawResult};
use crate::profile::{self, LanguageProfile};
use crate::runtime::{ContainerSpec, Mount, NetworkMode, Resources, RuntimeAdapter, Signal, WaitOutcome};

pub struct SandboxExecutor<R: RuntimeAdapter> {
    runtime: Arc<R>,
    config: ExecutorConfig,
}

impl<R: RuntimeAdapter> SandboxExecutor<R> {
    pub fn new(runtime: R, config: ExecutorConfig) -> Self {
        Self { runtime: Arc::new(runtime), config }
    }

    /// Shares the underlying runtime handle, e.g. for the `/ready` probe in
    /// the operational HTTP surface (§6) without duplicating the adapter.
    pub fn runtime_handle(&self) -> Arc<R> {
        Arc::clone(&self.runtime)
    }

    /// Whether the sandbox master switch is on (§6). Consulted by the
    /// Request Handler before admission; `execute` itself does not check
    /// this, since by the time a request reaches the executor it has
    /// already been admitted.
    pub fn sandbox_enabled(&self) -> bool {
        self.config.sandbox_enabled
    }

    /// Executes one request end to end, returning a well-formed
    /// [`RawResult`] on every path that creates a container — start, wait,
    /// and log-fetch failures are all converted to canonical results after
    /// the cleanup tail, never surfaced as `Err` (§7, Testable Property 2).
    /// A `create` failure is the only `Err` path, since no container
    /// exists yet and there is nothing to clean up.
    pub async fn execute(
        &self,
        request: &ExecutionRequest,
        parent_cancel: &CancellationToken,
    ) -> Result<RawResult, SandboxError> {
        let start = Instant::now();

        let mut profile = profile::resolve(&request.language, &self.config.sandbox_image);
        if let Some(cmd) = &request.command_override {
            profile.default_command = cmd.clone();
        }

        let workspace_path = request.workspace_path(&self.config.workspace_base_path);
        let name = format!("builder-test-{}", request.execution_id.short());
        let spec = build_spec(&name, &profile, &workspace_path, request);

        let container_id = self.runtime.create(&spec).await?;

        if let Err(e) = self.runtime.start(&container_id).await {
            self.runtime.stop(&container_id, 5).await;
            self.runtime.remove(&container_id, true).await;
            return Ok(RawResult {
                output: format!("Execution error: {e}"),
                exit_code: -1,
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        let timeout = Duration::from_secs(request.limits.sandbox_timeout_seconds);
        let wait_token = derive_wait_token(parent_cancel, timeout);

        let raw = match self.runtime.wait(&container_id, wait_token.clone()).await {
            Err(e) => {
                self.runtime.kill(&container_id, Signal::Kill).await;
                RawResult {
                    output: format!("Execution error: {e}"),
                    exit_code: -1,
                    duration_ms: start.elapsed().as_millis() as u64,
                }
            }
            Ok(WaitOutcome::Cancelled) => {
                self.runtime.kill(&container_id, Signal::Kill).await;
                RawResult {
                    output: "Execution timed out".to_string(),
                    exit_code: -1,
                    duration_ms: start.elapsed().as_millis() as u64,
                }
            }
            Ok(WaitOutcome::Exited(exit_code)) => {
                let output = match self.runtime.logs(&container_id).await {
                    Ok(framed) => logs::demux(&framed),
                    Err(e) => {
                        tracing::warn!(execution_id = %request.execution_id, error = %e, "log fetch failed");
                        "Failed to retrieve test output".to_string()
                    }
                };
                RawResult {
                    output,
                    exit_code: exit_code as i32,
                    duration_ms: start.elapsed().as_millis() as u64,
                }
            }
        };

        self.runtime.stop(&container_id, 5).await;
        self.runtime.remove(&container_id, true).await;

        Ok(raw)
    }
}

/// Derives a cancellation token that fires when either the parent context
/// cancels (upstream cancel / shutdown) or the timeout elapses, whichever
/// comes first. A real wall-clock timeout is spawned as a child task tied
/// to the returned token's lifetime.
fn derive_wait_token(parent: &CancellationToken, timeout: Duration) -> CancellationToken {
    let child = parent.child_token();
    let timeout_token = child.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => timeout_token.cancel(),
            _ = timeout_token.cancelled() => {}
        }
    });
    child
}

fn build_spec(
    name: &str,
    profile: &LanguageProfile,
    workspace_path: &str,
    request: &ExecutionRequest,
) -> ContainerSpec {
    ContainerSpec {
        name: name.to_string(),
        image: profile.image.clone(),
        command: profile.default_command.clone(),
        work_dir: profile.work_dir.clone(),
        env: profile.env.clone(),
        mounts: vec![Mount {
            host_path: workspace_path.to_string(),
            container_path: profile.work_dir.clone(),
            read_write: true,
        }],
        resources: Resources::from_limits(request.limits.memory_limit_mb, request.limits.cpu_limit),
        network_mode: NetworkMode::from_enabled(request.limits.network_enabled),
        labels: vec![
            ("managed".to_string(), "true".to_string()),
            ("execution_id".to_string(), request.execution_id.to_string()),
        ],
    }
}
