//! Isolation Runtime Adapter (§4.1).
//!
//! A thin capability surface over a container engine. [`RuntimeAdapter`] is
//! the only thing the Sandbox Executor depends on, so a second backend
//! (microVM, user-namespace sandbox) is a drop-in replacement — per the
//! Design Notes (§9), no backend type leaks across this boundary.

pub mod docker;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::RuntimeError;

/// One bind mount from a host path into the container.
#[derive(Debug, Clone)]
pub struct Mount {
    pub host_path: String,
    pub container_path: String,
    pub read_write: bool,
}

/// Resource caps applied at container creation (§4.1).
#[derive(Debug, Clone, Copy)]
pub struct Resources {
    pub memory_bytes: i64,
    pub cpu_quota_micros: i64,
    pub cpu_period_micros: i64,
}

impl Resources {
    /// Builds resource caps from the request-level limits (§4.1: memory cap
    /// in bytes = memory_limit_mb × 2²⁰; CPU quota in microseconds per
    /// 100ms period = cpu_limit × 100_000).
    pub fn from_limits(memory_limit_mb: u64, cpu_limit: f64) -> Self {
        Self {
            memory_bytes: (memory_limit_mb as i64) * (1 << 20),
            cpu_quota_micros: (cpu_limit * 100_000.0) as i64,
            cpu_period_micros: 100_000,
        }
    }
}

/// Network mode for a container, collapsed to the single on/off switch the
/// core exposes (§1 Non-goals: no network policy beyond on/off).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkMode {
    None,
    Bridge,
}

impl NetworkMode {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled { NetworkMode::Bridge } else { NetworkMode::None }
    }
}

/// Configuration for creating one container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub work_dir: String,
    pub env: Vec<(String, String)>,
    pub mounts: Vec<Mount>,
    pub resources: Resources,
    pub network_mode: NetworkMode,
    pub labels: Vec<(String, String)>,
}

/// A signal to send via [`RuntimeAdapter::kill`].
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    Kill,
    Term,
}

/// The outcome of [`RuntimeAdapter::wait`].
#[derive(Debug, Clone, Copy)]
pub enum WaitOutcome {
    Exited(i64),
    Cancelled,
}

/// Capability surface over a container engine (§4.1). All operations are
/// blocking from the caller's perspective; cancellation is cooperative via
/// the supplied [`CancellationToken`].
#[async_trait]
pub trait RuntimeAdapter: Send + Sync {
    async fn create(&self, spec: &ContainerSpec) -> Result<String, RuntimeError>;

    async fn start(&self, container_id: &str) -> Result<(), RuntimeError>;

    /// Waits for the container to exit, the token to fire, or a runtime
    /// error. Returns `Ok(WaitOutcome::Cancelled)` rather than an error when
    /// the token fires first.
    async fn wait(
        &self,
        container_id: &str,
        cancel: CancellationToken,
    ) -> Result<WaitOutcome, RuntimeError>;

    /// Best-effort; the Sandbox Executor logs failures here but never
    /// propagates them (§4.4 step 9, §7).
    async fn kill(&self, container_id: &str, signal: Signal);

    /// Combined stdout+stderr in the runtime's framed multiplex format
    /// (§4.3), not yet demultiplexed.
    async fn logs(&self, container_id: &str) -> Result<Vec<u8>, RuntimeError>;

    async fn stop(&self, container_id: &str, grace_seconds: u32);

    async fn remove(&self, container_id: &str, force: bool);

    /// Lightweight reachability probe for the `/ready` HTTP endpoint (§6).
    async fn ping(&self) -> bool;
}
