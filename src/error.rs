//! Crate-wide error types.
//!
//! Each subsystem gets its own error enum so callers can match on failure
//! kind without downcasting. Transient/fatal-for-this-request errors use
//! `thiserror`; process-boundary call sites (config loading, CLI) layer
//! `anyhow::Context` on top.

use thiserror::Error;

/// Errors from the Isolation Runtime Adapter.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to create container: {0}")]
    CreateFailed(String),

    #[error("failed to start container: {0}")]
    StartFailed(String),

    #[error("failed while waiting for container: {0}")]
    WaitFailed(String),

    #[error("failed to fetch container logs: {0}")]
    LogsFailed(String),

    #[error("runtime connection error: {0}")]
    Connection(String),
}

/// Errors from the Sandbox Executor.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Errors surfaced by the Concurrency Gate on admission.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The caller's context was cancelled before a slot was acquired.
    #[error("capacity exhausted or cancelled before admission")]
    CapacityExhausted,

    /// `SANDBOX_ENABLED=false`; the worker refuses all requests (§6, §7).
    #[error("sandbox disabled")]
    SandboxDisabled,
}
