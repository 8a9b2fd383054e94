//! Core data model: execution identity, requests, raw and parsed results.
//!
//! Types here cross the queue boundary (serde) and the parser boundary
//! (plain structs). Nothing here owns a runtime resource — containers are
//! process-local to [`crate::sandbox`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for one execution, supplied by the caller.
///
/// Never minted internally — the system consumes IDs, it does not generate
/// them. Dense enough that an 8-character prefix (used for container names,
/// see [`crate::sandbox`]) is practically unique within a fleet's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(String);

impl ExecutionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// First 8 characters, used to build human-readable container names.
    /// IDs shorter than 8 characters are returned whole.
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.0.len());
        &self.0[..end]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ExecutionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ExecutionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A snapshot of the resource limits to apply to one execution.
///
/// Taken from [`crate::config::ExecutorConfig`] at request-admission time so
/// a single execution's limits cannot change mid-flight even if config is
/// reloaded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub memory_limit_mb: u64,
    pub cpu_limit: f64,
    pub network_enabled: bool,
    pub sandbox_timeout_seconds: u64,
}

/// An inbound execution request (§6 inbound message).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub execution_id: ExecutionId,
    pub language: String,

    /// Overrides the language profile's default command when present.
    #[serde(default)]
    pub command_override: Option<Vec<String>>,

    /// Explicit workspace path. Derived as `workspace_base/execution_id`
    /// when absent.
    #[serde(default)]
    pub workspace_path: Option<String>,

    pub limits: ResourceLimits,
}

impl ExecutionRequest {
    /// Resolves the on-disk workspace path for this request.
    pub fn workspace_path(&self, workspace_base: &str) -> String {
        self.workspace_path
            .clone()
            .unwrap_or_else(|| format!("{workspace_base}/{}", self.execution_id))
    }
}

/// The raw, unparsed outcome of running a container to completion (or to a
/// terminal disposition such as timeout or wait error).
///
/// `exit_code == -1` is reserved for non-normal termination (timeout,
/// cancel, or a wait-side error) — see [`crate::sandbox`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResult {
    pub output: String,
    pub exit_code: i32,
    pub duration_ms: u64,
}

/// The status of one parsed test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// One test case extracted from framework output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub name: String,
    pub suite: Option<String>,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub output: Option<String>,
}

impl TestCaseResult {
    pub fn new(name: impl Into<String>, status: TestStatus) -> Self {
        Self {
            name: name.into(),
            suite: None,
            status,
            duration_ms: 0,
            error: None,
            output: None,
        }
    }
}

/// The uniform, framework-agnostic shape every parser collapses its input
/// into (§3, §4.6).
///
/// Invariant: `total == passed + failed + skipped` whenever a parser found
/// an explicit summary. `success == (failed == 0)`; the Request Handler
/// additionally ANDs in `exit_code == 0` (§4.6, Testable Property 5) since a
/// parser operates on text alone and cannot see the process exit code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    /// Percentage in `[0, 100]`; `0.0` means "not reported".
    pub coverage_pct: f64,
    pub duration_ms: u64,
    pub success: bool,
    pub test_cases: Vec<TestCaseResult>,
}

impl TestResult {
    pub fn empty() -> Self {
        Self {
            total: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            coverage_pct: 0.0,
            duration_ms: 0,
            success: true,
            test_cases: Vec::new(),
        }
    }

    /// Applies the exit-code veto: a nonzero exit code always forces
    /// `success = false`, regardless of what the parser inferred from text.
    pub fn apply_exit_code(&mut self, exit_code: i32) {
        self.success = self.success && exit_code == 0;
    }
}

/// The outbound execution result (§6 outbound message).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub execution_id: ExecutionId,
    pub raw_result: RawResult,
    pub test_result: TestResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_truncates_to_eight_chars() {
        let id = ExecutionId::new("0123456789abcdef");
        assert_eq!(id.short(), "01234567");
    }

    #[test]
    fn short_id_passes_through_when_shorter() {
        let id = ExecutionId::new("abc");
        assert_eq!(id.short(), "abc");
    }

    #[test]
    fn workspace_path_derives_from_base_when_absent() {
        let req = ExecutionRequest {
            execution_id: ExecutionId::new("exec-1"),
            language: "go".into(),
            command_override: None,
            workspace_path: None,
            limits: ResourceLimits {
                memory_limit_mb: 2048,
                cpu_limit: 2.0,
                network_enabled: false,
                sandbox_timeout_seconds: 300,
            },
        };
        assert_eq!(req.workspace_path("/var/lib/workspaces"), "/var/lib/workspaces/exec-1");
    }

    #[test]
    fn apply_exit_code_vetoes_success() {
        let mut r = TestResult::empty();
        r.success = true;
        r.apply_exit_code(1);
        assert!(!r.success);
    }
}
