//! Configuration schema and environment loading (§6 configuration table).

use std::env;

use crate::model::ResourceLimits;

/// The default placeholder image. Per §3's registry invariant, configuring
/// `SANDBOX_IMAGE` to exactly this value is a no-op — it never overrides a
/// language profile's image.
pub const DEFAULT_IMAGE_PLACEHOLDER: &str = "feature-sandbox:latest";

/// Fully resolved worker configuration, loaded once at process start.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Master switch; when `false` the worker refuses all requests.
    pub sandbox_enabled: bool,

    /// Selects the isolation runtime adapter variant. Only `"docker"` is
    /// implemented; anything else is accepted at config-load time and
    /// rejected when a runtime adapter is actually constructed.
    pub sandbox_type: String,

    /// Override image applied to every language profile (§3 registry
    /// invariant). Empty string or the literal default placeholder leaves
    /// profile images untouched.
    pub sandbox_image: String,

    pub sandbox_memory_limit_mb: u64,
    pub sandbox_cpu_limit: f64,
    pub sandbox_network_enabled: bool,
    pub sandbox_timeout_seconds: u64,

    pub max_concurrent_executions: usize,
    pub workspace_base_path: String,

    /// Threshold consumed by `validate_coverage`-style downstream checks.
    /// Not enforced by the core itself (§1 Non-goals).
    pub coverage_threshold: f64,
}

impl ExecutorConfig {
    /// Loads configuration from environment variables, falling back to the
    /// documented defaults (§6) for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self {
            sandbox_enabled: env_bool("SANDBOX_ENABLED", true),
            sandbox_type: env_string("SANDBOX_TYPE", "docker"),
            sandbox_image: env_string("SANDBOX_IMAGE", DEFAULT_IMAGE_PLACEHOLDER),
            sandbox_memory_limit_mb: env_parse("SANDBOX_MEMORY_LIMIT_MB", 2048),
            sandbox_cpu_limit: env_parse("SANDBOX_CPU_LIMIT", 2.0),
            sandbox_network_enabled: env_bool("SANDBOX_NETWORK_ENABLED", false),
            sandbox_timeout_seconds: env_parse("SANDBOX_TIMEOUT_SECONDS", 300),
            max_concurrent_executions: env_parse("MAX_CONCURRENT_EXECUTIONS", 10),
            workspace_base_path: env_string(
                "WORKSPACE_BASE_PATH",
                "/var/lib/feature-service/workspaces",
            ),
            coverage_threshold: env_parse("COVERAGE_THRESHOLD", 70.0),
        }
    }

    /// Builds the per-request resource-limits snapshot carried on every
    /// [`crate::model::ExecutionRequest`] at admission time.
    pub fn resource_limits(&self) -> ResourceLimits {
        ResourceLimits {
            memory_limit_mb: self.sandbox_memory_limit_mb,
            cpu_limit: self.sandbox_cpu_limit,
            network_enabled: self.sandbox_network_enabled,
            sandbox_timeout_seconds: self.sandbox_timeout_seconds,
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            sandbox_enabled: true,
            sandbox_type: "docker".to_string(),
            sandbox_image: DEFAULT_IMAGE_PLACEHOLDER.to_string(),
            sandbox_memory_limit_mb: 2048,
            sandbox_cpu_limit: 2.0,
            sandbox_network_enabled: false,
            sandbox_timeout_seconds: 300,
            max_concurrent_executions: 10,
            workspace_base_path: "/var/lib/feature-service/workspaces".to_string(),
            coverage_threshold: 70.0,
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
