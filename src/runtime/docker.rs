//! Docker-backed `RuntimeAdapter` implementation.
//!
//! Grounded on the teacher's `provider::docker::DockerProvider` /
//! `DockerSandbox`: a thin `bollard::Docker` wrapper, bind-mount based
//! workspace attachment, and `HostConfig`-level resource caps.
//!
//! `bollard` demultiplexes Docker's attach/logs stream internally and never
//! exposes the raw framed bytes described in §4.3/§6. To keep the Log
//! Demultiplexer (`crate::logs`) a real, independently testable component
//! that the execution pipeline actually passes output through, `logs()`
//! re-frames each of bollard's already-split `LogOutput` chunks using the
//! documented `[type:1][reserved:3][size:4 BE][payload]` header before
//! returning — `crate::sandbox::SandboxExecutor` then demuxes it exactly as
//! it would a raw socket capture.

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{
    Config as ContainerConfig, KillContainerOptions, LogOutput, LogsOptions,
    RemoveContainerOptions, StopContainerOptions, WaitContainerOptions,
};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::{ContainerSpec, NetworkMode, RuntimeAdapter, Signal, WaitOutcome};
use crate::error::RuntimeError;

pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connects using the local Docker daemon defaults (`DOCKER_HOST`, or
    /// the platform default socket).
    pub fn connect() -> Result<Self, RuntimeError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| RuntimeError::Connection(e.to_string()))?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl RuntimeAdapter for DockerRuntime {
    async fn create(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        let env: Vec<String> = spec.env.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let binds: Vec<String> = spec
            .mounts
            .iter()
            .map(|m| {
                format!(
                    "{}:{}:{}",
                    m.host_path,
                    m.container_path,
                    if m.read_write { "rw" } else { "ro" }
                )
            })
            .collect();

        let host_config = bollard::models::HostConfig {
            binds: Some(binds),
            network_mode: Some(match spec.network_mode {
                NetworkMode::None => "none".to_string(),
                NetworkMode::Bridge => "bridge".to_string(),
            }),
            memory: Some(spec.resources.memory_bytes),
            cpu_period: Some(spec.resources.cpu_period_micros),
            cpu_quota: Some(spec.resources.cpu_quota_micros),
            ..Default::default()
        };

        let labels: std::collections::HashMap<String, String> =
            spec.labels.iter().cloned().collect();

        let config = ContainerConfig {
            image: Some(spec.image.clone()),
            cmd: Some(spec.command.clone()),
            working_dir: Some(spec.work_dir.clone()),
            env: Some(env),
            host_config: Some(host_config),
            labels: Some(labels),
            ..Default::default()
        };

        let options = bollard::container::CreateContainerOptions {
            name: spec.name.as_str(),
            platform: None,
        };

        let response = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| RuntimeError::CreateFailed(e.to_string()))?;

        Ok(response.id)
    }

    async fn start(&self, container_id: &str) -> Result<(), RuntimeError> {
        self.docker
            .start_container::<String>(container_id, None)
            .await
            .map_err(|e| RuntimeError::StartFailed(e.to_string()))
    }

    async fn wait(
        &self,
        container_id: &str,
        cancel: CancellationToken,
    ) -> Result<WaitOutcome, RuntimeError> {
        let mut stream = self.docker.wait_container(
            container_id,
            None::<WaitContainerOptions<String>>,
        );

        tokio::select! {
            _ = cancel.cancelled() => Ok(WaitOutcome::Cancelled),
            next = stream.next() => match next {
                Some(Ok(response)) => Ok(WaitOutcome::Exited(response.status_code)),
                Some(Err(e)) => Err(RuntimeError::WaitFailed(e.to_string())),
                None => Err(RuntimeError::WaitFailed("wait stream ended without a result".into())),
            },
        }
    }

    async fn kill(&self, container_id: &str, signal: Signal) {
        let sig = match signal {
            Signal::Kill => "SIGKILL",
            Signal::Term => "SIGTERM",
        };
        if let Err(e) = self
            .docker
            .kill_container(container_id, Some(KillContainerOptions { signal: sig }))
            .await
        {
            tracing::warn!(container_id, error = %e, "kill failed");
        }
    }

    async fn logs(&self, container_id: &str) -> Result<Vec<u8>, RuntimeError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            follow: false,
            ..Default::default()
        };

        let mut stream = self.docker.logs(container_id, Some(options));
        let mut framed = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| RuntimeError::LogsFailed(e.to_string()))?;
            let (stream_type, payload) = match chunk {
                LogOutput::StdOut { message } => (1u8, message),
                LogOutput::StdErr { message } => (2u8, message),
                LogOutput::StdIn { message } => (0u8, message),
                LogOutput::Console { message } => (1u8, message),
            };
            framed.push(stream_type);
            framed.extend_from_slice(&[0, 0, 0]);
            framed.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            framed.extend_from_slice(&payload);
        }

        Ok(framed)
    }

    async fn stop(&self, container_id: &str, grace_seconds: u32) {
        let options = StopContainerOptions { t: grace_seconds as i64 };
        if let Err(e) = self.docker.stop_container(container_id, Some(options)).await {
            tracing::warn!(container_id, error = %e, "stop failed");
        }
    }

    async fn remove(&self, container_id: &str, force: bool) {
        let options = RemoveContainerOptions { force, ..Default::default() };
        if let Err(e) = self.docker.remove_container(container_id, Some(options)).await {
            tracing::warn!(container_id, error = %e, "remove failed");
        }
    }

    async fn ping(&self) -> bool {
        self.docker.ping().await.is_ok()
    }
}
