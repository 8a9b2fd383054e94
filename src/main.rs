//! CLI entrypoint: wires configuration, the Docker runtime adapter, the
//! Request Handler, and the operational HTTP surface together, then runs
//! until shutdown is requested.

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use offload_runner::config::ExecutorConfig;
use offload_runner::gate::ConcurrencyGate;
use offload_runner::handler::RequestHandler;
use offload_runner::http;
use offload_runner::queue::{request_channel, result_channel};
use offload_runner::runtime::docker::DockerRuntime;
use offload_runner::sandbox::SandboxExecutor;

/// Sandboxed test-execution worker.
#[derive(Debug, Parser)]
#[command(name = "offload-runner", version, about)]
struct Cli {
    /// Address the operational HTTP surface binds to.
    #[arg(long, default_value = "0.0.0.0:8080")]
    http_addr: String,

    /// Inbound request channel buffer size (in-process default wiring;
    /// a real deployment replaces this with an adapter over its queue).
    #[arg(long, default_value_t = 256)]
    queue_buffer: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ExecutorConfig::from_env();

    if !config.sandbox_enabled {
        tracing::warn!("SANDBOX_ENABLED=false; request handler will refuse all requests at admission");
    }

    let runtime = DockerRuntime::connect()?;
    let executor = SandboxExecutor::new(runtime, config.clone());
    let runtime_for_http: Arc<dyn offload_runner::runtime::RuntimeAdapter> = executor.runtime_handle();
    let gate = Arc::new(ConcurrencyGate::new(config.max_concurrent_executions));
    let shutdown = CancellationToken::new();

    let handler = Arc::new(RequestHandler::new(executor, Arc::clone(&gate), shutdown.clone()));

    let (_request_tx, request_source) = request_channel(cli.queue_buffer);
    let (result_sink, mut result_rx) = result_channel(cli.queue_buffer);

    let request_source: Arc<dyn offload_runner::queue::RequestSource> = Arc::new(request_source);
    let result_sink: Arc<dyn offload_runner::queue::ResultSink> = Arc::new(result_sink);

    let drain_results = tokio::spawn(async move {
        while let Some(result) = result_rx.recv().await {
            tracing::info!(
                execution_id = %result.execution_id,
                success = result.test_result.success,
                exit_code = result.raw_result.exit_code,
                "execution result ready for publication"
            );
        }
    });

    let handler_task = tokio::spawn(Arc::clone(&handler).run(request_source, result_sink));

    let app = http::router(runtime_for_http, gate);
    let listener = tokio::net::TcpListener::bind(&cli.http_addr).await?;
    tracing::info!(addr = %cli.http_addr, "operational HTTP surface listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "http server exited with error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    shutdown.cancel();
    let _ = handler_task.await;
    drop(drain_results);

    Ok(())
}
