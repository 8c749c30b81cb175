use au_server::config::{Args, CorsOrigin};
use au_server::{Application, Config, telemetry};
use clap::Parser;
use tracing::info;

/// Resolves on SIGTERM or Ctrl+C; in-flight uploads and queries are then allowed to finish.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = ctrl_c => "Ctrl+C",
        _ = terminate => "SIGTERM",
    };
    info!(signal = received, "Shutdown requested, draining in-flight requests");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The OTLP exporter's HTTP client needs a crypto provider before it is built
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = Args::parse();
    let config = Config::load(&args)?;

    if args.validate {
        println!(
            "Configuration is valid: would listen on {} and allow {} CORS origin(s).",
            config.bind_address(),
            config.cors.allowed_origins.len()
        );
        return Ok(());
    }

    telemetry::init_telemetry(config.enable_otel_export)?;

    let allowed_origins: Vec<String> = config
        .cors
        .allowed_origins
        .iter()
        .map(CorsOrigin::header_value)
        .collect();
    info!(
        config_file = %args.config,
        bind_address = %config.bind_address(),
        ?allowed_origins,
        max_upload_size = ?config.limits.max_upload_size,
        docs = config.enable_docs,
        "Starting au-server"
    );

    Application::new(config)?.serve(shutdown_signal()).await
}
