use gemgate::config::CONFIG;
use gemgate::providers::Providers;
use gemgate::server::listen::bind_with_fallback;
use gemgate::server::router::{GatewayState, gemgate_router};
use mimalloc::MiMalloc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &*CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        fallback_ports = ?cfg.basic.fallback_ports,
        loglevel = %cfg.basic.loglevel,
        gateway_key = if cfg.basic.gateway_key().is_some() { "<set>" } else { "<none>" },
        stream_chunk_delay_ms = cfg.stream.chunk_delay_ms,
        "Configuration loaded"
    );

    let providers = Providers::init(cfg)?;
    let state = GatewayState::new(providers, cfg.stream.clone(), cfg.basic.gateway_key());
    let app = gemgate_router(state);

    let listener = bind_with_fallback(
        cfg.basic.listen_addr,
        cfg.basic.listen_port,
        &cfg.basic.fallback_ports,
    )
    .await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
