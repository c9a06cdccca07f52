use anyhow::Result;
use api::{AppState, Settings, create_router, response};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting photos API");

    let settings = Settings::from_env()?;
    response::set_diagnostics(settings.server.is_development());

    let state = AppState::initialize(&settings).await?;
    info!("Photos API initialized successfully");

    let app = create_router(state);

    let addr = settings.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(
        "Photos API listening on {} ({})",
        addr, settings.server.environment
    );

    axum::serve(listener, app).await?;

    Ok(())
}
