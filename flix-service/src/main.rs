use flix_service::{ServiceConfig, create_app, init_tracing};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env()?;
    init_tracing(config.log_format);

    info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        "Starting Flix.AI recommendation service"
    );

    let app = create_app(&config);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    let addr = listener.local_addr()?;

    info!("Server running on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /health              - Health check");
    info!("  GET  /catalog             - Selectable genres and languages");
    info!("  POST /recommend           - Generate movie recommendations");
    info!(r#"    Example: POST /recommend {{"genres": ["action"], "language": "en"}}"#);
    info!("  POST /sessions            - Start a form session");

    axum::serve(listener, app).await?;

    Ok(())
}
