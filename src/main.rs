use tiktok_downloader::{ApiError, Config, build_router};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "tiktok_downloader=info,tower_http=info".to_string()),
        )
        .init();

    if let Err(error) = run().await {
        eprintln!("Server error: {}", error.message);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    let app = build_router(&config);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|error| {
            ApiError::internal(format!("Could not bind {}: {error}", config.bind_addr))
        })?;

    info!("Mock downloader listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|error| ApiError::internal(format!("HTTP server error: {error}")))
}
