use std::time::Duration;

use gdp_mock_server::{AppState, MockOptions};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let delay_ms = std::env::var("MOCK_DELAY_MS")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(0);

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, delay_ms, "mock GDP backend listening");

    let state = AppState::new(MockOptions::default().delay(Duration::from_millis(delay_ms)));
    gdp_mock_server::run(listener, state).await
}
