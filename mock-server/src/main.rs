use mock_server::{sample_statuses, MockFeed};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let username = std::env::var("MOCK_USER").unwrap_or_else(|_| "user".to_string());
    let password = std::env::var("MOCK_PASSWORD").unwrap_or_else(|_| "pass".to_string());
    let hold_open = std::env::var("MOCK_HOLD_OPEN").is_ok_and(|v| v == "1");

    let feed = MockFeed::new(&username, &password, sample_statuses()).hold_open(hold_open);
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    mock_server::run(listener, feed).await
}
