/**
 * ChatRelay Server Entry Point
 *
 * Loads configuration, initializes tracing and serves the realtime
 * endpoints over Axum.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    // Initialize tracing with INFO level by default
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = chatrelay::shared::ServerConfig::from_env()?;
    tracing::info!(
        "Configuration loaded (ping every {:?}, pong timeout {:?}, {} seeded users)",
        config.ping_interval,
        config.pong_timeout,
        config.users.len()
    );

    let app = chatrelay::backend::server::create_app(&config).await;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin chatrelay-server --features ssr");
    std::process::exit(1);
}
