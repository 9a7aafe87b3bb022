use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use eventboard::config::Config;
use eventboard::handlers::AppState;
use eventboard::routes::create_routes;
use eventboard::store::MemoryBackend;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("eventboard=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    let state = AppState::new(Arc::new(MemoryBackend::new()));

    let app: Router = create_routes(state, &config);

    let addr = config.bind_addr;
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
