mod db;
mod error;
mod rate_limit;
mod routes;
mod services;
mod state;
mod store;
mod upstream;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    let upstream = upstream::HttpUpstreamClient::from_env().expect("upstream client init failed");
    tracing::info!(endpoint = upstream.endpoint(), "upstream client initialized");

    let store = Arc::new(store::pg::PgStore::new(pool));
    let state = state::AppState::new(store, Arc::new(upstream));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "replygate listening");
    axum::serve(listener, app).await.expect("server failed");
}
