//! Keep-alive HTTP server for uptime pings.
//!
//! Hosting platforms that sleep idle processes poll these endpoints to
//! keep the bot awake. Purely informational, no state.

use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

async fn home() -> Html<&'static str> {
    Html(
        "<div style=\"text-align: center; font-family: sans-serif; padding: 50px;\">\
         <h1>🤖 Ticker Bot</h1>\
         <p>✅ Bot is online.</p>\
         </div>",
    )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "tickerbot",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Serve `/` and `/health` until the process exits.
pub async fn serve(port: u16) -> std::io::Result<()> {
    let app = Router::new()
        .route("/", get(home))
        .route("/health", get(health));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "keep-alive server listening");
    axum::serve(listener, app).await
}
