//! HTTP / WebSocket surface over the [`Market`](crate::market::Market).

pub mod market;
pub mod monitor;
pub mod orders;
pub mod portfolio;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::SharedState;

/// Builds the full router with tracing and permissive CORS for the dashboard
/// dev server.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Quotes ────────────────────────────────────────────────────────────
        .route("/api/health",                      get(market::health_check))
        .route("/api/instruments",                 get(market::list_instruments))
        .route("/api/instruments/:symbol",         get(market::get_instrument))
        .route("/api/instruments/:symbol/depth",   get(market::get_depth))
        // ── Portfolio ─────────────────────────────────────────────────────────
        .route("/api/positions",                   get(portfolio::list_positions))
        .route("/api/positions/:symbol/square-off", post(portfolio::square_off))
        .route("/api/holdings",                    get(portfolio::list_holdings))
        .route("/api/funds",                       get(portfolio::get_funds))
        // ── Orders ────────────────────────────────────────────────────────────
        .route("/api/orders",                      get(orders::list_orders).post(orders::place_order))
        .route("/api/orders/:id",                  delete(orders::cancel_order))
        // ── Stream ────────────────────────────────────────────────────────────
        .route("/ws/stream",                       get(monitor::ws_stream))
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
