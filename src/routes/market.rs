//! # routes::market
//!
//! Quote and depth queries.
//!
//! | Method | Path                              | Description                    |
//! |--------|-----------------------------------|--------------------------------|
//! | GET    | `/api/health`                     | Tick / order counters          |
//! | GET    | `/api/instruments`                | Every instrument, listing order|
//! | GET    | `/api/instruments/:symbol`        | One instrument                 |
//! | GET    | `/api/instruments/:symbol/depth`  | Fresh synthetic depth ladder   |

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{error::AppError, state::SharedState};

/// GET /api/health
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    let market = &state.market;
    Json(json!({
        "ok":          true,
        "tick_count":  market.tick_count(),
        "order_count": market.orders().len(),
        "instruments": market.instruments().len(),
    }))
}

/// GET /api/instruments
pub async fn list_instruments(State(state): State<SharedState>) -> impl IntoResponse {
    let instruments = state.market.instruments();
    Json(json!({
        "ok":          true,
        "count":       instruments.len(),
        "instruments": instruments,
    }))
}

/// GET /api/instruments/:symbol
pub async fn get_instrument(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let instrument = state
        .market
        .instrument(&symbol)
        .ok_or_else(|| AppError::not_found("instrument", &symbol))?;

    Ok(Json(json!({ "ok": true, "instrument": instrument })))
}

/// GET /api/instruments/:symbol/depth
///
/// Unknown symbols get empty sides, not a 404.
pub async fn get_depth(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    let depth = state.market.market_depth(&symbol);
    Json(json!({ "ok": true, "symbol": symbol, "depth": depth }))
}
