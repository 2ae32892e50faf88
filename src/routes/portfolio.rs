//! # routes::portfolio
//!
//! | Method | Path                                 | Description                 |
//! |--------|--------------------------------------|-----------------------------|
//! | GET    | `/api/positions`                     | Open positions plus totals  |
//! | POST   | `/api/positions/:symbol/square-off`  | Close one position          |
//! | GET    | `/api/holdings`                      | Holdings plus summary       |
//! | GET    | `/api/funds`                         | Funds / margin              |

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{error::AppError, state::SharedState};

/// GET /api/positions
pub async fn list_positions(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "ok":        true,
        "positions": state.market.positions(),
        "summary":   state.market.positions_summary(),
    }))
}

/// POST /api/positions/:symbol/square-off
pub async fn square_off(
    State(state): State<SharedState>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order = state
        .market
        .square_off_position(&symbol)
        .ok_or_else(|| AppError::not_found("open position", &symbol))?;

    info!(%symbol, order_id = %order.id, "square-off requested over HTTP");
    Ok(Json(json!({ "ok": true, "order": order })))
}

/// GET /api/holdings
pub async fn list_holdings(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "ok":       true,
        "holdings": state.market.holdings(),
        "summary":  state.market.holdings_summary(),
    }))
}

/// GET /api/funds
pub async fn get_funds(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({ "ok": true, "funds": state.market.funds() }))
}
