//! # routes::orders
//!
//! The order blotter.
//!
//! | Method | Path               | Description                          |
//! |--------|--------------------|--------------------------------------|
//! | GET    | `/api/orders`      | All orders, newest first             |
//! | POST   | `/api/orders`      | Place an order                       |
//! | DELETE | `/api/orders/:id`  | Cancel a pending order               |
//!
//! The core engine accepts any request.  The checks the dashboard's order
//! ticket used to make live here instead, in [`validate`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::OrderRequest,
    state::SharedState,
};

/// Largest quantity a position can carry.
pub const MAX_QUANTITY: u64 = i64::MAX as u64;

/// Rejects order tickets the UI would never have sent, and strips the price
/// or trigger from kinds that do not use them.
pub fn validate(mut request: OrderRequest) -> Result<OrderRequest, AppError> {
    if request.symbol.trim().is_empty() {
        return Err(AppError::InvalidOrder("symbol is required".into()));
    }
    if request.quantity == 0 {
        return Err(AppError::InvalidOrder("quantity must be at least 1".into()));
    }
    if request.quantity > MAX_QUANTITY {
        return Err(AppError::InvalidOrder(format!("quantity must be at most {MAX_QUANTITY}")));
    }

    if request.kind.takes_price() {
        match request.price {
            Some(p) if p.is_finite() && p > 0.0 => {}
            _ => {
                return Err(AppError::InvalidOrder(format!(
                    "{:?} orders need a positive price",
                    request.kind
                )))
            }
        }
    } else {
        request.price = None;
    }

    if request.kind.takes_trigger() {
        match request.trigger_price {
            Some(t) if t.is_finite() && t > 0.0 => {}
            _ => {
                return Err(AppError::InvalidOrder(format!(
                    "{:?} orders need a positive trigger price",
                    request.kind
                )))
            }
        }
    } else {
        request.trigger_price = None;
    }

    Ok(request)
}

/// GET /api/orders
pub async fn list_orders(State(state): State<SharedState>) -> impl IntoResponse {
    let orders = state.market.orders();
    Json(json!({
        "ok":     true,
        "count":  orders.len(),
        "orders": orders,
    }))
}

/// POST /api/orders
pub async fn place_order(
    State(state): State<SharedState>,
    Json(request): Json<OrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = validate(request)?;
    let order = state.market.place_order(request);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "order": order })),
    ))
}

/// DELETE /api/orders/:id
pub async fn cancel_order(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if state.market.order(&id).is_none() {
        return Err(AppError::not_found("order", id));
    }

    let cancelled = state.market.cancel_order(&id);
    let status = if cancelled { StatusCode::OK } else { StatusCode::CONFLICT };

    Ok((
        status,
        Json(json!({
            "ok":        cancelled,
            "cancelled": cancelled,
            "order":     state.market.order(&id),
        })),
    ))
}
