//! # error
//!
//! Error type of the HTTP surface.  The simulator core never fails: lookups
//! return `Option` and refused transitions return `false`.  Only handlers
//! produce an [`AppError`], rendered as
//! `{ "ok": false, "code": "...", "error": "..." }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::events::UnknownChannel;

#[derive(Debug, Error)]
pub enum AppError {
    /// The order ticket parsed but would never have left the dashboard.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// A `channels=` entry on the stream endpoint.
    #[error(transparent)]
    UnknownChannel(#[from] UnknownChannel),

    /// Unknown symbol, order id or open position.
    #[error("no {kind} '{key}'")]
    NotFound { kind: &'static str, key: String },
}

impl AppError {
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        AppError::NotFound { kind, key: key.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidOrder(_) | AppError::UnknownChannel(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidOrder(_)   => "INVALID_ORDER",
            AppError::UnknownChannel(_) => "UNKNOWN_CHANNEL",
            AppError::NotFound { .. }   => "NOT_FOUND",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "ok":    false,
            "code":  self.code(),
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_statuses() {
        assert_eq!(AppError::InvalidOrder("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(UnknownChannel("trades".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("order", "ORD1").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn not_found_names_what_is_missing() {
        let err = AppError::not_found("instrument", "NOPE");
        assert_eq!(err.to_string(), "no instrument 'NOPE'");
    }
}
