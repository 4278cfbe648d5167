//! Error types for the API server.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Lot
//! errors keep their [`ErrorKind`] tag in the JSON body so clients can
//! branch on the category rather than parse messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parkgrid_lot::{ErrorKind, LotError};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A lot-layer failure (unknown ids, illegal transitions, routing).
    #[error(transparent)]
    Lot(#[from] LotError),

    /// An invalid query or path parameter was provided.
    #[error("invalid request: {0}")]
    BadRequest(String),
}

/// HTTP status for a lot-layer error category.
const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidTransition | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NoPath => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            Self::Lot(e) => (status_for(e.kind()), e.kind().to_string(), e.to_string()),
            Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, String::from("BadRequest"), msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "kind": kind,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkgrid_types::{LotId, NodeId, SpotStatus};

    #[test]
    fn lot_errors_map_to_their_statuses() {
        let cases = [
            (
                ApiError::from(LotError::LotNotFound(LotId::new(1))),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(LotError::Conflict {
                    node: NodeId::new(3),
                    status: SpotStatus::Reserved,
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(LotError::InvalidTransition {
                    node: NodeId::new(3),
                    from: SpotStatus::Available,
                    to: SpotStatus::Occupied,
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(LotError::NoPath {
                    from: NodeId::new(1),
                    to: NodeId::new(2),
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::BadRequest(String::from("bad")),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
