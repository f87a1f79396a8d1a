use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tradepost_core::OrderError;

/// Map a domain error to its HTTP status and JSON body.
///
/// `Storage` deliberately answers with a generic message: the operation name
/// and driver detail are already in the logs and are not the client's
/// business.
pub fn order_error_to_response(err: OrderError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        OrderError::InvalidInput(_) => json_error(StatusCode::BAD_REQUEST, "invalid_input", message),
        OrderError::OrderNotFound(_)
        | OrderError::ProductNotFound(_)
        | OrderError::CustomerNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", message)
        }
        OrderError::InvalidState { .. } => {
            json_error(StatusCode::BAD_REQUEST, "invalid_state", message)
        }
        OrderError::InsufficientStock {
            requested,
            available,
        } => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "insufficient_stock",
                "message": message,
                "requested": requested,
                "available": available,
            })),
        )
            .into_response(),
        OrderError::LockTimeout => json_error(StatusCode::CONFLICT, "lock_timeout", message),
        OrderError::Storage { .. } => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "internal server error",
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradepost_core::OrderId;

    #[test]
    fn insufficient_stock_maps_to_400_with_both_quantities() {
        let resp = order_error_to_response(OrderError::insufficient_stock(10, 4));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn lock_timeout_maps_to_conflict() {
        let resp = order_error_to_response(OrderError::LockTimeout);
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_maps_to_500() {
        let resp = order_error_to_response(OrderError::storage("lock_order"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_records_map_to_404() {
        let resp = order_error_to_response(OrderError::order_not_found(OrderId::new(9)));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
