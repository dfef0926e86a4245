/**
 * Error Conversion
 *
 * `IntoResponse` for `BackendError`, so handlers can return it directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "session token expired",
 *   "status": 401,
 *   "logout": true
 * }
 * ```
 *
 * `logout` is true only for expired or invalid session tokens.
 *
 * Path and query rejections are folded into `HandlerError` so malformed
 * requests get the same body shape.
 */

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    response::{IntoResponse, Json, Response},
};
use crate::backend::error::types::BackendError;

impl From<PathRejection> for BackendError {
    fn from(rejection: PathRejection) -> Self {
        BackendError::handler(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for BackendError {
    fn from(rejection: QueryRejection) -> Self {
        BackendError::handler(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", self);
        }

        let body = serde_json::json!({
            "error": self.message(),
            "status": status.as_u16(),
            "logout": self.forces_logout(),
        });

        (status, Json(body)).into_response()
    }
}
