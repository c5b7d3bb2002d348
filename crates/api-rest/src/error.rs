//! HTTP error mapping.
//!
//! Every failure leaves the API as `{ "error": "<message>" }`, the body shape the web front end
//! already understands.

use api_shared::wire::ErrorRes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use echo_core::EchoError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Patient not found")]
    PatientNotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            ApiError::PatientNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Internal(detail) => {
                tracing::error!("API internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorRes { error: message })).into_response()
    }
}

impl From<EchoError> for ApiError {
    fn from(err: EchoError) -> Self {
        match err {
            EchoError::PatientNotFound(_) => ApiError::PatientNotFound,
            e if e.is_client_error() => ApiError::BadRequest(e.to_string()),
            e => ApiError::Internal(format!("{:?}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use echo_core::CalculationError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_uses_fixed_message() {
        let err: ApiError = EchoError::PatientNotFound("RM-9".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Patient not found");
    }

    #[tokio::test]
    async fn calculation_errors_are_bad_requests() {
        let err: ApiError =
            EchoError::from(CalculationError::Domain("SVR: cardiac output is zero".into())).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("cardiac output is zero"));
    }

    #[tokio::test]
    async fn store_errors_hide_details() {
        let err: ApiError = EchoError::FileWrite(std::io::Error::other("disk full")).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Internal server error");
    }
}
