//! Request extractors with BOOKSWAP error shaping.

use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;

/// JSON body extractor that rejects with the standard validation error body.
///
/// Axum's own `Json` rejection answers 422 with a plain-text body; the API
/// contract treats a malformed body the same as a missing required field, so
/// syntax errors and type mismatches surface as 400 with the usual
/// `{"error": {...}}` shape.
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(AppError::validation(
                vec![json!({"error": rejection.body_text()})],
                "Malformed JSON body",
            )),
        }
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        title: String,
    }

    fn json_request(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn type_mismatch_rejects_with_validation_error() {
        let result = Json::<Payload>::from_request(json_request(r#"{"title": 123}"#), &()).await;

        let err = result.err().expect("type mismatch must be rejected");
        match err {
            AppError::Validation { code, .. } => assert_eq!(code, "validation_error"),
            other => panic!("expected validation rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn syntax_error_rejects_with_bad_request_status() {
        let result = Json::<Payload>::from_request(json_request("{not json"), &()).await;

        let err = result.err().expect("malformed body must be rejected");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn valid_body_deserializes() {
        let result =
            Json::<Payload>::from_request(json_request(r#"{"title": "ok"}"#), &()).await;
        assert!(result.is_ok());
    }
}
