//! `Path` and `Query` extractors whose rejections render as the JSON envelope.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default)]
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(Path(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        Ok(Query(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        routing::{get, patch},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        dto::bookings::CancelBookingRequest, middleware::validate::ValidatedJson,
        routes::params::{LawyerSearchQuery, Pagination},
    };

    async fn by_id(Path(id): Path<i64>) -> String {
        id.to_string()
    }

    async fn paged(Query(pagination): Query<Pagination>) -> String {
        format!("{:?}", pagination.normalize())
    }

    async fn search(Query(query): Query<LawyerSearchQuery>) -> String {
        format!("{:?}", query.sort_by)
    }

    async fn cancel(payload: Option<ValidatedJson<CancelBookingRequest>>) -> String {
        let payload = payload.map(|ValidatedJson(p)| p).unwrap_or_default();
        payload.reason.unwrap_or_default()
    }

    fn app() -> Router {
        Router::new()
            .route("/lawyers/search", get(search))
            .route("/lawyers/{id}", get(by_id))
            .route("/reviews", get(paged))
            .route("/bookings/{id}/cancel", patch(cancel))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    async fn get_uri(uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    fn assert_envelope(status: StatusCode, content_type: Option<String>, body: &[u8]) {
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let json: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Validation failed");
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn bad_path_id_is_enveloped() {
        let (status, content_type, body) = get_uri("/lawyers/abc").await;
        assert_envelope(status, content_type, &body);
    }

    #[tokio::test]
    async fn good_path_id_passes_through() {
        let (status, _, body) = get_uri("/lawyers/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"42");
    }

    #[tokio::test]
    async fn bad_query_values_are_enveloped() {
        let (status, content_type, body) = get_uri("/reviews?page=x").await;
        assert_envelope(status, content_type, &body);

        let (status, content_type, body) = get_uri("/lawyers/search?sort_by=bogus").await;
        assert_envelope(status, content_type, &body);
    }

    #[tokio::test]
    async fn cancel_body_is_optional() {
        let (status, _, body) = send(
            Request::builder()
                .method("PATCH")
                .uri("/bookings/1/cancel")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        let (status, _, body) = send(
            Request::builder()
                .method("PATCH")
                .uri("/bookings/1/cancel")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"reason":"travel"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"travel");
    }

    #[tokio::test]
    async fn malformed_cancel_body_is_enveloped() {
        let (status, content_type, body) = send(
            Request::builder()
                .method("PATCH")
                .uri("/bookings/1/cancel")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
        assert_envelope(status, content_type, &body);
    }
}
