use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ApiError;

/// JSON body whose rejections come back in the usual envelope instead of
/// axum's plain-text body.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            warn!(status = %rejection.status(), "request body rejected");
            ApiError::from(rejection)
        })?;
        Ok(ApiJson(value))
    }
}

#[cfg(test)]
mod tests {
    use crate::{app::build_app, state::AppState};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn send(content_type: Option<&str>, body: &'static str) -> (StatusCode, serde_json::Value) {
        let mut req = Request::builder().method("POST").uri("/api/update_goal");
        if let Some(ct) = content_type {
            req = req.header("content-type", ct);
        }
        let res = build_app(AppState::fake())
            .oneshot(req.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn mistyped_field_comes_back_in_the_envelope() {
        let (status, body) = send(Some("application/json"), r#"{"userId":"abc"}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("userId"));
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn malformed_json_and_missing_content_type_use_the_envelope() {
        let (status, body) = send(Some("application/json"), "{\"userId\": 1,").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(None, r#"{"userId":1}"#).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["success"], false);
    }
}
