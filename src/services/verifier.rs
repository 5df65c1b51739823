use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use eth_signature_verifier::common::types::{ErrorBody, VerifyResponse};
use eth_signature_verifier::common::verify::{verify_message, VerifyError};
use serde_json::Value;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Error carried out of a handler. Serializes to the uniform
/// `{ error: { message, status } }` body; the internal detail is logged
/// server-side and only echoed in the `stack` field when
/// `APP_ENV=development`.
struct AppError {
    status: StatusCode,
    message: String,
    detail: Option<String>,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<VerifyError> for AppError {
    fn from(err: VerifyError) -> Self {
        AppError::bad_request("Invalid signature format or unable to recover address")
            .with_detail(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let detail = self.detail.as_deref().unwrap_or(&self.message);
        tracing::error!(status = %self.status.as_u16(), "{detail}");

        let mut body = ErrorBody::new(self.message, self.status.as_u16());
        if development_mode() {
            body.error.stack = self.detail;
        }
        (self.status, Json(body)).into_response()
    }
}

fn development_mode() -> bool {
    env::var("APP_ENV").map(|v| v == "development").unwrap_or(false)
}

// Create a new router with the verify endpoint
pub fn create_router() -> Router {
    Router::new()
        .route("/verify-signature", post(handle_verify_request))
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Pulls `message` and `signature` out of the parsed body, enforcing the
/// validation order: presence first, then type.
fn validate_request(body: &Value) -> Result<(&str, &str), AppError> {
    let message = body.get("message");
    let signature = body.get("signature");

    let present = |field: Option<&Value>| match field {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    if !present(message) || !present(signature) {
        return Err(AppError::bad_request("Missing message or signature"));
    }

    match (message.and_then(Value::as_str), signature.and_then(Value::as_str)) {
        (Some(message), Some(signature)) => Ok((message, signature)),
        _ => Err(AppError::bad_request(
            "Message and signature must be strings",
        )),
    }
}

// Handle the verify request
async fn handle_verify_request(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VerifyResponse>, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        AppError::bad_request("Invalid JSON body").with_detail(rejection.body_text())
    })?;

    let (message, signature) = validate_request(&body)?;
    tracing::info!(message_len = message.len(), "received verify request");

    let verification = verify_message(message, signature)?;

    Ok(Json(VerifyResponse {
        is_valid: verification.is_valid,
        signer: verification.signer,
        original_message: verification.original_message,
        message_hash: verification.message_hash,
    }))
}

async fn handle_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("Not Found", 404)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use eth_signature_verifier::common::signer::{parse_signing_key, sign_message};
    use eth_signature_verifier::test_utils;
    use serde_json::json;
    use tower::ServiceExt;

    async fn post_verify(app: Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/verify-signature")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn valid_signature_returns_signer() {
        let app = create_router();
        let signed = test_utils::create_signed_payload("Hello, World!");

        let (status, body) = post_verify(
            app,
            json!({ "message": signed.message, "signature": signed.signature }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["isValid"].as_bool().unwrap());
        assert_eq!(body["signer"].as_str().unwrap(), signed.address);
        assert_eq!(body["originalMessage"].as_str().unwrap(), "Hello, World!");
        let hash = body["messageHash"].as_str().unwrap();
        assert!(hash.starts_with("0x") && hash.len() == 66);
    }

    #[tokio::test]
    async fn known_key_recovers_known_address() {
        let app = create_router();
        let (key_hex, address) = test_utils::known_keypair();
        let key = parse_signing_key(key_hex).unwrap();
        let signed = sign_message(&key, "hello world").unwrap();

        let (status, body) = post_verify(
            app,
            json!({ "message": "hello world", "signature": signed.signature }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["isValid"].as_bool().unwrap());
        assert_eq!(body["signer"].as_str().unwrap(), address);
    }

    #[tokio::test]
    async fn missing_signature_is_rejected() {
        let app = create_router();
        let (status, body) = post_verify(app, json!({ "message": "hi" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"].as_str().unwrap(),
            "Missing message or signature"
        );
        assert_eq!(body["error"]["status"].as_u64().unwrap(), 400);
    }

    #[tokio::test]
    async fn empty_message_counts_as_missing() {
        let app = create_router();
        let (status, body) =
            post_verify(app, json!({ "message": "", "signature": "0xabcd" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"].as_str().unwrap(),
            "Missing message or signature"
        );
    }

    #[tokio::test]
    async fn non_string_fields_are_rejected() {
        let app = create_router();
        let (status, body) =
            post_verify(app, json!({ "message": 123, "signature": "0xabc" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"].as_str().unwrap(),
            "Message and signature must be strings"
        );
    }

    #[tokio::test]
    async fn malformed_signature_is_rejected() {
        let app = create_router();
        let (status, body) = post_verify(
            app,
            json!({ "message": "hello world", "signature": "0xabc" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"].as_str().unwrap(),
            "Invalid signature format or unable to recover address"
        );
    }

    #[tokio::test]
    async fn invalid_json_body_is_rejected() {
        let app = create_router();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/verify-signature")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["status"].as_u64().unwrap(), 400);
    }

    #[tokio::test]
    async fn unknown_route_returns_json_404() {
        let app = create_router();
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["message"].as_str().unwrap(), "Not Found");
        assert_eq!(body["error"]["status"].as_u64().unwrap(), 404);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    let app = create_router();

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Verifier backend running on port {port}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
