use eth_signature_verifier::common::types::{ErrorBody, VerifyResponse};
use eth_signature_verifier::common::verify::verify_message;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde_json::Value;

/// Main function for the Lambda handler
#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .with_line_number(false)
        .init();

    run(service_fn(handle_request)).await
}

/// Route the incoming request
async fn handle_request(event: Request) -> Result<Response<Body>, Error> {
    let path = event.uri().path();
    tracing::info!(%path, "received request");

    // Handle both root path and /verify-signature
    if path == "/" || path == "/verify-signature" {
        handle_verify_request(event).await
    } else {
        error_response(404, "Not Found", None)
    }
}

/// Handle the verify request
async fn handle_verify_request(event: Request) -> Result<Response<Body>, Error> {
    let body: Value = match serde_json::from_slice(event.body()) {
        Ok(body) => body,
        Err(err) => {
            return error_response(400, "Invalid JSON body", Some(err.to_string()));
        }
    };

    let message = body.get("message");
    let signature = body.get("signature");

    let present = |field: Option<&Value>| match field {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    if !present(message) || !present(signature) {
        return error_response(400, "Missing message or signature", None);
    }

    let (message, signature) = match (
        message.and_then(Value::as_str),
        signature.and_then(Value::as_str),
    ) {
        (Some(message), Some(signature)) => (message, signature),
        _ => {
            return error_response(400, "Message and signature must be strings", None);
        }
    };

    match verify_message(message, signature) {
        Ok(verification) => {
            let response = VerifyResponse {
                is_valid: verification.is_valid,
                signer: verification.signer,
                original_message: verification.original_message,
                message_hash: verification.message_hash,
            };
            json_response(200, serde_json::to_string(&response)?)
        }
        Err(err) => {
            tracing::error!("verification failed: {err}");
            error_response(
                400,
                "Invalid signature format or unable to recover address",
                Some(err.to_string()),
            )
        }
    }
}

fn error_response(
    status: u16,
    message: &str,
    detail: Option<String>,
) -> Result<Response<Body>, Error> {
    let mut body = ErrorBody::new(message, status);
    if development_mode() {
        body.error.stack = detail;
    }
    json_response(status, serde_json::to_string(&body)?)
}

fn development_mode() -> bool {
    std::env::var("APP_ENV")
        .map(|v| v == "development")
        .unwrap_or(false)
}

fn json_response(status: u16, body: String) -> Result<Response<Body>, Error> {
    let response = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))?;
    Ok(response)
}
