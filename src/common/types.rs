use serde::{Deserialize, Serialize};

/// Request structure for the verification endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub message: String,
    pub signature: String,
}

/// Response structure for the verification endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    pub signer: Option<String>,
    pub original_message: String,
    pub message_hash: String,
}

/// Uniform error body returned by every non-2xx response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub status: u16,
    /// Internal detail, included only when `APP_ENV=development`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                status,
                stack: None,
            },
        }
    }
}
