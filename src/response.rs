//! Response types for the gateway API.

use crate::pinning::{PinGroup, PinnedFile};
use serde::Serialize;
use serde_json::Value;

/// Uniform operation response: `{success, result?, error?, tx_hash?}`.
#[derive(Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl ApiResponse {
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            tx_hash: None,
        }
    }

    pub fn confirmed(result: Option<Value>, tx_hash: String) -> Self {
        Self {
            success: true,
            result,
            error: None,
            tx_hash: Some(tx_hash),
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
            tx_hash: None,
        }
    }
}

/// Response from the upload endpoint: the created group plus one
/// descriptor per uploaded file, in request order.
#[derive(Serialize)]
pub struct UploadResponse {
    pub group: PinGroup,
    pub files: Vec<PinnedFile>,
}

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub contract_id: String,
    pub rpc_url: String,
    pub uptime_secs: u64,
    pub requests: u64,
}
