//! Error types for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;

/// Gateway error type.
///
/// Each variant maps to one failure class of the submit pipeline: bad input
/// before any network call, a contract rejection during simulation, a signing
/// failure, an immediate rejection on send, or a non-success terminal status
/// after the transaction was accepted.
#[derive(Debug)]
pub enum Error {
    /// Configuration error.
    Config(String),
    /// Missing or malformed input, detected before any network call.
    Validation(String),
    /// RPC communication error.
    Rpc(String),
    /// XDR or ScVal encoding/decoding error.
    Codec(String),
    /// The contract would reject the call (detected before signing).
    Simulation(String),
    /// Key unavailable, wallet declined, or envelope shape rejected.
    Signing(String),
    /// The network rejected the envelope on send.
    Submission(String),
    /// Accepted for processing but resolved to a non-success status.
    Confirmation(String),
    /// The confirmation poll exhausted its attempt budget.
    ConfirmationTimeout { attempts: u32 },
    /// Pinning service error.
    Pinning(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::Validation(msg) => write!(f, "validation error: {msg}"),
            Error::Rpc(msg) => write!(f, "rpc error: {msg}"),
            Error::Codec(msg) => write!(f, "codec error: {msg}"),
            Error::Simulation(msg) => write!(f, "simulation failed: {msg}"),
            Error::Signing(msg) => write!(f, "signing failed: {msg}"),
            Error::Submission(msg) => write!(f, "submission failed: {msg}"),
            Error::Confirmation(msg) => write!(f, "transaction failed: {msg}"),
            Error::ConfirmationTimeout { attempts } => {
                write!(f, "no terminal status after {attempts} polling attempts")
            }
            Error::Pinning(msg) => write!(f, "pinning error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<stellar_xdr::curr::Error> for Error {
    fn from(e: stellar_xdr::curr::Error) -> Self {
        Error::Codec(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Rpc(e.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Config(_) | Error::Codec(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Rpc(_) | Error::Submission(_) => StatusCode::BAD_GATEWAY,
            Error::Simulation(_) | Error::Signing(_) | Error::Confirmation(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::ConfirmationTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Error::Pinning(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string()
        });
        (status, Json(body)).into_response()
    }
}
