//! # Guarana Gateway
//!
//! HTTP gateway and CLI for the Guarana NFT contract on Soroban.
//! Builds contract-call envelopes, simulates them, signs them (locally or
//! via a delegated wallet signature), submits them, and polls for a
//! terminal status. Uploaded media is pinned to Pinata under a named group.
//!
//! ## Quick Start
//! ```bash
//! cargo run --bin gateway
//! ```
//!
//! ## Endpoints
//! - `GET /health` - Health check with metrics
//! - `POST /api/files` - Pin uploaded files under a named group
//! - `POST /api/collections` - Build an unsigned create_collection envelope
//! - `POST /api/transactions` - Submit a signed envelope and confirm

pub mod cli;
pub mod codec;
pub mod config;
pub mod contract;
pub mod envelope;
mod error;
mod handlers;
mod metrics;
mod middleware;
pub mod pinning;
mod response;
mod router;
pub mod rpc;
pub mod signer;
mod state;
pub mod submit;
pub mod types;

pub use config::{Config, NetworkConfig};
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
