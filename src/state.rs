//! Application state shared across handlers.

use crate::config::Config;
use crate::contract::NftContractClient;
use crate::pinning::PinataClient;
use crate::rpc::SorobanRpc;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub rpc: Arc<SorobanRpc>,
    pub contract: NftContractClient,
    pub pinata: PinataClient,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Self {
        let rpc = Arc::new(SorobanRpc::new(&config.rpc_url));
        let contract = NftContractClient::new(Arc::clone(&rpc), config.network());
        let pinata = PinataClient::new(&config);
        info!(contract = %config.contract_id, rpc = %config.rpc_url, "gateway state initialized");
        Self {
            config,
            rpc,
            contract,
            pinata,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        }
    }
}
