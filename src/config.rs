//! Gateway configuration.

use serde::Deserialize;

/// Configuration for the gateway and CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    #[serde(default = "defaults::network_passphrase")]
    pub network_passphrase: String,

    #[serde(default = "defaults::contract_id")]
    pub contract_id: String,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// Bearer JWT for the pinning service. Empty disables uploads.
    #[serde(default)]
    pub pinata_jwt: String,

    #[serde(default = "defaults::pinata_api_url")]
    pub pinata_api_url: String,

    #[serde(default = "defaults::pinata_upload_url")]
    pub pinata_upload_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: defaults::rpc_url(),
            network_passphrase: defaults::network_passphrase(),
            contract_id: defaults::contract_id(),
            bind_address: defaults::bind_address(),
            pinata_jwt: String::new(),
            pinata_api_url: defaults::pinata_api_url(),
            pinata_upload_url: defaults::pinata_upload_url(),
        }
    }
}

impl Config {
    /// Load from `gateway.toml` (optional) with `GUARANA_*` environment
    /// overrides, e.g. `GUARANA_RPC_URL`, `GUARANA_PINATA_JWT`.
    pub fn load() -> Result<Self, crate::Error> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("gateway").required(false))
            .add_source(config::Environment::with_prefix("GUARANA"))
            .build()
            .map_err(|e| crate::Error::Config(format!("failed to read configuration: {e}")))?;
        settings
            .try_deserialize()
            .map_err(|e| crate::Error::Config(format!("invalid configuration: {e}")))
    }

    /// The chain-facing subset, threaded into every component constructor.
    pub fn network(&self) -> NetworkConfig {
        NetworkConfig {
            rpc_url: self.rpc_url.clone(),
            network_passphrase: self.network_passphrase.clone(),
            contract_id: self.contract_id.clone(),
        }
    }
}

/// Endpoint, network passphrase, and contract identifier for one deployment.
///
/// Passed explicitly so nothing binds to a hidden global endpoint and tests
/// can point components at a mock RPC server.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub network_passphrase: String,
    pub contract_id: String,
}

mod defaults {
    pub fn rpc_url() -> String {
        "https://soroban-testnet.stellar.org".into()
    }

    pub fn network_passphrase() -> String {
        "Test SDF Network ; September 2015".into()
    }

    pub fn contract_id() -> String {
        "CBQOMU3JVKPFKN5SVP7XN6OEURNKF2NBP76UCNWT3IPBSNUIQ6VPJX4Q".into()
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3030".into()
    }

    pub fn pinata_api_url() -> String {
        "https://api.pinata.cloud/v3".into()
    }

    pub fn pinata_upload_url() -> String {
        "https://uploads.pinata.cloud/v3".into()
    }
}

/// Link to a transaction on the public testnet explorer.
pub fn explorer_tx_url(tx_hash: &str) -> String {
    format!("https://stellar.expert/explorer/testnet/tx/{tx_hash}")
}
