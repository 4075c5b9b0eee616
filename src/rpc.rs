//! Soroban JSON-RPC client.
//!
//! Thin wrapper over the node's HTTP endpoint: account sequence lookup,
//! simulation, submission, and status queries. The simulation response type
//! forces callers through [`SimulateTransactionResponse::into_outcome`], so
//! an error-shaped result can never reach the return-value decoder.

use crate::envelope;
use crate::metrics::METRICS;
use crate::Error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use stellar_xdr::curr::{
    AccountId, LedgerEntryData, LedgerKey, LedgerKeyAccount, Limits, PublicKey, ReadXdr, ScVal,
    SorobanAuthorizationEntry, SorobanTransactionData, Transaction, TransactionMeta,
    TransactionV1Envelope, Uint256, WriteXdr,
};
use tracing::{debug, warn};

/// Terminal and non-terminal `getTransaction` statuses.
pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const STATUS_NOT_FOUND: &str = "NOT_FOUND";

/// Immediate `sendTransaction` rejection status.
pub const SEND_STATUS_ERROR: &str = "ERROR";

/// JSON-RPC client bound to one node endpoint.
pub struct SorobanRpc {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl SorobanRpc {
    pub fn new(url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "rpc call");
        let response = self
            .http
            .post(&self.url)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .map_err(|e| {
                METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
                Error::Rpc(format!("{method} request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
            return Err(Error::Rpc(format!("{method} returned http {status}")));
        }

        let body: RpcResponse<R> = response
            .json()
            .await
            .map_err(|e| Error::Rpc(format!("{method} returned invalid json: {e}")))?;

        if let Some(err) = body.error {
            METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
            warn!(method, code = err.code, error = %err.message, "rpc error");
            return Err(Error::Rpc(format!(
                "{method} failed: {} (code {})",
                err.message, err.code
            )));
        }
        body.result
            .ok_or_else(|| Error::Rpc(format!("{method} returned an empty result")))
    }

    /// Quick connectivity check against the node.
    pub async fn health(&self) -> Result<String, Error> {
        let resp: GetHealthResponse = self.call("getHealth", serde_json::json!({})).await?;
        Ok(resp.status)
    }

    /// Fetch an account's current sequence number.
    ///
    /// Fails if the account does not exist on the ledger (unfunded/unknown).
    pub async fn get_account(&self, address: &str) -> Result<AccountSnapshot, Error> {
        let pk = stellar_strkey::ed25519::PublicKey::from_string(address)
            .map_err(|_| Error::Validation(format!("invalid account address: {address}")))?;
        let key = LedgerKey::Account(LedgerKeyAccount {
            account_id: AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(pk.0))),
        });
        let key_b64 = key.to_xdr_base64(Limits::none())?;

        let resp: GetLedgerEntriesResponse = self
            .call("getLedgerEntries", serde_json::json!({ "keys": [key_b64] }))
            .await?;

        let entry = resp
            .entries
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::Rpc(format!("account not found on ledger: {address} (is it funded?)"))
            })?;

        match LedgerEntryData::from_xdr_base64(&entry.xdr, Limits::none())? {
            LedgerEntryData::Account(account) => Ok(AccountSnapshot {
                address: address.to_string(),
                sequence: account.seq_num.0,
            }),
            other => Err(Error::Rpc(format!(
                "unexpected ledger entry for {address}: {other:?}"
            ))),
        }
    }

    /// Dry-run a transaction against current network state. Read-only.
    pub async fn simulate_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<SimulateTransactionResponse, Error> {
        let tx_b64 = envelope::unsigned_envelope_base64(tx)?;
        self.call(
            "simulateTransaction",
            serde_json::json!({ "transaction": tx_b64 }),
        )
        .await
    }

    /// Submit a signed envelope. The caller checks the returned status.
    pub async fn send_transaction(
        &self,
        signed: &TransactionV1Envelope,
    ) -> Result<SendTransactionResponse, Error> {
        let tx_b64 = envelope::envelope_to_base64(signed)?;
        self.call(
            "sendTransaction",
            serde_json::json!({ "transaction": tx_b64 }),
        )
        .await
    }

    /// Fetch the status of a submitted transaction by hex hash.
    pub async fn get_transaction(&self, tx_hash: &str) -> Result<GetTransactionResponse, Error> {
        self.call("getTransaction", serde_json::json!({ "hash": tx_hash }))
            .await
    }
}

/// Account address plus its sequence number at read time.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    pub address: String,
    pub sequence: i64,
}

#[derive(Debug, Deserialize)]
struct GetHealthResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct GetLedgerEntriesResponse {
    entries: Option<Vec<LedgerEntryResult>>,
}

#[derive(Debug, Deserialize)]
struct LedgerEntryResult {
    xdr: String,
}

/// Raw `simulateTransaction` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateTransactionResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub transaction_data: Option<String>,
    #[serde(default)]
    pub min_resource_fee: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<SimulateHostFunctionResult>>,
    #[serde(default)]
    pub latest_ledger: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateHostFunctionResult {
    #[serde(default)]
    pub xdr: Option<String>,
    #[serde(default)]
    pub auth: Option<Vec<String>>,
}

impl SimulateTransactionResponse {
    /// The error predicate every caller must go through.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Convert into a decoded outcome, failing on an error-shaped result.
    ///
    /// This is the only path to the return value, so an error result cannot
    /// be mistaken for usable data.
    pub fn into_outcome(self) -> Result<SimulationOutcome, Error> {
        if let Some(error) = self.error {
            return Err(Error::Simulation(error));
        }

        let transaction_data = self
            .transaction_data
            .filter(|data| !data.is_empty())
            .map(|data| SorobanTransactionData::from_xdr_base64(&data, Limits::none()))
            .transpose()?;

        let min_resource_fee = self
            .min_resource_fee
            .as_deref()
            .map(|fee| {
                fee.parse::<i64>()
                    .map_err(|_| Error::Codec(format!("invalid minResourceFee: {fee}")))
            })
            .transpose()?
            .unwrap_or(0)
            .clamp(0, u32::MAX as i64) as u32;

        let first = self.results.unwrap_or_default().into_iter().next();
        let auth = first
            .as_ref()
            .and_then(|r| r.auth.as_ref())
            .map(|entries| {
                entries
                    .iter()
                    .map(|b64| SorobanAuthorizationEntry::from_xdr_base64(b64, Limits::none()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();
        let return_value = first
            .and_then(|r| r.xdr)
            .map(|b64| ScVal::from_xdr_base64(&b64, Limits::none()))
            .transpose()?;

        Ok(SimulationOutcome {
            transaction_data,
            min_resource_fee,
            auth,
            return_value,
        })
    }
}

/// Decoded simulation result, only obtainable after the error check.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub transaction_data: Option<SorobanTransactionData>,
    pub min_resource_fee: u32,
    pub auth: Vec<SorobanAuthorizationEntry>,
    pub return_value: Option<ScVal>,
}

impl SimulationOutcome {
    pub fn require_return_value(&self) -> Result<&ScVal, Error> {
        self.return_value
            .as_ref()
            .ok_or_else(|| Error::Simulation("no result returned from simulation".into()))
    }
}

/// Raw `sendTransaction` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionResponse {
    pub status: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub error_result_xdr: Option<String>,
    #[serde(default)]
    pub latest_ledger: Option<u32>,
}

/// Raw `getTransaction` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionResponse {
    pub status: String,
    #[serde(default)]
    pub latest_ledger: Option<u32>,
    #[serde(default)]
    pub result_xdr: Option<String>,
    #[serde(default)]
    pub result_meta_xdr: Option<String>,
}

impl GetTransactionResponse {
    pub fn is_not_found(&self) -> bool {
        self.status == STATUS_NOT_FOUND
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Decode the invocation's return value from the transaction meta.
    pub fn return_value(&self) -> Result<Option<ScVal>, Error> {
        let Some(meta_b64) = &self.result_meta_xdr else {
            return Ok(None);
        };
        match TransactionMeta::from_xdr_base64(meta_b64, Limits::none())? {
            TransactionMeta::V3(meta) => {
                Ok(meta.soroban_meta.map(|soroban| soroban.return_value))
            }
            _ => Ok(None),
        }
    }
}
