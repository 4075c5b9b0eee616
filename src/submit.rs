//! Submission and confirmation polling.
//!
//! Send the signed envelope, fail fast on an immediate `ERROR` status, then
//! poll `getTransaction` at a fixed interval while the status is exactly
//! `NOT_FOUND`. The loop is bounded: after [`MAX_POLL_ATTEMPTS`] the caller
//! gets a visible timeout error instead of polling forever.

use crate::envelope;
use crate::rpc::{GetTransactionResponse, SorobanRpc, SEND_STATUS_ERROR};
use crate::Error;
use std::future::Future;
use std::time::Duration;
use stellar_xdr::curr::{ScVal, TransactionV1Envelope};
use tracing::{debug, info};

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const MAX_POLL_ATTEMPTS: u32 = 60;

/// Successful terminal outcome of a submitted transaction.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub tx_hash: String,
    pub return_value: Option<ScVal>,
}

/// Poll until the first status other than `NOT_FOUND`.
///
/// Returns whatever terminal response the network produced, success or
/// failure; classifying it is the caller's job. Errors from `fetch` abort
/// the loop immediately.
pub async fn poll_until_terminal<F, Fut>(
    mut fetch: F,
    interval: Duration,
    max_attempts: u32,
) -> Result<GetTransactionResponse, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<GetTransactionResponse, Error>>,
{
    for attempt in 1..=max_attempts {
        let response = fetch().await?;
        if !response.is_not_found() {
            return Ok(response);
        }
        debug!(attempt, "transaction not found yet, polling again");
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }
    Err(Error::ConfirmationTimeout {
        attempts: max_attempts,
    })
}

/// Send a signed envelope and wait for a terminal status.
pub async fn submit_and_confirm(
    rpc: &SorobanRpc,
    network_passphrase: &str,
    signed: &TransactionV1Envelope,
) -> Result<Confirmation, Error> {
    let local_hash = hex::encode(envelope::transaction_hash(network_passphrase, &signed.tx)?);

    let send = rpc.send_transaction(signed).await?;
    if send.status == SEND_STATUS_ERROR {
        let payload =
            serde_json::to_string(&send).unwrap_or_else(|_| send.status.clone());
        return Err(Error::Submission(payload));
    }

    let tx_hash = if send.hash.is_empty() {
        local_hash
    } else {
        send.hash.clone()
    };
    info!(tx_hash = %tx_hash, status = %send.status, "transaction sent, awaiting confirmation");

    let terminal = poll_until_terminal(
        || rpc.get_transaction(&tx_hash),
        POLL_INTERVAL,
        MAX_POLL_ATTEMPTS,
    )
    .await?;

    if terminal.is_success() {
        let return_value = terminal.return_value()?;
        info!(tx_hash = %tx_hash, "transaction confirmed");
        Ok(Confirmation {
            tx_hash,
            return_value,
        })
    } else {
        let payload =
            serde_json::to_string(&terminal).unwrap_or_else(|_| terminal.status.clone());
        Err(Error::Confirmation(payload))
    }
}
