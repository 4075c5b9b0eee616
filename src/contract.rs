//! Clients for the NFT contract: a read-only query context and a
//! transaction-building/submitting context.
//!
//! The two are distinct types on purpose. [`NftQueryClient`] wraps a
//! throwaway unfunded identity that only ever satisfies the envelope
//! construction API for simulations; it cannot be reused for a mutating
//! call. [`NftContractClient`] builds real envelopes against a funded
//! source account and drives the simulate → sign → send → poll pipeline.

use crate::codec;
use crate::config::NetworkConfig;
use crate::envelope;
use crate::rpc::{SimulationOutcome, SorobanRpc};
use crate::signer::{self, EnvelopeSigner};
use crate::submit::{self, Confirmation};
use crate::types::{
    derive_display_uri, Collection, CreateCollectionPreview, MintPreview, Token, TokenId,
};
use crate::Error;
use std::sync::Arc;
use stellar_xdr::curr::{ScVal, Transaction};
use tracing::debug;

/// Symbol length bounds, a UI convention the contract does not enforce.
const SYMBOL_MIN_CHARS: usize = 3;
const SYMBOL_MAX_CHARS: usize = 10;

/// Validate collection inputs before any network call is made.
pub fn validate_collection_inputs(name: &str, symbol: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::Validation("collection name must not be empty".into()));
    }
    let len = symbol.chars().count();
    if !(SYMBOL_MIN_CHARS..=SYMBOL_MAX_CHARS).contains(&len) {
        return Err(Error::Validation(format!(
            "symbol must be {SYMBOL_MIN_CHARS}-{SYMBOL_MAX_CHARS} characters, got {len}"
        )));
    }
    Ok(())
}

/// Read-only execution context around a throwaway identity.
pub struct NftQueryClient {
    rpc: Arc<SorobanRpc>,
    network: NetworkConfig,
    /// Random, unfunded, never signs. Sequence 0 is fine for simulation.
    source: String,
}

impl NftQueryClient {
    pub fn new(rpc: Arc<SorobanRpc>, network: NetworkConfig) -> Self {
        Self {
            rpc,
            network,
            source: signer::random_address(),
        }
    }

    /// One simulate-and-decode round trip. No caching: every call re-queries
    /// the network.
    async fn simulate_call(&self, method: &str, args: Vec<ScVal>) -> Result<SimulationOutcome, Error> {
        debug!(method, "read-only contract call");
        let tx = envelope::build_invoke_transaction(&self.network, &self.source, 0, method, args)?;
        self.rpc.simulate_transaction(&tx).await?.into_outcome()
    }

    pub async fn get_collection(&self, collection_id: u32) -> Result<Option<Collection>, Error> {
        let outcome = self
            .simulate_call("get_collection", vec![codec::u32_to_scval(collection_id)])
            .await?;
        codec::unwrap_optional(outcome.require_return_value()?.clone())
            .map(|val| codec::decode_collection(&val))
            .transpose()
    }

    /// Fetch a token, overwriting its stored URI with the derived display
    /// URI when the parent collection has a base URI.
    pub async fn get_token(
        &self,
        collection_id: u32,
        token_id: u32,
    ) -> Result<Option<Token>, Error> {
        let outcome = self
            .simulate_call(
                "get_token",
                vec![
                    codec::u32_to_scval(collection_id),
                    codec::u32_to_scval(token_id),
                ],
            )
            .await?;
        let Some(val) = codec::unwrap_optional(outcome.require_return_value()?.clone()) else {
            return Ok(None);
        };
        let mut token = codec::decode_token(&val)?;
        if let Some(collection) = self.get_collection(collection_id).await? {
            token.uri = derive_display_uri(&collection, token_id, &token.uri);
        }
        Ok(Some(token))
    }

    pub async fn owner_of(
        &self,
        collection_id: u32,
        token_id: u32,
    ) -> Result<Option<String>, Error> {
        let outcome = self
            .simulate_call(
                "owner_of",
                vec![
                    codec::u32_to_scval(collection_id),
                    codec::u32_to_scval(token_id),
                ],
            )
            .await?;
        codec::unwrap_optional(outcome.require_return_value()?.clone())
            .map(|val| codec::scval_to_address_string(&val))
            .transpose()
    }

    pub async fn tokens_of(&self, owner: &str) -> Result<Vec<TokenId>, Error> {
        let outcome = self
            .simulate_call("tokens_of", vec![codec::address_to_scval(owner)?])
            .await?;
        codec::decode_token_ids(outcome.require_return_value()?)
    }

    pub async fn total_collections(&self) -> Result<u32, Error> {
        let outcome = self.simulate_call("total_collections", vec![]).await?;
        codec::scval_to_u32(outcome.require_return_value()?)
    }

    pub async fn total_tokens_in_collection(&self, collection_id: u32) -> Result<u32, Error> {
        let outcome = self
            .simulate_call(
                "total_tokens_in_collection",
                vec![codec::u32_to_scval(collection_id)],
            )
            .await?;
        codec::scval_to_u32(outcome.require_return_value()?)
    }
}

/// Transaction-building and submitting context.
pub struct NftContractClient {
    rpc: Arc<SorobanRpc>,
    network: NetworkConfig,
    query: NftQueryClient,
}

impl NftContractClient {
    pub fn new(rpc: Arc<SorobanRpc>, network: NetworkConfig) -> Self {
        let query = NftQueryClient::new(Arc::clone(&rpc), network.clone());
        Self {
            rpc,
            network,
            query,
        }
    }

    /// The read-only context sharing this client's endpoint.
    pub fn query(&self) -> &NftQueryClient {
        &self.query
    }

    /// Build an unsigned `create_collection` envelope plus the expected
    /// collection id (a read-time snapshot of the total count).
    ///
    /// The account fetch and the count fetch have no ordering dependency and
    /// are issued concurrently.
    pub async fn build_create_collection(
        &self,
        creator: &str,
        name: &str,
        symbol: &str,
        base_uri: Option<&str>,
    ) -> Result<(Transaction, CreateCollectionPreview), Error> {
        validate_collection_inputs(name, symbol)?;
        let (account, total_collections) = tokio::try_join!(
            self.rpc.get_account(creator),
            self.query.total_collections()
        )?;

        let args = vec![
            codec::address_to_scval(creator)?,
            codec::string_to_scval(name)?,
            codec::string_to_scval(symbol)?,
            codec::option_string_to_scval(base_uri)?,
        ];
        let tx = envelope::build_invoke_transaction(
            &self.network,
            creator,
            account.sequence,
            "create_collection",
            args,
        )?;
        Ok((
            tx,
            CreateCollectionPreview {
                expected_collection_id: total_collections,
            },
        ))
    }

    /// Build an unsigned `mint_nft` envelope plus the expected token id and
    /// display URI. The id is a snapshot of the collection's current token
    /// count; concurrent mints can race for it and the contract arbitrates.
    pub async fn build_mint(
        &self,
        minter: &str,
        collection_id: u32,
        to: &str,
        metadata_uri: Option<&str>,
    ) -> Result<(Transaction, MintPreview), Error> {
        let (collection, current_token_count) = tokio::try_join!(
            self.query.get_collection(collection_id),
            self.query.total_tokens_in_collection(collection_id)
        )?;
        let collection = collection.ok_or_else(|| {
            Error::Validation(format!("collection {collection_id} not found"))
        })?;

        let expected_token_id = current_token_count;
        let expected_uri = collection
            .base_uri
            .as_ref()
            .map(|base| format!("{base}{expected_token_id}"))
            .unwrap_or_default();

        let account = self.rpc.get_account(minter).await?;
        let args = vec![
            codec::address_to_scval(minter)?,
            codec::u32_to_scval(collection_id),
            codec::address_to_scval(to)?,
            codec::option_string_to_scval(metadata_uri)?,
        ];
        let tx = envelope::build_invoke_transaction(
            &self.network,
            minter,
            account.sequence,
            "mint_nft",
            args,
        )?;
        Ok((
            tx,
            MintPreview {
                expected_token_id,
                expected_uri,
            },
        ))
    }

    /// Build an unsigned `transfer` envelope.
    pub async fn build_transfer(
        &self,
        from: &str,
        to: &str,
        collection_id: u32,
        token_id: u32,
    ) -> Result<Transaction, Error> {
        let account = self.rpc.get_account(from).await?;
        let args = vec![
            codec::address_to_scval(from)?,
            codec::address_to_scval(to)?,
            codec::u32_to_scval(collection_id),
            codec::u32_to_scval(token_id),
        ];
        envelope::build_invoke_transaction(&self.network, from, account.sequence, "transfer", args)
    }

    /// Simulate and assemble: abort on a simulation error before anything
    /// is signed, otherwise fold resources and auth back into the envelope.
    pub async fn prepare(
        &self,
        tx: Transaction,
    ) -> Result<(Transaction, SimulationOutcome), Error> {
        let outcome = self.rpc.simulate_transaction(&tx).await?.into_outcome()?;
        let prepared = envelope::apply_simulation(tx, &outcome)?;
        Ok((prepared, outcome))
    }

    /// Full mutating pipeline: simulate, prepare, sign, send, poll.
    pub async fn execute(
        &self,
        tx: Transaction,
        signer: &dyn EnvelopeSigner,
    ) -> Result<Confirmation, Error> {
        let (prepared, _) = self.prepare(tx).await?;
        let signed = signer.sign(&prepared, &self.network.network_passphrase)?;
        submit::submit_and_confirm(&self.rpc, &self.network.network_passphrase, &signed).await
    }

    /// Submit an envelope signed out of process (fails closed on anything
    /// that is not a plain signed v1 envelope).
    pub async fn submit_signed_envelope(&self, signed_xdr: &str) -> Result<Confirmation, Error> {
        let signed = envelope::parse_signed_envelope(signed_xdr)?;
        if signed.signatures.is_empty() {
            return Err(Error::Signing("envelope carries no signatures".into()));
        }
        submit::submit_and_confirm(&self.rpc, &self.network.network_passphrase, &signed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_length_bounds_are_inclusive() {
        assert!(validate_collection_inputs("Guarana", "GRN").is_ok());
        assert!(validate_collection_inputs("Guarana", "ABCDEFGHIJ").is_ok());
        assert!(validate_collection_inputs("Guarana", "AB").is_err());
        assert!(validate_collection_inputs("Guarana", "ABCDEFGHIJK").is_err());
    }

    #[test]
    fn name_must_not_be_blank() {
        let err = validate_collection_inputs("   ", "GRN").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
