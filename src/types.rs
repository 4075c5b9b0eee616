//! Request-scoped views of the contract's entities.
//!
//! Everything here is externally owned; these types only hold what one
//! query or build round trip returned.

use serde::{Deserialize, Serialize};

/// An NFT collection as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub owner: String,
    pub name: String,
    pub symbol: String,
    pub base_uri: Option<String>,
}

/// A single token as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub owner: String,
    pub uri: String,
}

/// Composite token identifier, assigned sequentially by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenId {
    pub collection_id: u32,
    pub token_id: u32,
}

/// Preview of a mint before submission: ids are read-time snapshots with no
/// reservation, so two concurrent mints can race for the same token id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintPreview {
    pub expected_token_id: u32,
    pub expected_uri: String,
}

/// Preview of a collection creation before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCollectionPreview {
    pub expected_collection_id: u32,
}

/// Display-layer URI policy: when the parent collection carries a base URI,
/// the display URI is `base_uri + token_id` (plain concatenation) and the
/// contract-stored URI is silently discarded. Without a base URI the stored
/// URI passes through unmodified.
pub fn derive_display_uri(collection: &Collection, token_id: u32, stored_uri: &str) -> String {
    match &collection.base_uri {
        Some(base) => format!("{base}{token_id}"),
        None => stored_uri.to_string(),
    }
}
