//! ScVal encoding and decoding for the contract's call surface.
//!
//! The contract only ever sees four argument shapes (address, string, u32,
//! optional string) and returns u32s, optional structs, and vectors of
//! `TokenId`. Optional values travel as `Void` when absent.

use crate::types::{Collection, Token, TokenId};
use crate::Error;
use stellar_xdr::curr::{
    AccountId, Hash, PublicKey, ScAddress, ScMap, ScString, ScVal, Uint256,
};

/// Encode a `G…` account or `C…` contract strkey as an ScVal address.
pub fn address_to_scval(address: &str) -> Result<ScVal, Error> {
    Ok(ScVal::Address(parse_address(address)?))
}

/// Parse a `G…` account or `C…` contract strkey.
pub fn parse_address(address: &str) -> Result<ScAddress, Error> {
    if address.starts_with('G') {
        let pk = stellar_strkey::ed25519::PublicKey::from_string(address)
            .map_err(|_| Error::Validation(format!("invalid account address: {address}")))?;
        Ok(ScAddress::Account(AccountId(
            PublicKey::PublicKeyTypeEd25519(Uint256(pk.0)),
        )))
    } else if address.starts_with('C') {
        let contract = stellar_strkey::Contract::from_string(address)
            .map_err(|_| Error::Validation(format!("invalid contract address: {address}")))?;
        Ok(ScAddress::Contract(Hash(contract.0)))
    } else {
        Err(Error::Validation(format!(
            "address must be a G… account or C… contract id: {address}"
        )))
    }
}

pub fn string_to_scval(value: &str) -> Result<ScVal, Error> {
    Ok(ScVal::String(ScString(value.try_into()?)))
}

pub fn u32_to_scval(value: u32) -> ScVal {
    ScVal::U32(value)
}

/// `None` travels as `Void`, matching the contract's `Option<String>` ABI.
pub fn option_string_to_scval(value: Option<&str>) -> Result<ScVal, Error> {
    match value {
        Some(s) => string_to_scval(s),
        None => Ok(ScVal::Void),
    }
}

// --- Decoding ---

/// `Void` means the contract returned `None`.
pub fn unwrap_optional(val: ScVal) -> Option<ScVal> {
    match val {
        ScVal::Void => None,
        other => Some(other),
    }
}

pub fn scval_to_u32(val: &ScVal) -> Result<u32, Error> {
    match val {
        ScVal::U32(n) => Ok(*n),
        other => Err(Error::Codec(format!("expected u32, got {other:?}"))),
    }
}

pub fn scval_to_string(val: &ScVal) -> Result<String, Error> {
    match val {
        ScVal::String(ScString(s)) => s
            .to_utf8_string()
            .map_err(|e| Error::Codec(format!("invalid utf-8 string: {e}"))),
        other => Err(Error::Codec(format!("expected string, got {other:?}"))),
    }
}

/// Render an address ScVal back into its strkey form.
pub fn scval_to_address_string(val: &ScVal) -> Result<String, Error> {
    match val {
        ScVal::Address(addr) => Ok(address_to_string(addr)),
        other => Err(Error::Codec(format!("expected address, got {other:?}"))),
    }
}

pub fn address_to_string(address: &ScAddress) -> String {
    match address {
        ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(bytes)))) => {
            stellar_strkey::ed25519::PublicKey(*bytes).to_string()
        }
        ScAddress::Contract(Hash(bytes)) => stellar_strkey::Contract(*bytes).to_string(),
    }
}

/// Lossy JSON rendering of a return value, for API responses. Covers the
/// shapes this contract returns; anything else falls back to its debug form.
pub fn scval_to_json(val: &ScVal) -> serde_json::Value {
    use serde_json::Value;
    match val {
        ScVal::Void => Value::Null,
        ScVal::Bool(b) => Value::Bool(*b),
        ScVal::U32(n) => Value::from(*n),
        ScVal::U64(n) => Value::from(*n),
        ScVal::String(ScString(s)) => Value::String(s.to_utf8_string_lossy()),
        ScVal::Symbol(sym) => Value::String(sym.0.to_utf8_string_lossy()),
        ScVal::Address(addr) => Value::String(address_to_string(addr)),
        ScVal::Vec(Some(items)) => Value::Array(items.iter().map(scval_to_json).collect()),
        ScVal::Map(Some(map)) => Value::Object(
            map.iter()
                .map(|entry| {
                    let key = match &entry.key {
                        ScVal::Symbol(sym) => sym.0.to_utf8_string_lossy(),
                        other => format!("{other:?}"),
                    };
                    (key, scval_to_json(&entry.val))
                })
                .collect(),
        ),
        other => Value::String(format!("{other:?}")),
    }
}

fn map_entry<'a>(map: &'a ScMap, field: &str) -> Result<&'a ScVal, Error> {
    map.iter()
        .find(|entry| match &entry.key {
            ScVal::Symbol(sym) => sym.0.to_utf8_string_lossy() == field,
            _ => false,
        })
        .map(|entry| &entry.val)
        .ok_or_else(|| Error::Codec(format!("missing struct field `{field}`")))
}

fn as_map(val: &ScVal) -> Result<&ScMap, Error> {
    match val {
        ScVal::Map(Some(map)) => Ok(map),
        other => Err(Error::Codec(format!("expected struct map, got {other:?}"))),
    }
}

/// Decode the contract's `Collection` struct.
pub fn decode_collection(val: &ScVal) -> Result<Collection, Error> {
    let map = as_map(val)?;
    let base_uri = match map_entry(map, "base_uri")? {
        ScVal::Void => None,
        other => Some(scval_to_string(other)?),
    };
    Ok(Collection {
        owner: scval_to_address_string(map_entry(map, "owner")?)?,
        name: scval_to_string(map_entry(map, "name")?)?,
        symbol: scval_to_string(map_entry(map, "symbol")?)?,
        base_uri,
    })
}

/// Decode the contract's `Token` struct.
pub fn decode_token(val: &ScVal) -> Result<Token, Error> {
    let map = as_map(val)?;
    Ok(Token {
        owner: scval_to_address_string(map_entry(map, "owner")?)?,
        uri: scval_to_string(map_entry(map, "uri")?)?,
    })
}

/// Decode the contract's `Vec<TokenId>` return shape.
pub fn decode_token_ids(val: &ScVal) -> Result<Vec<TokenId>, Error> {
    let items = match val {
        ScVal::Vec(Some(vec)) => vec,
        other => return Err(Error::Codec(format!("expected vec, got {other:?}"))),
    };
    items
        .iter()
        .map(|item| {
            let map = as_map(item)?;
            Ok(TokenId {
                collection_id: scval_to_u32(map_entry(map, "collection_id")?)?,
                token_id: scval_to_u32(map_entry(map, "token_id")?)?,
            })
        })
        .collect()
}
