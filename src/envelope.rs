//! Unsigned transaction envelope construction and assembly.
//!
//! One fixed shape: a single `InvokeHostFunction` operation against the
//! configured contract, base fee, 30-second time bound, sequence number one
//! past the source account's on-chain value. Simulation results are folded
//! back in with [`apply_simulation`] before signing (the "prepare" step).

use crate::codec;
use crate::config::NetworkConfig;
use crate::rpc::SimulationOutcome;
use crate::Error;
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    DecoratedSignature, Hash, HostFunction, InvokeContractArgs, InvokeHostFunctionOp, Limits,
    Memo, MuxedAccount, Operation, OperationBody, Preconditions, ReadXdr, ScSymbol, ScVal,
    SequenceNumber, Signature, SignatureHint, TimeBounds, TimePoint, Transaction,
    TransactionEnvelope, TransactionExt, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, TransactionV1Envelope, Uint256, VecM, WriteXdr,
};

/// Base fee in stroops, before the simulation's resource fee is added.
pub const BASE_FEE: u32 = 100;

/// Envelope validity window.
pub const TX_TIMEOUT_SECS: u64 = 30;

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn source_ed25519(source_account: &str) -> Result<Uint256, Error> {
    let pk = stellar_strkey::ed25519::PublicKey::from_string(source_account)
        .map_err(|_| Error::Validation(format!("invalid source account: {source_account}")))?;
    Ok(Uint256(pk.0))
}

/// Build an unsigned contract-call transaction.
///
/// `sequence` is the source account's current on-chain sequence number; the
/// envelope uses the next one.
pub fn build_invoke_transaction(
    network: &NetworkConfig,
    source_account: &str,
    sequence: i64,
    method: &str,
    args: Vec<ScVal>,
) -> Result<Transaction, Error> {
    let contract_address = codec::parse_address(&network.contract_id)?;
    let function_name = ScSymbol(
        method
            .try_into()
            .map_err(|_| Error::Codec(format!("method name too long: {method}")))?,
    );

    let op = Operation {
        source_account: None,
        body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
            host_function: HostFunction::InvokeContract(InvokeContractArgs {
                contract_address,
                function_name,
                args: args.try_into()?,
            }),
            auth: VecM::default(),
        }),
    };

    Ok(Transaction {
        source_account: MuxedAccount::Ed25519(source_ed25519(source_account)?),
        fee: BASE_FEE,
        seq_num: SequenceNumber(sequence + 1),
        cond: Preconditions::Time(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(now_secs() + TX_TIMEOUT_SECS),
        }),
        memo: Memo::None,
        operations: vec![op].try_into()?,
        ext: TransactionExt::V0,
    })
}

/// Network id: SHA-256 of the network passphrase.
pub fn network_id(network_passphrase: &str) -> Hash {
    Hash(Sha256::digest(network_passphrase.as_bytes()).into())
}

/// Hash a transaction for signing and for status lookups.
pub fn transaction_hash(network_passphrase: &str, tx: &Transaction) -> Result<[u8; 32], Error> {
    let payload = TransactionSignaturePayload {
        network_id: network_id(network_passphrase),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    };
    Ok(Sha256::digest(payload.to_xdr(Limits::none())?).into())
}

/// Fold a simulation's resource data, resource fee, and auth entries back
/// into the transaction. Simulations of pure reads may carry no resource
/// data, in which case the transaction is returned unchanged apart from fee.
pub fn apply_simulation(
    mut tx: Transaction,
    outcome: &SimulationOutcome,
) -> Result<Transaction, Error> {
    tx.fee = BASE_FEE.saturating_add(outcome.min_resource_fee);
    if let Some(data) = &outcome.transaction_data {
        tx.ext = TransactionExt::V1(data.clone());
    }
    if !outcome.auth.is_empty() {
        let mut ops: Vec<Operation> = tx.operations.into();
        if let Some(Operation {
            body: OperationBody::InvokeHostFunction(invoke),
            ..
        }) = ops.first_mut()
        {
            if invoke.auth.is_empty() {
                invoke.auth = outcome.auth.clone().try_into()?;
            }
        }
        tx.operations = ops.try_into()?;
    }
    Ok(tx)
}

/// Attach one decorated signature, producing a submittable envelope.
pub fn attach_signature(
    tx: &Transaction,
    hint: [u8; 4],
    signature: [u8; 64],
) -> Result<TransactionV1Envelope, Error> {
    let decorated = DecoratedSignature {
        hint: SignatureHint(hint),
        signature: Signature(signature.to_vec().try_into()?),
    };
    Ok(TransactionV1Envelope {
        tx: tx.clone(),
        signatures: vec![decorated].try_into()?,
    })
}

/// Base64 XDR of a not-yet-signed envelope, handed to external wallets.
pub fn unsigned_envelope_base64(tx: &Transaction) -> Result<String, Error> {
    let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
        tx: tx.clone(),
        signatures: VecM::default(),
    });
    Ok(envelope.to_xdr_base64(Limits::none())?)
}

pub fn envelope_to_base64(envelope: &TransactionV1Envelope) -> Result<String, Error> {
    Ok(TransactionEnvelope::Tx(envelope.clone()).to_xdr_base64(Limits::none())?)
}

/// Parse a signed envelope received from an external signer.
///
/// Fails closed on anything other than a plain v1 envelope: the contract
/// pipeline downstream only accepts that form, and some wallets hand back
/// fee-bump envelopes.
pub fn parse_signed_envelope(xdr_base64: &str) -> Result<TransactionV1Envelope, Error> {
    let envelope = TransactionEnvelope::from_xdr_base64(xdr_base64, Limits::none())
        .map_err(|e| Error::Signing(format!("unparseable envelope XDR: {e}")))?;
    match envelope {
        TransactionEnvelope::Tx(inner) => Ok(inner),
        TransactionEnvelope::TxFeeBump(_) => Err(Error::Signing(
            "fee-bump envelope rejected; a plain transaction envelope is required".into(),
        )),
        TransactionEnvelope::TxV0(_) => Err(Error::Signing(
            "legacy v0 envelope rejected; a plain transaction envelope is required".into(),
        )),
    }
}
