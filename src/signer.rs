//! Signing backends: local secret key or a delegated wallet signature.
//!
//! Both variants produce the same artifact, a signed envelope ready for
//! submission, so callers depend only on [`EnvelopeSigner`] and never on
//! which variant is active.

use crate::envelope;
use crate::Error;
use ed25519_dalek::{Signer as _, SigningKey};
use rand::rngs::OsRng;
use stellar_xdr::curr::{Transaction, TransactionV1Envelope};

/// Produce a signed envelope for a prepared transaction.
pub trait EnvelopeSigner {
    fn sign(
        &self,
        tx: &Transaction,
        network_passphrase: &str,
    ) -> Result<TransactionV1Envelope, Error>;
}

/// Holds an ed25519 secret in process memory for one invocation (CLI).
pub struct LocalSigner {
    signing_key: SigningKey,
    address: String,
}

impl LocalSigner {
    /// Decode an `S…` strkey secret.
    pub fn from_secret(secret: &str) -> Result<Self, Error> {
        let sk = stellar_strkey::ed25519::PrivateKey::from_string(secret)
            .map_err(|_| Error::Signing("invalid secret key (expected an S… strkey)".into()))?;
        let signing_key = SigningKey::from_bytes(&sk.0);
        let address =
            stellar_strkey::ed25519::PublicKey(signing_key.verifying_key().to_bytes()).to_string();
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// The `G…` account address of this key.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl EnvelopeSigner for LocalSigner {
    fn sign(
        &self,
        tx: &Transaction,
        network_passphrase: &str,
    ) -> Result<TransactionV1Envelope, Error> {
        let hash = envelope::transaction_hash(network_passphrase, tx)?;
        let signature = self.signing_key.sign(&hash);
        let public = self.signing_key.verifying_key().to_bytes();
        let hint = [public[28], public[29], public[30], public[31]];
        envelope::attach_signature(tx, hint, signature.to_bytes())
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocalSigner({})", self.address)
    }
}

/// Carries an envelope signed out of process (browser wallet).
///
/// Fails closed: the envelope must be a plain v1 envelope, must carry at
/// least one signature, and must hash to the transaction being signed.
#[derive(Debug, Clone)]
pub struct DelegatedSigner {
    signed_xdr: String,
}

impl DelegatedSigner {
    pub fn new(signed_xdr: impl Into<String>) -> Self {
        Self {
            signed_xdr: signed_xdr.into(),
        }
    }
}

impl EnvelopeSigner for DelegatedSigner {
    fn sign(
        &self,
        tx: &Transaction,
        network_passphrase: &str,
    ) -> Result<TransactionV1Envelope, Error> {
        let signed = envelope::parse_signed_envelope(&self.signed_xdr)?;
        if signed.signatures.is_empty() {
            return Err(Error::Signing("delegated envelope carries no signatures".into()));
        }
        let expected = envelope::transaction_hash(network_passphrase, tx)?;
        let actual = envelope::transaction_hash(network_passphrase, &signed.tx)?;
        if expected != actual {
            return Err(Error::Signing(
                "delegated envelope does not match the transaction being signed".into(),
            ));
        }
        Ok(signed)
    }
}

/// Throwaway identity for read-only execution contexts. Never funded,
/// never used to sign.
pub fn random_address() -> String {
    let key = SigningKey::generate(&mut OsRng);
    stellar_strkey::ed25519::PublicKey(key.verifying_key().to_bytes()).to_string()
}
