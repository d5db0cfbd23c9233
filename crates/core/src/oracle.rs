//! Identity oracle: the signing boundary.
//!
//! The registry hands a plaintext message and a wallet address to the oracle
//! and gets back an opaque signature string, or a refusal. Key custody,
//! wallet connectivity, and signature verification all live on the far side
//! of this trait.

use base64::{engine::general_purpose, Engine as _};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use pcr_types::WalletAddress;

/// Failures from a signing request.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The signer refused to sign for this address.
    #[error("signing declined: {0}")]
    Declined(String),
    /// No signer is reachable (e.g. no wallet connected).
    #[error("signer unavailable: {0}")]
    Unavailable(String),
    /// The signing request did not complete in time.
    #[error("signing request timed out")]
    TimedOut,
}

/// A key holder able to sign arbitrary messages, bound to one wallet address.
pub trait IdentityOracle: Send + Sync {
    /// Signs `message` with the key behind `address`.
    ///
    /// The returned signature is opaque: the registry stores it verbatim and
    /// never interprets it.
    fn sign(&self, message: &str, address: &WalletAddress) -> Result<String, OracleError>;
}

/// In-process signer holding a generated P-256 key bound to one address.
///
/// Stands in for a connected wallet during development and testing; requests
/// for any other address are declined, mirroring a wallet that only holds its
/// own keys.
pub struct LocalKeySigner {
    key: SigningKey,
    address: WalletAddress,
}

impl LocalKeySigner {
    /// Generates a fresh signing key bound to `address`.
    pub fn new(address: WalletAddress) -> Self {
        Self {
            key: SigningKey::random(&mut rand::thread_rng()),
            address,
        }
    }

    /// Generates a fresh signing key bound to a fresh random address.
    pub fn generate() -> Self {
        let bytes: [u8; 20] = rand::random();
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        let address = WalletAddress::new(format!("0x{hex}"))
            .expect("generated hex string is a valid address");
        Self::new(address)
    }

    /// The wallet address this signer answers for.
    pub fn address(&self) -> &WalletAddress {
        &self.address
    }
}

impl IdentityOracle for LocalKeySigner {
    fn sign(&self, message: &str, address: &WalletAddress) -> Result<String, OracleError> {
        if *address != self.address {
            return Err(OracleError::Declined(format!(
                "no key held for address {address}"
            )));
        }
        let signature: Signature = self.key.sign(message.as_bytes());
        Ok(general_purpose::STANDARD.encode(signature.to_bytes()))
    }
}
