use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

use crate::account::types::Address;
use crate::error::{LedgerError, LedgerResult};

/// Length of a bank address in bytes, before hex encoding.
pub const ADDRESS_LEN: usize = 20;

/// Bank address of a public key: hex of the first 20 bytes of its SHA-256.
pub fn address_from_public_key(public_key: &VerifyingKey) -> Address {
    let hash = Sha256::digest(public_key.as_bytes());
    Address::new(hex::encode(&hash[..ADDRESS_LEN]))
}

pub fn public_key_hex(public_key: &VerifyingKey) -> String {
    hex::encode(public_key.to_bytes())
}

pub fn public_key_from_hex(s: &str) -> LedgerResult<VerifyingKey> {
    let bytes = hex::decode(s.trim()).map_err(|e| LedgerError::InvalidPublicKey(e.to_string()))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| LedgerError::InvalidPublicKey("expected 32 bytes".to_string()))?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| LedgerError::InvalidPublicKey(e.to_string()))
}
