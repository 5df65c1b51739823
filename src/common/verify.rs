use alloy_primitives::{Address, Signature, B256};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// EIP-191 personal-sign prefix. The message's decimal byte length and the
/// message itself are appended before hashing.
pub const PERSONAL_SIGN_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Structural failures while decoding or recovering a signature. These are
/// distinct from "signature does not match": a well-formed signature produced
/// over a different message still recovers an address, just not the one the
/// caller expected.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),
    #[error("malformed signature")]
    MalformedSignature,
    #[error("unable to recover address")]
    RecoveryFailed,
}

/// Outcome of verifying one message/signature pair.
#[derive(Clone, Debug)]
pub struct Verification {
    pub is_valid: bool,
    pub signer: Option<String>,
    pub original_message: String,
    pub message_hash: String,
}

/// Hashes a message with the personal-sign prefix:
/// `keccak256("\x19Ethereum Signed Message:\n" + byte_len(message) + message)`.
///
/// Computed by hand with Keccak-256 so the low-level recovery path does not
/// share a digest implementation with the alloy path.
pub fn eth_message_hash(message: &str) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_SIGN_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    B256::from_slice(&hasher.finalize())
}

/// Decodes a hex signature (with or without `0x` prefix) into the 65-byte
/// r || s || v layout.
pub fn decode_signature(signature: &str) -> Result<[u8; 65], VerifyError> {
    let signature = signature.trim();
    let signature = signature.strip_prefix("0x").unwrap_or(signature);

    let bytes = hex::decode(signature)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| VerifyError::InvalidLength(len))
}

/// Verifies a personal-sign signature over `message` and reports the
/// recovered signer.
///
/// The address is recovered twice: once through alloy's message-level
/// recovery (which re-derives the EIP-191 digest internally) and once through
/// raw ECDSA recovery over our own digest. `is_valid` requires both paths to
/// agree; a disagreement on a well-formed signature means the two libraries
/// treat it differently, which is reported as invalid rather than trusted.
pub fn verify_message(message: &str, signature: &str) -> Result<Verification, VerifyError> {
    let sig_bytes = decode_signature(signature)?;
    let digest = eth_message_hash(message);

    let recovered = recover_from_message(message, &sig_bytes)?;
    let cross_check = recover_from_digest(&digest, &sig_bytes)?;

    Ok(Verification {
        is_valid: recovered == cross_check,
        signer: Some(recovered.to_checksum(None)),
        original_message: message.to_string(),
        message_hash: format!("0x{}", hex::encode(digest)),
    })
}

/// High-level path: alloy parses the 65-byte signature and recovers the
/// address from the raw message.
fn recover_from_message(message: &str, sig: &[u8; 65]) -> Result<Address, VerifyError> {
    let signature = Signature::try_from(&sig[..]).map_err(|_| VerifyError::MalformedSignature)?;
    signature
        .recover_address_from_msg(message)
        .map_err(|_| VerifyError::RecoveryFailed)
}

/// Low-level path: raw ECDSA public-key recovery over the prefixed digest,
/// then address = last 20 bytes of keccak256(uncompressed pubkey).
fn recover_from_digest(digest: &B256, sig: &[u8; 65]) -> Result<Address, VerifyError> {
    let v = match sig[64] {
        0 | 27 => 0u8,
        1 | 28 => 1,
        v => return Err(VerifyError::InvalidRecoveryId(v)),
    };
    let recovery_id =
        RecoveryId::try_from(v).map_err(|_| VerifyError::InvalidRecoveryId(sig[64]))?;

    // Rejects zero or out-of-range r/s scalars.
    let ecdsa_sig =
        EcdsaSignature::from_slice(&sig[..64]).map_err(|_| VerifyError::MalformedSignature)?;

    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &ecdsa_sig, recovery_id)
        .map_err(|_| VerifyError::RecoveryFailed)?;

    Ok(address_from_key(&key))
}

/// Derives the Ethereum address for a secp256k1 public key.
pub fn address_from_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag.
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
