use crate::common::verify::{address_from_key, eth_message_hash};
use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

/// A message signed with the personal-sign convention, ready to submit to the
/// verifier endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedMessage {
    pub message: String,
    pub signature: String,
    pub address: String,
}

/// Loads the signing key from the `PRIVATE_KEY_HEX` environment variable,
/// falling back to a `private_key.hex` file in the working directory.
pub fn load_signing_key() -> Result<SigningKey, Box<dyn std::error::Error>> {
    let private_key_hex = match env::var("PRIVATE_KEY_HEX") {
        Ok(key) => key,
        Err(_) => fs::read_to_string("private_key.hex")?,
    };

    parse_signing_key(&private_key_hex)
}

/// Parses a 32-byte secp256k1 private key from hex (with or without `0x`).
pub fn parse_signing_key(hex_key: &str) -> Result<SigningKey, Box<dyn std::error::Error>> {
    let hex_key = hex_key.trim();
    let hex_key = hex_key.strip_prefix("0x").unwrap_or(hex_key);

    let bytes = hex::decode(hex_key)?;
    let key = SigningKey::from_slice(&bytes)?;
    Ok(key)
}

/// Signs `message` under the personal-sign convention and returns the
/// 65-byte r || s || v signature as 0x-prefixed hex, with v in {27, 28}.
pub fn sign_message(
    key: &SigningKey,
    message: &str,
) -> Result<SignedMessage, Box<dyn std::error::Error>> {
    let digest = eth_message_hash(message);
    let (signature, recovery_id) = key.sign_prehash_recoverable(digest.as_slice())?;

    let mut bytes = signature.to_vec();
    bytes.push(27 + recovery_id.to_byte());

    Ok(SignedMessage {
        message: message.to_string(),
        signature: format!("0x{}", hex::encode(bytes)),
        address: address_from_key(key.verifying_key()).to_checksum(None),
    })
}
