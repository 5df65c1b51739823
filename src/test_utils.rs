use crate::common::signer::{sign_message, SignedMessage};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

/// Signs `message` with a fresh ephemeral key. The returned payload carries
/// the checksummed address the verifier is expected to recover.
pub fn create_signed_payload(message: &str) -> SignedMessage {
    let key = SigningKey::random(&mut OsRng);
    sign_message(&key, message).unwrap()
}

/// A published test keypair (Hardhat account #0): private key hex and the
/// checksummed address it derives to.
pub fn known_keypair() -> (&'static str, &'static str) {
    (
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
    )
}
