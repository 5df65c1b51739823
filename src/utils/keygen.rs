use eth_signature_verifier::common::verify::address_from_key;
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use std::path::Path;

/// Generates a secp256k1 keypair, writes the private key as hex to `path`,
/// and returns the checksummed address.
fn generate_key_file(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let key = SigningKey::random(&mut OsRng);
    std::fs::write(path, hex::encode(key.to_bytes()))?;
    Ok(address_from_key(key.verifying_key()).to_checksum(None))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "private_key.hex".to_string());

    let address = generate_key_file(Path::new(&path))?;

    println!("Private key saved to {path}");
    println!("Address: {address}");

    Ok(())
}
