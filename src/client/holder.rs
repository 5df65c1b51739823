use eth_signature_verifier::common::signer::{load_signing_key, sign_message};
use eth_signature_verifier::common::types::{VerifyRequest, VerifyResponse};
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

/// Submits a verify request and parses the response body.
async fn submit(
    client: &reqwest::Client,
    url: &str,
    request: &VerifyRequest,
) -> Result<VerifyResponse, Box<dyn std::error::Error>> {
    let response = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(request)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await?;
        return Err(format!("Server returned status {status} with body: {text}").into());
    }

    let body = response.json::<VerifyResponse>().await?;
    Ok(body)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Verifier URL and message from the command line, with defaults
    let verifier_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:3000/verify-signature".to_string());
    let message = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "hello world".to_string());

    println!("Using verifier service at: {verifier_url}");

    // Use the configured key if one is available, otherwise an ephemeral one
    let key = load_signing_key().unwrap_or_else(|_| SigningKey::random(&mut OsRng));
    let signed = sign_message(&key, &message)?;

    println!("Message:   {}", signed.message);
    println!("Signature: {}", signed.signature);
    println!("Address:   {}", signed.address);

    let client = reqwest::Client::new();
    let request = VerifyRequest {
        message: signed.message,
        signature: signed.signature,
    };
    let response = submit(&client, &verifier_url, &request).await?;

    println!("isValid:     {}", response.is_valid);
    println!("signer:      {}", response.signer.as_deref().unwrap_or("null"));
    println!("messageHash: {}", response.message_hash);

    match response.signer {
        Some(signer) if signer.eq_ignore_ascii_case(&signed.address) => {
            println!("Verifier recovered the expected signer");
            Ok(())
        }
        other => Err(format!(
            "Verifier recovered {} but the local address is {}",
            other.as_deref().unwrap_or("null"),
            signed.address
        )
        .into()),
    }
}
