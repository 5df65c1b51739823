pub mod signer;
pub mod types;
pub mod verify;
