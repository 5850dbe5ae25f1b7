//! Bearer session tokens.
//!
//! The client holds the raw token; only its SHA-256 digest is stored.

use sha2::{Digest, Sha256};

pub const TOKEN_LEN: usize = 48;

const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a new random session token
pub fn generate_token() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..TOKEN_LEN)
    .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
    .collect()
}

/// Hex SHA-256 of a token, as stored in the sessions table
pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}
