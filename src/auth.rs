//! Password hashing and credential validation.
//!
//! Hashes are salted SHA-256: 16 random salt bytes, then
//! `hex(salt) || hex(sha256(salt || password))` as one lowercase hex string.

use rand::Rng;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill(&mut salt[..]);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());

    format!("{}{}", hex::encode(salt), hex::encode(hasher.finalize()))
}

/// Verifies a password against a stored salted hash. Returns `false` for
/// hashes that are malformed rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if stored.len() <= SALT_LEN * 2 || !stored.is_ascii() {
        return false;
    }
    let Ok(salt) = hex::decode(&stored[..SALT_LEN * 2]) else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());

    hex::encode(hasher.finalize()) == stored[SALT_LEN * 2..]
}

/// Usernames are 3-20 characters, letters, digits and underscores only.
pub fn is_valid_username(username: &str) -> bool {
    (3..=20).contains(&username.len())
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Passwords are at least 8 characters with an uppercase letter, a lowercase
/// letter, a digit and a special character.
pub fn is_valid_password(password: &str) -> bool {
    if password.len() < 8 {
        return false;
    }
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password
        .chars()
        .any(|c| !c.is_alphanumeric());
    has_upper && has_lower && has_digit && has_special
}
