use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SCHEME: &str = "sha256";
const SALT_BYTES: usize = 16;

/// Hashes a password with a fresh random salt into
/// `sha256$<salt base64>$<digest base64>`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    hash_password_with_salt(password, &salt)
}

pub fn hash_password_with_salt(password: &str, salt: &[u8]) -> String {
    let digest = digest(password, salt);
    format!("{SCHEME}${}${}", STANDARD.encode(salt), STANDARD.encode(digest))
}

/// Checks a password against an encoded hash. Malformed hashes never match.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(scheme), Some(salt), Some(expected), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt), STANDARD.decode(expected)) else {
        return false;
    };
    digest(password, &salt)
        .as_slice()
        .ct_eq(expected.as_slice())
        .into()
}

pub fn is_encoded_hash(value: &str) -> bool {
    value.starts_with(SCHEME) && value.split('$').count() == 3
}

fn digest(password: &str, salt: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
#[path = "tests/password_tests.rs"]
mod tests;
