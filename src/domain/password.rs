use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hash a password for storage as `"<salt>$<hex sha-256 of salt:password>"`.
/// A fresh random salt per account keeps identical passwords from sharing a
/// stored form.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest(&salt, password))
}

/// Check a password attempt against a stored `salt$digest` value. Anything
/// that does not split into the two parts fails closed.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", salt, password));
    format!("{:x}", hasher.finalize())
}
