//! Customer portal credentials.
//!
//! Customer ids look like `VOL_2026/48213`: a configurable prefix, the current year and
//! a uniformly random five-digit number. Passwords are random alphanumerics, stored as
//! `salt$sha256(salt || password)` and only ever sent to the customer by mail.

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SALT_LENGTH: usize = 16;

pub fn customer_id<R: Rng>(rng: &mut R, prefix: &str, year: i32) -> String {
    format!("{}{}/{}", prefix, year, rng.gen_range(10_000..=99_999))
}

pub fn random_token<R: Rng>(rng: &mut R, length: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn digest(salt: &str, password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

pub fn hash_password<R: Rng>(rng: &mut R, password: &str) -> String {
    let salt = random_token(rng, SALT_LENGTH);
    format!("{}${}", salt, hex::encode(digest(&salt, password)))
}

pub fn verify_password(stored: &str, password: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => match hex::decode(expected) {
            Ok(expected) => bool::from(digest(salt, password).ct_eq(expected.as_slice())),
            Err(_) => false,
        },
        None => false,
    }
}
