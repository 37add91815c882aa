//! Salted one-way password hashing.
//!
//! # Invariants
//! - Stored hashes use `pbkdf2:sha256:<iterations>$<salt-hex>$<hash-hex>`.
//! - Raw passwords never leave this module except as derived hashes.
//! - Verification reads the iteration count from the stored hash, so hashes
//!   created under a different policy remain verifiable.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

const METHOD_PREFIX: &str = "pbkdf2:sha256:";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Default PBKDF2 work factor for newly created hashes.
pub const DEFAULT_HASH_ITERATIONS: u32 = 260_000;

/// Produces and verifies PBKDF2-HMAC-SHA256 password hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_ITERATIONS)
    }
}

impl PasswordHasher {
    /// Creates a hasher for new hashes. Zero iterations are raised to one.
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hashes `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let key = derive_key(password, &salt, self.iterations);
        format!(
            "{METHOD_PREFIX}{}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(key)
        )
    }

    /// Returns whether `password` matches `stored_hash`.
    ///
    /// Malformed hashes never match.
    pub fn verify(&self, stored_hash: &str, password: &str) -> bool {
        let Some((iterations, salt, expected)) = parse_hash(stored_hash) else {
            return false;
        };
        let actual = derive_key(password, &salt, iterations);
        constant_time_eq(&actual, &expected)
    }
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

fn parse_hash(stored_hash: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let rest = stored_hash.strip_prefix(METHOD_PREFIX)?;
    let mut parts = rest.splitn(3, '$');
    let iterations = parts.next()?.parse::<u32>().ok().filter(|value| *value > 0)?;
    let salt = hex::decode(parts.next()?).ok()?;
    let key = hex::decode(parts.next()?).ok()?;
    Some((iterations, salt, key))
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
