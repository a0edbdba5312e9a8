//! Password hashing: PBKDF2-HMAC-SHA512 with per-identity salts.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;

/// PBKDF2 iteration count.
pub const ITERATIONS: u32 = 150_000;

/// Derived hash length in bytes.
pub const HASH_LEN: usize = 64;

/// Salt length in bytes.
pub const SALT_LEN: usize = 32;

/// Derives the stored hash for `password` under `salt`.
///
/// Deterministic: identical inputs always produce identical output.
pub fn derive(password: &str, salt: &[u8]) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, ITERATIONS, &mut out);
    out
}

/// Generates a fresh random salt. One per identity, never reused.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Verifies `password` against a stored hash in constant time.
///
/// Always re-derives before looking at `expected`, so a length mismatch costs
/// the same KDF work as a content mismatch. Never panics on malformed input;
/// bad lengths normalize to `false`.
pub fn verify(password: &str, salt: &[u8], expected: &[u8]) -> bool {
    let derived = derive(password, salt);
    if expected.len() != HASH_LEN {
        return false;
    }
    derived.as_slice().ct_eq(expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_then_verify_round_trips() {
        let salt = generate_salt();
        let hash = derive("correct horse battery staple", &salt);
        assert!(verify("correct horse battery staple", &salt, &hash));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let salt = generate_salt();
        let hash = derive("hunter2", &salt);
        assert!(!verify("hunter3", &salt, &hash));
        assert!(!verify("", &salt, &hash));
    }

    #[test]
    fn derive_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        assert_eq!(derive("abc", &salt), derive("abc", &salt));
    }

    #[test]
    fn different_salts_give_different_hashes() {
        let a = derive("abc", &[1u8; SALT_LEN]);
        let b = derive("abc", &[2u8; SALT_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn salts_are_unique_and_sized() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(SALT_LEN, a.len());
        assert_ne!(a, b);
    }

    #[test]
    fn length_mismatch_fails_closed() {
        let salt = generate_salt();
        let hash = derive("hunter2", &salt);
        assert!(!verify("hunter2", &salt, &hash[..32]));
        assert!(!verify("hunter2", &salt, &[]));
    }
}
