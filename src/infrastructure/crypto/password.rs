//! Password hashing utilities

use bcrypt::{hash, verify};

pub use bcrypt::{BcryptError, DEFAULT_COST};

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Hash a password using bcrypt with the given cost factor.
pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

/// Check a candidate against a stored hash. A malformed hash never matches.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    verify(candidate, stored_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_below_minimum_is_rejected() {
        assert!(hash_password("secret-pw", MIN_COST - 1).is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("secret-pw", MIN_COST).unwrap();

        assert_ne!(hashed, "secret-pw");
        assert!(verify_password("secret-pw", &hashed));
        assert!(!verify_password("wrong-pw", &hashed));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("secret-pw", "secret-pw"));
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        assert!(hash_password("secret-pw", 2).is_err());
    }
}
