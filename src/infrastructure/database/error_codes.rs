//! Vendor error codes the repositories reclassify.
//!
//! The driver reports codes as strings (`DatabaseError::code()`). This table
//! is the only place that knows which strings mean what for each backend.

use sea_orm::DbBackend;

/// Domain-meaningful classes of vendor failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    DuplicateKey,
}

const SQLITE_DUPLICATE_KEY: &[&str] = &[
    "2067", // SQLITE_CONSTRAINT_UNIQUE
    "1555", // SQLITE_CONSTRAINT_PRIMARYKEY
];
const POSTGRES_DUPLICATE_KEY: &[&str] = &["23505"];
// ER_DUP_ENTRY. SQLSTATE 23000 also covers NOT NULL and foreign-key
// failures, so it is not matched.
const MYSQL_DUPLICATE_KEY: &[&str] = &["1062"];

fn duplicate_key_codes(backend: DbBackend) -> &'static [&'static str] {
    match backend {
        DbBackend::Sqlite => SQLITE_DUPLICATE_KEY,
        DbBackend::Postgres => POSTGRES_DUPLICATE_KEY,
        DbBackend::MySql => MYSQL_DUPLICATE_KEY,
    }
}

/// Classifies a vendor code; `None` means the failure stays opaque.
pub fn classify(backend: DbBackend, code: Option<&str>) -> Option<ErrorClass> {
    let code = code?;
    duplicate_key_codes(backend)
        .contains(&code)
        .then_some(ErrorClass::DuplicateKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_per_backend() {
        assert_eq!(
            classify(DbBackend::Sqlite, Some("2067")),
            Some(ErrorClass::DuplicateKey)
        );
        assert_eq!(
            classify(DbBackend::Postgres, Some("23505")),
            Some(ErrorClass::DuplicateKey)
        );
        assert_eq!(
            classify(DbBackend::MySql, Some("1062")),
            Some(ErrorClass::DuplicateKey)
        );
    }

    #[test]
    fn test_other_codes_stay_unclassified() {
        // NOT NULL violation
        assert_eq!(classify(DbBackend::Sqlite, Some("1299")), None);
        assert_eq!(classify(DbBackend::Postgres, Some("2067")), None);
        assert_eq!(classify(DbBackend::Sqlite, None), None);
        // Generic MySQL integrity SQLSTATE
        assert_eq!(classify(DbBackend::MySql, Some("23000")), None);
    }
}
