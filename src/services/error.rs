use thiserror::Error;

use crate::database::store::StoreError;

/// Service-level outcomes for mutating hierarchy operations. Everything here
/// except `Store` and `PasswordHash` is an expected, client-addressable
/// condition; the HTTP layer translates variants to status codes.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Denied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Deletion blocked: the target admin still owns created records.
    #[error("Sub-admin has created records that must be reassigned or removed first")]
    IntegrityConflict { users: i64, faculty: i64 },

    #[error("Password hashing failed")]
    PasswordHash,

    #[error(transparent)]
    Store(#[from] StoreError),
}
