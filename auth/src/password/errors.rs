use thiserror::Error;

/// Failures of the password hasher. A wrong password is not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// The stored hash is not a PHC string argon2 can read.
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),
}
