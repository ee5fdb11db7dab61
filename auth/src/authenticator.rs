use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use chrono::Duration;

use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::token::Claims;
use crate::token::Identity;
use crate::token::TokenError;
use crate::token::TokenService;

/// Bytes of randomness drawn for a rotated signing secret.
const ROTATED_SECRET_LEN: usize = 32;

/// Authentication coordinator combining password verification and token issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_service: TokenService,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Signed bearer token
    pub access_token: String,
    /// Claims embedded in `access_token`
    pub claims: Claims,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create an authenticator issuing tokens with the default lifetime.
    ///
    /// # Arguments
    /// * `jwt_secret` - Initial signing secret
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_service: TokenService::new(jwt_secret),
        }
    }

    /// Create an authenticator whose tokens live for `token_ttl`.
    pub fn with_token_ttl(jwt_secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_service: TokenService::with_ttl(jwt_secret, token_ttl),
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_service.ttl()
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue a token for `identity`.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `identity` - Identity the token will carry
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        identity: &Identity,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let issued = self.token_service.issue(identity)?;

        Ok(AuthenticationResult {
            access_token: issued.token,
            claims: issued.claims,
        })
    }

    /// Validate a bearer token and decode its claims.
    ///
    /// # Errors
    /// * `TokenError` - Signature, algorithm, key or expiry check failed
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.token_service.verify(token)
    }

    /// Replace the signing secret with fresh random bytes.
    ///
    /// Returns the id of the new signing key. Tokens signed before the
    /// rotation keep verifying until they expire.
    pub fn rotate_signing_key(&self) -> String {
        let mut secret = [0u8; ROTATED_SECRET_LEN];
        OsRng.fill_bytes(&mut secret);
        self.token_service.rotate(&secret)
    }
}
