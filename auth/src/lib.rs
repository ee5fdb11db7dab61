//! Authentication building blocks for the lost & found API.
//!
//! - Password hashing (Argon2id)
//! - Bearer token issuance and verification (HS256, rotating key ring)
//! - Account roles
//! - Authentication coordination
//!
//! Nothing here performs I/O; persistence and HTTP live in the service crate.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{Identity, Role, TokenService};
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!");
//! let identity = Identity::new("user123", "alice@x.com", Role::User);
//! let issued = tokens.issue(&identity).unwrap();
//! let claims = tokens.verify(&issued.token).unwrap();
//! assert_eq!(claims.identity(), identity);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, Identity, Role};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Signup: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let identity = Identity::new("user123", "alice@x.com", Role::User);
//! let result = auth.authenticate("password123", &hash, &identity).unwrap();
//!
//! // Protected request: validate token
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.role, Role::User);
//! ```

pub mod authenticator;
pub mod password;
pub mod roles;
pub mod token;

pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use roles::Role;
pub use roles::RoleError;
pub use token::Claims;
pub use token::Identity;
pub use token::IssuedToken;
pub use token::TokenError;
pub use token::TokenService;
pub use token::DEFAULT_TOKEN_TTL_HOURS;
