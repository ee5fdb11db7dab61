pub mod claims;
pub mod errors;
pub mod service;

pub use claims::Claims;
pub use claims::Identity;
pub use errors::TokenError;
pub use service::IssuedToken;
pub use service::TokenService;
pub use service::DEFAULT_TOKEN_TTL_HOURS;
