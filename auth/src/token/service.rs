use std::sync::PoisonError;
use std::sync::RwLock;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::Identity;
use super::errors::TokenError;

/// Lifetime of an access token unless configured otherwise.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 4;

/// The only algorithm tokens are signed and accepted with.
const ALGORITHM: Algorithm = Algorithm::HS256;

struct SigningKey {
    id: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    retired_at: Option<DateTime<Utc>>,
}

impl SigningKey {
    fn new(id: String, secret: &[u8]) -> Self {
        Self {
            id,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            retired_at: None,
        }
    }

    /// Retired keys verify for one token lifetime after retirement.
    fn verifies_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.retired_at.map_or(true, |retired_at| retired_at + ttl >= now)
    }
}

struct KeyRing {
    current: SigningKey,
    retired: Vec<SigningKey>,
    generation: u64,
}

impl KeyRing {
    fn find(&self, id: &str, now: DateTime<Utc>, ttl: Duration) -> Option<&SigningKey> {
        std::iter::once(&self.current)
            .chain(self.retired.iter())
            .find(|key| key.id == id && key.verifies_at(now, ttl))
    }
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues and verifies HS256 bearer tokens.
///
/// Tokens name their signing key in the `kid` header. Rotating the secret
/// installs a new current key; the previous key keeps verifying the tokens it
/// signed until they have all expired, then it is dropped. There is no
/// revocation: a token is trusted until `exp` once its signature checks out.
pub struct TokenService {
    keys: RwLock<KeyRing>,
    ttl: Duration,
}

impl TokenService {
    /// Token service with the default 4 hour lifetime.
    ///
    /// The secret should be at least 32 bytes for HS256.
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &[u8], ttl: Duration) -> Self {
        Self {
            keys: RwLock::new(KeyRing {
                current: SigningKey::new(key_id(0), secret),
                retired: Vec::new(),
                generation: 0,
            }),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Identifier of the key new tokens are signed with.
    pub fn current_key_id(&self) -> String {
        self.read_keys().current.id.clone()
    }

    /// Sign a token for `identity`, valid from now for the configured lifetime.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Sign a token as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let claims = Claims::for_identity(identity, issued_at, self.ttl);
        let keys = self.read_keys();

        let mut header = Header::new(ALGORITHM);
        header.kid = Some(keys.current.id.clone());

        let token = encode(&header, &claims, &keys.current.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature, algorithm, key and expiry, then return the claims.
    ///
    /// # Errors
    /// * `Expired` - `exp` is in the past (no leeway)
    /// * `UnknownKey` - `kid` names no key that may still verify
    /// * `Invalid` - Malformed token, wrong algorithm, bad signature or payload
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|e| TokenError::Invalid(e.to_string()))?;

        if header.alg != ALGORITHM {
            return Err(TokenError::Invalid(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let key_id = header
            .kid
            .ok_or_else(|| TokenError::Invalid("missing key id".to_string()))?;

        let keys = self.read_keys();
        let key = keys
            .find(&key_id, Utc::now(), self.ttl)
            .ok_or(TokenError::UnknownKey(key_id))?;

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &key.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }

    /// Make `secret` the signing secret and return the new key id.
    pub fn rotate(&self, secret: &[u8]) -> String {
        self.rotate_at(secret, Utc::now())
    }

    pub(crate) fn rotate_at(&self, secret: &[u8], at: DateTime<Utc>) -> String {
        let mut keys = self.keys.write().unwrap_or_else(PoisonError::into_inner);

        keys.generation += 1;
        let id = key_id(keys.generation);

        let mut previous =
            std::mem::replace(&mut keys.current, SigningKey::new(id.clone(), secret));
        previous.retired_at = Some(at);
        keys.retired.push(previous);

        let ttl = self.ttl;
        keys.retired.retain(|key| key.verifies_at(at, ttl));

        id
    }

    fn read_keys(&self) -> std::sync::RwLockReadGuard<'_, KeyRing> {
        self.keys.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn key_id(generation: u64) -> String {
    format!("k{}", generation)
}
