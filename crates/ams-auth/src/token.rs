//! # Trust Tokens
//!
//! Signed, time-bounded HS256 tokens asserting an identity and privilege
//! level without a server-side session lookup.
//!
//! The signing key is loaded once at startup and shared read-only by the
//! issuer and verifier — there is no ambient global and no runtime rotation.
//! Rotating the key invalidates every unexpired token silently.
//!
//! Expiry is a data-level check against an explicit instant, not a runtime
//! mechanism: [`TokenService::validate_at`] takes the instant so callers
//! (and tests) control the clock; [`TokenService::validate`] uses the wall
//! clock. A token's conceptual lifecycle is `Unissued → Valid → Expired` —
//! there is no revoked state.

use std::fmt;

use base64::engine::general_purpose;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{InvalidKey, TokenError};

/// Fixed token validity window: one hour from issuance. Not configurable.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Process-wide token signing secret (32 bytes).
///
/// Zeroized on drop; `Debug` is redacted. Constructed once from process
/// configuration and passed by reference into [`TokenService::new`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey([u8; 32]);

impl SigningKey {
    /// Parse key material from its configuration encoding.
    ///
    /// Accepts, in order: 64 hex chars, base64url (unpadded), standard
    /// base64, or 32 raw bytes.
    pub fn parse(raw: &str) -> Result<Self, InvalidKey> {
        let trimmed = raw.trim();

        if trimmed.len() == 64 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            if let Some(bytes) = decode_hex(trimmed) {
                if let Ok(key) = <[u8; 32]>::try_from(bytes.as_slice()) {
                    return Ok(Self(key));
                }
            }
        }

        if let Ok(bytes) = general_purpose::URL_SAFE_NO_PAD.decode(trimmed) {
            if let Ok(key) = <[u8; 32]>::try_from(bytes.as_slice()) {
                return Ok(Self(key));
            }
        }

        if let Ok(bytes) = general_purpose::STANDARD.decode(trimmed) {
            if let Ok(key) = <[u8; 32]>::try_from(bytes.as_slice()) {
                return Ok(Self(key));
            }
        }

        if let Ok(key) = <[u8; 32]>::try_from(trimmed.as_bytes()) {
            return Ok(Self(key));
        }

        Err(InvalidKey(
            "expected 32 bytes as hex, base64, or raw".to_string(),
        ))
    }

    /// Construct from raw bytes (used for ephemeral development keys).
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }
    let mut bytes = Vec::with_capacity(input.len() / 2);
    let mut chars = input.chars();
    while let (Some(h), Some(l)) = (chars.next(), chars.next()) {
        let hi = h.to_digit(16)?;
        let lo = l.to_digit(16)?;
        bytes.push(((hi << 4) | lo) as u8);
    }
    Some(bytes)
}

/// Decoded trust-token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the credential record id.
    pub sub: Uuid,
    /// Display name embedded at issuance.
    pub username: String,
    /// Privilege flag copied from the credential record at issuance.
    /// A promotion or demotion takes effect at the next login.
    pub is_admin: bool,
    /// Expiry (unix timestamp, seconds).
    pub exp: i64,
    /// Issued-at (unix timestamp, seconds).
    pub iat: i64,
}

/// Stateless token mint and verifier.
///
/// Purely functional over (token, instant); safe to call concurrently —
/// the only shared state is the read-only key material.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    validation: Validation,
}

impl TokenService {
    /// Build a token service bound to the process signing key.
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked explicitly against the caller-supplied instant in
        // validate_at, not against jsonwebtoken's internal wall clock.
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            header: Header::new(Algorithm::HS256),
            validation,
        }
    }

    /// Mint a signed token for the given identity, valid for
    /// [`TOKEN_TTL_SECS`] from `now`.
    pub fn issue_at(
        &self,
        subject: Uuid,
        username: &str,
        is_admin: bool,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject,
            username: username.to_string(),
            is_admin,
            exp: now.timestamp() + TOKEN_TTL_SECS,
            iat: now.timestamp(),
        };
        jsonwebtoken::encode(&self.header, &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Validate a token against the wall clock.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token's signature and expiry against an explicit instant.
    ///
    /// A token is expired when `now` is at or past its `exp` claim. Signature
    /// failures and unparseable structures both report [`TokenError::Malformed`].
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Missing);
        }
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Malformed)?;
        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}
