//! # Application Configuration
//!
//! Explicitly constructed from environment variables in `main` and passed by
//! reference into the state — no ambient global lookups past startup.
//!
//! | Variable              | Meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `AMS_PORT`            | Listen port (default 5111)                |
//! | `AMS_SIGNING_KEY`     | Token signing key: 32 bytes as hex, base64, or raw |
//! | `DATABASE_URL`        | Postgres URL; absent = in-memory mode     |
//! | `AMS_METRICS_ENABLED` | `false` disables the metrics endpoint     |

use ams_auth::SigningKey;

/// Immutable process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Process-wide token signing key, shared read-only by issuer and
    /// verifier. Never rotated at runtime; rotation invalidates every
    /// unexpired token.
    pub signing_key: SigningKey,
    /// True when no key was configured and a random one was generated.
    /// Tokens from an ephemeral key do not survive a restart.
    pub key_ephemeral: bool,
}

impl AppConfig {
    /// Build configuration from the environment.
    ///
    /// A missing signing key falls back to an ephemeral random key with a
    /// warning (development convenience); a key that is present but
    /// unparseable is a hard error — silently replacing a configured key
    /// would invalidate tokens across the fleet.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = std::env::var("AMS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5111);

        let (signing_key, key_ephemeral) = match std::env::var("AMS_SIGNING_KEY") {
            Ok(raw) => (SigningKey::parse(&raw)?, false),
            Err(_) => {
                tracing::warn!(
                    "AMS_SIGNING_KEY not set — using an ephemeral signing key. \
                     Issued tokens will not survive a restart."
                );
                (SigningKey::from_bytes(rand::random()), true)
            }
        };

        Ok(Self {
            port,
            signing_key,
            key_ephemeral,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_debug_redacts_key() {
        let config = AppConfig {
            port: 5111,
            signing_key: SigningKey::from_bytes([0u8; 32]),
            key_ephemeral: true,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("SigningKey(..)"));
        assert!(!debug.contains("0, 0, 0"));
    }
}
