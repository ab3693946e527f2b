//! # ams-auth — Credential & Session-Trust Core
//!
//! The security-critical core of the artist management stack: account
//! registration, password verification, and stateless bearer-token issuance
//! and validation. The repetitive entity CRUD services live elsewhere and
//! talk to this crate only through the issued tokens.
//!
//! ## Components
//!
//! - [`hasher`] — Argon2id credential hashing with constant-time verification
//! - [`store`] — the credential-store seam ([`CredentialStore`]) plus an
//!   in-memory implementation for tests and databaseless deployments
//! - [`registrar`] — account registration with duplicate detection
//! - [`session`] — password verification and token issuance at login
//! - [`token`] — HS256 trust tokens: signing key, claims, verifier
//! - [`error`] — the error taxonomy shared by the operations above
//!
//! ## Trust model
//!
//! A trust token is a signed, time-bounded assertion of identity and
//! privilege. Its claims are trustworthy iff the signature verifies against
//! the process signing key and the current instant is before the `exp`
//! claim. The system keeps no record of issued tokens, so a token cannot be
//! revoked before its natural expiry — rotating the signing key is the only
//! (blunt) invalidation mechanism.
//!
//! ## Concurrency
//!
//! No component holds mutable state across calls. The signing key is
//! immutable after construction; the credential store is the only shared
//! mutable resource and its insert atomicity is the backend's transactional
//! guarantee.

pub mod error;
pub mod hasher;
pub mod registrar;
pub mod session;
pub mod store;
pub mod token;

pub use error::{AuthError, HasherError, RegistrationError, StoreError, TokenError};
pub use hasher::CredentialHasher;
pub use registrar::{Registrar, RegistrationInput};
pub use session::SessionIssuer;
pub use store::{CredentialRecord, CredentialStore, MemoryCredentialStore};
pub use token::{Claims, SigningKey, TokenService, TOKEN_TTL_SECS};
