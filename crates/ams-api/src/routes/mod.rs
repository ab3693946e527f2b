//! # API Route Modules
//!
//! - `auth` — registration, login, and token validation endpoints.

pub mod auth;
