//! Extension contracts for signing requests outside the handshake.
//!
//! [`RequestSignerExt`] attaches OAuth 1.0 credentials to arbitrary requests, and
//! [`SignedFetcher`] issues protected resource calls (such as profile lookups) with an
//! access token.

pub mod request_signer;

pub use request_signer::*;
