//! Provider-facing descriptors (data), strategies (behavior), and error parsing.
//!
//! `descriptor` exposes validated metadata ([`ProviderDescriptor`]) covering the three
//! OAuth 1.0 endpoints, the signature method, the default callback, and provider quirks
//! (verifier parameter name, refusal parameter, callback confirmation).
//! `strategy` defines [`ProviderStrategy`], the capability set of override points the
//! handshake consults, and `error` holds [`ProviderError`] plus reusable body parsers.

pub mod descriptor;
pub mod error;
pub mod strategy;

pub use descriptor::*;
pub use error::*;
pub use strategy::*;
