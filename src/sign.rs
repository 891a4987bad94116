//! OAuth 1.0 signing primitives (RFC 5849 §3.4).
//!
//! `encode` implements the protocol's percent-encoding, `base_string` builds the canonical
//! signature base string, `method` exposes [`Signer`] for the HMAC-SHA1, RSA-SHA1, and
//! PLAINTEXT methods, and `nonce` supplies per-request nonce/timestamp pairs.

pub mod base_string;
pub mod encode;
pub mod method;
pub mod nonce;

pub use base_string::*;
pub use encode::*;
pub use method::*;
pub use nonce::*;

// self
use crate::{_prelude::*, error::BoxError};

/// Failures raised while configuring a signer or computing a signature.
#[derive(Debug, ThisError)]
pub enum SignError {
	/// The configured signature method is not one of HMAC-SHA1, RSA-SHA1, or PLAINTEXT.
	#[error("Signature method `{0}` is not supported.")]
	UnsupportedSignatureMethod(String),
	/// RSA-SHA1 requires a PEM-encoded RSA private key in place of the consumer secret.
	#[error("Consumer secret is not a valid PEM-encoded RSA private key.")]
	InvalidPrivateKey {
		/// Underlying parsing failure.
		#[source]
		source: BoxError,
	},
	/// HMAC key material was rejected.
	#[error("HMAC-SHA1 key material was rejected.")]
	InvalidHmacKey,
	/// RSA signing failed.
	#[error("RSA-SHA1 signing failed.")]
	Rsa {
		/// Underlying signing failure.
		#[source]
		source: BoxError,
	},
}
