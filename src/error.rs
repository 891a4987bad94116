//! Crate-level error types shared across signing, stores, transports, and flows.

// self
use crate::{
	_prelude::*,
	auth::IdentifierError,
	flows::InvalidTransition,
	provider::{ProviderDescriptorError, ProviderError},
	sign::SignError,
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used where callers or transports supply their own error types.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Use [`Error::is_fatal`] to tell infrastructure and application failures apart from the
/// provider-side problems that the authenticator reports as plain authentication failures.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure other than a missing token.
	#[error("{0}")]
	Storage(#[source] crate::store::StoreError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Signature computation failure or unsupported signature method.
	#[error(transparent)]
	Signature(#[from] SignError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider answered with a non-success status or an unusable body.
	#[error(transparent)]
	Provider(#[from] ProviderError),

	/// The handshake state machine was driven out of order.
	#[error(transparent)]
	State(#[from] InvalidTransition),

	/// Request token was never issued, already consumed, or expired.
	#[error("Request token was not found; the authorization session expired or was already used.")]
	TokenNotFound,
	/// Provider profile could not be loaded.
	#[error("Failed to fetch the user profile.")]
	ProfileFetch {
		/// Underlying fetch or decoding failure.
		#[source]
		source: BoxError,
	},
	/// The verify callback reported an application error.
	#[error("Identity resolution failed.")]
	IdentityResolution {
		/// Error returned by the verify callback.
		#[source]
		source: BoxError,
	},
	/// The verify callback did not resolve within the configured bound.
	#[error("Verify callback did not resolve within {timeout}.")]
	VerifyTimeout {
		/// Configured bound that elapsed.
		timeout: Duration,
	},
}
impl Error {
	/// Wraps a profile fetch failure.
	pub fn profile_fetch(src: impl Into<BoxError>) -> Self {
		Self::ProfileFetch { source: src.into() }
	}

	/// Wraps an application error returned by the verify callback.
	pub fn identity_resolution(src: impl Into<BoxError>) -> Self {
		Self::IdentityResolution { source: src.into() }
	}

	/// Returns `true` when the error must terminate the attempt instead of being reported as an
	/// authentication failure.
	pub fn is_fatal(&self) -> bool {
		!matches!(
			self,
			Self::Provider(_) | Self::Transport(_) | Self::TokenNotFound | Self::ProfileFetch { .. }
		)
	}
}
impl From<crate::store::StoreError> for Error {
	fn from(e: crate::store::StoreError) -> Self {
		match e {
			crate::store::StoreError::TokenNotFound => Self::TokenNotFound,
			other => Self::Storage(other),
		}
	}
}

/// Configuration and validation failures raised while building an authenticator.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
	/// A required option was not supplied.
	#[error("Missing required option `{option}`.")]
	MissingOption {
		/// Option name as it appears in the configuration surface.
		option: &'static str,
	},
	/// An endpoint option could not be parsed as an absolute URL.
	#[error("Option `{option}` is not a valid URL.")]
	InvalidUrl {
		/// Option name as it appears in the configuration surface.
		option: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider descriptor validation failed.
	#[error(transparent)]
	InvalidDescriptor(#[from] ProviderDescriptorError),
	/// A relative callback URL could not be resolved against the inbound request.
	#[error("Callback URL could not be resolved against the inbound request.")]
	CallbackResolution {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Identifier validation failed.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
	/// Serialized options could not be decoded.
	#[error("Strategy options are invalid.")]
	InvalidOptions {
		/// Structured decoding failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint label.
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The provider did not answer within the configured timeout.
	#[error("Request to the {endpoint} endpoint timed out.")]
	Timeout {
		/// Endpoint label.
		endpoint: &'static str,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling a provider endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(endpoint: &'static str, src: impl Into<BoxError>) -> Self {
		Self::Network { endpoint, source: src.into() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_errors_split_missing_tokens_from_backend_failures() {
		let missing: Error = StoreError::TokenNotFound.into();

		assert!(matches!(missing, Error::TokenNotFound));
		assert!(!missing.is_fatal());

		let write: Error = StoreError::Write { message: "session locked".into() }.into();

		assert!(matches!(write, Error::Storage(_)));
		assert!(write.is_fatal());
		assert!(write.to_string().contains("session locked"));

		let source = StdError::source(&write)
			.expect("Storage errors should expose the original store error as their source.");

		assert!(source.to_string().contains("session locked"));
	}

	#[test]
	fn provider_and_profile_errors_are_not_fatal() {
		let provider: Error = ProviderError::new("Failed to obtain access token.", 401, "").into();

		assert!(!provider.is_fatal());
		assert!(!Error::profile_fetch("profile endpoint down").is_fatal());
		assert!(Error::identity_resolution("database offline").is_fatal());
		assert!(Error::VerifyTimeout { timeout: Duration::seconds(1) }.is_fatal());
		assert!(Error::from(SignError::UnsupportedSignatureMethod("MD5".into())).is_fatal());
	}
}
