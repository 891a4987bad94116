//! Unauthorized request tokens awaiting the user's return from the provider.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, TokenSecret},
};

/// Request token issued during the first leg of the handshake.
///
/// The token lives in a [`RequestTokenStore`](crate::store::RequestTokenStore) until it is
/// exchanged, destroyed, or expires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
	/// Attempt this token belongs to.
	pub correlation_id: CorrelationId,
	/// Value of `oauth_token`.
	pub token: String,
	/// Value of `oauth_token_secret`; second half of the access-token signing key.
	pub token_secret: TokenSecret,
	/// Moment the provider issued the token.
	#[serde(with = "time::serde::timestamp")]
	pub issued_at: OffsetDateTime,
	/// Whether the provider echoed `oauth_callback_confirmed=true` (OAuth 1.0a).
	#[serde(default)]
	pub callback_confirmed: bool,
}
impl RequestToken {
	/// Creates a token issued now.
	pub fn new(
		correlation_id: CorrelationId,
		token: impl Into<String>,
		token_secret: impl Into<TokenSecret>,
	) -> Self {
		Self {
			correlation_id,
			token: token.into(),
			token_secret: token_secret.into(),
			issued_at: OffsetDateTime::now_utc(),
			callback_confirmed: false,
		}
	}

	/// Overrides the issue instant.
	pub fn with_issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = instant;

		self
	}

	/// Records whether the provider confirmed the callback.
	pub fn with_callback_confirmed(mut self, confirmed: bool) -> Self {
		self.callback_confirmed = confirmed;

		self
	}

	/// Returns `true` once `ttl` has elapsed since issuance.
	pub fn is_expired_at(&self, ttl: Duration, instant: OffsetDateTime) -> bool {
		instant - self.issued_at >= ttl
	}
}
