//! Access tokens handed to the application after a successful exchange.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access token returned by the third leg.
///
/// The engine never persists access tokens; ownership moves to the verify callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Value of `oauth_token`.
	pub token: String,
	/// Value of `oauth_token_secret`.
	pub token_secret: TokenSecret,
	/// Remaining response fields such as `user_id` or `screen_name`.
	#[serde(default)]
	pub params: BTreeMap<String, String>,
}
impl AccessToken {
	/// Creates a token without extra parameters.
	pub fn new(token: impl Into<String>, token_secret: impl Into<TokenSecret>) -> Self {
		Self { token: token.into(), token_secret: token_secret.into(), params: BTreeMap::new() }
	}

	/// Attaches extra response parameters.
	pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
		self.params = params;

		self
	}

	/// Looks up an extra response parameter.
	pub fn param(&self, key: &str) -> Option<&str> {
		self.params.get(key).map(String::as_str)
	}
}
