//! Provider strategy hooks that customize the handshake.
//!
//! Every hook has a default so a strategy overrides only what its provider needs:
//! extra request-token parameters, extra authorization-page parameters, error body
//! parsing, and profile retrieval.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Profile, ProviderId},
	error::BoxError,
	ext::SignedFetcher,
	flows::AuthenticateOptions,
	provider::{ProviderError, parse_json_error, parse_oauth_problem},
};

/// Boxed future returned by [`ProviderStrategy::user_profile`].
pub type ProfileFuture<'a> = Pin<Box<dyn Future<Output = Result<Profile, BoxError>> + 'a + Send>>;

/// Inputs handed to [`ProviderStrategy::user_profile`].
#[derive(Clone, Copy, Debug)]
pub struct ProfileRequest<'a> {
	/// Provider the profile belongs to.
	pub provider: &'a ProviderId,
	/// Access token issued by the third leg.
	pub access_token: &'a AccessToken,
	/// Client that signs protected resource requests with `access_token`.
	pub fetcher: &'a SignedFetcher,
}

/// Override points consulted by the handshake.
///
/// Implementors must be `Send + Sync`; one strategy instance serves every concurrent
/// attempt. The hooks work on crate-owned types so strategies never depend on a
/// particular HTTP client.
pub trait ProviderStrategy
where
	Self: Send + Sync,
{
	/// Extra form parameters sent to the request-token endpoint.
	fn request_token_params(&self, _options: &AuthenticateOptions) -> Vec<(String, String)> {
		Vec::new()
	}

	/// Extra query parameters merged into the user authorization URL.
	fn user_authorization_params(&self, _options: &AuthenticateOptions) -> Vec<(String, String)> {
		Vec::new()
	}

	/// Extracts a provider-specific error from a failed token endpoint response.
	///
	/// Returning `None` makes the engine report a generic error carrying the status and the
	/// raw body.
	fn parse_error_response(&self, _body: &str, _status: u16) -> Option<ProviderError> {
		None
	}

	/// Loads the user profile after a successful access-token exchange.
	///
	/// The default yields the empty profile without any network traffic.
	fn user_profile<'a>(&'a self, request: ProfileRequest<'a>) -> ProfileFuture<'a> {
		Box::pin(async move { Ok(Profile::empty(request.provider.clone())) })
	}
}

/// Strategy that relies on every default hook.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {}

/// Strategy that understands JSON error bodies and OAuth problem reports.
///
/// JSON shapes are tried first (see [`parse_json_error`]), then `oauth_problem` form bodies.
#[derive(Debug, Default)]
pub struct JsonErrorStrategy;
impl Display for JsonErrorStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("json-error-strategy")
	}
}
impl ProviderStrategy for JsonErrorStrategy {
	fn parse_error_response(&self, body: &str, status: u16) -> Option<ProviderError> {
		parse_json_error(body, status).or_else(|| parse_oauth_problem(body, status))
	}
}
