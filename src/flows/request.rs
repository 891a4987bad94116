//! Framework-neutral view of the inbound authentication request.

// crates.io
use ::http::HeaderMap;
// self
use crate::{_prelude::*, auth::CorrelationId};

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Inbound request handed to [`Authenticator::authenticate`](crate::flows::Authenticator::authenticate).
///
/// `url` is the absolute URL as the application received it (scheme and `Host` included);
/// `correlation_id` identifies the user's session so both legs find the same request token.
#[derive(Clone, Debug)]
pub struct AuthRequest {
	/// Session or attempt identifier shared by the first and third legs.
	pub correlation_id: CorrelationId,
	/// Absolute request URL including the query string.
	pub url: Url,
	/// Request headers; only proxy headers are consulted.
	pub headers: HeaderMap,
}
impl AuthRequest {
	/// Creates a request without headers.
	pub fn new(correlation_id: CorrelationId, url: Url) -> Self {
		Self { correlation_id, url, headers: HeaderMap::new() }
	}

	/// Attaches request headers.
	pub fn with_headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;

		self
	}

	/// Returns the first value of query parameter `name`.
	pub fn query_param(&self, name: &str) -> Option<String> {
		self.url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value.into_owned())
	}

	/// Reconstructs the URL the user agent actually requested.
	///
	/// With `trust_proxy`, the first `X-Forwarded-Proto` and `X-Forwarded-Host` values replace
	/// the scheme and authority; malformed values are ignored.
	pub fn original_url(&self, trust_proxy: bool) -> Url {
		if !trust_proxy {
			return self.url.clone();
		}

		let proto = self.forwarded(FORWARDED_PROTO).unwrap_or_else(|| self.url.scheme().to_owned());
		let authority = match self.forwarded(FORWARDED_HOST) {
			Some(host) => host,
			None => match (self.url.host_str(), self.url.port()) {
				(Some(host), Some(port)) => format!("{host}:{port}"),
				(Some(host), None) => host.to_owned(),
				(None, _) => return self.url.clone(),
			},
		};
		let query = self.url.query().map(|query| format!("?{query}")).unwrap_or_default();

		Url::parse(&format!("{proto}://{authority}{}{query}", self.url.path()))
			.unwrap_or_else(|_| self.url.clone())
	}

	fn forwarded(&self, name: &str) -> Option<String> {
		let value = self.headers.get(name)?.to_str().ok()?;
		let first = value.split(',').next()?.trim();

		(!first.is_empty()).then(|| first.to_ascii_lowercase())
	}
}
