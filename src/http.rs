//! Transport primitives for calls to OAuth 1.0 provider endpoints.
//!
//! The engine speaks [`http`] crate types at this boundary: requests are
//! `http::Request<Vec<u8>>` and responses `http::Response<Vec<u8>>`. Any client that can
//! execute such a request implements [`ProviderHttpClient`]; the default is
//! [`ReqwestHttpClient`].

// std
use std::ops::Deref;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Outbound request handed to a transport.
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Buffered response returned by a transport.
pub type HttpResponse = ::http::Response<Vec<u8>>;
/// Boxed future returned by [`ProviderHttpClient::execute`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports able to reach provider endpoints.
///
/// Implementations must be `Send + Sync + 'static` so one instance can be shared by every
/// concurrent handshake, and the returned futures must be `Send`. Transports should not
/// follow redirects: token endpoints answer directly.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes `request` and buffers the whole response body.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Clients built by this type never follow redirects and always carry a request timeout.
/// When supplying a custom [`ReqwestClient`] through [`ReqwestHttpClient::with_client`],
/// configure both yourself; the authenticator still bounds every call with its own timeout.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Timeout applied to provider calls unless overridden.
	pub const DEFAULT_TIMEOUT: Duration = Duration::seconds(10);

	/// Builds a client with [`Self::DEFAULT_TIMEOUT`].
	pub fn new() -> Result<Self, ConfigError> {
		Self::with_timeout(Self::DEFAULT_TIMEOUT)
	}

	/// Builds a client whose requests give up after `timeout`.
	pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(timeout.unsigned_abs())
			.redirect(reqwest::redirect::Policy::none())
			.build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let response = self.0.execute(reqwest::Request::try_from(request)?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut buffered = HttpResponse::new(response.bytes().await?.to_vec());

			*buffered.status_mut() = status;
			*buffered.headers_mut() = headers;

			Ok(buffered)
		})
	}
}

/// Returns the response body as text, replacing invalid UTF-8 sequences.
pub fn body_text(response: &HttpResponse) -> String {
	String::from_utf8_lossy(response.body()).into_owned()
}
