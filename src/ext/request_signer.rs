//! Request signing contracts that let callers attach OAuth 1.0 credentials to any HTTP
//! request, plus the signed fetcher handed to profile hooks.

// crates.io
use ::http::{
	HeaderMap, HeaderValue, Method,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	error::ConfigError,
	http::{HttpRequest, HttpResponse, body_text},
	oauth::{Consumer, EndpointKind, OAuth1Facade, TokenCredentials},
	provider::ProviderError,
};

/// Describes how to attach an [`AccessToken`] to an outbound request without constraining
/// the HTTP client type.
///
/// URL query parameters and `application/x-www-form-urlencoded` bodies are part of the
/// signature; other body types are not.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the request and returns it with an `Authorization: OAuth ...` header.
	fn attach_token(&self, request: Request, token: &AccessToken) -> Result<Request, Error>;
}
impl RequestSignerExt<HttpRequest, Error> for Consumer {
	fn attach_token(&self, mut request: HttpRequest, token: &AccessToken) -> Result<HttpRequest> {
		let url = Url::parse(&request.uri().to_string())
			.map_err(|source| ConfigError::InvalidUrl { option: "request.uri", source })?;
		let body = form_params(request.headers(), Some(request.body().as_slice()));
		let header = self.authorization_header(
			request.method().as_str(),
			&url,
			Some(credentials(token)),
			&[],
			&body,
		)?;

		request.headers_mut().insert(AUTHORIZATION, header_value(&header)?);

		Ok(request)
	}
}
#[cfg(feature = "reqwest")]
impl RequestSignerExt<reqwest::Request, Error> for Consumer {
	fn attach_token(
		&self,
		mut request: reqwest::Request,
		token: &AccessToken,
	) -> Result<reqwest::Request> {
		let body = form_params(request.headers(), request.body().and_then(|body| body.as_bytes()));
		let header = self.authorization_header(
			request.method().as_str(),
			request.url(),
			Some(credentials(token)),
			&[],
			&body,
		)?;

		request.headers_mut().insert(AUTHORIZATION, header_value(&header)?);

		Ok(request)
	}
}

/// Issues protected resource requests signed with one access token.
///
/// Handed to [`ProviderStrategy::user_profile`](crate::provider::ProviderStrategy::user_profile)
/// so profile hooks reuse the authenticator's transport, timeout, and consumer credentials.
pub struct SignedFetcher {
	facade: Arc<dyn OAuth1Facade>,
	token: AccessToken,
}
impl SignedFetcher {
	pub(crate) fn new(facade: Arc<dyn OAuth1Facade>, token: AccessToken) -> Self {
		Self { facade, token }
	}

	/// Returns the access token requests are signed with.
	pub fn access_token(&self) -> &AccessToken {
		&self.token
	}

	/// Signs and sends `request`, returning the raw response regardless of status.
	pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
		let signed = self.facade.consumer().attach_token(request, &self.token)?;

		self.facade.send(EndpointKind::Resource, signed).await
	}

	/// Sends a signed `GET`, failing with [`Error::Provider`] on non-success statuses.
	pub async fn get(&self, url: &Url) -> Result<HttpResponse> {
		let request = ::http::Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.header(ACCEPT, "application/json")
			.body(Vec::new())
			.map_err(ConfigError::from)?;
		let response = self.execute(request).await?;
		let status = response.status();

		if !status.is_success() {
			let endpoint = EndpointKind::Resource;

			return Err(ProviderError::new(
				endpoint.failure_message(),
				status.as_u16(),
				body_text(&response),
			)
			.into());
		}

		Ok(response)
	}

	/// Sends a signed `GET` and decodes the JSON response.
	pub async fn get_json<T>(&self, url: &Url) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.get(url).await?;

		serde_json::from_slice(response.body()).map_err(Error::profile_fetch)
	}
}
impl Debug for SignedFetcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignedFetcher")
			.field("consumer", self.facade.consumer())
			.field("token", &self.token.token)
			.finish()
	}
}

fn credentials(token: &AccessToken) -> TokenCredentials<'_> {
	TokenCredentials { token: &token.token, secret: token.token_secret.expose() }
}

fn header_value(header: &str) -> Result<HeaderValue> {
	HeaderValue::from_str(header).map_err(|e| ConfigError::from(::http::Error::from(e)).into())
}

fn form_params(headers: &HeaderMap, body: Option<&[u8]>) -> Vec<(String, String)> {
	let is_form = headers
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

	match body {
		Some(body) if is_form => form_urlencoded::parse(body).into_owned().collect(),
		_ => Vec::new(),
	}
}
