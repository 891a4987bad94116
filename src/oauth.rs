//! OAuth 1.0 wire client: signed `Authorization` headers, token endpoint exchanges, and
//! transport error mapping.

// crates.io
use ::http::{
	Method,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, TransportError},
	http::{HttpRequest, HttpResponse, ProviderHttpClient, body_text},
	provider::{ProviderError, ProviderStrategy},
	sign::{
		NonceGenerator, SignError, SignatureInput, Signer, SystemNonceGenerator,
		collect_parameters, percent_encode,
	},
};

pub(crate) type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Provider endpoints the engine talks to; used as span, metric, and error labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointKind {
	/// Temporary credential (request token) endpoint.
	RequestToken,
	/// Token credential (access token) endpoint.
	AccessToken,
	/// Protected resources such as profile APIs.
	Resource,
}
impl EndpointKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointKind::RequestToken => "request_token",
			EndpointKind::AccessToken => "access_token",
			EndpointKind::Resource => "resource",
		}
	}

	/// Message used when a provider failure carries no parsable detail.
	pub const fn failure_message(self) -> &'static str {
		match self {
			EndpointKind::RequestToken => "Failed to obtain request token.",
			EndpointKind::AccessToken => "Failed to obtain access token.",
			EndpointKind::Resource => "Failed to fetch protected resource.",
		}
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an error emitted by the transport into a crate error.
	fn map_transport_error(&self, endpoint: EndpointKind, error: E) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, endpoint: EndpointKind, err: ReqwestError) -> Error {
		if err.is_builder() {
			return ConfigError::from(err).into();
		}
		if err.is_timeout() {
			return TransportError::Timeout { endpoint: endpoint.as_str() }.into();
		}

		TransportError::network(endpoint.as_str(), err).into()
	}
}

/// Token and secret used to sign a request on behalf of a user.
#[derive(Clone, Copy)]
pub struct TokenCredentials<'a> {
	/// Value sent as `oauth_token`.
	pub token: &'a str,
	/// Second half of the signing key.
	pub secret: &'a str,
}
impl Debug for TokenCredentials<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCredentials")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.finish()
	}
}

/// Client (consumer) credentials plus the machinery to sign requests with them.
#[derive(Clone)]
pub struct Consumer {
	key: String,
	signer: Signer,
	nonce: Arc<dyn NonceGenerator>,
}
impl Consumer {
	/// Creates a consumer that draws nonces from [`SystemNonceGenerator`].
	pub fn new(key: impl Into<String>, signer: Signer) -> Self {
		Self { key: key.into(), signer, nonce: Arc::new(SystemNonceGenerator) }
	}

	/// Replaces the nonce/timestamp source.
	pub fn with_nonce_generator(mut self, nonce: Arc<dyn NonceGenerator>) -> Self {
		self.nonce = nonce;

		self
	}

	/// Returns the consumer key.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Returns the signer bound to the consumer secret.
	pub fn signer(&self) -> &Signer {
		&self.signer
	}

	/// Builds the `Authorization: OAuth ...` header value for one request.
	///
	/// `protocol` carries leg-specific `oauth_*` parameters such as `oauth_callback` or
	/// `oauth_verifier`. URL query parameters and `body` form parameters are signed but not
	/// repeated in the header.
	pub fn authorization_header(
		&self,
		method: &str,
		url: &Url,
		token: Option<TokenCredentials<'_>>,
		protocol: &[(&str, &str)],
		body: &[(String, String)],
	) -> Result<String, SignError> {
		let stamp = self.nonce.next();
		let mut oauth = BTreeMap::from([
			("oauth_consumer_key".to_owned(), self.key.clone()),
			("oauth_nonce".to_owned(), stamp.nonce),
			("oauth_signature_method".to_owned(), self.signer.method().as_str().to_owned()),
			("oauth_timestamp".to_owned(), stamp.timestamp.to_string()),
			("oauth_version".to_owned(), "1.0".to_owned()),
		]);

		if let Some(credentials) = token {
			oauth.insert("oauth_token".into(), credentials.token.to_owned());
		}
		for (key, value) in protocol {
			oauth.insert((*key).to_owned(), (*value).to_owned());
		}

		let parameters = collect_parameters(
			url,
			body.iter().cloned().chain(oauth.iter().map(|(k, v)| (k.clone(), v.clone()))),
		);
		let input = SignatureInput::new(method, url, &parameters)
			.with_token_secret(token.map(|credentials| credentials.secret));
		let signature = self.signer.sign(&input)?;

		oauth.insert("oauth_signature".into(), signature);

		let fields = oauth
			.iter()
			.map(|(key, value)| format!("{}=\"{}\"", percent_encode(key), percent_encode(value)))
			.collect::<Vec<_>>();

		Ok(format!("OAuth {}", fields.join(", ")))
	}

	/// Builds a complete signed request with `body` sent as a form payload.
	pub fn signed_request(
		&self,
		method: Method,
		url: &Url,
		token: Option<TokenCredentials<'_>>,
		protocol: &[(&str, &str)],
		body: &[(String, String)],
	) -> Result<HttpRequest> {
		let header = self.authorization_header(method.as_str(), url, token, protocol, body)?;
		let mut builder =
			::http::Request::builder().method(method).uri(url.as_str()).header(AUTHORIZATION, header);

		if !body.is_empty() {
			builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE);
		}

		builder.body(encode_form(body).into_bytes()).map_err(|e| ConfigError::from(e).into())
	}
}
impl Debug for Consumer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Consumer").field("key", &self.key).field("signer", &self.signer).finish()
	}
}

/// Parsed form-encoded body returned by a token endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenResponse {
	/// Value of `oauth_token`.
	pub token: String,
	/// Value of `oauth_token_secret`; empty when the provider omitted it.
	pub token_secret: TokenSecret,
	/// Every other field of the response.
	pub params: BTreeMap<String, String>,
}
impl TokenResponse {
	/// Parses a token endpoint body, failing when `oauth_token` is missing.
	pub fn parse(endpoint: EndpointKind, status: u16, body: &str) -> Result<Self, ProviderError> {
		let mut params = form_urlencoded::parse(body.trim().as_bytes())
			.into_owned()
			.collect::<BTreeMap<String, String>>();
		let token = params
			.remove("oauth_token")
			.filter(|token| !token.is_empty())
			.ok_or_else(|| ProviderError::new(endpoint.failure_message(), status, body))?;
		let token_secret = TokenSecret::new(params.remove("oauth_token_secret").unwrap_or_default());

		Ok(Self { token, token_secret, params })
	}

	/// Returns `true` when the provider sent `oauth_callback_confirmed=true`.
	pub fn callback_confirmed(&self) -> bool {
		self.params.get("oauth_callback_confirmed").is_some_and(|value| value == "true")
	}
}

/// OAuth 1.0 client operations used by the handshake, erased over the transport type.
pub(crate) trait OAuth1Facade
where
	Self: Send + Sync,
{
	fn consumer(&self) -> &Consumer;

	/// Returns a facade sharing this transport but signing with `consumer` and bounding calls
	/// by `timeout`.
	fn reconfigure(&self, consumer: Consumer, timeout: Duration) -> Arc<dyn OAuth1Facade>;

	fn send(&self, endpoint: EndpointKind, request: HttpRequest) -> FacadeFuture<'_, HttpResponse>;

	fn fetch_request_token<'a>(
		&'a self,
		strategy: &'a dyn ProviderStrategy,
		url: &'a Url,
		callback: &'a str,
		params: &'a [(String, String)],
	) -> FacadeFuture<'a, TokenResponse>;

	fn fetch_access_token<'a>(
		&'a self,
		strategy: &'a dyn ProviderStrategy,
		url: &'a Url,
		credentials: TokenCredentials<'a>,
		verifier: Option<&'a str>,
	) -> FacadeFuture<'a, TokenResponse>;
}

pub(crate) struct OAuth1Client<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	consumer: Consumer,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
	timeout: Duration,
}
impl<C, M> OAuth1Client<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		consumer: Consumer,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
		timeout: Duration,
	) -> Self {
		Self { consumer, http_client: http_client.into(), error_mapper: error_mapper.into(), timeout }
	}

	async fn exchange(
		&self,
		strategy: &dyn ProviderStrategy,
		endpoint: EndpointKind,
		request: HttpRequest,
	) -> Result<TokenResponse> {
		let response = self.send(endpoint, request).await?;
		let status = response.status();
		let body = body_text(&response);

		if !status.is_success() {
			let error = strategy
				.parse_error_response(&body, status.as_u16())
				.unwrap_or_else(|| ProviderError::new(endpoint.failure_message(), status.as_u16(), body));

			return Err(error.into());
		}

		TokenResponse::parse(endpoint, status.as_u16(), &body).map_err(Error::from)
	}
}
impl<C, M> OAuth1Facade for OAuth1Client<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn consumer(&self) -> &Consumer {
		&self.consumer
	}

	fn reconfigure(&self, consumer: Consumer, timeout: Duration) -> Arc<dyn OAuth1Facade> {
		Arc::new(Self {
			consumer,
			http_client: self.http_client.clone(),
			error_mapper: self.error_mapper.clone(),
			timeout,
		})
	}

	fn send(&self, endpoint: EndpointKind, request: HttpRequest) -> FacadeFuture<'_, HttpResponse> {
		Box::pin(async move {
			let call = self.http_client.execute(request);

			match tokio::time::timeout(self.timeout.unsigned_abs(), call).await {
				Ok(Ok(response)) => Ok(response),
				Ok(Err(err)) => Err(self.error_mapper.map_transport_error(endpoint, err)),
				Err(_) => Err(TransportError::Timeout { endpoint: endpoint.as_str() }.into()),
			}
		})
	}

	fn fetch_request_token<'a>(
		&'a self,
		strategy: &'a dyn ProviderStrategy,
		url: &'a Url,
		callback: &'a str,
		params: &'a [(String, String)],
	) -> FacadeFuture<'a, TokenResponse> {
		Box::pin(async move {
			let request = self.consumer.signed_request(
				Method::POST,
				url,
				None,
				&[("oauth_callback", callback)],
				params,
			)?;

			self.exchange(strategy, EndpointKind::RequestToken, request).await
		})
	}

	fn fetch_access_token<'a>(
		&'a self,
		strategy: &'a dyn ProviderStrategy,
		url: &'a Url,
		credentials: TokenCredentials<'a>,
		verifier: Option<&'a str>,
	) -> FacadeFuture<'a, TokenResponse> {
		Box::pin(async move {
			let protocol = verifier.map(|value| ("oauth_verifier", value)).into_iter().collect::<Vec<_>>();
			let request =
				self.consumer.signed_request(Method::POST, url, Some(credentials), &protocol, &[])?;

			self.exchange(strategy, EndpointKind::AccessToken, request).await
		})
	}
}

/// Encodes parameters as an RFC 3986 form body (`%20` rather than `+` for spaces).
pub fn encode_form(params: &[(String, String)]) -> String {
	params
		.iter()
		.map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
		.collect::<Vec<_>>()
		.join("&")
}

/// Parses an `Authorization: OAuth ...` header back into its decoded parameters.
pub fn parse_authorization_header(header: &str) -> Option<BTreeMap<String, String>> {
	let fields = header.trim().strip_prefix("OAuth ")?;
	let mut params = BTreeMap::new();

	for field in fields.split(',') {
		let (key, value) = field.trim().split_once('=')?;
		let value = value.strip_prefix('"')?.strip_suffix('"')?;

		params.insert(
			crate::sign::percent_decode(key).ok()?,
			crate::sign::percent_decode(value).ok()?,
		);
	}

	Some(params)
}
