//! Handshake orchestration powered by the OAuth 1.0 facade.
//!
//! [`Authenticator::authenticate`] is the single entry point. An inbound request without an
//! `oauth_token` starts the first leg (request token + redirect); a request carrying one
//! resumes at the access-token exchange, then resolves the user's identity through the
//! application's [`Verify`] callback.

pub mod authenticate;
pub mod common;
pub mod request;
pub mod state;
pub mod verify;

mod access_token;
mod request_token;

pub use authenticate::*;
pub use common::*;
pub use request::*;
pub use state::*;
pub use verify::*;

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::{StrategyOptions, StrategySettings},
	ext::SignedFetcher,
	flows::common::FlowGuards,
	http::ProviderHttpClient,
	oauth::{Consumer, OAuth1Client, OAuth1Facade, TransportErrorMapper},
	provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
	sign::{NonceGenerator, Signer},
	store::{MemorySessions, RequestTokenStore, SessionBackend, SessionStore},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Runs OAuth 1.0a handshakes against a single provider descriptor.
///
/// The authenticator owns the consumer credentials, transport, request token store,
/// provider strategy, and verify callback, so each call to
/// [`Authenticator::authenticate`] only needs the inbound request. `P` is the principal type
/// the verify callback resolves users to.
///
/// Request tokens default to a [`SessionStore`] over in-process [`MemorySessions`]; plug the
/// application's session mechanism in with [`Authenticator::with_session_backend`] or any
/// other store with [`Authenticator::with_store`].
pub struct Authenticator<P> {
	/// Provider descriptor that defines endpoints and quirks.
	pub descriptor: ProviderDescriptor,
	/// Runtime settings (timeouts, profile handling, proxy trust).
	pub settings: StrategySettings,
	/// Strategy supplying provider-specific hooks.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// Store holding request tokens between the first and third legs.
	pub store: Arc<dyn RequestTokenStore>,
	verify: Arc<dyn Verify<P>>,
	facade: Arc<dyn OAuth1Facade>,
	session_backend: Option<Arc<dyn SessionBackend>>,
	flow_guards: FlowGuards,
}
impl<P> Authenticator<P>
where
	P: 'static + Send,
{
	/// Creates an authenticator that reuses the caller-provided transport + mapper pair.
	///
	/// Fails when the consumer secret does not suit the descriptor's signature method (for
	/// example an unparsable PEM key with RSA-SHA1).
	pub fn with_http_client<C, M>(
		descriptor: ProviderDescriptor,
		consumer_key: impl Into<String>,
		consumer_secret: &str,
		verify: Arc<dyn Verify<P>>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self>
	where
		C: ?Sized + ProviderHttpClient,
		M: ?Sized + TransportErrorMapper<C::TransportError>,
	{
		let settings = StrategySettings::default();
		let signer = Signer::new(descriptor.signature_method, consumer_secret)?;
		let consumer = Consumer::new(consumer_key, signer);
		let facade = OAuth1Client::<C, M>::new(consumer, http_client, mapper, settings.http_timeout);
		let session_backend: Arc<dyn SessionBackend> = Arc::new(MemorySessions::default());

		Ok(Self {
			store: Arc::new(
				SessionStore::new(session_backend.clone()).with_key(settings.session_key.clone()),
			),
			descriptor,
			settings,
			strategy: Arc::new(DefaultProviderStrategy),
			verify,
			facade: Arc::new(facade),
			session_backend: Some(session_backend),
			flow_guards: Default::default(),
		})
	}

	/// Replaces the request token store.
	pub fn with_store(mut self, store: Arc<dyn RequestTokenStore>) -> Self {
		self.store = store;
		self.session_backend = None;

		self
	}

	/// Stores request tokens in the application's sessions under
	/// [`StrategySettings::session_key`].
	pub fn with_session_backend(mut self, backend: Arc<dyn SessionBackend>) -> Self {
		self.store =
			Arc::new(SessionStore::new(backend.clone()).with_key(self.settings.session_key.clone()));
		self.session_backend = Some(backend);

		self
	}

	/// Replaces the provider strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Replaces the runtime settings.
	///
	/// The HTTP timeout is enforced by the authenticator around every provider call; a
	/// transport with its own, shorter timeout still fails first. Session-backed stores built
	/// by the authenticator pick up the new session key.
	pub fn with_settings(mut self, settings: StrategySettings) -> Self {
		if let Some(backend) = &self.session_backend {
			self.store =
				Arc::new(SessionStore::new(backend.clone()).with_key(settings.session_key.clone()));
		}

		self.facade = self.facade.reconfigure(self.facade.consumer().clone(), settings.http_timeout);
		self.settings = settings;

		self
	}

	/// Replaces the nonce/timestamp source used for every signed request.
	pub fn with_nonce_generator(mut self, nonce: Arc<dyn NonceGenerator>) -> Self {
		let consumer = self.facade.consumer().clone().with_nonce_generator(nonce);

		self.facade = self.facade.reconfigure(consumer, self.settings.http_timeout);

		self
	}

	/// Returns the consumer credentials used for signing.
	pub fn consumer(&self) -> &Consumer {
		self.facade.consumer()
	}

	/// Returns a client that signs protected resource requests with `token`.
	pub fn signed_fetcher(&self, token: AccessToken) -> SignedFetcher {
		SignedFetcher::new(self.facade.clone(), token)
	}
}
#[cfg(feature = "reqwest")]
impl<P> Authenticator<P>
where
	P: 'static + Send,
{
	/// Creates an authenticator backed by the crate's reqwest transport.
	pub fn new(
		descriptor: ProviderDescriptor,
		consumer_key: impl Into<String>,
		consumer_secret: &str,
		verify: Arc<dyn Verify<P>>,
	) -> Result<Self> {
		Self::with_http_client::<ReqwestHttpClient, ReqwestTransportErrorMapper>(
			descriptor,
			consumer_key,
			consumer_secret,
			verify,
			ReqwestHttpClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Validates `options` and builds a reqwest-backed authenticator from them.
	pub fn from_options(options: StrategyOptions, verify: Arc<dyn Verify<P>>) -> Result<Self> {
		let resolved = options.resolve()?;
		let http_client = ReqwestHttpClient::with_timeout(resolved.settings.http_timeout)?;

		Ok(Self::with_http_client::<ReqwestHttpClient, ReqwestTransportErrorMapper>(
			resolved.descriptor,
			resolved.consumer_key,
			resolved.consumer_secret.expose(),
			verify,
			http_client,
			Arc::new(ReqwestTransportErrorMapper),
		)?
		.with_settings(resolved.settings))
	}
}
impl<P> Clone for Authenticator<P> {
	fn clone(&self) -> Self {
		Self {
			descriptor: self.descriptor.clone(),
			settings: self.settings.clone(),
			strategy: self.strategy.clone(),
			store: self.store.clone(),
			verify: self.verify.clone(),
			facade: self.facade.clone(),
			session_backend: self.session_backend.clone(),
			flow_guards: self.flow_guards.clone(),
		}
	}
}
impl<P> Debug for Authenticator<P> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("descriptor", &self.descriptor)
			.field("settings", &self.settings)
			.field("consumer", self.facade.consumer())
			.finish_non_exhaustive()
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::*,
		auth::{CorrelationId, ProviderId, RequestToken},
		error::{BoxError, TransportError},
		http::{HttpFuture, HttpRequest},
		oauth::EndpointKind,
		store::MemoryStore,
	};

	struct StalledClient;
	impl ProviderHttpClient for StalledClient {
		type TransportError = std::io::Error;

		fn execute(&self, _: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
			Box::pin(std::future::pending())
		}
	}

	struct IoErrorMapper;
	impl TransportErrorMapper<std::io::Error> for IoErrorMapper {
		fn map_transport_error(&self, endpoint: EndpointKind, error: std::io::Error) -> Error {
			TransportError::network(endpoint.as_str(), error).into()
		}
	}

	fn descriptor() -> ProviderDescriptor {
		ProviderDescriptor::builder(
			ProviderId::new("example").expect("Provider identifier should be valid."),
		)
		.request_token_endpoint(
			Url::parse("http://127.0.0.1:9/oauth/request_token")
				.expect("Failed to parse request token endpoint fixture."),
		)
		.access_token_endpoint(
			Url::parse("http://127.0.0.1:9/oauth/access_token")
				.expect("Failed to parse access token endpoint fixture."),
		)
		.user_authorization_endpoint(
			Url::parse("http://127.0.0.1:9/oauth/authorize")
				.expect("Failed to parse authorization endpoint fixture."),
		)
		.build()
		.expect("Descriptor fixture should build.")
	}

	#[tokio::test]
	async fn denied_callbacks_fail_without_network_traffic() {
		let verify: Arc<dyn Verify<String>> =
			Arc::new(|_: VerifyInput| async { Ok::<_, BoxError>(Verdict::accept("nobody".to_owned())) });
		let (authenticator, store) =
			build_reqwest_test_authenticator(descriptor(), "key", "secret", verify);
		let request = AuthRequest::new(
			CorrelationId::new("session-1").expect("Correlation identifier should be valid."),
			Url::parse("https://app.example.com/auth/callback?denied=abc")
				.expect("Failed to parse callback URL fixture."),
		);
		let outcome = authenticator
			.authenticate(request, AuthenticateOptions::default())
			.await
			.expect("Denied callbacks should not be fatal.");

		match outcome {
			AuthOutcome::Failure(failure) => assert_eq!(failure.reason, FailureReason::Denied),
			other => panic!("Unexpected outcome: {other:?}."),
		}
		assert!(store.is_empty());
	}

	#[test]
	fn debug_output_hides_consumer_secret() {
		let verify: Arc<dyn Verify<String>> =
			Arc::new(|_: VerifyInput| async { Ok::<_, BoxError>(Verdict::accept("nobody".to_owned())) });
		let (authenticator, _) =
			build_reqwest_test_authenticator(descriptor(), "key", "hunter2", verify);
		let rendered = format!("{authenticator:?}");

		assert!(rendered.contains("key"));
		assert!(!rendered.contains("hunter2"));
	}

	#[tokio::test]
	async fn cancelled_exchanges_release_their_flow_guard() {
		let verify: Arc<dyn Verify<String>> =
			Arc::new(|_: VerifyInput| async { Ok::<_, BoxError>(Verdict::accept("nobody".to_owned())) });
		let correlation =
			CorrelationId::new("session-1").expect("Correlation identifier should be valid.");
		let store = Arc::new(MemoryStore::default());

		store
			.put(RequestToken::new(correlation.clone(), "req-token", "req-secret"))
			.await
			.expect("Seeding the store should succeed.");

		let authenticator = Authenticator::with_http_client::<StalledClient, IoErrorMapper>(
			descriptor(),
			"key",
			"secret",
			verify,
			StalledClient,
			IoErrorMapper,
		)
		.expect("Authenticator with a stalled transport should build.")
		.with_store(store);
		let request = AuthRequest::new(
			correlation,
			Url::parse("https://app.example.com/auth/callback?oauth_token=req-token&oauth_verifier=v")
				.expect("Failed to parse callback URL fixture."),
		);
		let attempt = tokio::time::timeout(
			std::time::Duration::from_millis(50),
			authenticator.authenticate(request, AuthenticateOptions::default()),
		)
		.await;

		assert!(attempt.is_err(), "The stalled exchange should still be pending.");
		assert!(authenticator.flow_guards.lock().is_empty());
	}
}
