//! Session-backed [`RequestTokenStore`] scoped by a namespace key.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, RequestToken, TokenSecret},
	store::{RequestTokenStore, StoreError, StoreFuture, StoreKey},
};

/// Mutable view of one session's data.
pub type SessionData = serde_json::Map<String, serde_json::Value>;

/// Mutation applied to a session inside the backend's critical section.
pub type SessionUpdate = Box<dyn FnOnce(&mut SessionData) -> Result<(), StoreError> + Send>;

/// Adapter over the application's session mechanism.
///
/// Sessions are addressed by the correlation id of the authentication attempt, which is
/// normally the session id itself.
pub trait SessionBackend
where
	Self: Send + Sync,
{
	/// Loads a snapshot of the session, or `None` when it does not exist.
	fn load<'a>(&'a self, session_id: &'a CorrelationId) -> StoreFuture<'a, Option<SessionData>>;

	/// Applies `update` to the session, creating it when absent.
	fn modify<'a>(
		&'a self,
		session_id: &'a CorrelationId,
		update: SessionUpdate,
	) -> StoreFuture<'a, ()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionEntry {
	oauth_token: String,
	oauth_token_secret: String,
	issued_at: i64,
}
impl SessionEntry {
	fn parse(raw: &serde_json::Value) -> Result<Self, StoreError> {
		Self::deserialize(raw).map_err(|e| StoreError::Serialization { message: e.to_string() })
	}

	fn is_expired_at(&self, ttl: Duration, instant: OffsetDateTime) -> bool {
		instant.unix_timestamp() - self.issued_at >= ttl.whole_seconds()
	}
}

/// Keeps the unauthorized request token in the caller's session under `key`.
///
/// The entry holds `oauth_token`, `oauth_token_secret`, and `issued_at`. Entries older than
/// the TTL read as absent and are removed on lookup; destroying the token removes the whole
/// namespace entry. [`take`] runs inside one [`SessionBackend::modify`] call, so it is as
/// atomic as the backend's critical section.
///
/// [`take`]: RequestTokenStore::take
#[derive(Clone)]
pub struct SessionStore {
	backend: Arc<dyn SessionBackend>,
	key: String,
	ttl: Duration,
}
impl SessionStore {
	/// Namespace used when no session key is configured.
	pub const DEFAULT_KEY: &'static str = "oauth";
	/// Default lifetime of an unauthorized request token.
	pub const DEFAULT_TTL: Duration = Duration::minutes(10);

	/// Wraps `backend` using [`Self::DEFAULT_KEY`] and [`Self::DEFAULT_TTL`].
	pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
		Self { backend, key: Self::DEFAULT_KEY.into(), ttl: Self::DEFAULT_TTL }
	}

	/// Overrides the namespace key.
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = key.into();

		self
	}

	/// Overrides the token lifetime.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;

		self
	}

	/// Returns the namespace key.
	pub fn key(&self) -> &str {
		&self.key
	}
}
impl Debug for SessionStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionStore")
			.field("key", &self.key)
			.field("ttl", &self.ttl)
			.finish_non_exhaustive()
	}
}
impl RequestTokenStore for SessionStore {
	fn put(&self, token: RequestToken) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let entry = SessionEntry {
				oauth_token: token.token,
				oauth_token_secret: token.token_secret.expose().to_owned(),
				issued_at: token.issued_at.unix_timestamp(),
			};
			let value = serde_json::to_value(entry)
				.map_err(|e| StoreError::Serialization { message: e.to_string() })?;
			let key = self.key.clone();

			self.backend
				.modify(
					&token.correlation_id,
					Box::new(move |data| {
						data.insert(key, value);

						Ok(())
					}),
				)
				.await
		})
	}

	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, TokenSecret> {
		Box::pin(async move {
			let data =
				self.backend.load(&key.correlation_id).await?.ok_or(StoreError::TokenNotFound)?;
			let Some(raw) = data.get(&self.key) else {
				return Err(StoreError::TokenNotFound);
			};
			let entry = SessionEntry::parse(raw)?;

			if entry.oauth_token != key.token {
				return Err(StoreError::TokenNotFound);
			}
			if entry.is_expired_at(self.ttl, OffsetDateTime::now_utc()) {
				self.destroy(key).await?;

				return Err(StoreError::TokenNotFound);
			}

			Ok(TokenSecret::new(entry.oauth_token_secret))
		})
	}

	fn destroy<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let namespace = self.key.clone();
			let token = key.token.clone();

			self.backend
				.modify(
					&key.correlation_id,
					Box::new(move |data| {
						let matches = data
							.get(&namespace)
							.and_then(|entry| entry.get("oauth_token"))
							.and_then(serde_json::Value::as_str)
							.is_some_and(|stored| stored == token);

						if matches {
							data.remove(&namespace);
						}

						Ok(())
					}),
				)
				.await
		})
	}

	fn take<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, TokenSecret> {
		Box::pin(async move {
			let namespace = self.key.clone();
			let token = key.token.clone();
			let ttl = self.ttl;
			let now = OffsetDateTime::now_utc();
			let claimed = Arc::new(Mutex::new(None));
			let slot = claimed.clone();

			self.backend
				.modify(
					&key.correlation_id,
					Box::new(move |data| {
						let Some(raw) = data.get(&namespace) else {
							return Err(StoreError::TokenNotFound);
						};
						let entry = SessionEntry::parse(raw)?;

						if entry.oauth_token != token {
							return Err(StoreError::TokenNotFound);
						}

						data.remove(&namespace);

						if entry.is_expired_at(ttl, now) {
							return Err(StoreError::TokenNotFound);
						}

						*slot.lock() = Some(TokenSecret::new(entry.oauth_token_secret));

						Ok(())
					}),
				)
				.await?;

			claimed.lock().take().ok_or(StoreError::TokenNotFound)
		})
	}
}

/// In-process [`SessionBackend`] for tests and single-node deployments.
#[derive(Clone, Debug, Default)]
pub struct MemorySessions(Arc<RwLock<HashMap<CorrelationId, SessionData>>>);
impl MemorySessions {
	/// Returns a snapshot of one session.
	pub fn session(&self, session_id: &CorrelationId) -> Option<SessionData> {
		self.0.read().get(session_id).cloned()
	}

	/// Number of sessions currently held.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no session is held.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl SessionBackend for MemorySessions {
	fn load<'a>(&'a self, session_id: &'a CorrelationId) -> StoreFuture<'a, Option<SessionData>> {
		Box::pin(async move { Ok(self.session(session_id)) })
	}

	fn modify<'a>(
		&'a self,
		session_id: &'a CorrelationId,
		update: SessionUpdate,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.0.write();
			let session = guard.entry(session_id.clone()).or_default();
			let result = update(session);

			if session.is_empty() {
				guard.remove(session_id);
			}

			result
		})
	}
}
