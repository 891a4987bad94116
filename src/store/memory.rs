//! Thread-safe in-memory [`RequestTokenStore`] shared across requests.

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, RequestToken, TokenSecret},
	store::{RequestTokenStore, StoreError, StoreFuture, StoreKey},
};

type TokenMap = Arc<RwLock<HashMap<CorrelationId, RequestToken>>>;

/// Shared cache keyed by correlation id.
///
/// Entries older than the TTL are treated as absent; every `put` sweeps them out, so abandoned
/// handshakes do not accumulate. [`take`] removes the entry under a single write lock, so a
/// token can be consumed at most once.
///
/// [`take`]: RequestTokenStore::take
#[derive(Clone, Debug)]
pub struct MemoryStore {
	tokens: TokenMap,
	ttl: Duration,
}
impl MemoryStore {
	/// Default lifetime of an unauthorized request token.
	pub const DEFAULT_TTL: Duration = Duration::minutes(10);

	/// Creates an empty store with [`Self::DEFAULT_TTL`].
	pub fn new() -> Self {
		Self { tokens: Default::default(), ttl: Self::DEFAULT_TTL }
	}

	/// Overrides the token lifetime.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;

		self
	}

	/// Number of entries currently held, expired ones included.
	pub fn len(&self) -> usize {
		self.tokens.read().len()
	}

	/// Returns `true` when no entries are held.
	pub fn is_empty(&self) -> bool {
		self.tokens.read().is_empty()
	}

	/// Drops every entry that expired before `instant`, returning how many were removed.
	pub fn purge_expired(&self, instant: OffsetDateTime) -> usize {
		let mut guard = self.tokens.write();
		let before = guard.len();

		guard.retain(|_, token| !token.is_expired_at(self.ttl, instant));

		before - guard.len()
	}

	fn lookup(&self, key: &StoreKey, consume: bool) -> Result<TokenSecret, StoreError> {
		let now = OffsetDateTime::now_utc();
		let mut guard = self.tokens.write();
		let live = match guard.get(&key.correlation_id) {
			Some(stored) if stored.is_expired_at(self.ttl, now) => {
				guard.remove(&key.correlation_id);

				return Err(StoreError::TokenNotFound);
			},
			Some(stored) => stored.token == key.token,
			None => false,
		};

		if !live {
			return Err(StoreError::TokenNotFound);
		}
		if consume {
			return guard
				.remove(&key.correlation_id)
				.map(|token| token.token_secret)
				.ok_or(StoreError::TokenNotFound);
		}

		guard
			.get(&key.correlation_id)
			.map(|token| token.token_secret.clone())
			.ok_or(StoreError::TokenNotFound)
	}

	fn destroy_now(&self, key: &StoreKey) {
		let mut guard = self.tokens.write();

		if guard.get(&key.correlation_id).is_some_and(|stored| stored.token == key.token) {
			guard.remove(&key.correlation_id);
		}
	}
}
impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}
impl RequestTokenStore for MemoryStore {
	fn put(&self, token: RequestToken) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();
			let mut guard = self.tokens.write();

			guard.retain(|_, stored| !stored.is_expired_at(self.ttl, now));
			guard.insert(token.correlation_id.clone(), token);

			Ok(())
		})
	}

	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, TokenSecret> {
		Box::pin(async move { self.lookup(key, false) })
	}

	fn destroy<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.destroy_now(key);

			Ok(())
		})
	}

	fn take<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, TokenSecret> {
		Box::pin(async move { self.lookup(key, true) })
	}
}
