//! Request token storage contracts and built-in implementations.
//!
//! The handshake engine only talks to [`RequestTokenStore`]. [`SessionStore`] keeps the
//! unauthorized token inside the caller's session so no shared server-side state is needed;
//! [`MemoryStore`] is a shared in-process cache with a TTL and atomic consume-on-read.

pub mod memory;
pub mod session;

pub use memory::MemoryStore;
pub use session::{MemorySessions, SessionBackend, SessionData, SessionStore, SessionUpdate};

// self
use crate::{
	_prelude::*,
	auth::{CorrelationId, RequestToken, TokenSecret},
};

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage contract for request tokens awaiting user authorization.
///
/// Implementations must keep operations on different correlation ids independent. At most one
/// unauthorized token exists per correlation id; `put` replaces any previous entry.
pub trait RequestTokenStore
where
	Self: Send + Sync,
{
	/// Persists `token` under its correlation id.
	fn put(&self, token: RequestToken) -> StoreFuture<'_, ()>;

	/// Returns the secret stored for `key`.
	///
	/// Fails with [`StoreError::TokenNotFound`] when the token was never stored, was destroyed,
	/// expired, or belongs to another correlation id.
	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, TokenSecret>;

	/// Removes the token stored for `key`. Removing an absent token is not an error.
	fn destroy<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, ()>;

	/// Returns and removes the secret stored for `key`.
	///
	/// The default composes [`get`](Self::get) and [`destroy`](Self::destroy); backends with an
	/// atomic delete-on-read should override it.
	fn take<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, TokenSecret> {
		Box::pin(async move {
			let secret = self.get(key).await?;

			self.destroy(key).await?;

			Ok(secret)
		})
	}
}

/// Error type produced by [`RequestTokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// No matching request token is stored.
	#[error("Request token was not found in the store.")]
	TokenNotFound,
	/// The backend rejected a write.
	#[error("Store write failed: {message}.")]
	Write {
		/// Human-readable error payload.
		message: String,
	},
	/// Stored data could not be encoded or decoded.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Lookup key for a stored request token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Attempt the token was issued for.
	pub correlation_id: CorrelationId,
	/// Value of `oauth_token` returned by the provider.
	pub token: String,
}
impl StoreKey {
	/// Builds a key from its parts.
	pub fn new(correlation_id: CorrelationId, token: impl Into<String>) -> Self {
		Self { correlation_id, token: token.into() }
	}
}
impl From<&RequestToken> for StoreKey {
	fn from(token: &RequestToken) -> Self {
		Self::new(token.correlation_id.clone(), token.token.clone())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Default)]
	struct CountingStore {
		inner: MemoryStore,
		destroys: Mutex<usize>,
	}
	impl RequestTokenStore for CountingStore {
		fn put(&self, token: RequestToken) -> StoreFuture<'_, ()> {
			self.inner.put(token)
		}

		fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, TokenSecret> {
			self.inner.get(key)
		}

		fn destroy<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, ()> {
			*self.destroys.lock() += 1;

			self.inner.destroy(key)
		}
	}

	#[tokio::test]
	async fn default_take_composes_get_and_destroy() {
		let store = CountingStore::default();
		let token = RequestToken::new(
			CorrelationId::new("sess-1").expect("Correlation fixture should be valid."),
			"token-1",
			"secret-1",
		);
		let key = StoreKey::from(&token);

		store.put(token).await.expect("Put should succeed.");

		let secret = store.take(&key).await.expect("First take should return the secret.");

		assert_eq!(secret.expose(), "secret-1");
		assert_eq!(*store.destroys.lock(), 1);
		assert_eq!(store.take(&key).await, Err(StoreError::TokenNotFound));
		assert_eq!(*store.destroys.lock(), 1, "A failed lookup must not reach destroy.");
	}

	#[test]
	fn store_error_messages_carry_payload() {
		let error = StoreError::Write { message: "session locked".into() };

		assert_eq!(error.to_string(), "Store write failed: session locked.");
	}
}
