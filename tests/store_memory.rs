// std
use std::sync::Arc;
// crates.io
use time::{Duration, OffsetDateTime};
// self
use oauth1_strategy::{
	auth::{CorrelationId, RequestToken},
	store::{MemoryStore, RequestTokenStore, StoreError, StoreKey},
};

fn correlation(value: &str) -> CorrelationId {
	CorrelationId::new(value).expect("Failed to build correlation identifier for store tests.")
}

fn token(session: &str, token: &str, secret: &str) -> RequestToken {
	RequestToken::new(correlation(session), token, secret)
}

#[tokio::test]
async fn put_get_destroy_round_trip() {
	let store = MemoryStore::default();
	let issued = token("sess-1", "req-token", "req-secret");
	let key = StoreKey::from(&issued);

	store.put(issued).await.expect("Saving request token into memory store should succeed.");

	let secret = store.get(&key).await.expect("Stored request token should be retrievable.");

	assert_eq!(secret.expose(), "req-secret");

	store.destroy(&key).await.expect("Destroying a stored token should succeed.");

	assert_eq!(store.get(&key).await, Err(StoreError::TokenNotFound));
	store.destroy(&key).await.expect("Destroying an absent token should be a no-op.");
}

#[tokio::test]
async fn get_without_put_fails_for_any_correlation() {
	let store = MemoryStore::default();

	for session in ["sess-a", "sess-b", "x"] {
		let key = StoreKey::new(correlation(session), "never-issued");

		assert_eq!(store.get(&key).await, Err(StoreError::TokenNotFound));
	}
}

#[tokio::test]
async fn token_and_correlation_must_both_match() {
	let store = MemoryStore::default();

	store
		.put(token("sess-1", "req-token", "req-secret"))
		.await
		.expect("Saving request token into memory store should succeed.");

	let wrong_token = StoreKey::new(correlation("sess-1"), "other-token");
	let wrong_session = StoreKey::new(correlation("sess-2"), "req-token");

	assert_eq!(store.get(&wrong_token).await, Err(StoreError::TokenNotFound));
	assert_eq!(store.get(&wrong_session).await, Err(StoreError::TokenNotFound));

	store.destroy(&wrong_token).await.expect("Mismatched destroy should be a no-op.");

	assert_eq!(store.len(), 1, "A mismatched destroy must leave the stored token intact.");
}

#[tokio::test]
async fn new_put_replaces_previous_token_for_the_same_correlation() {
	let store = MemoryStore::default();
	let first = token("sess-1", "first", "first-secret");
	let second = token("sess-1", "second", "second-secret");
	let first_key = StoreKey::from(&first);
	let second_key = StoreKey::from(&second);

	store.put(first).await.expect("First put should succeed.");
	store.put(second).await.expect("Second put should succeed.");

	assert_eq!(store.len(), 1);
	assert_eq!(store.get(&first_key).await, Err(StoreError::TokenNotFound));
	assert_eq!(
		store.get(&second_key).await.expect("Latest token should be stored.").expose(),
		"second-secret"
	);
}

#[tokio::test]
async fn expired_tokens_are_not_found_and_purged() {
	let store = MemoryStore::default().with_ttl(Duration::minutes(10));
	let stale = token("sess-old", "old", "old-secret")
		.with_issued_at(OffsetDateTime::now_utc() - Duration::minutes(11));
	let fresh = token("sess-new", "new", "new-secret");
	let stale_key = StoreKey::from(&stale);

	store.put(fresh).await.expect("Fresh put should succeed.");
	store.put(stale).await.expect("Stale put should succeed.");

	assert_eq!(store.purge_expired(OffsetDateTime::now_utc()), 1);
	assert_eq!(store.len(), 1);
	assert_eq!(store.get(&stale_key).await, Err(StoreError::TokenNotFound));

	let zero_ttl = MemoryStore::default().with_ttl(Duration::ZERO);
	let instant = token("sess-1", "t", "s");
	let instant_key = StoreKey::from(&instant);

	zero_ttl.put(instant).await.expect("Put should succeed.");

	assert_eq!(zero_ttl.get(&instant_key).await, Err(StoreError::TokenNotFound));
	assert!(zero_ttl.is_empty(), "Expired entries are dropped on lookup.");
}

#[tokio::test]
async fn puts_sweep_abandoned_tokens() {
	let store = MemoryStore::default().with_ttl(Duration::ZERO);

	for session in ["sess-1", "sess-2", "sess-3"] {
		store.put(token(session, "req-token", "req-secret")).await.expect("Put should succeed.");
	}

	assert_eq!(store.len(), 1, "Only the entry written last should survive the sweep.");

	let store = MemoryStore::default();

	for session in ["sess-1", "sess-2", "sess-3"] {
		store.put(token(session, "req-token", "req-secret")).await.expect("Put should succeed.");
	}

	assert_eq!(store.len(), 3, "Live entries must not be swept.");
}

#[tokio::test]
async fn concurrent_takes_consume_a_token_once() {
	let store = Arc::new(MemoryStore::default());
	let issued = token("sess-1", "req-token", "req-secret");
	let key = StoreKey::from(&issued);

	store.put(issued).await.expect("Saving request token into memory store should succeed.");

	let handles = (0..16)
		.map(|_| {
			let store = store.clone();
			let key = key.clone();

			tokio::spawn(async move { store.take(&key).await })
		})
		.collect::<Vec<_>>();
	let mut successes = 0;

	for handle in handles {
		match handle.await.expect("Take task should not panic.") {
			Ok(secret) => {
				assert_eq!(secret.expose(), "req-secret");

				successes += 1;
			},
			Err(err) => assert_eq!(err, StoreError::TokenNotFound),
		}
	}

	assert_eq!(successes, 1);
}

#[tokio::test]
async fn independent_correlations_do_not_interfere() {
	let store = Arc::new(MemoryStore::default());
	let handles = (0..32)
		.map(|i| {
			let store = store.clone();

			tokio::spawn(async move {
				let issued = token(&format!("sess-{i}"), &format!("tok-{i}"), &format!("sec-{i}"));
				let key = StoreKey::from(&issued);

				store.put(issued).await?;

				let secret = store.get(&key).await?;

				store.destroy(&key).await?;

				Ok::<_, StoreError>(secret.expose() == format!("sec-{i}"))
			})
		})
		.collect::<Vec<_>>();

	for handle in handles {
		assert!(
			handle
				.await
				.expect("Store task should not panic.")
				.expect("Store operations should succeed.")
		);
	}

	assert!(store.is_empty());
}
