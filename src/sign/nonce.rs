//! Nonce and timestamp generation for signed requests.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

const NONCE_LEN: usize = 32;

/// One `oauth_nonce` + `oauth_timestamp` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonceStamp {
	/// Random nonce, unique per request.
	pub nonce: String,
	/// Seconds since the Unix epoch.
	pub timestamp: i64,
}

/// Source of nonce/timestamp pairs; swap in a fixed implementation for deterministic tests.
pub trait NonceGenerator
where
	Self: Send + Sync,
{
	/// Produces a fresh pair for the next outbound request.
	fn next(&self) -> NonceStamp;
}

/// Default generator backed by the thread-local CSPRNG and the system clock.
///
/// Nonces are 32 alphanumeric characters, roughly 190 bits of entropy.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemNonceGenerator;
impl NonceGenerator for SystemNonceGenerator {
	fn next(&self) -> NonceStamp {
		let nonce = rand::rng()
			.sample_iter(Alphanumeric)
			.take(NONCE_LEN)
			.map(char::from)
			.collect::<String>();

		NonceStamp { nonce, timestamp: OffsetDateTime::now_utc().unix_timestamp() }
	}
}

/// Generator that always returns the same pair.
#[derive(Clone, Debug)]
pub struct FixedNonceGenerator(pub NonceStamp);
impl NonceGenerator for FixedNonceGenerator {
	fn next(&self) -> NonceStamp {
		self.0.clone()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashSet;
	// self
	use super::*;

	#[test]
	fn system_nonces_are_long_alphanumeric_and_unique() {
		let generator = SystemNonceGenerator;
		let stamps = (0..256).map(|_| generator.next()).collect::<Vec<_>>();
		let unique = stamps.iter().map(|stamp| stamp.nonce.as_str()).collect::<HashSet<_>>();

		assert_eq!(unique.len(), stamps.len());

		for stamp in &stamps {
			assert_eq!(stamp.nonce.len(), NONCE_LEN);
			assert!(stamp.nonce.chars().all(|c| c.is_ascii_alphanumeric()));
		}
	}

	#[test]
	fn system_timestamps_track_the_clock() {
		let before = OffsetDateTime::now_utc().unix_timestamp();
		let stamp = SystemNonceGenerator.next();
		let after = OffsetDateTime::now_utc().unix_timestamp();

		assert!((before..=after).contains(&stamp.timestamp));
	}

	#[test]
	fn fixed_generator_repeats_its_pair() {
		let generator =
			FixedNonceGenerator(NonceStamp { nonce: "abc".into(), timestamp: 1_700_000_000 });

		assert_eq!(generator.next(), generator.next());
	}
}
