//! OAuth 1.0a three-legged authentication strategy: request-token issuance, user redirection,
//! signed access-token exchanges, and identity resolution behind pluggable stores and provider
//! hooks.
//!
//! [`flows::Authenticator`] drives the handshake. Signing lives in [`sign`], request token
//! persistence in [`store`], provider customization in [`provider`], and the transport
//! boundary in [`http`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod ext;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod sign;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::{Authenticator, Verify},
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::ProviderDescriptor,
		store::{MemoryStore, RequestTokenStore},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.timeout(ReqwestHttpClient::DEFAULT_TIMEOUT.unsigned_abs())
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`Authenticator`] backed by an in-memory store and the reqwest transport
	/// used across tests.
	pub fn build_reqwest_test_authenticator<P>(
		descriptor: ProviderDescriptor,
		consumer_key: &str,
		consumer_secret: &str,
		verify: Arc<dyn Verify<P>>,
	) -> (Authenticator<P>, Arc<MemoryStore>)
	where
		P: 'static + Send,
	{
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn RequestTokenStore> = store_backend.clone();
		let authenticator =
			Authenticator::with_http_client::<ReqwestHttpClient, ReqwestTransportErrorMapper>(
				descriptor,
				consumer_key,
				consumer_secret,
				verify,
				test_reqwest_http_client(),
				Arc::new(ReqwestTransportErrorMapper),
			)
			.expect("Failed to build authenticator for tests.")
			.with_store(store);

		(authenticator, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
