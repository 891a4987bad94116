//! Shared helpers for handshake legs (per-attempt options, callback resolution, guards).

// self
use crate::{
	_prelude::*,
	auth::CorrelationId,
	error::ConfigError,
	flows::AuthRequest,
	store::StoreKey,
};

/// Per-attempt options supplied alongside the inbound request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthenticateOptions {
	/// Callback overriding the descriptor's default for this attempt.
	pub callback_url: Option<String>,
	/// Extra form parameters sent to the request-token endpoint.
	pub extra_params: Vec<(String, String)>,
}
impl AuthenticateOptions {
	/// Overrides the callback URL for this attempt.
	pub fn with_callback_url(mut self, callback: impl Into<String>) -> Self {
		self.callback_url = Some(callback.into());

		self
	}

	/// Appends one extra request-token parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_params.push((key.into(), value.into()));

		self
	}
}

/// Transient state of one redirect round-trip, seeded when the first leg starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandshakeContext {
	/// Correlation key the request token is stored under.
	pub correlation_id: CorrelationId,
	/// Fully resolved callback sent as `oauth_callback` (`oob` when none is configured).
	pub callback_url: String,
	/// Extra request-token parameters for this attempt.
	pub extra_params: Vec<(String, String)>,
}
impl HandshakeContext {
	/// Value sent when no callback is configured (out-of-band verification).
	pub const OUT_OF_BAND: &'static str = "oob";

	/// Builds the context for `request`, resolving relative callbacks against its original
	/// URL.
	pub fn resolve(
		request: &AuthRequest,
		callback: Option<&str>,
		extra_params: Vec<(String, String)>,
		trust_proxy: bool,
	) -> Result<Self> {
		let callback_url = match callback {
			None => Self::OUT_OF_BAND.to_owned(),
			Some(Self::OUT_OF_BAND) => Self::OUT_OF_BAND.to_owned(),
			Some(callback) => match Url::parse(callback) {
				Ok(url) => url.into(),
				Err(url::ParseError::RelativeUrlWithoutBase) => request
					.original_url(trust_proxy)
					.join(callback)
					.map_err(|source| ConfigError::CallbackResolution { source })?
					.into(),
				Err(source) => return Err(ConfigError::CallbackResolution { source }.into()),
			},
		};

		Ok(Self { correlation_id: request.correlation_id.clone(), callback_url, extra_params })
	}
}

/// Per-key singleflight slots shared by clones of one authenticator.
pub(crate) type FlowGuards = Arc<Mutex<HashMap<StoreKey, Arc<AsyncMutex<()>>>>>;

/// Handle on the singleflight slot for one store key.
///
/// The slot leaves the shared map when the last handle drops, including handles owned by a
/// cancelled attempt.
pub(crate) struct FlowGuard {
	guards: FlowGuards,
	key: StoreKey,
	slot: Arc<AsyncMutex<()>>,
}
impl FlowGuard {
	/// Returns (and creates on demand) the slot for `key`.
	pub(crate) fn acquire(guards: &FlowGuards, key: &StoreKey) -> Self {
		let slot =
			guards.lock().entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone();

		Self { guards: guards.clone(), key: key.clone(), slot }
	}

	pub(crate) fn slot(&self) -> &AsyncMutex<()> {
		&self.slot
	}
}
impl Drop for FlowGuard {
	fn drop(&mut self) {
		let mut guards = self.guards.lock();

		// One reference lives in the map, the other is `self.slot`.
		if guards
			.get(&self.key)
			.is_some_and(|entry| Arc::ptr_eq(entry, &self.slot) && Arc::strong_count(entry) == 2)
		{
			guards.remove(&self.key);
		}
	}
}
