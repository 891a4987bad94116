//! Strategy configuration: the serde-deserializable option surface and the runtime settings
//! derived from it.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, TokenSecret},
	error::ConfigError,
	provider::{ProviderDescriptor, ProviderQuirks},
	sign::SignatureMethod,
	store::SessionStore,
};

/// Runtime knobs that shape one authenticator's behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrategySettings {
	/// Hands the inbound request to the verify callback.
	pub pass_req_to_callback: bool,
	/// Trusts `X-Forwarded-Proto`/`X-Forwarded-Host` when resolving relative callbacks.
	pub proxy: bool,
	/// Skips profile retrieval and hands the empty profile to the verify callback.
	pub skip_user_profile: bool,
	/// Substitutes the empty profile when profile retrieval fails.
	pub profile_optional: bool,
	/// Namespace key for session-backed request token stores.
	pub session_key: String,
	/// Upper bound for every outbound provider call.
	pub http_timeout: Duration,
	/// Upper bound for the verify callback.
	pub verify_timeout: Duration,
}
impl StrategySettings {
	/// Default bound for outbound provider calls.
	pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::seconds(10);
	/// Default bound for the verify callback.
	pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::seconds(30);

	/// Toggles passing the inbound request to the verify callback.
	pub fn with_pass_req_to_callback(mut self, enabled: bool) -> Self {
		self.pass_req_to_callback = enabled;

		self
	}

	/// Toggles trusting proxy headers.
	pub fn with_proxy(mut self, enabled: bool) -> Self {
		self.proxy = enabled;

		self
	}

	/// Toggles profile retrieval.
	pub fn with_skip_user_profile(mut self, enabled: bool) -> Self {
		self.skip_user_profile = enabled;

		self
	}

	/// Toggles tolerating profile retrieval failures.
	pub fn with_profile_optional(mut self, enabled: bool) -> Self {
		self.profile_optional = enabled;

		self
	}

	/// Overrides the session namespace key.
	pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
		self.session_key = key.into();

		self
	}

	/// Overrides the outbound call bound; negative values clamp to zero.
	pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
		self.http_timeout = timeout.max(Duration::ZERO);

		self
	}

	/// Overrides the verify callback bound; negative values clamp to zero.
	pub fn with_verify_timeout(mut self, timeout: Duration) -> Self {
		self.verify_timeout = timeout.max(Duration::ZERO);

		self
	}
}
impl Default for StrategySettings {
	fn default() -> Self {
		Self {
			pass_req_to_callback: false,
			proxy: false,
			skip_user_profile: false,
			profile_optional: false,
			session_key: SessionStore::DEFAULT_KEY.into(),
			http_timeout: Self::DEFAULT_HTTP_TIMEOUT,
			verify_timeout: Self::DEFAULT_VERIFY_TIMEOUT,
		}
	}
}

/// Declarative option set accepted by [`Authenticator::from_options`](crate::flows::Authenticator::from_options).
///
/// Field names deserialize in snake case, and the camel-case spellings used by web
/// frameworks (`requestTokenURL`, `consumerKey`, `passReqToCallback`, ...) are accepted as
/// aliases. Timeouts are expressed in milliseconds.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyOptions {
	/// Provider identifier; defaults to `oauth`.
	pub name: Option<String>,
	/// Request token endpoint.
	#[serde(alias = "requestTokenURL", alias = "requestTokenUrl")]
	pub request_token_url: Option<String>,
	/// Access token endpoint.
	#[serde(alias = "accessTokenURL", alias = "accessTokenUrl")]
	pub access_token_url: Option<String>,
	/// User authorization page.
	#[serde(alias = "userAuthorizationURL", alias = "userAuthorizationUrl")]
	pub user_authorization_url: Option<String>,
	/// Consumer key.
	#[serde(alias = "consumerKey")]
	pub consumer_key: Option<String>,
	/// Consumer secret, or a PEM private key for RSA-SHA1.
	#[serde(alias = "consumerSecret")]
	pub consumer_secret: Option<TokenSecret>,
	/// Signature method; HMAC-SHA1 when absent.
	#[serde(alias = "signatureMethod")]
	pub signature_method: Option<SignatureMethod>,
	/// Default callback URL; absolute, or a path resolved per request.
	#[serde(alias = "callbackURL", alias = "callbackUrl")]
	pub callback_url: Option<String>,
	/// See [`StrategySettings::pass_req_to_callback`].
	#[serde(alias = "passReqToCallback")]
	pub pass_req_to_callback: bool,
	/// See [`StrategySettings::session_key`].
	#[serde(alias = "sessionKey")]
	pub session_key: Option<String>,
	/// See [`StrategySettings::proxy`].
	pub proxy: bool,
	/// See [`StrategySettings::skip_user_profile`].
	#[serde(alias = "skipUserProfile")]
	pub skip_user_profile: bool,
	/// See [`StrategySettings::profile_optional`].
	#[serde(alias = "profileOptional")]
	pub profile_optional: bool,
	/// See [`ProviderQuirks::verifier_param`].
	#[serde(alias = "verifierParam")]
	pub verifier_param: Option<String>,
	/// See [`ProviderQuirks::require_callback_confirmed`].
	#[serde(alias = "requireCallbackConfirmed")]
	pub require_callback_confirmed: bool,
	/// Outbound call bound in milliseconds.
	#[serde(alias = "httpTimeout")]
	pub http_timeout: Option<u64>,
	/// Verify callback bound in milliseconds.
	#[serde(alias = "verifyTimeout")]
	pub verify_timeout: Option<u64>,
}
impl StrategyOptions {
	/// Provider identifier used when `name` is absent.
	pub const DEFAULT_NAME: &'static str = "oauth";

	/// Decodes options from JSON, reporting the path of the offending field on failure.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let deserializer = &mut serde_json::Deserializer::from_str(json);

		serde_path_to_error::deserialize(deserializer)
			.map_err(|source| ConfigError::InvalidOptions { source })
	}

	/// Validates the options and splits them into their runtime parts.
	pub fn resolve(self) -> Result<ResolvedOptions, ConfigError> {
		let id = ProviderId::new(self.name.as_deref().unwrap_or(Self::DEFAULT_NAME))?;
		let request_token = required_url("request_token_url", self.request_token_url)?;
		let access_token = required_url("access_token_url", self.access_token_url)?;
		let user_authorization = required_url("user_authorization_url", self.user_authorization_url)?;
		let consumer_key = self
			.consumer_key
			.filter(|key| !key.is_empty())
			.ok_or(ConfigError::MissingOption { option: "consumer_key" })?;
		let consumer_secret = self
			.consumer_secret
			.ok_or(ConfigError::MissingOption { option: "consumer_secret" })?;
		let mut quirks = ProviderQuirks {
			require_callback_confirmed: self.require_callback_confirmed,
			..Default::default()
		};

		if let Some(param) = self.verifier_param {
			quirks.verifier_param = param;
		}

		let mut builder = ProviderDescriptor::builder(id)
			.request_token_endpoint(request_token)
			.access_token_endpoint(access_token)
			.user_authorization_endpoint(user_authorization)
			.signature_method(self.signature_method.unwrap_or_default())
			.quirks(quirks);

		if let Some(callback) = self.callback_url {
			builder = builder.callback_url(callback);
		}

		let descriptor = builder.build()?;
		let mut settings = StrategySettings::default()
			.with_pass_req_to_callback(self.pass_req_to_callback)
			.with_proxy(self.proxy)
			.with_skip_user_profile(self.skip_user_profile)
			.with_profile_optional(self.profile_optional);

		if let Some(key) = self.session_key {
			settings = settings.with_session_key(key);
		}
		if let Some(ms) = self.http_timeout {
			settings = settings.with_http_timeout(millis(ms));
		}
		if let Some(ms) = self.verify_timeout {
			settings = settings.with_verify_timeout(millis(ms));
		}

		Ok(ResolvedOptions { descriptor, settings, consumer_key, consumer_secret })
	}
}
impl Debug for StrategyOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyOptions")
			.field("name", &self.name)
			.field("request_token_url", &self.request_token_url)
			.field("access_token_url", &self.access_token_url)
			.field("user_authorization_url", &self.user_authorization_url)
			.field("consumer_key", &self.consumer_key)
			.field("consumer_secret_set", &self.consumer_secret.is_some())
			.field("signature_method", &self.signature_method)
			.field("callback_url", &self.callback_url)
			.finish_non_exhaustive()
	}
}

/// Validated pieces produced by [`StrategyOptions::resolve`].
#[derive(Clone, Debug)]
pub struct ResolvedOptions {
	/// Provider endpoints, signature method, and quirks.
	pub descriptor: ProviderDescriptor,
	/// Runtime settings.
	pub settings: StrategySettings,
	/// Consumer key.
	pub consumer_key: String,
	/// Consumer secret or PEM private key.
	pub consumer_secret: TokenSecret,
}

fn required_url(option: &'static str, value: Option<String>) -> Result<Url, ConfigError> {
	let raw = value.filter(|raw| !raw.is_empty()).ok_or(ConfigError::MissingOption { option })?;

	Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { option, source })
}

fn millis(ms: u64) -> Duration {
	Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::ProviderDescriptorError;

	const CAMEL: &str = r#"{
		"requestTokenURL": "https://api.example.com/oauth/request_token",
		"accessTokenURL": "https://api.example.com/oauth/access_token",
		"userAuthorizationURL": "https://api.example.com/oauth/authorize",
		"consumerKey": "key",
		"consumerSecret": "secret",
		"callbackURL": "/auth/example/callback",
		"passReqToCallback": true,
		"sessionKey": "oauth:example",
		"skipUserProfile": true,
		"httpTimeout": 2500
	}"#;

	#[test]
	fn camel_case_options_resolve() {
		let resolved = StrategyOptions::from_json(CAMEL)
			.expect("Options should decode.")
			.resolve()
			.expect("Options should resolve.");

		assert_eq!(resolved.descriptor.id.as_ref(), "oauth");
		assert_eq!(resolved.descriptor.signature_method, SignatureMethod::HmacSha1);
		assert_eq!(resolved.descriptor.callback_url.as_deref(), Some("/auth/example/callback"));
		assert_eq!(resolved.descriptor.quirks.verifier_param, "oauth_verifier");
		assert_eq!(resolved.consumer_key, "key");
		assert_eq!(resolved.consumer_secret.expose(), "secret");
		assert!(resolved.settings.pass_req_to_callback);
		assert!(resolved.settings.skip_user_profile);
		assert_eq!(resolved.settings.session_key, "oauth:example");
		assert_eq!(resolved.settings.http_timeout, Duration::milliseconds(2500));
		assert_eq!(resolved.settings.verify_timeout, StrategySettings::DEFAULT_VERIFY_TIMEOUT);
	}

	#[test]
	fn missing_and_malformed_options_are_reported() {
		let err = StrategyOptions::default().resolve().expect_err("Empty options should fail.");

		assert!(matches!(err, ConfigError::MissingOption { option: "request_token_url" }));

		let options = StrategyOptions {
			request_token_url: Some("not a url".into()),
			..Default::default()
		};
		let err = options.resolve().expect_err("Malformed URL should fail.");

		assert!(matches!(err, ConfigError::InvalidUrl { option: "request_token_url", .. }));

		let options = StrategyOptions {
			request_token_url: Some("ftp://api.example.com/request_token".into()),
			access_token_url: Some("https://api.example.com/access_token".into()),
			user_authorization_url: Some("https://api.example.com/authorize".into()),
			consumer_key: Some("key".into()),
			consumer_secret: Some("secret".into()),
			..Default::default()
		};
		let err = options.resolve().expect_err("Non-HTTP endpoint should fail.");

		assert!(matches!(
			err,
			ConfigError::InvalidDescriptor(ProviderDescriptorError::UnsupportedScheme { .. })
		));
	}

	#[test]
	fn unknown_signature_methods_fail_with_a_path() {
		let err = StrategyOptions::from_json(r#"{"signatureMethod":"MD5"}"#)
			.expect_err("Unsupported method should fail to decode.");

		match err {
			ConfigError::InvalidOptions { source } =>
				assert_eq!(source.path().to_string(), "signatureMethod"),
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn debug_output_hides_the_consumer_secret() {
		let options =
			StrategyOptions { consumer_secret: Some("hunter2".into()), ..Default::default() };

		assert!(!format!("{options:?}").contains("hunter2"));
	}
}
