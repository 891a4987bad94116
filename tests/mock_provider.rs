// crates.io
use url::Url;
// self
use oauth1_strategy::{
	auth::ProviderId,
	provider::{
		DefaultProviderStrategy, JsonErrorStrategy, ProviderDescriptor, ProviderDescriptorBuilder,
		ProviderDescriptorError, ProviderQuirks, ProviderStrategy,
	},
	sign::SignatureMethod,
};

fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse mock provider URL.")
}

fn builder(id: &str) -> ProviderDescriptorBuilder {
	let provider_id =
		ProviderId::new(id).expect("Failed to build provider identifier for mock descriptor.");

	ProviderDescriptor::builder(provider_id)
}

fn complete(id: &str) -> ProviderDescriptorBuilder {
	builder(id)
		.request_token_endpoint(url("https://api.example.com/oauth/request_token"))
		.access_token_endpoint(url("https://api.example.com/oauth/access_token"))
		.user_authorization_endpoint(url("https://api.example.com/oauth/authorize"))
}

#[test]
fn descriptor_requires_every_endpoint() {
	let err = builder("mock")
		.access_token_endpoint(url("https://api.example.com/oauth/access_token"))
		.user_authorization_endpoint(url("https://api.example.com/oauth/authorize"))
		.build()
		.expect_err("Descriptor builder should reject a missing request token endpoint.");

	assert_eq!(err, ProviderDescriptorError::MissingRequestTokenEndpoint);

	let err = builder("mock")
		.request_token_endpoint(url("https://api.example.com/oauth/request_token"))
		.user_authorization_endpoint(url("https://api.example.com/oauth/authorize"))
		.build()
		.expect_err("Descriptor builder should reject a missing access token endpoint.");

	assert_eq!(err, ProviderDescriptorError::MissingAccessTokenEndpoint);

	let err = builder("mock")
		.request_token_endpoint(url("https://api.example.com/oauth/request_token"))
		.access_token_endpoint(url("https://api.example.com/oauth/access_token"))
		.build()
		.expect_err("Descriptor builder should reject a missing authorization endpoint.");

	assert_eq!(err, ProviderDescriptorError::MissingUserAuthorizationEndpoint);
}

#[test]
fn descriptor_defaults_follow_oauth_1_0a() {
	let descriptor = complete("defaults").build().expect("Complete descriptor should build.");

	assert_eq!(descriptor.signature_method, SignatureMethod::HmacSha1);
	assert_eq!(descriptor.callback_url, None);
	assert_eq!(descriptor.quirks, ProviderQuirks::default());
	assert_eq!(descriptor.quirks.verifier_param, "oauth_verifier");
	assert_eq!(descriptor.quirks.denied_param, "denied");
	assert!(!descriptor.quirks.require_callback_confirmed);
}

#[test]
fn descriptor_rejects_non_http_endpoints() {
	let err = complete("mock")
		.user_authorization_endpoint(url("javascript:alert(1)"))
		.build()
		.expect_err("Descriptor builder should reject non-HTTP endpoints.");

	assert!(matches!(
		err,
		ProviderDescriptorError::UnsupportedScheme { endpoint: "user authorization", .. }
	));
}

#[test]
fn descriptor_validates_callbacks() {
	for callback in ["oob", "/auth/example/callback", "https://app.example.com/cb"] {
		complete("callbacks")
			.callback_url(callback)
			.build()
			.unwrap_or_else(|e| panic!("Callback `{callback}` should be accepted: {e}."));
	}
	for callback in ["auth/callback", "//evil.example.com/cb", "ftp://app.example.com/cb"] {
		let err = complete("callbacks")
			.callback_url(callback)
			.build()
			.expect_err("Invalid callbacks should be rejected.");

		assert_eq!(err, ProviderDescriptorError::InvalidCallback { callback: callback.into() });
	}
}

#[test]
fn descriptor_rejects_empty_quirk_parameters() {
	let err = complete("quirks")
		.quirks(ProviderQuirks { verifier_param: String::new(), ..Default::default() })
		.build()
		.expect_err("Empty verifier parameter should be rejected.");

	assert_eq!(err, ProviderDescriptorError::EmptyParameterName { quirk: "verifier_param" });
}

#[test]
fn descriptor_serde_round_trip_keeps_quirks() {
	let descriptor = complete("serde")
		.signature_method(SignatureMethod::RsaSha1)
		.callback_url("/cb")
		.quirks(ProviderQuirks { require_callback_confirmed: true, ..Default::default() })
		.build()
		.expect("Descriptor should build.");
	let json = serde_json::to_string(&descriptor).expect("Descriptor should serialize.");

	assert!(json.contains("\"RSA-SHA1\""));

	let decoded: ProviderDescriptor =
		serde_json::from_str(&json).expect("Descriptor should deserialize.");

	assert_eq!(decoded, descriptor);
}

#[test]
fn error_parsers_fall_back_to_none() {
	let body = r#"{"error":"invalid_signature"}"#;
	let parsed = JsonErrorStrategy
		.parse_error_response(body, 401)
		.expect("JSON-aware strategy should parse the error.");

	assert!(parsed.message.contains("invalid_signature"));
	assert_eq!(parsed.status, 401);
	assert!(DefaultProviderStrategy.parse_error_response(body, 401).is_none());
	assert!(JsonErrorStrategy.parse_error_response("<html>oops</html>", 500).is_none());
}
