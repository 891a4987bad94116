// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{ProviderDescriptor, ProviderEndpoints, ProviderQuirks},
	sign::SignatureMethod,
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// The request token endpoint is mandatory.
	#[error("Missing request token endpoint.")]
	MissingRequestTokenEndpoint,
	/// The access token endpoint is mandatory.
	#[error("Missing access token endpoint.")]
	MissingAccessTokenEndpoint,
	/// The user authorization endpoint is mandatory.
	#[error("Missing user authorization endpoint.")]
	MissingUserAuthorizationEndpoint,
	/// Endpoints must use HTTP(S).
	#[error("The {endpoint} endpoint must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The callback must be `oob`, an absolute HTTP(S) URL, or an absolute path.
	#[error("Callback URL `{callback}` must be `oob`, an absolute URL, or start with `/`.")]
	InvalidCallback {
		/// Callback value that was supplied.
		callback: String,
	},
	/// Quirk parameter names cannot be empty.
	#[error("The `{quirk}` parameter name cannot be empty.")]
	EmptyParameterName {
		/// Quirk that failed validation.
		quirk: &'static str,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Request token endpoint.
	pub request_token_endpoint: Option<Url>,
	/// Access token endpoint.
	pub access_token_endpoint: Option<Url>,
	/// User authorization endpoint.
	pub user_authorization_endpoint: Option<Url>,
	/// Signature method applied to outbound requests.
	pub signature_method: SignatureMethod,
	/// Default callback URL.
	pub callback_url: Option<String>,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			request_token_endpoint: None,
			access_token_endpoint: None,
			user_authorization_endpoint: None,
			signature_method: SignatureMethod::default(),
			callback_url: None,
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the request token endpoint.
	pub fn request_token_endpoint(mut self, url: Url) -> Self {
		self.request_token_endpoint = Some(url);

		self
	}

	/// Sets the access token endpoint.
	pub fn access_token_endpoint(mut self, url: Url) -> Self {
		self.access_token_endpoint = Some(url);

		self
	}

	/// Sets the user authorization endpoint.
	pub fn user_authorization_endpoint(mut self, url: Url) -> Self {
		self.user_authorization_endpoint = Some(url);

		self
	}

	/// Overrides the signature method (HMAC-SHA1 by default).
	pub fn signature_method(mut self, method: SignatureMethod) -> Self {
		self.signature_method = method;

		self
	}

	/// Sets the default callback URL.
	pub fn callback_url(mut self, callback: impl Into<String>) -> Self {
		self.callback_url = Some(callback.into());

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let request_token = self
			.request_token_endpoint
			.ok_or(ProviderDescriptorError::MissingRequestTokenEndpoint)?;
		let access_token = self
			.access_token_endpoint
			.ok_or(ProviderDescriptorError::MissingAccessTokenEndpoint)?;
		let user_authorization = self
			.user_authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingUserAuthorizationEndpoint)?;
		let descriptor = ProviderDescriptor {
			id: self.id,
			endpoints: ProviderEndpoints { request_token, access_token, user_authorization },
			signature_method: self.signature_method,
			callback_url: self.callback_url,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("request token", &self.endpoints.request_token)?;
		validate_endpoint("access token", &self.endpoints.access_token)?;
		validate_endpoint("user authorization", &self.endpoints.user_authorization)?;

		if let Some(callback) = self.callback_url.as_deref() {
			validate_callback(callback)?;
		}
		if self.quirks.verifier_param.is_empty() {
			return Err(ProviderDescriptorError::EmptyParameterName { quirk: "verifier_param" });
		}
		if self.quirks.denied_param.is_empty() {
			return Err(ProviderDescriptorError::EmptyParameterName { quirk: "denied_param" });
		}

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if matches!(url.scheme(), "http" | "https") {
		Ok(())
	} else {
		Err(ProviderDescriptorError::UnsupportedScheme { endpoint: name, url: url.to_string() })
	}
}

pub(crate) fn validate_callback(callback: &str) -> Result<(), ProviderDescriptorError> {
	let valid = callback == "oob"
		|| (callback.starts_with('/') && !callback.starts_with("//"))
		|| Url::parse(callback).is_ok_and(|url| matches!(url.scheme(), "http" | "https"));

	if valid {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InvalidCallback { callback: callback.to_owned() })
	}
}
