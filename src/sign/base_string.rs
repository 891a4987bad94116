//! Signature base string construction (RFC 5849 §3.4.1).

// self
use crate::{_prelude::*, sign::percent_encode};

/// Everything a signer needs to sign one outbound request.
///
/// The consumer secret lives inside the [`Signer`](crate::sign::Signer); the token secret is
/// supplied per request because it changes between the request-token and access-token legs.
#[derive(Clone, Copy)]
pub struct SignatureInput<'a> {
	/// HTTP method, uppercased during normalization.
	pub method: &'a str,
	/// Target URL; query and fragment are ignored when computing the base URL.
	pub url: &'a Url,
	/// Complete parameter set (protocol, query, and form-body parameters).
	pub parameters: &'a [(String, String)],
	/// Secret of the request or access token, if the request carries a token.
	pub token_secret: Option<&'a str>,
}
impl<'a> SignatureInput<'a> {
	/// Creates an input without a token secret.
	pub fn new(method: &'a str, url: &'a Url, parameters: &'a [(String, String)]) -> Self {
		Self { method, url, parameters, token_secret: None }
	}

	/// Attaches the token secret used as the second half of the signing key.
	pub fn with_token_secret(mut self, token_secret: Option<&'a str>) -> Self {
		self.token_secret = token_secret;

		self
	}

	/// Renders the canonical base string for this input.
	pub fn base_string(&self) -> String {
		base_string(self.method, self.url, self.parameters)
	}
}
impl Debug for SignatureInput<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignatureInput")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("parameters", &self.parameters.len())
			.field("token_secret", &self.token_secret.map(|_| "<redacted>"))
			.finish()
	}
}

/// Returns `scheme://host[:port]/path` with the scheme and host lowercased and default ports
/// omitted.
pub fn base_url(url: &Url) -> String {
	let scheme = url.scheme().to_ascii_lowercase();
	let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

	// `Url::port` already hides the scheme's default port.
	match url.port() {
		Some(port) => format!("{scheme}://{host}:{port}{}", url.path()),
		None => format!("{scheme}://{host}{}", url.path()),
	}
}

/// Merges the URL's query pairs with additional parameters into one signature parameter set.
pub fn collect_parameters<I>(url: &Url, extra: I) -> Vec<(String, String)>
where
	I: IntoIterator<Item = (String, String)>,
{
	url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).chain(extra).collect()
}

/// Encodes, sorts, and joins parameters into the normalized parameter string.
///
/// `oauth_signature` is never part of the signed set and is dropped here.
pub fn normalize_parameters(parameters: &[(String, String)]) -> String {
	let mut encoded = parameters
		.iter()
		.filter(|(key, _)| key != "oauth_signature")
		.map(|(key, value)| (percent_encode(key), percent_encode(value)))
		.collect::<Vec<_>>();

	encoded.sort();

	encoded.into_iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&")
}

/// Builds `METHOD&enc(base_url)&enc(normalized_parameters)`.
pub fn base_string(method: &str, url: &Url, parameters: &[(String, String)]) -> String {
	format!(
		"{}&{}&{}",
		method.to_ascii_uppercase(),
		percent_encode(&base_url(url)),
		percent_encode(&normalize_parameters(parameters))
	)
}
