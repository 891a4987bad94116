//! Provider error values and parsers for common error body formats.

// crates.io
use serde_json::Value;
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Failure reported by a provider endpoint.
///
/// Provider errors never abort the caller: the handshake reports them as authentication
/// failures carrying this value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
#[error("{message}")]
pub struct ProviderError {
	/// Most specific human-readable message available.
	pub message: String,
	/// HTTP status returned by the provider.
	pub status: u16,
	/// Raw response body.
	pub body: String,
}
impl ProviderError {
	/// Creates a provider error.
	pub fn new(message: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
		Self { message: message.into(), status, body: body.into() }
	}
}

/// Extracts a message from common JSON error shapes.
///
/// Recognized fields, in order: `error` (string, combined with `error_description` when
/// present), `error.message`, `errors[0].message`, `error_description`, and `message`.
/// Returns `None` for non-JSON bodies or unrecognized shapes.
pub fn parse_json_error(body: &str, status: u16) -> Option<ProviderError> {
	let json = serde_json::from_str::<Value>(body).ok()?;
	let text = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_owned);
	let description = text(json.get("error_description"));
	let message = match json.get("error") {
		Some(Value::String(code)) => Some(match &description {
			Some(description) => format!("{code}: {description}"),
			None => code.clone(),
		}),
		Some(nested) => text(nested.get("message")),
		None => None,
	}
	.or_else(|| text(json.get("errors").and_then(|errors| errors.get(0)?.get("message"))))
	.or(description)
	.or_else(|| text(json.get("message")))?;

	Some(ProviderError::new(message, status, body))
}

/// Extracts `oauth_problem` (and `oauth_problem_advice`) from a form-encoded body, as
/// defined by the OAuth problem reporting extension.
pub fn parse_oauth_problem(body: &str, status: u16) -> Option<ProviderError> {
	let params = form_urlencoded::parse(body.trim().as_bytes())
		.into_owned()
		.collect::<BTreeMap<String, String>>();
	let problem = params.get("oauth_problem").filter(|problem| !problem.is_empty())?;
	let message = match params.get("oauth_problem_advice") {
		Some(advice) if !advice.is_empty() => format!("{problem} ({advice})"),
		_ => problem.clone(),
	};

	Some(ProviderError::new(message, status, body))
}
