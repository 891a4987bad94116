// self
use crate::_prelude::*;

/// Provider-specific quirks that influence how the handshake behaves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Query parameter carrying the verifier on the callback (`oauth_verifier` by default).
	pub verifier_param: String,
	/// Query parameter a provider sets when the user refused authorization.
	pub denied_param: String,
	/// Rejects request tokens issued without `oauth_callback_confirmed=true` (OAuth 1.0a).
	pub require_callback_confirmed: bool,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			verifier_param: "oauth_verifier".into(),
			denied_param: "denied".into(),
			require_callback_confirmed: false,
		}
	}
}
