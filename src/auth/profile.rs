//! Normalized user profile returned by provider strategies.

// self
use crate::{_prelude::*, auth::ProviderId};

/// Provider-agnostic profile handed to the verify callback.
///
/// The default value is the empty profile used when fetching is skipped or optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
	/// Provider that produced the profile.
	pub provider: Option<ProviderId>,
	/// Provider-side user identifier.
	pub id: Option<String>,
	/// Login or screen name.
	pub username: Option<String>,
	/// Human-readable name.
	pub display_name: Option<String>,
	/// Known email addresses.
	#[serde(default)]
	pub emails: Vec<String>,
	/// Raw provider payload.
	#[serde(default)]
	pub raw: serde_json::Value,
}
impl Profile {
	/// Returns an empty profile tagged with `provider`.
	pub fn empty(provider: ProviderId) -> Self {
		Self { provider: Some(provider), ..Default::default() }
	}

	/// Returns `true` when no field besides the provider tag is populated.
	pub fn is_empty(&self) -> bool {
		self.id.is_none()
			&& self.username.is_none()
			&& self.display_name.is_none()
			&& self.emails.is_empty()
			&& self.raw.is_null()
	}
}
