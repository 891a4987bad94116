//! Provider descriptor data structures shared by every handshake.
//!
//! The module exposes validated metadata and builder utilities so providers can describe
//! their endpoints and protocol quirks in a transport-agnostic way.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::ProviderId, sign::SignatureMethod};

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Endpoint issuing unauthorized request tokens.
	pub request_token: Url,
	/// Endpoint exchanging an authorized request token for an access token.
	pub access_token: Url,
	/// Page the user is redirected to for authorization.
	pub user_authorization: Url,
}

/// Immutable provider descriptor consumed by the handshake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Method used to sign every outbound request.
	pub signature_method: SignatureMethod,
	/// Default callback; absolute, or a path resolved against the inbound request.
	pub callback_url: Option<String>,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}
}
