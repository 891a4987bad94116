//! Identity resolution contract between the handshake and the application.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Profile},
	error::BoxError,
	flows::AuthRequest,
};

/// Boxed future returned by [`Verify::verify`].
pub type VerifyFuture<'a, P> =
	Pin<Box<dyn Future<Output = Result<Verdict<P>, BoxError>> + 'a + Send>>;

/// Everything the verify callback learns about a successful exchange.
#[derive(Clone, Debug)]
pub struct VerifyInput {
	/// Inbound request; populated only when
	/// [`StrategySettings::pass_req_to_callback`](crate::config::StrategySettings::pass_req_to_callback)
	/// is enabled.
	pub request: Option<AuthRequest>,
	/// Access token; ownership moves to the application.
	pub access_token: AccessToken,
	/// Provider profile, or the empty profile when skipped.
	pub profile: Profile,
}

/// Informational payload attached to successes and failures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
	/// Human-readable message, such as the reason a user was rejected.
	pub message: Option<String>,
}
impl AuthInfo {
	/// Creates an info payload carrying `message`.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: Some(message.into()) }
	}
}

/// Decision returned by the verify callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict<P> {
	/// The user maps to `principal`.
	Accept {
		/// Application principal.
		principal: P,
		/// Optional details forwarded to the caller.
		info: AuthInfo,
	},
	/// The user is not allowed in; not an error.
	Reject {
		/// Optional details forwarded to the caller.
		info: AuthInfo,
	},
}
impl<P> Verdict<P> {
	/// Accepts the user without extra info.
	pub fn accept(principal: P) -> Self {
		Self::Accept { principal, info: AuthInfo::default() }
	}

	/// Rejects the user with an informational message.
	pub fn reject(message: impl Into<String>) -> Self {
		Self::Reject { info: AuthInfo::new(message) }
	}
}

/// Application callback resolving an authenticated provider user to a principal.
///
/// Returning `Err` is an application failure and aborts the attempt with
/// [`Error::IdentityResolution`]. Closures `Fn(VerifyInput) -> impl Future<Output =
/// Result<Verdict<P>, BoxError>>` implement this trait directly.
pub trait Verify<P>
where
	Self: Send + Sync,
{
	/// Resolves `input` to a verdict.
	fn verify(&self, input: VerifyInput) -> VerifyFuture<'_, P>;
}
impl<P, F, Fut> Verify<P> for F
where
	F: Send + Sync + Fn(VerifyInput) -> Fut,
	Fut: 'static + Send + Future<Output = Result<Verdict<P>, BoxError>>,
{
	fn verify(&self, input: VerifyInput) -> VerifyFuture<'_, P> {
		Box::pin(self(input))
	}
}
