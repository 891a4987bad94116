//! Entry point dispatching an inbound request to the right handshake leg.

// self
use crate::{
	_prelude::*,
	flows::{AuthInfo, AuthRequest, AuthenticateOptions, Authenticator, Handshake},
	obs::{self, HandshakeOutcome, HandshakeSpan, HandshakeStage},
};

const TOKEN_PARAM: &str = "oauth_token";

/// Result of one call to [`Authenticator::authenticate`].
#[derive(Debug)]
pub enum AuthOutcome<P> {
	/// Send the user agent to `location` (HTTP 302).
	Redirect {
		/// Provider authorization URL carrying the request token.
		location: Url,
	},
	/// The verify callback accepted the user.
	Success {
		/// Principal returned by the verify callback.
		principal: P,
		/// Details returned by the verify callback.
		info: AuthInfo,
	},
	/// Authentication failed without a fatal error.
	Failure(Failure),
}
impl<P> AuthOutcome<P> {
	/// Returns `true` for [`AuthOutcome::Success`].
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success { .. })
	}
}

/// Why an attempt ended in [`AuthOutcome::Failure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureReason {
	/// The user refused authorization at the provider.
	Denied,
	/// The returned request token is unknown, expired, or already used.
	TokenNotFound,
	/// A provider endpoint answered with an error.
	Provider,
	/// A provider endpoint could not be reached in time.
	Transport,
	/// The profile could not be loaded.
	ProfileFetch,
	/// The verify callback rejected the user.
	Rejected,
}
impl FailureReason {
	/// Returns a stable label suitable for logs or responses.
	pub const fn as_str(self) -> &'static str {
		match self {
			FailureReason::Denied => "denied",
			FailureReason::TokenNotFound => "token_not_found",
			FailureReason::Provider => "provider",
			FailureReason::Transport => "transport",
			FailureReason::ProfileFetch => "profile_fetch",
			FailureReason::Rejected => "rejected",
		}
	}
}
impl Display for FailureReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Non-fatal authentication failure.
#[derive(Debug)]
pub struct Failure {
	/// Failure category.
	pub reason: FailureReason,
	/// Details safe to show the user.
	pub info: AuthInfo,
	/// Underlying error for diagnostics, when one exists.
	pub error: Option<Error>,
}
impl Failure {
	/// Failure without an underlying error.
	pub fn new(reason: FailureReason, info: AuthInfo) -> Self {
		Self { reason, info, error: None }
	}

	/// Classifies a non-fatal error; returns it back when it is fatal.
	pub fn from_error(error: Error) -> Result<Self, Error> {
		let (reason, message) = match &error {
			Error::TokenNotFound =>
				(FailureReason::TokenNotFound, "Unable to verify authorization request.".to_owned()),
			Error::Provider(provider) => (FailureReason::Provider, provider.message.clone()),
			Error::Transport(transport) => (FailureReason::Transport, transport.to_string()),
			Error::ProfileFetch { .. } => (FailureReason::ProfileFetch, error.to_string()),
			_ => return Err(error),
		};

		Ok(Self { reason, info: AuthInfo::new(message), error: Some(error) })
	}
}

impl<P> Authenticator<P>
where
	P: 'static + Send,
{
	/// Runs one handshake step for `request`.
	///
	/// - `denied` (or the provider's equivalent) in the query: immediate
	///   [`FailureReason::Denied`] without network traffic.
	/// - `oauth_token` in the query: exchanges it (with the verifier, when present), fetches the
	///   profile, and calls the verify callback.
	/// - Otherwise: obtains a request token, stores it, and returns [`AuthOutcome::Redirect`].
	///
	/// Provider, transport, missing-token, and profile failures become
	/// [`AuthOutcome::Failure`]; configuration, signing, storage, and verify-callback errors
	/// are returned as `Err`.
	pub async fn authenticate(
		&self,
		request: AuthRequest,
		options: AuthenticateOptions,
	) -> Result<AuthOutcome<P>> {
		let token = request.query_param(TOKEN_PARAM);
		let stage =
			if token.is_some() { HandshakeStage::AccessToken } else { HandshakeStage::RequestToken };
		let span = HandshakeSpan::new(stage, self.descriptor.id.as_ref());

		obs::record_stage_outcome(stage, HandshakeOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut handshake = Handshake::new();
				let attempt = if request.query_param(&self.descriptor.quirks.denied_param).is_some() {
					Ok(AuthOutcome::Failure(Failure::new(
						FailureReason::Denied,
						AuthInfo::new("User denied authorization."),
					)))
				} else {
					match token {
						Some(token) => {
							let verifier = request.query_param(&self.descriptor.quirks.verifier_param);

							self.complete(&mut handshake, request, token, verifier).await
						},
						None => self.begin(&mut handshake, &request, &options).await,
					}
				};

				settle(&mut handshake, attempt)
			})
			.await;
		let outcome = match &result {
			Ok(AuthOutcome::Redirect { .. } | AuthOutcome::Success { .. }) => HandshakeOutcome::Success,
			Ok(AuthOutcome::Failure(Failure { reason: FailureReason::Rejected, .. })) =>
				HandshakeOutcome::Rejected,
			_ => HandshakeOutcome::Failure,
		};

		obs::record_stage_outcome(stage, outcome);

		result
	}
}

/// Converts non-fatal errors into failures and closes the state machine.
fn settle<P>(handshake: &mut Handshake, attempt: Result<AuthOutcome<P>>) -> Result<AuthOutcome<P>> {
	let outcome = attempt.or_else(|error| Failure::from_error(error).map(AuthOutcome::Failure));

	if !matches!(outcome, Ok(AuthOutcome::Redirect { .. } | AuthOutcome::Success { .. })) {
		handshake.fail();
	}

	outcome
}
