//! Handshake state machine.
//!
//! One [`Handshake`] tracks a single call to
//! [`Authenticator::authenticate`](crate::flows::Authenticator::authenticate). The first leg
//! ends suspended in [`HandshakeState::AwaitingUserAuthorization`]; the provider's redirect
//! starts a fresh handshake that jumps from `Init` straight to the exchange.

// self
use crate::{_prelude::*, obs};

/// States of one handshake attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeState {
	/// Inbound request not inspected yet.
	Init,
	/// Obtaining a request token.
	RequestingToken,
	/// User redirected to the provider; the attempt ends here.
	AwaitingUserAuthorization,
	/// Exchanging the authorized request token for an access token.
	ExchangingAccessToken,
	/// Fetching the profile and running the verify callback.
	VerifyingIdentity,
	/// The verify callback accepted the user.
	Complete,
	/// The attempt failed or the user was rejected.
	Failed,
}
impl HandshakeState {
	/// Returns a stable label suitable for span or log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			HandshakeState::Init => "init",
			HandshakeState::RequestingToken => "requesting_token",
			HandshakeState::AwaitingUserAuthorization => "awaiting_user_authorization",
			HandshakeState::ExchangingAccessToken => "exchanging_access_token",
			HandshakeState::VerifyingIdentity => "verifying_identity",
			HandshakeState::Complete => "complete",
			HandshakeState::Failed => "failed",
		}
	}

	/// Returns `true` for states that accept no further transitions.
	pub const fn is_terminal(self) -> bool {
		matches!(self, HandshakeState::Complete | HandshakeState::Failed)
	}

	/// Returns `true` when moving from `self` to `next` is a legal transition.
	pub const fn can_transition_to(self, next: HandshakeState) -> bool {
		use HandshakeState::*;

		match (self, next) {
			(Complete | Failed, _) => false,
			(_, Failed) => true,
			(Init, RequestingToken | ExchangingAccessToken) => true,
			(RequestingToken, AwaitingUserAuthorization) => true,
			(AwaitingUserAuthorization, ExchangingAccessToken) => true,
			(ExchangingAccessToken, VerifyingIdentity) => true,
			(VerifyingIdentity, Complete) => true,
			_ => false,
		}
	}
}
impl Display for HandshakeState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Raised when a handshake is driven along an illegal edge.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Invalid handshake transition from {from} to {to}.")]
pub struct InvalidTransition {
	/// State the handshake was in.
	pub from: HandshakeState,
	/// Requested next state.
	pub to: HandshakeState,
}

/// State tracker for one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Handshake {
	state: HandshakeState,
	history: Vec<HandshakeState>,
}
impl Handshake {
	/// Starts a new attempt in [`HandshakeState::Init`].
	pub fn new() -> Self {
		Self { state: HandshakeState::Init, history: vec![HandshakeState::Init] }
	}

	/// Current state.
	pub fn state(&self) -> HandshakeState {
		self.state
	}

	/// Every state visited so far, in order.
	pub fn history(&self) -> &[HandshakeState] {
		&self.history
	}

	/// Moves to `next`, rejecting illegal edges.
	pub fn advance(&mut self, next: HandshakeState) -> Result<(), InvalidTransition> {
		if !self.state.can_transition_to(next) {
			return Err(InvalidTransition { from: self.state, to: next });
		}

		obs::record_transition(self.state.as_str(), next.as_str());

		self.state = next;
		self.history.push(next);

		Ok(())
	}

	/// Moves to [`HandshakeState::Failed`] unless the attempt already ended.
	pub fn fail(&mut self) {
		if !self.state.is_terminal() {
			let _ = self.advance(HandshakeState::Failed);
		}
	}
}
impl Default for Handshake {
	fn default() -> Self {
		Self::new()
	}
}
