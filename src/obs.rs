//! Optional observability helpers for handshake attempts.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth1_strategy.handshake` with the
//!   `stage` field, plus debug events for every state transition.
//! - Enable `metrics` to increment the `oauth1_strategy_handshake_total` counter for every
//!   attempt/success/failure/rejection, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Handshake stages observed by the authenticator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeStage {
	/// First leg: obtaining a request token and redirecting the user.
	RequestToken,
	/// Third leg: exchanging the authorized request token.
	AccessToken,
	/// Profile retrieval after a successful exchange.
	Profile,
	/// Application verify callback.
	Verify,
}
impl HandshakeStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			HandshakeStage::RequestToken => "request_token",
			HandshakeStage::AccessToken => "access_token",
			HandshakeStage::Profile => "profile",
			HandshakeStage::Verify => "verify",
		}
	}
}
impl Display for HandshakeStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandshakeOutcome {
	/// Entry to a stage.
	Attempt,
	/// Stage completed.
	Success,
	/// Stage ended in an authentication failure or an error.
	Failure,
	/// The verify callback rejected the user.
	Rejected,
}
impl HandshakeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			HandshakeOutcome::Attempt => "attempt",
			HandshakeOutcome::Success => "success",
			HandshakeOutcome::Failure => "failure",
			HandshakeOutcome::Rejected => "rejected",
		}
	}
}
impl Display for HandshakeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
