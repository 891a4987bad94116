// self
use crate::{_prelude::*, obs::HandshakeStage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedHandshake<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedHandshake<F> = F;

/// A span builder used by handshake attempts.
#[derive(Clone, Debug)]
pub struct HandshakeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl HandshakeSpan {
	/// Creates a new span tagged with the entry stage and the provider identifier.
	pub fn new(stage: HandshakeStage, provider: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("oauth1_strategy.handshake", stage = stage.as_str(), provider);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, provider);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedHandshake<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for one state machine transition (when enabled).
pub fn record_transition(from: &'static str, to: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(from, to, "handshake transition");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (from, to);
	}
}
