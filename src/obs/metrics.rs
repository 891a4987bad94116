// self
use crate::obs::{HandshakeOutcome, HandshakeStage};

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_stage_outcome(stage: HandshakeStage, outcome: HandshakeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth1_strategy_handshake_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_stage_outcome_noop_without_metrics() {
		record_stage_outcome(HandshakeStage::AccessToken, HandshakeOutcome::Failure);
	}
}
