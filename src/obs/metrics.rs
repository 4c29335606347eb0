// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"dropbox_team_auth_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts a fetched member listing page via the global metrics recorder (when enabled).
pub fn count_member_page() {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("dropbox_team_auth_member_pages_total").increment(1);
	}
}
