// self
use crate::{_prelude::*, obs::FlowKind};

/// Future returned by [`FlowSpan::instrument`].
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`FlowSpan::instrument`]; the input future itself without tracing.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span covering one strategy operation, labeled by flow kind and call site.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	inner: tracing::Span,
}
#[cfg(feature = "tracing")]
impl FlowSpan {
	/// Opens a `dropbox_team_auth.flow` span for `kind` at `stage`.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		Self { inner: tracing::info_span!("dropbox_team_auth.flow", flow = %kind, stage) }
	}

	/// Keeps the span entered until the returned guard drops.
	pub fn entered(self) -> FlowSpanGuard {
		FlowSpanGuard { _entered: self.inner.entered() }
	}

	/// Attaches the span to `fut` so every poll runs inside it.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		tracing::Instrument::instrument(fut, self.inner.clone())
	}
}
#[cfg(not(feature = "tracing"))]
impl FlowSpan {
	/// Creates an inert span.
	pub fn new(_kind: FlowKind, _stage: &'static str) -> Self {
		Self {}
	}

	/// Returns an inert guard.
	pub fn entered(self) -> FlowSpanGuard {
		FlowSpanGuard {}
	}

	/// Returns `fut` unchanged.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		fut
	}
}

/// Guard returned by [`FlowSpan::entered`]; the span is exited on drop.
#[derive(Debug)]
pub struct FlowSpanGuard {
	#[cfg(feature = "tracing")]
	_entered: tracing::span::EnteredSpan,
}

/// Emits a `debug` event for a fetched member listing page.
pub fn trace_member_page(page: usize, members: usize, has_more: bool) {
	#[cfg(feature = "tracing")]
	tracing::debug!(page, members, has_more, "fetched team member page");
	#[cfg(not(feature = "tracing"))]
	let _ = (page, members, has_more);
}
