// self
use crate::{
	_prelude::*,
	auth::FlowId,
	flows::HandshakeState,
	obs::FlowStage,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by handshake stages.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided stage and, when known, the flow identifier.
	pub fn new(stage: FlowStage, flow: Option<&FlowId>) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth1_broker.flow",
				stage = stage.as_str(),
				flow = flow.map(AsRef::<str>::as_ref)
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, flow);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
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

/// Emits a debug event for a handshake state transition (when enabled).
pub fn record_transition(flow: &FlowId, from: HandshakeState, to: HandshakeState) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			flow = flow.as_ref(),
			from = from.as_str(),
			to = to.as_str(),
			"handshake state changed"
		);
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (flow, from, to);
	}
}
