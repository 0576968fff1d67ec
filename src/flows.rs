//! The OAuth 1.0a three-legged handshake engine.
//!
//! [`Handshake`] owns the transport, the pending-flow store, the provider configuration and the
//! signing capabilities so each stage (`begin`, `complete`, `fetch_identity`) only deals with its
//! own round-trip. Every stage is instrumented with a [`FlowSpan`](crate::obs::FlowSpan) and
//! counted through [`record_flow_outcome`](crate::obs::record_flow_outcome).

pub mod begin;
pub mod complete;
pub mod identity;

mod common;

pub use begin::*;
pub use complete::*;

// self
use crate::{
	_prelude::*,
	auth::FlowId,
	http::HttpTransport,
	obs,
	provider::{IdentityMapper, ProviderConfig},
	sign::{RandomStamps, Signer, StampSource},
	store::FlowStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Handshake specialized for the crate's default reqwest transport.
pub type ReqwestHandshake = Handshake<ReqwestTransport>;

/// Lifecycle of a single login attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeState {
	/// Nothing happened yet.
	Idle,
	/// The request-token call is in flight.
	RequestTokenRequested,
	/// The user is on the provider's authorize page.
	AwaitingUserAuthorization,
	/// The access-token call is in flight.
	AccessTokenRequested,
	/// A credential was issued.
	Completed,
	/// The attempt failed and must be restarted.
	Failed,
}
impl HandshakeState {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			HandshakeState::Idle => "idle",
			HandshakeState::RequestTokenRequested => "request_token_requested",
			HandshakeState::AwaitingUserAuthorization => "awaiting_user_authorization",
			HandshakeState::AccessTokenRequested => "access_token_requested",
			HandshakeState::Completed => "completed",
			HandshakeState::Failed => "failed",
		}
	}

	/// Returns true for `Completed` and `Failed`.
	pub const fn is_terminal(self) -> bool {
		matches!(self, HandshakeState::Completed | HandshakeState::Failed)
	}

	/// Checks whether `next` is a legal successor of `self`.
	pub const fn can_advance_to(self, next: HandshakeState) -> bool {
		match (self, next) {
			(HandshakeState::Idle, HandshakeState::RequestTokenRequested)
			| (HandshakeState::RequestTokenRequested, HandshakeState::AwaitingUserAuthorization)
			| (HandshakeState::AwaitingUserAuthorization, HandshakeState::AccessTokenRequested)
			| (HandshakeState::AccessTokenRequested, HandshakeState::Completed) => true,
			(from, HandshakeState::Failed) => !from.is_terminal(),
			_ => false,
		}
	}
}
impl Display for HandshakeState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Tracks one flow's state inside a stage and traces every accepted transition.
#[derive(Debug)]
pub(crate) struct FlowProgress<'a> {
	flow: &'a FlowId,
	state: HandshakeState,
}
impl<'a> FlowProgress<'a> {
	pub(crate) fn starting_at(flow: &'a FlowId, state: HandshakeState) -> Self {
		Self { flow, state }
	}

	/// Moves to `next`; illegal transitions leave the state untouched.
	pub(crate) fn advance(&mut self, next: HandshakeState) -> bool {
		if !self.state.can_advance_to(next) {
			return false;
		}

		obs::record_transition(self.flow, self.state, next);

		self.state = next;

		true
	}

	pub(crate) fn fail(&mut self) {
		self.advance(HandshakeState::Failed);
	}

	#[cfg(test)]
	pub(crate) fn state(&self) -> HandshakeState {
		self.state
	}
}

/// Coordinates OAuth 1.0a handshakes against a single provider configuration.
///
/// Flows are independent: the engine keeps no per-flow memory of its own, and the only shared
/// mutable state is the [`FlowStore`]. Hosts typically build one handshake per provider and share
/// it (it is cheap to clone) across requests.
pub struct Handshake<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound provider call.
	pub transport: Arc<T>,
	/// Pending-flow store bridging `begin` and `complete`.
	pub store: Arc<dyn FlowStore>,
	/// Provider configuration.
	pub config: ProviderConfig,
	/// Signature scheme, derived from the configuration unless overridden.
	pub signer: Arc<dyn Signer>,
	/// Nonce + timestamp source.
	pub stamps: Arc<dyn StampSource>,
	/// Overrides the configured [`IdentityMapping`](crate::provider::IdentityMapping).
	pub identity_mapper: Option<Arc<dyn IdentityMapper>>,
}
impl<T> Handshake<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a handshake that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn FlowStore>,
		config: ProviderConfig,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			signer: config.signature_method.signer(),
			config,
			stamps: Arc::new(RandomStamps),
			identity_mapper: None,
		}
	}

	/// Replaces the signature scheme.
	pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
		self.signer = signer;

		self
	}

	/// Replaces the nonce + timestamp source.
	pub fn with_stamps(mut self, stamps: Arc<dyn StampSource>) -> Self {
		self.stamps = stamps;

		self
	}

	/// Replaces the data-driven identity mapping with custom behavior.
	pub fn with_identity_mapper(mut self, mapper: Arc<dyn IdentityMapper>) -> Self {
		self.identity_mapper = Some(mapper);

		self
	}
}
#[cfg(feature = "reqwest")]
impl Handshake<ReqwestTransport> {
	/// Creates a handshake backed by a default reqwest client.
	///
	/// Use [`Handshake::with_transport`] with [`ReqwestTransport::with_timeout`] to bound call
	/// durations.
	pub fn new(store: Arc<dyn FlowStore>, config: ProviderConfig) -> Self {
		Self::with_transport(store, config, ReqwestTransport::default())
	}
}
impl<T> Clone for Handshake<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			signer: self.signer.clone(),
			stamps: self.stamps.clone(),
			identity_mapper: self.identity_mapper.clone(),
		}
	}
}
impl<T> Debug for Handshake<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Handshake")
			.field("config", &self.config)
			.field("signature_method", &self.signer.method())
			.field("custom_identity_mapper", &self.identity_mapper.is_some())
			.finish()
	}
}
