//! Storage contracts and the built-in in-memory store for pending handshake flows.
//!
//! A [`FlowState`] holds the request-token secret between `begin` and `complete`. Backends must
//! make [`FlowStore::take`] destructive and atomic: of two concurrent takes for one flow, exactly
//! one observes the state. Expiry is carried on the state itself, so every backend honours the
//! provider's TTL without extra configuration.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{FlowId, TokenSecret},
};

/// Boxed future returned by [`FlowStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for pending flows.
pub trait FlowStore
where
	Self: Send + Sync,
{
	/// Persists a pending flow, replacing any earlier state for the same flow id.
	fn put(&self, state: FlowState) -> StoreFuture<'_, ()>;

	/// Removes and returns the flow state; `None` when it is missing or expired at `now`.
	fn take<'a>(
		&'a self,
		flow: &'a FlowId,
		now: OffsetDateTime,
	) -> StoreFuture<'a, Option<FlowState>>;
}

/// Transient state kept between the authorize redirect and the callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
	/// Flow identifier supplied by the host.
	pub flow_id: FlowId,
	/// Request token the provider issued.
	pub request_token: String,
	/// Request-token secret needed to sign the access-token call.
	pub request_token_secret: TokenSecret,
	/// Instant the request token arrived.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Instant after which the state must be treated as missing.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
}
impl FlowState {
	/// Creates a state that expires `ttl` after `created_at`.
	pub fn new(
		flow_id: FlowId,
		request_token: impl Into<String>,
		request_token_secret: impl Into<TokenSecret>,
		created_at: OffsetDateTime,
		ttl: Duration,
	) -> Self {
		Self {
			flow_id,
			request_token: request_token.into(),
			request_token_secret: request_token_secret.into(),
			created_at,
			expires_at: created_at + ttl,
		}
	}

	/// Returns true once `now` reaches `expires_at`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		now >= self.expires_at
	}
}

/// Error type produced by [`FlowStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_broker_error_with_source() {
		let store_error = StoreError::Backend { message: "cache unreachable".into() };
		let broker_error: Error = store_error.clone().into();

		assert!(matches!(broker_error, Error::Storage(_)));
		assert!(broker_error.to_string().contains("cache unreachable"));

		let source = StdError::source(&broker_error)
			.expect("Broker error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn flow_state_expiry_is_inclusive() {
		let created = macros::datetime!(2025-11-10 12:00 UTC);
		let state = FlowState::new(
			FlowId::new("session-1").expect("Flow fixture should be valid."),
			"rt1",
			"rts1",
			created,
			Duration::minutes(5),
		);

		assert!(!state.is_expired_at(created + Duration::minutes(4)));
		assert!(state.is_expired_at(created + Duration::minutes(5)));
	}

	#[test]
	fn flow_state_serializes_for_external_backends() {
		let state = FlowState::new(
			FlowId::new("session-1").expect("Flow fixture should be valid."),
			"rt1",
			"rts1",
			macros::datetime!(2025-11-10 12:00 UTC),
			Duration::minutes(10),
		);
		let payload = serde_json::to_value(&state).expect("FlowState should serialize.");

		assert_eq!(payload["expires_at"], "2025-11-10T12:10:00Z");
		assert_eq!(payload["request_token_secret"], "rts1");

		let round_trip: FlowState =
			serde_json::from_value(payload).expect("FlowState should deserialize.");

		assert_eq!(round_trip, state);
	}
}
