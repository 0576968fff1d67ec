//! Thread-safe in-memory [`FlowStore`] implementation for single-process hosts and tests.

// self
use crate::{
	_prelude::*,
	auth::FlowId,
	store::{FlowState, FlowStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<FlowId, FlowState>>>;

/// Storage backend that keeps pending flows in-process.
///
/// A single lock guards the map, so concurrent `take` calls for one flow have exactly one winner.
/// Every `put` first drops entries already expired at the new state's creation time, so flows
/// abandoned on the authorize page cannot accumulate; [`MemoryStore::purge_expired`] does the same
/// on demand.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of pending flows, expired ones included until the next `put` or purge.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when no flow is pending.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Drops every state that is expired at `now`, returning how many were removed.
	pub fn purge_expired(&self, now: OffsetDateTime) -> usize {
		let mut guard = self.0.write();
		let before = guard.len();

		guard.retain(|_, state| !state.is_expired_at(now));

		before - guard.len()
	}

	fn put_now(map: StoreMap, state: FlowState) -> Result<(), StoreError> {
		let mut guard = map.write();

		guard.retain(|_, pending| !pending.is_expired_at(state.created_at));
		guard.insert(state.flow_id.clone(), state);

		Ok(())
	}

	fn take_now(map: StoreMap, flow: FlowId, now: OffsetDateTime) -> Option<FlowState> {
		map.write().remove(&flow).filter(|state| !state.is_expired_at(now))
	}
}
impl FlowStore for MemoryStore {
	fn put(&self, state: FlowState) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::put_now(map, state) })
	}

	fn take<'a>(
		&'a self,
		flow: &'a FlowId,
		now: OffsetDateTime,
	) -> StoreFuture<'a, Option<FlowState>> {
		let map = self.0.clone();
		let flow = flow.to_owned();

		Box::pin(async move { Ok(Self::take_now(map, flow, now)) })
	}
}
