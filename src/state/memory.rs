//! Thread-safe in-memory [`StateStore`] implementation for single-process hosts and tests.

// std
use std::collections::hash_map::Entry;
// self
use crate::{
	_prelude::*,
	state::{PendingState, StateCheck, StateFuture, StateStore},
};

type StateMap = Arc<Mutex<HashMap<String, PendingState>>>;

/// In-process state store.
///
/// Each entry expires at the instant stamped on it by the issuer; the store keeps no lifetime of
/// its own.
#[derive(Clone, Debug, Default)]
pub struct MemoryStateStore {
	entries: StateMap,
}
impl MemoryStateStore {
	/// Number of handles currently pending, expired ones included.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns `true` when no handle is pending.
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	fn issue_now(map: &StateMap, pending: PendingState) {
		let now = OffsetDateTime::now_utc();
		let mut guard = map.lock();

		guard.retain(|_, entry| !entry.is_expired_at(now));
		guard.insert(pending.handle.clone(), pending);
	}

	fn redeem_now(map: &StateMap, session: &str, handle: &str, now: OffsetDateTime) -> StateCheck {
		let mut guard = map.lock();
		let Entry::Occupied(entry) = guard.entry(handle.to_owned()) else {
			return StateCheck::Unknown;
		};

		if entry.get().session != session {
			return StateCheck::Unknown;
		}

		let pending = entry.remove();

		if pending.is_expired_at(now) { StateCheck::Expired } else { StateCheck::Valid(pending) }
	}
}
impl StateStore for MemoryStateStore {
	fn issue(&self, pending: PendingState) -> StateFuture<'_, ()> {
		let map = self.entries.clone();

		Box::pin(async move {
			Self::issue_now(&map, pending);

			Ok(())
		})
	}

	fn redeem<'a>(&'a self, session: &'a str, handle: &'a str) -> StateFuture<'a, StateCheck> {
		let map = self.entries.clone();

		Box::pin(async move {
			Ok(Self::redeem_now(&map, session, handle, OffsetDateTime::now_utc()))
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::state::DEFAULT_STATE_TTL;

	#[tokio::test]
	async fn handles_redeem_exactly_once() {
		let store = MemoryStateStore::default();
		let pending = PendingState::generate("session-1", DEFAULT_STATE_TTL);

		store.issue(pending.clone()).await.expect("Issuing a state should succeed.");

		assert_eq!(store.len(), 1);

		let first =
			store.redeem("session-1", &pending.handle).await.expect("Redeem should succeed.");

		assert_eq!(first, StateCheck::Valid(pending.clone()));

		let second =
			store.redeem("session-1", &pending.handle).await.expect("Redeem should succeed.");

		assert_eq!(second, StateCheck::Unknown);
		assert!(store.is_empty());
	}

	#[tokio::test]
	async fn unknown_handles_are_rejected() {
		let store = MemoryStateStore::default();
		let check =
			store.redeem("session-1", "never-issued").await.expect("Redeem should succeed.");

		assert_eq!(check, StateCheck::Unknown);
	}

	#[tokio::test]
	async fn handles_from_another_session_are_unknown_and_kept() {
		let store = MemoryStateStore::default();
		let pending = PendingState::generate("session-a", DEFAULT_STATE_TTL);

		store.issue(pending.clone()).await.expect("Issuing a state should succeed.");

		let foreign =
			store.redeem("session-b", &pending.handle).await.expect("Redeem should succeed.");

		assert_eq!(foreign, StateCheck::Unknown);
		assert_eq!(store.len(), 1);

		let own = store.redeem("session-a", &pending.handle).await.expect("Redeem should succeed.");

		assert_eq!(own, StateCheck::Valid(pending));
	}

	#[tokio::test]
	async fn expired_handles_report_expiry_and_are_consumed() {
		let store = MemoryStateStore::default();
		let stale = PendingState::new(
			"stale",
			"session-1",
			OffsetDateTime::now_utc() - Duration::minutes(11),
			DEFAULT_STATE_TTL,
		);

		store.issue(stale).await.expect("Issuing a state should succeed.");

		assert_eq!(
			store.redeem("session-1", "stale").await.expect("Redeem should succeed."),
			StateCheck::Expired
		);
		assert_eq!(
			store.redeem("session-1", "stale").await.expect("Redeem should succeed."),
			StateCheck::Unknown
		);
	}

	#[tokio::test]
	async fn issuing_prunes_expired_entries() {
		let store = MemoryStateStore::default();
		let stale = PendingState::new(
			"stale",
			"session-1",
			OffsetDateTime::now_utc() - Duration::minutes(5),
			Duration::minutes(1),
		);

		store.issue(stale).await.expect("Issuing a state should succeed.");
		store
			.issue(PendingState::generate("session-1", Duration::minutes(1)))
			.await
			.expect("Issuing a state should succeed.");

		assert_eq!(store.len(), 1);
	}
}
