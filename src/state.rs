//! CSRF `state` handles issued with the authorization redirect and redeemed on the callback.

pub mod memory;

pub use memory::MemoryStateStore;

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

/// Length of generated `state` handles.
pub const STATE_LEN: usize = 24;

/// Future returned by [`StateStore`] operations.
pub type StateFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StateStoreError>> + 'a + Send>>;

/// Lifetime stamped on issued handles unless the strategy overrides it.
pub const DEFAULT_STATE_TTL: Duration = Duration::minutes(10);

/// Storage backend contract for pending `state` handles.
///
/// Every handle is bound to the session that started the sign-in. A handle redeems at most once,
/// and only from that session; redemption from any other session reports
/// [`StateCheck::Unknown`] and leaves the handle in place.
pub trait StateStore
where
	Self: Send + Sync,
{
	/// Records a freshly issued handle.
	fn issue(&self, pending: PendingState) -> StateFuture<'_, ()>;

	/// Consumes `handle` for `session` and reports whether it was known and still fresh.
	fn redeem<'a>(&'a self, session: &'a str, handle: &'a str) -> StateFuture<'a, StateCheck>;
}

/// Error type produced by [`StateStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StateStoreError {
	/// Backend-level failure for the storage engine.
	#[error("State store failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// `state` handle waiting for its callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingState {
	/// Opaque value sent with the authorization redirect.
	pub handle: String,
	/// Session key of the browser the redirect was issued to.
	pub session: String,
	/// Issue instant.
	pub issued_at: OffsetDateTime,
	/// Instant after which the handle is no longer accepted.
	pub expires_at: OffsetDateTime,
}
impl PendingState {
	/// Issues a random handle for `session`, valid for `ttl` starting now.
	pub fn generate(session: impl Into<String>, ttl: Duration) -> Self {
		Self::new(generate_state(), session, OffsetDateTime::now_utc(), ttl)
	}

	/// Builds a pending entry for a known handle, session and issue instant.
	pub fn new(
		handle: impl Into<String>,
		session: impl Into<String>,
		issued_at: OffsetDateTime,
		ttl: Duration,
	) -> Self {
		let expires_at = issued_at + ttl;

		Self { handle: handle.into(), session: session.into(), issued_at, expires_at }
	}

	/// Returns `true` once `instant` reaches the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}
}

/// Result of redeeming a `state` handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateCheck {
	/// The handle was issued by this store and is still fresh.
	Valid(PendingState),
	/// The handle was never issued to this session or was already redeemed.
	Unknown,
	/// The handle was issued but its lifetime elapsed.
	Expired,
}

/// Generates a random alphanumeric `state` handle.
pub fn generate_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}
