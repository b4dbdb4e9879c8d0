//! Optional observability helpers for the sign-in strategy.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_daldalso.flow` with the `flow` (step
//!   of the sign-in) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `oauth2_daldalso_flow_total` counter for every
//!   attempt/success/rejection/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Steps of a sign-in observed by the strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Building the authorization redirect and issuing its `state`.
	Authorize,
	/// Redeeming the callback `state` and exchanging the authorization code.
	CodeExchange,
	/// Fetching and normalizing the user profile.
	UserProfile,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Authorize => "authorize",
			FlowKind::CodeExchange => "code_exchange",
			FlowKind::UserProfile => "user_profile",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a strategy step.
	Attempt,
	/// Successful completion.
	Success,
	/// The end user's sign-in was refused (denied consent, bad state, verify rejection).
	Rejected,
	/// Error propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Rejected => "rejected",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
