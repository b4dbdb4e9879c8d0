//! Daldalso provider constants (data) and the quirks the generic OAuth client is tuned with.
//!
//! `endpoints` exposes the parsed endpoint set the strategy calls; `quirks` describes how the
//! provider expects access tokens to be read and presented. Both are fixed for Daldalso and are
//! not caller-configurable.

pub mod endpoints;
pub mod quirks;

pub use endpoints::*;
pub use quirks::*;

// self
use crate::_prelude::*;

/// Strategy name exposed to hosts that register several strategies.
pub const PROVIDER_NAME: &str = "daldalso";
/// Authorization endpoint the end user's browser is redirected to.
pub const AUTHORIZATION_URL: &str = "https://daldal.so/oauth/authorize";
/// Token endpoint where authorization codes are exchanged.
pub const TOKEN_URL: &str = "https://daldal.so/oauth/token";
/// User-info endpoint returning the profile document for an access token.
pub const USER_INFO_URL: &str = "https://daldal.so/oauth/api/me";

/// Provider tag stamped on every normalized profile; serializes as `"daldalso"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderTag {
	/// Daldalso.
	#[default]
	#[serde(rename = "daldalso")]
	Daldalso,
}
impl ProviderTag {
	/// Returns the stable provider label.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderTag::Daldalso => PROVIDER_NAME,
		}
	}
}
impl Display for ProviderTag {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
