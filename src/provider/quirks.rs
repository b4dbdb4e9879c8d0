//! How Daldalso expects access tokens to be read and presented.

// self
use crate::_prelude::*;

/// Where an access token travels on authenticated GET requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTokenPlacement {
	/// `Authorization: Bearer <token>` header.
	AuthorizationHeader,
	/// Query parameter named after [`ProviderQuirks::access_token_name`].
	QueryParameter,
}

/// Provider-specific quirks that tune the generic OAuth client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderQuirks {
	/// Name of the field carrying the access token.
	pub access_token_name: &'static str,
	/// How authenticated GETs present the access token.
	pub access_token_placement: AccessTokenPlacement,
}
impl ProviderQuirks {
	/// Quirks Daldalso requires: tokens live in `access_token` and GETs use the header.
	pub const DALDALSO: Self = Self {
		access_token_name: "access_token",
		access_token_placement: AccessTokenPlacement::AuthorizationHeader,
	};
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self::DALDALSO
	}
}
