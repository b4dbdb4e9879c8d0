//! Parsed endpoint set the strategy sends requests to.

// self
use crate::{_prelude::*, config::StrategyOptions, error::ConfigError, provider::USER_INFO_URL};

/// Endpoint set the strategy talks to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint used to build the consent redirect.
	pub authorization: Url,
	/// Token endpoint used for code exchanges.
	pub token: Url,
	/// User-info endpoint queried with the access token.
	pub user_info: Url,
}
impl ProviderEndpoints {
	/// Parses the endpoints carried by built options plus the fixed user-info URL.
	///
	/// Options are never validated when built, so malformed URLs surface here.
	pub fn from_options(options: &StrategyOptions) -> Result<Self, ConfigError> {
		Ok(Self {
			authorization: parse_endpoint("authorization", &options.authorization_url)?,
			token: parse_endpoint("token", &options.token_url)?,
			user_info: parse_endpoint("user_info", USER_INFO_URL)?,
		})
	}
}

fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint {
		endpoint,
		url: raw.to_owned(),
		source,
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::config::build_options;

	#[test]
	fn built_options_resolve_to_fixed_endpoints() {
		let options = build_options(StrategyOptions::new("client", "https://app.example.com/cb"));
		let endpoints =
			ProviderEndpoints::from_options(&options).expect("Fixed endpoints should parse.");

		assert_eq!(endpoints.authorization.as_str(), "https://daldal.so/oauth/authorize");
		assert_eq!(endpoints.token.as_str(), "https://daldal.so/oauth/token");
		assert_eq!(endpoints.user_info.as_str(), "https://daldal.so/oauth/api/me");
	}

	#[test]
	fn malformed_endpoints_surface_as_config_errors() {
		let mut options =
			build_options(StrategyOptions::new("client", "https://app.example.com/cb"));

		options.token_url = "not a url".into();

		let err = ProviderEndpoints::from_options(&options)
			.expect_err("Malformed token URL should be rejected when parsed.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { endpoint: "token", .. }));
	}
}
