//! Strategy options and the builder that pins them to Daldalso.
//!
//! [`StrategyOptions`] is a plain record: hosts fill in the client credentials and redirect URI
//! (by hand or by deserializing their own config file) and [`build_options`] stamps the fixed
//! provider endpoints and the `state` requirement on top. Nothing is validated at this stage;
//! malformed values surface as [`ConfigError`](crate::error::ConfigError)s once the strategy
//! parses them.

// self
use crate::{
	_prelude::*,
	provider::{AUTHORIZATION_URL, TOKEN_URL},
};

/// Client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	#[default]
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Options record consumed by [`Strategy`](crate::strategy::Strategy).
///
/// Keys deserialize in `snake_case`; the camel-case spellings used by other OAuth tooling
/// (`clientID`, `clientSecret`, `callbackURL`, ...) are accepted as aliases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyOptions {
	/// OAuth client identifier.
	#[serde(alias = "clientID", alias = "clientId")]
	pub client_id: String,
	/// OAuth client secret, absent for public clients.
	#[serde(default, alias = "clientSecret")]
	pub client_secret: Option<String>,
	/// URI the provider redirects back to after consent.
	#[serde(alias = "callbackURL")]
	pub redirect_uri: String,
	/// Authorization endpoint; overwritten by [`build_options`].
	#[serde(default, alias = "authorizationURL")]
	pub authorization_url: String,
	/// Token endpoint; overwritten by [`build_options`].
	#[serde(default, alias = "tokenURL")]
	pub token_url: String,
	/// Whether a CSRF `state` must round-trip; forced on by [`build_options`].
	#[serde(default)]
	pub state: bool,
	/// Scopes requested on the authorization redirect.
	#[serde(default)]
	pub scope: Vec<String>,
	/// Delimiter used to join scopes.
	#[serde(default = "default_scope_delimiter", alias = "scopeSeparator")]
	pub scope_delimiter: char,
	/// How the client authenticates at the token endpoint.
	#[serde(default)]
	pub client_auth_method: ClientAuthMethod,
	/// Extra query parameters appended to the authorization redirect.
	#[serde(default)]
	pub authorization_params: BTreeMap<String, String>,
}
impl StrategyOptions {
	/// Creates options for the given client identifier and redirect URI.
	pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: None,
			redirect_uri: redirect_uri.into(),
			authorization_url: String::new(),
			token_url: String::new(),
			state: false,
			scope: Vec::new(),
			scope_delimiter: default_scope_delimiter(),
			client_auth_method: ClientAuthMethod::default(),
			authorization_params: BTreeMap::new(),
		}
	}

	/// Sets the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Replaces the requested scopes.
	pub fn with_scope<I, S>(mut self, scope: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope = scope.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the scope delimiter.
	pub fn with_scope_delimiter(mut self, delimiter: char) -> Self {
		self.scope_delimiter = delimiter;

		self
	}

	/// Overrides the token endpoint client authentication method.
	pub fn with_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Adds an extra authorization redirect parameter.
	pub fn with_authorization_param(
		mut self,
		key: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		self.authorization_params.insert(key.into(), value.into());

		self
	}

	/// Stamps the Daldalso endpoints and the `state` requirement onto these options in place.
	///
	/// Values the caller supplied for these three fields are discarded.
	pub fn apply_provider_defaults(&mut self) -> &mut Self {
		self.authorization_url = AUTHORIZATION_URL.to_owned();
		self.token_url = TOKEN_URL.to_owned();
		self.state = true;

		self
	}
}

/// Pins `options` to Daldalso and hands them back.
///
/// Overwrites the authorization endpoint, the token endpoint and the `state` flag regardless of
/// their previous values; every other field passes through untouched.
pub fn build_options(mut options: StrategyOptions) -> StrategyOptions {
	options.apply_provider_defaults();

	options
}

fn default_scope_delimiter() -> char {
	' '
}
