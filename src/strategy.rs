//! The Daldalso sign-in strategy.
//!
//! [`Strategy`] owns the pinned options, the HTTP transport, the state store and the host's
//! [`Verify`] hook. [`Strategy::authenticate`] walks the authorization-code sign-in end to end;
//! [`Strategy::user_profile`] is the profile fetcher it uses once an access token is known.

pub mod authenticate;
pub mod verify;

pub use authenticate::*;
pub use verify::*;

// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	config::{StrategyOptions, build_options},
	error::ProfileError,
	http::{self, TokenHttpClient},
	oauth::TransportErrorMapper,
	obs::{FlowKind, FlowSpan},
	profile::Profile,
	provider::{PROVIDER_NAME, ProviderEndpoints, ProviderQuirks},
	state::{DEFAULT_STATE_TTL, MemoryStateStore, StateStore},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Strategy specialized for the crate's default reqwest transport stack.
pub type ReqwestStrategy<V> = Strategy<V, ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Daldalso OAuth 2.0 sign-in strategy.
///
/// Construction pins the options to Daldalso (see [`build_options`]) and parses the provider
/// endpoints. Caller-supplied values such as the redirect URI are taken as given; a redirect URI
/// that cannot be resolved fails the request that needs it. The strategy holds no per-attempt
/// state besides what it writes to its [`StateStore`]; share one instance across concurrent
/// requests.
pub struct Strategy<V, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	options: StrategyOptions,
	scope: ScopeSet,
	endpoints: ProviderEndpoints,
	quirks: ProviderQuirks,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	state_store: Arc<dyn StateStore>,
	state_ttl: Duration,
	verify: V,
}
impl<V, C, M> Strategy<V, C, M>
where
	V: Verify,
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a strategy that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		options: StrategyOptions,
		verify: V,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let options = build_options(options);
		let scope = ScopeSet::from_configured(&options.scope, options.scope_delimiter);
		let endpoints = ProviderEndpoints::from_options(&options)?;

		Ok(Self {
			options,
			scope,
			endpoints,
			quirks: ProviderQuirks::DALDALSO,
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			state_store: Arc::new(MemoryStateStore::default()),
			state_ttl: DEFAULT_STATE_TTL,
			verify,
		})
	}

	/// Points the strategy at different endpoints (staging hosts, local mock servers).
	pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
		self.endpoints = endpoints;

		self
	}

	/// Replaces the state store, e.g. with one shared across processes.
	pub fn with_state_store(mut self, state_store: Arc<dyn StateStore>) -> Self {
		self.state_store = state_store;

		self
	}

	/// Overrides the lifetime stamped on issued `state` handles; this is the only place a handle's
	/// lifetime is configured.
	pub fn with_state_ttl(mut self, ttl: Duration) -> Self {
		self.state_ttl = ttl;

		self
	}

	/// Strategy name hosts register this strategy under.
	pub fn name(&self) -> &'static str {
		PROVIDER_NAME
	}

	/// Pinned options.
	pub fn options(&self) -> &StrategyOptions {
		&self.options
	}

	/// Endpoints the strategy calls.
	pub fn endpoints(&self) -> &ProviderEndpoints {
		&self.endpoints
	}

	/// Provider quirks applied to outbound requests.
	pub fn quirks(&self) -> ProviderQuirks {
		self.quirks
	}

	/// Fetches and normalizes the profile for `access_token`.
	///
	/// Sends exactly one GET to the user-info endpoint and never retries. Transport failures and
	/// non-2xx statuses yield [`ProfileError::Transport`]; for the latter the body is quoted in the
	/// message with invalid UTF-8 replaced. Successful bodies that are not UTF-8 JSON yield
	/// [`ProfileError::Parse`].
	pub async fn user_profile(&self, access_token: &str) -> Result<Profile> {
		let span = FlowSpan::new(FlowKind::UserProfile, "user_profile");
		let profile = span.instrument(self.fetch_profile(access_token)).await;

		span.finish_with(profile)
	}

	async fn fetch_profile(&self, access_token: &str) -> Result<Profile> {
		let request =
			http::authenticated_get(&self.endpoints.user_info, access_token, self.quirks)?;
		let response = http::send(self.http_client.as_ref(), request)
			.await
			.map_err(|err| ProfileError::Transport { status: None, message: error_chain(&err) })?;
		let status = response.status();

		if !status.is_success() {
			let body = String::from_utf8_lossy(response.body());
			let message = serde_json::json!({ "statusCode": status.as_u16(), "data": body });

			return Err(ProfileError::Transport {
				status: Some(status.as_u16()),
				message: message.to_string(),
			}
			.into());
		}

		Ok(Profile::from_bytes(response.into_body())?)
	}
}
#[cfg(feature = "reqwest")]
impl<V> Strategy<V, ReqwestHttpClient, ReqwestTransportErrorMapper>
where
	V: Verify,
{
	/// Creates a strategy backed by its own reqwest transport.
	pub fn new(options: StrategyOptions, verify: V) -> Result<Self> {
		Self::with_http_client(
			options,
			verify,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<V, C, M> Debug for Strategy<V, C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Strategy")
			.field("name", &PROVIDER_NAME)
			.field("client_id", &self.options.client_id)
			.field("client_secret_set", &self.options.client_secret.is_some())
			.field("endpoints", &self.endpoints)
			.field("state_ttl", &self.state_ttl)
			.finish()
	}
}

fn error_chain(err: &dyn StdError) -> String {
	let mut message = err.to_string();
	let mut source = err.source();

	while let Some(inner) = source {
		message.push_str(": ");
		message.push_str(&inner.to_string());

		source = inner.source();
	}

	message
}
