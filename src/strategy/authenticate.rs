//! Authorization redirect and callback handling.

// self
use crate::{
	_prelude::*,
	auth::TokenSet,
	error::ConfigError,
	http::TokenHttpClient,
	oauth::{BasicFacade, OAuth2Facade, TransportErrorMapper},
	obs::{FlowKind, FlowOutcome, FlowSpan},
	state::{PendingState, StateCheck},
	strategy::{Strategy, Verify},
};

const RESERVED_AUTHORIZATION_PARAMS: [&str; 5] =
	["response_type", "client_id", "redirect_uri", "scope", "state"];

/// One request reaching the strategy: either a fresh sign-in or the provider's callback.
///
/// `session` identifies the end user's browser session. The `state` issued with a redirect is
/// bound to it and the callback must come back with the same key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticateRequest {
	/// Authorization code returned by the provider.
	pub code: Option<String>,
	/// `state` echoed by the provider.
	pub state: Option<String>,
	/// OAuth error code returned instead of a code.
	pub error: Option<String>,
	/// Human-readable error detail.
	pub error_description: Option<String>,
	/// Link to an error page.
	pub error_uri: Option<String>,
	/// Key of the end user's session.
	#[serde(default)]
	pub session: Option<String>,
	/// URL of the incoming request; a relative redirect URI is resolved against it.
	#[serde(default)]
	pub origin: Option<Url>,
}
impl AuthenticateRequest {
	/// Request that starts a new sign-in.
	pub fn start() -> Self {
		Self::default()
	}

	/// Callback carrying an authorization code and its `state`.
	pub fn callback(code: impl Into<String>, state: impl Into<String>) -> Self {
		Self { code: Some(code.into()), state: Some(state.into()), ..Default::default() }
	}

	/// Extracts the callback parameters from the URL the provider redirected to.
	///
	/// Empty values count as absent; unrelated parameters are ignored. The URL itself becomes the
	/// request's `origin`.
	pub fn from_callback_url(url: &Url) -> Self {
		let mut request = Self { origin: Some(url.clone()), ..Default::default() };

		for (key, value) in url.query_pairs() {
			if value.is_empty() {
				continue;
			}

			let slot = match key.as_ref() {
				"code" => &mut request.code,
				"state" => &mut request.state,
				"error" => &mut request.error,
				"error_description" => &mut request.error_description,
				"error_uri" => &mut request.error_uri,
				_ => continue,
			};

			*slot = Some(value.into_owned());
		}

		request
	}

	/// Attaches the end user's session key.
	pub fn with_session(mut self, session: impl Into<String>) -> Self {
		self.session = Some(session.into());

		self
	}

	/// Sets the URL a relative redirect URI is resolved against.
	pub fn with_origin(mut self, origin: Url) -> Self {
		self.origin = Some(origin);

		self
	}
}

/// Redirect the host must send the end user's browser to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRedirect {
	/// Fully formed authorize URL.
	pub url: Url,
	/// `state` issued into the state store for this redirect.
	pub state: String,
}

/// Why a sign-in ended without a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
	/// The end user declined consent.
	AccessDenied {
		/// Provider-supplied detail.
		description: Option<String>,
	},
	/// The callback carried no `state`.
	MissingState,
	/// The callback `state` was never issued to this session or was already used.
	InvalidState,
	/// The callback `state` outlived its lifetime.
	ExpiredState,
	/// The verification hook declined the profile.
	Rejected,
}
impl Display for FailureReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			FailureReason::AccessDenied { description: Some(description) } =>
				write!(f, "Access denied: {description}."),
			FailureReason::AccessDenied { description: None } => f.write_str("Access denied."),
			FailureReason::MissingState => f.write_str("Authorization state is missing."),
			FailureReason::InvalidState => f.write_str("Authorization state is invalid."),
			FailureReason::ExpiredState => f.write_str("Authorization state has expired."),
			FailureReason::Rejected => f.write_str("Sign-in was rejected."),
		}
	}
}

/// Terminal result of one [`Strategy::authenticate`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authentication<U> {
	/// Send the browser to the provider.
	Redirect(AuthorizationRedirect),
	/// Sign-in completed with the verified user.
	Success(U),
	/// Sign-in ended without a user.
	Fail(FailureReason),
}
impl<U> Authentication<U> {
	/// Returns the user on success.
	pub fn into_user(self) -> Option<U> {
		match self {
			Authentication::Success(user) => Some(user),
			_ => None,
		}
	}
}

impl<V, C, M> Strategy<V, C, M>
where
	V: Verify,
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Drives one step of the sign-in.
	///
	/// - An `error` parameter ends the attempt: `access_denied` becomes
	///   [`FailureReason::AccessDenied`], any other code becomes [`Error::Authorization`].
	/// - Every other request needs a `session`; without one the call fails with
	///   [`Error::SessionRequired`].
	/// - Without a `code`, a fresh `state` bound to the session is issued and the authorize
	///   redirect is returned.
	/// - With a `code`, the `state` is redeemed for the session, the code is exchanged, the
	///   profile is loaded and the verification hook decides the outcome.
	pub async fn authenticate(
		&self,
		request: AuthenticateRequest,
	) -> Result<Authentication<V::User>> {
		let AuthenticateRequest {
			code,
			state,
			error,
			error_description,
			error_uri,
			session,
			origin,
		} = request;

		if let Some(code) = error {
			if code == "access_denied" {
				return Ok(Authentication::Fail(FailureReason::AccessDenied {
					description: error_description,
				}));
			}

			return Err(Error::Authorization {
				code,
				description: error_description,
				uri: error_uri,
			});
		}

		let session = session.ok_or(Error::SessionRequired)?;
		let Some(code) = code else {
			return self
				.authorization_redirect(&session, origin.as_ref())
				.await
				.map(Authentication::Redirect);
		};
		let redirect_uri = self.redirect_uri(origin.as_ref())?;
		let span = FlowSpan::new(FlowKind::CodeExchange, "authenticate");

		if let Err(reason) = self.redeem_state(&session, state.as_deref()).await? {
			span.finish(FlowOutcome::Rejected);

			return Ok(Authentication::Fail(reason));
		}

		let tokens =
			span.finish_with(span.instrument(self.exchange_code(&code, redirect_uri)).await)?;
		let profile = self.user_profile(tokens.access_token.expose()).await?;

		match self.verify.verify(tokens, profile).await {
			Ok(Some(user)) => Ok(Authentication::Success(user)),
			Ok(None) => Ok(Authentication::Fail(FailureReason::Rejected)),
			Err(source) => Err(Error::Verify { source }),
		}
	}

	/// Issues a `state` bound to `session` and builds the authorize redirect.
	///
	/// `origin` is the URL of the incoming request; it is only consulted when the configured
	/// redirect URI is relative.
	pub async fn authorization_redirect(
		&self,
		session: &str,
		origin: Option<&Url>,
	) -> Result<AuthorizationRedirect> {
		let redirect_uri = self.redirect_uri(origin)?;
		let span = FlowSpan::new(FlowKind::Authorize, "authorization_redirect");
		let pending = PendingState::generate(session, self.state_ttl);
		let issued = span.instrument(self.state_store.issue(pending.clone())).await;

		span.finish_with(issued.map_err(Error::from))?;

		let url = self.authorize_url(&pending.handle, &redirect_uri);

		Ok(AuthorizationRedirect { url, state: pending.handle })
	}

	/// Builds the authorize URL for an already issued `state`.
	pub fn authorize_url(&self, state: &str, redirect_uri: &Url) -> Url {
		let mut url = self.endpoints.authorization.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.options.client_id);
		pairs.append_pair("redirect_uri", redirect_uri.as_str());

		if let Some(scope) = self.scope.join(self.options.scope_delimiter) {
			pairs.append_pair("scope", &scope);
		}

		pairs.append_pair("state", state);

		for (key, value) in &self.options.authorization_params {
			if !RESERVED_AUTHORIZATION_PARAMS.contains(&key.as_str()) {
				pairs.append_pair(key, value);
			}
		}

		drop(pairs);

		url
	}

	/// Resolves the configured redirect URI, joining a relative one onto `origin`.
	pub fn redirect_uri(&self, origin: Option<&Url>) -> Result<Url> {
		let raw = &self.options.redirect_uri;
		let resolved = match (Url::parse(raw), origin) {
			(Ok(url), _) => Ok(url),
			(Err(url::ParseError::RelativeUrlWithoutBase), Some(origin)) => origin.join(raw),
			(Err(source), _) => Err(source),
		};

		Ok(resolved.map_err(|source| ConfigError::InvalidRedirect { url: raw.clone(), source })?)
	}

	async fn redeem_state(
		&self,
		session: &str,
		state: Option<&str>,
	) -> Result<Result<(), FailureReason>> {
		let Some(state) = state else {
			return Ok(Err(FailureReason::MissingState));
		};

		Ok(match self.state_store.redeem(session, state).await? {
			StateCheck::Valid(pending) if pending.session == session => Ok(()),
			StateCheck::Valid(_) | StateCheck::Unknown => Err(FailureReason::InvalidState),
			StateCheck::Expired => Err(FailureReason::ExpiredState),
		})
	}

	async fn exchange_code(&self, code: &str, redirect_uri: Url) -> Result<TokenSet> {
		let facade = BasicFacade::from_options(
			&self.endpoints,
			&self.options,
			redirect_uri,
			self.http_client.clone(),
			self.transport_mapper.clone(),
		);

		facade.exchange_authorization_code(code).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn callback_url_parameters_are_extracted() {
		let url = Url::parse(
			"https://app.example.com/cb?code=abc&state=xyz&foo=bar&error_description=",
		)
		.expect("Callback fixture should parse.");

		assert_eq!(
			AuthenticateRequest::from_callback_url(&url),
			AuthenticateRequest::callback("abc", "xyz").with_origin(url.clone())
		);
	}

	#[test]
	fn callback_url_errors_are_extracted() {
		let url = Url::parse(
			"https://app.example.com/cb?error=access_denied&error_description=User+said+no",
		)
		.expect("Callback fixture should parse.");
		let request = AuthenticateRequest::from_callback_url(&url);

		assert_eq!(request.error.as_deref(), Some("access_denied"));
		assert_eq!(request.error_description.as_deref(), Some("User said no"));
		assert!(request.code.is_none());
		assert!(request.session.is_none());
	}

	#[test]
	fn failure_reasons_render_messages() {
		assert_eq!(
			FailureReason::AccessDenied { description: Some("nope".into()) }.to_string(),
			"Access denied: nope."
		);
		assert_eq!(FailureReason::ExpiredState.to_string(), "Authorization state has expired.");
	}
}
