#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_daldalso::{
	_preludet::*,
	auth::TokenSet,
	profile::Profile,
	strategy::{AuthenticateRequest, Authentication, FailureReason},
};

const TOKEN_BODY: &str = "{\"access_token\":\"access-it\",\"refresh_token\":\"refresh-it\",\"token_type\":\"bearer\",\"expires_in\":3600}";

#[derive(Debug, PartialEq)]
struct SignedIn {
	id: String,
	name: Option<String>,
	access_token: String,
	refresh_token: Option<String>,
}

async fn sign_in(tokens: TokenSet, profile: Profile) -> Result<Option<SignedIn>, std::io::Error> {
	Ok(Some(SignedIn {
		id: profile.id,
		name: profile.display_name,
		access_token: tokens.access_token.expose().to_owned(),
		refresh_token: tokens.refresh_token.map(|secret| secret.expose().to_owned()),
	}))
}

async fn reject_all(_tokens: TokenSet, _profile: Profile) -> Result<Option<()>, std::io::Error> {
	Ok(None)
}

async fn explode(_tokens: TokenSet, _profile: Profile) -> Result<Option<()>, std::io::Error> {
	Err(std::io::Error::other("user directory offline"))
}

fn session_callback(code: &str, state: &str) -> AuthenticateRequest {
	AuthenticateRequest::callback(code, state).with_session(TEST_SESSION)
}

fn callback_url(code: &str, state: &str) -> Url {
	let mut url = Url::parse(&test_options().redirect_uri).expect("Redirect URI should parse.");

	url.query_pairs_mut().append_pair("code", code).append_pair("state", state);

	url
}

async fn mock_token_and_profile(server: &MockServer) -> (httpmock::Mock<'_>, httpmock::Mock<'_>) {
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/api/me").header("authorization", "Bearer access-it");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"key":"u7","name":"Mina"}"#);
		})
		.await;

	(token, profile)
}

#[tokio::test]
async fn authenticate_redirects_then_signs_in() {
	let server = MockServer::start_async().await;
	let (strategy, states) = build_reqwest_test_strategy(&server.base_url(), sign_in);
	let redirect = match strategy
		.authenticate(AuthenticateRequest::start().with_session(TEST_SESSION))
		.await
		.expect("Starting a sign-in should succeed.")
	{
		Authentication::Redirect(redirect) => redirect,
		other => panic!("Expected a redirect, got {other:?}."),
	};

	assert_eq!(states.len(), 1);
	assert_eq!(redirect.state.len(), 24);
	assert_eq!(redirect.url.path(), "/oauth/authorize");

	let pairs: HashMap<_, _> = redirect.url.query_pairs().into_owned().collect();

	assert_eq!(pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(pairs.get("client_id"), Some(&"client-it".into()));
	assert_eq!(pairs.get("redirect_uri"), Some(&test_options().redirect_uri));
	assert_eq!(pairs.get("state"), Some(&redirect.state));
	assert!(!pairs.contains_key("scope"));

	let (token, profile) = mock_token_and_profile(&server).await;
	let outcome = strategy
		.authenticate(
			AuthenticateRequest::from_callback_url(&callback_url("code-it", &redirect.state))
				.with_session(TEST_SESSION),
		)
		.await
		.expect("Callback should complete the sign-in.");

	token.assert_calls_async(1).await;
	profile.assert_calls_async(1).await;

	assert_eq!(
		outcome,
		Authentication::Success(SignedIn {
			id: "u7".into(),
			name: Some("Mina".into()),
			access_token: "access-it".into(),
			refresh_token: Some("refresh-it".into()),
		})
	);
	assert!(states.is_empty());
}

#[tokio::test]
async fn state_is_single_use() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(&server.base_url(), sign_in);
	let redirect =
		strategy.authorization_redirect(TEST_SESSION, None).await.expect("Redirect should build.");
	let (token, _profile) = mock_token_and_profile(&server).await;
	let first = strategy
		.authenticate(session_callback("code-it", &redirect.state))
		.await
		.expect("First callback should succeed.");
	let replay = strategy
		.authenticate(session_callback("code-it", &redirect.state))
		.await
		.expect("Replayed callback should fail softly.");

	token.assert_calls_async(1).await;

	assert!(matches!(first, Authentication::Success(_)));
	assert_eq!(replay, Authentication::Fail(FailureReason::InvalidState));
}

#[tokio::test]
async fn mismatched_or_missing_state_never_reaches_token_endpoint() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(&server.base_url(), sign_in);
	let (token, profile) = mock_token_and_profile(&server).await;

	strategy.authorization_redirect(TEST_SESSION, None).await.expect("Redirect should build.");

	let forged = strategy
		.authenticate(session_callback("code-it", "forged-state"))
		.await
		.expect("Forged state should fail softly.");
	let missing = strategy
		.authenticate(AuthenticateRequest {
			code: Some("code-it".into()),
			session: Some(TEST_SESSION.into()),
			..Default::default()
		})
		.await
		.expect("Missing state should fail softly.");

	assert_eq!(forged, Authentication::Fail(FailureReason::InvalidState));
	assert_eq!(missing, Authentication::Fail(FailureReason::MissingState));

	token.assert_calls_async(0).await;
	profile.assert_calls_async(0).await;
}

#[tokio::test]
async fn expired_state_fails_softly() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(&server.base_url(), sign_in);
	let strategy = strategy.with_state_ttl(Duration::ZERO);
	let redirect =
		strategy.authorization_redirect(TEST_SESSION, None).await.expect("Redirect should build.");
	let outcome = strategy
		.authenticate(session_callback("code-it", &redirect.state))
		.await
		.expect("Expired state should fail softly.");

	assert_eq!(outcome, Authentication::Fail(FailureReason::ExpiredState));
}

#[tokio::test]
async fn provider_errors_on_callback_are_classified() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(&server.base_url(), sign_in);
	let denied = Url::parse(
		"https://app.example.com/auth/daldalso/callback?error=access_denied&error_description=User+declined",
	)
	.expect("Denied callback should parse.");
	let outcome = strategy
		.authenticate(AuthenticateRequest::from_callback_url(&denied))
		.await
		.expect("Denied consent should fail softly.");

	assert_eq!(
		outcome,
		Authentication::Fail(FailureReason::AccessDenied {
			description: Some("User declined".into())
		})
	);

	let err = strategy
		.authenticate(AuthenticateRequest {
			error: Some("server_error".into()),
			error_uri: Some("https://daldal.so/help".into()),
			..Default::default()
		})
		.await
		.expect_err("Other provider errors should surface.");

	assert!(matches!(
		err,
		Error::Authorization { ref code, uri: Some(_), .. } if code == "server_error"
	));
}

#[tokio::test]
async fn invalid_grant_is_classified() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(&server.base_url(), sign_in);
	let redirect =
		strategy.authorization_redirect(TEST_SESSION, None).await.expect("Redirect should build.");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"already used\"}");
		})
		.await;
	let err = strategy
		.authenticate(session_callback("stale-code", &redirect.state))
		.await
		.expect_err("Invalid grant errors should be classified correctly.");

	mock.assert_async().await;

	assert!(matches!(err, Error::InvalidGrant { .. }));
}

#[tokio::test]
async fn verify_rejection_and_failure_are_distinct() {
	let server = MockServer::start_async().await;
	let (rejecting, _) = build_reqwest_test_strategy(&server.base_url(), reject_all);
	let (failing, _) = build_reqwest_test_strategy(&server.base_url(), explode);
	let _mocks = mock_token_and_profile(&server).await;
	let redirect =
		rejecting.authorization_redirect(TEST_SESSION, None).await.expect("Redirect should build.");
	let outcome = rejecting
		.authenticate(session_callback("code-it", &redirect.state))
		.await
		.expect("Rejection should fail softly.");

	assert_eq!(outcome, Authentication::Fail(FailureReason::Rejected));

	let redirect =
		failing.authorization_redirect(TEST_SESSION, None).await.expect("Redirect should build.");
	let err = failing
		.authenticate(session_callback("code-it", &redirect.state))
		.await
		.expect_err("Hook failures should surface.");

	assert!(matches!(err, Error::Verify { .. }));
	assert!(
		StdError::source(&err).is_some_and(|source| source.to_string() == "user directory offline")
	);
}

#[tokio::test]
async fn state_from_another_session_is_refused() {
	let server = MockServer::start_async().await;
	let (strategy, states) = build_reqwest_test_strategy(&server.base_url(), sign_in);
	let (token, profile) = mock_token_and_profile(&server).await;
	let attacker = strategy
		.authorization_redirect("session-attacker", None)
		.await
		.expect("Redirect should build.");
	let outcome = strategy
		.authenticate(
			AuthenticateRequest::from_callback_url(&callback_url("attacker-code", &attacker.state))
				.with_session(TEST_SESSION),
		)
		.await
		.expect("Foreign state should fail softly.");

	assert_eq!(outcome, Authentication::Fail(FailureReason::InvalidState));
	assert_eq!(states.len(), 1);

	token.assert_calls_async(0).await;
	profile.assert_calls_async(0).await;
}

#[tokio::test]
async fn requests_without_a_session_are_errors() {
	let server = MockServer::start_async().await;
	let (strategy, states) = build_reqwest_test_strategy(&server.base_url(), sign_in);
	let err = strategy
		.authenticate(AuthenticateRequest::start())
		.await
		.expect_err("A sign-in cannot start without a session.");

	assert!(matches!(err, Error::SessionRequired));
	assert!(states.is_empty());
}
