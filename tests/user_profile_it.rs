#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_daldalso::{
	_preludet::*,
	auth::TokenSet,
	error::ProfileError,
	profile::{Libra, Presentation, Profile},
	provider::ProviderTag,
};

async fn accept(_tokens: TokenSet, profile: Profile) -> Result<Option<String>, std::io::Error> {
	Ok(Some(profile.id))
}

#[tokio::test]
async fn user_profile_normalizes_full_document() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(&server.base_url(), accept);
	let body = r#"{"key":"u42","name":"Alice","account":"alice","libra":{"level":7,"prev":1200,"next":1500},"foveon":42.5,"profile":{"image":"https://daldal.so/img/alice.png","text":"hello"}}"#;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/api/me").header("authorization", "Bearer access-42");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await;
	let profile =
		strategy.user_profile("access-42").await.expect("User profile should load successfully.");

	mock.assert_calls_async(1).await;

	assert_eq!(profile.provider, ProviderTag::Daldalso);
	assert_eq!(profile.id, "u42");
	assert_eq!(profile.display_name.as_deref(), Some("Alice"));
	assert_eq!(profile.account.as_deref(), Some("alice"));
	assert_eq!(
		profile.libra,
		Some(Libra { level: Some(7.0), prev: Some(1200.0), next: Some(1500.0) })
	);
	assert_eq!(profile.foveon, Some(42.5));
	assert_eq!(
		profile.profile,
		Some(Presentation {
			image: Some("https://daldal.so/img/alice.png".into()),
			text: Some("hello".into()),
		})
	);
	assert_eq!(profile.raw, body);
	assert_eq!(profile.json["libra"]["level"], 7);
}

#[tokio::test]
async fn user_profile_accepts_key_only_documents() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(&server.base_url(), accept);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/api/me");
			then.status(200).header("content-type", "application/json").body(r#"{"key":"u1"}"#);
		})
		.await;
	let profile = strategy.user_profile("access-1").await.expect("Key-only profile should load.");

	mock.assert_async().await;

	assert_eq!(profile.id, "u1");
	assert_eq!(profile.display_name, None);
	assert_eq!(profile.account, None);
	assert_eq!(profile.libra, None);
	assert_eq!(profile.foveon, None);
	assert_eq!(profile.profile, None);
	assert_eq!(profile.raw, r#"{"key":"u1"}"#);
}

#[tokio::test]
async fn user_profile_reports_non_json_bodies_as_parse_errors() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(&server.base_url(), accept);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/api/me");
			then.status(200).header("content-type", "text/html").body("<html>maintenance</html>");
		})
		.await;
	let err = strategy.user_profile("access-1").await.expect_err("HTML bodies should not parse.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Profile(ProfileError::Parse { path: None, .. })));
}

#[tokio::test]
async fn user_profile_reports_missing_key_as_parse_error() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(&server.base_url(), accept);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/api/me");
			then.status(200).header("content-type", "application/json").body(r#"{"name":"A"}"#);
		})
		.await;
	let err = strategy.user_profile("access-1").await.expect_err("Missing key should fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Profile(ProfileError::Parse { path: Some(_), .. })));
}

#[tokio::test]
async fn user_profile_fails_once_on_unauthorized_without_retrying() {
	let server = MockServer::start_async().await;
	let (strategy, _) = build_reqwest_test_strategy(&server.base_url(), accept);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/api/me");
			then.status(401)
				.header("content-type", "application/json")
				.body(r#"{"error":"invalid_token"}"#);
		})
		.await;
	let err = strategy.user_profile("revoked").await.expect_err("401 responses should fail.");

	mock.assert_calls_async(1).await;

	match err {
		Error::Profile(ProfileError::Transport { status, message }) => {
			assert_eq!(status, Some(401));

			let payload: Value =
				serde_json::from_str(&message).expect("Transport message should be JSON.");

			assert_eq!(payload["statusCode"], 401);
			assert_eq!(payload["data"], r#"{"error":"invalid_token"}"#);
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn user_profile_reports_unreachable_hosts_as_transport_errors() {
	let (strategy, _) = build_reqwest_test_strategy("http://127.0.0.1:1", accept);
	let err = strategy.user_profile("access-1").await.expect_err("Closed ports should fail.");

	assert!(matches!(err, Error::Profile(ProfileError::Transport { status: None, .. })));
}
