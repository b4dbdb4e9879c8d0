//! Daldalso OAuth 2.0 sign-in strategy: fixed provider endpoints, CSRF state round-trips and a
//! normalized user profile layered on top of the `oauth2` crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod profile;
pub mod provider;
pub mod state;
pub mod strategy;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and demos.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::StrategyOptions,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::ProviderEndpoints,
		state::MemoryStateStore,
		strategy::{Strategy, Verify},
	};

	/// Strategy type alias used by reqwest-backed integration tests.
	pub type ReqwestTestStrategy<V> = Strategy<V, ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Session key integration tests sign in under.
	pub const TEST_SESSION: &str = "session-it";

	/// Options shared by the integration tests.
	pub fn test_options() -> StrategyOptions {
		StrategyOptions::new("client-it", "https://app.example.com/auth/daldalso/callback")
			.with_client_secret("secret-it")
	}

	/// Endpoint set rooted at a local mock server base URL (e.g. `httpmock::MockServer::base_url`).
	pub fn mock_endpoints(base_url: &str) -> ProviderEndpoints {
		let join = |path: &str| {
			Url::parse(&format!("{base_url}{path}")).expect("Mock endpoint URL should parse.")
		};

		ProviderEndpoints {
			authorization: join("/oauth/authorize"),
			token: join("/oauth/token"),
			user_info: join("/oauth/api/me"),
		}
	}

	/// Constructs a [`Strategy`] pointed at a mock server, backed by an
	/// in-memory state store and the reqwest transport used across integration tests.
	pub fn build_reqwest_test_strategy<V>(
		base_url: &str,
		verify: V,
	) -> (ReqwestTestStrategy<V>, Arc<MemoryStateStore>)
	where
		V: Verify,
	{
		let state_backend = Arc::new(MemoryStateStore::default());
		let strategy = ReqwestTestStrategy::<V>::with_http_client(
			test_options(),
			verify,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.expect("Test strategy should build from the fixed Daldalso options.")
		.with_endpoints(mock_endpoints(base_url))
		.with_state_store(state_backend.clone());

		(strategy, state_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

pub use config::{StrategyOptions, build_options};
pub use profile::Profile;
pub use strategy::{AuthenticateRequest, Authentication, FailureReason, Strategy, Verify};
