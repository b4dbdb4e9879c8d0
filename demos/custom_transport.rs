//! Demonstrates running a full Daldalso sign-in over a custom, non-reqwest transport.
//!
//! 1. Implement [`TokenHttpClient`] so the transport records [`ResponseMetadata`] via the provided
//!    [`ResponseMetadataSlot`].
//! 2. Provide a [`TransportErrorMapper`] that understands both the transport error type and the
//!    captured metadata.
//! 3. Pass both to [`Strategy::with_http_client`]; the same transport serves the token exchange
//!    and the user-info fetch.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use color_eyre::Result;
use time::Duration;
// self
use oauth2_daldalso::{
	StrategyOptions,
	auth::TokenSet,
	error::{Error, TransientError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{
		TransportErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
			http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
		},
	},
	profile::Profile,
	strategy::{AuthenticateRequest, Authentication, Strategy, Verify},
};

const SESSION: &str = "demo-session";
const TOKEN_BODY: &str =
	"{\"access_token\":\"mock-access\",\"token_type\":\"bearer\",\"expires_in\":900}";
const PROFILE_BODY: &str = "{\"key\":\"u1\",\"name\":\"Mina\",\"libra\":{\"level\":3,\"prev\":100,\"next\":200},\"foveon\":12.5}";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let mapper = Arc::new(MockTransportErrorMapper);
	let strategy = build(MockHttpClient::default(), Arc::clone(&mapper))?;
	let redirect = strategy.authorization_redirect(SESSION, None).await?;

	println!("Authorize URL: {}.", redirect.url);

	let callback = AuthenticateRequest::callback("mock-code", redirect.state).with_session(SESSION);

	match strategy.authenticate(callback).await? {
		Authentication::Success(profile) => println!(
			"Signed in {} ({:?}) at libra level {:?}.",
			profile.id,
			profile.display_name,
			profile.libra.and_then(|libra| libra.level)
		),
		other => println!("Sign-in did not complete: {other:?}."),
	}

	let failing = build(
		MockHttpClient::transport_error(MockTransportError::DnsFailure { host: "daldal.so" }),
		mapper,
	)?;
	let redirect = failing.authorization_redirect(SESSION, None).await?;
	let callback = AuthenticateRequest::callback("mock-code", redirect.state).with_session(SESSION);

	match failing.authenticate(callback).await {
		Ok(outcome) => println!("Mock transport unexpectedly succeeded: {outcome:?}."),
		Err(e) => println!("Transport error mapped by the strategy: {e}"),
	}

	match failing.user_profile("mock-access").await {
		Ok(profile) => println!("Mock transport unexpectedly produced {}.", profile.id),
		Err(e) => println!("Profile fetch failed without retrying: {e}"),
	}

	Ok(())
}

fn build(
	http_client: MockHttpClient,
	mapper: Arc<MockTransportErrorMapper>,
) -> Result<Strategy<impl Verify<User = Profile>, MockHttpClient, MockTransportErrorMapper>> {
	let options = StrategyOptions::new("demo-client", "https://app.example.com/callback")
		.with_client_secret("demo-secret");
	let verify = |_tokens: TokenSet, profile: Profile| async move {
		Ok::<_, std::io::Error>(Some(profile))
	};

	Ok(Strategy::with_http_client(options, verify, http_client, mapper)?)
}

#[derive(Clone, Debug)]
enum MockTransportError {
	DnsFailure { host: &'static str },
}
impl Display for MockTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::DnsFailure { host } => write!(f, "DNS lookup failed for {host}"),
		}
	}
}
impl StdError for MockTransportError {}

#[derive(Clone, Default)]
struct MockHttpClient {
	failure: Option<MockTransportError>,
}
impl MockHttpClient {
	fn transport_error(error: MockTransportError) -> Self {
		Self { failure: Some(error) }
	}
}
impl TokenHttpClient for MockHttpClient {
	type Handle = MockHttpHandle;
	type TransportError = MockTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		MockHttpHandle { slot, failure: self.failure.clone() }
	}
}

struct MockHttpHandle {
	slot: ResponseMetadataSlot,
	failure: Option<MockTransportError>,
}
impl<'a> AsyncHttpClient<'a> for MockHttpHandle {
	type Error = HttpClientError<MockTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let failure = self.failure.clone();

		Box::pin(async move {
			slot.take();

			if let Some(error) = failure {
				slot.store(ResponseMetadata {
					status: Some(503),
					retry_after: Some(Duration::seconds(2)),
				});

				return Err(HttpClientError::Reqwest(Box::new(error)));
			}

			let body = match request.uri().path() {
				"/oauth/token" => TOKEN_BODY,
				"/oauth/api/me" => PROFILE_BODY,
				other => return Err(HttpClientError::Other(format!("No mock route for {other}"))),
			};
			let mut response = HttpResponse::new(body.as_bytes().to_vec());

			slot.store(ResponseMetadata { status: Some(200), retry_after: None });

			*response.status_mut() = StatusCode::OK;
			response
				.headers_mut()
				.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

			Ok(response)
		})
	}
}

#[derive(Clone, Default)]
struct MockTransportErrorMapper;
impl TransportErrorMapper<MockTransportError> for MockTransportErrorMapper {
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<MockTransportError>,
	) -> Error {
		let message = match error {
			HttpClientError::Reqwest(inner) => format!("Mock transport error: {inner}."),
			HttpClientError::Other(text) => format!("Mock transport error: {text}."),
			_ => "Mock transport error.".to_owned(),
		};

		TransientError::TokenEndpoint {
			message,
			status: metadata.and_then(|meta| meta.status),
			retry_after: metadata.and_then(|meta| meta.retry_after),
		}
		.into()
	}
}
