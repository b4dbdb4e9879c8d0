//! Strategy-level error types shared across the authorization flow, the token exchange, and the
//! profile fetcher.

// self
use crate::_prelude::*;

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error returned by caller-supplied hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical strategy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure at the token endpoint.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS) while calling the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The user-info endpoint could not be fetched or its body could not be parsed.
	#[error(transparent)]
	Profile(#[from] ProfileError),
	/// State store failure.
	#[error("{0}")]
	State(
		#[from]
		#[source]
		crate::state::StateStoreError,
	),
	/// The request carried no session key to bind or check the `state` against.
	#[error("A session key is required to bind the authorization state.")]
	SessionRequired,
	/// The caller's verification hook failed.
	#[error("Verification callback failed.")]
	Verify {
		/// Error returned by the verification hook.
		#[source]
		source: BoxError,
	},

	/// The provider redirected back with an OAuth error other than `access_denied`.
	#[error("Authorization endpoint returned an OAuth error: {code}.")]
	Authorization {
		/// Provider-supplied `error` parameter.
		code: String,
		/// Provider-supplied `error_description` parameter.
		description: Option<String>,
		/// Provider-supplied `error_uri` parameter.
		uri: Option<String>,
	},
	/// Requested scopes exceed what the client may obtain.
	#[error("Token lacks the required scopes: {reason}.")]
	InsufficientScope {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Provider rejected the grant (e.g., a stale authorization code).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Wraps a verification hook failure.
	pub fn verify(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Verify { source: Box::new(src) }
	}
}

/// Configuration failures raised while wiring the OAuth client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// One of the provider endpoints is not a valid URL.
	#[error("The {endpoint} endpoint is not a valid URL: {url}.")]
	InvalidEndpoint {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Raw endpoint value.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid: {url}.")]
	InvalidRedirect {
		/// Raw redirect URI value.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Configured scopes cannot be normalized.
	#[error("Configured scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants at the token endpoint.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected but non-fatal response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or strategy-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO) at the token endpoint.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures reported by the profile fetcher.
///
/// There are exactly two kinds: the user-info call failed, or its body could not be parsed.
/// Missing optional profile fields never produce an error.
#[derive(Debug, ThisError)]
pub enum ProfileError {
	/// The user-info request failed at the transport or HTTP layer.
	#[error("Failed to fetch user profile: {message}.")]
	Transport {
		/// HTTP status code, when a response was received.
		status: Option<u16>,
		/// Stringified failure detail.
		message: String,
	},
	/// The user-info body is not valid JSON or lacks the `key` field.
	#[error("Failed to parse user profile{}.", .path.as_deref().map(|p| format!(" at `{p}`")).unwrap_or_default())]
	Parse {
		/// JSON path of the offending value, when the body itself was valid JSON.
		path: Option<String>,
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
}
impl From<serde_json::Error> for ProfileError {
	fn from(source: serde_json::Error) -> Self {
		Self::Parse { path: None, source }
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ProfileError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Parse { path: Some(path), source: e.into_inner() }
	}
}
