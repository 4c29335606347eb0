//! Strategy-level error types shared across configuration, token exchange, and profile lookup.

// self
use crate::_prelude::*;

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type JsonPathError = serde_path_to_error::Error<serde_json::Error>;

/// Canonical strategy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Authorization code could not be exchanged for tokens.
	#[error(transparent)]
	TokenExchange(#[from] TokenExchangeError),
	/// Team admin profile could not be resolved.
	#[error("Failed to fetch user profile.")]
	ProfileFetch(#[from] ProfileError),
	/// Verification callback refused the authenticated user.
	#[error("Verification callback failed.")]
	Verify {
		/// Error returned by the callback.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps a verification callback failure.
	pub fn verify(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Verify { source: Box::new(src) }
	}
}

/// Configuration and validation failures raised while assembling the strategy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Client identifier is blank.
	#[error("Client identifier cannot be empty.")]
	MissingClientId,
	/// Configured endpoint cannot be parsed or joined.
	#[error("The {endpoint} endpoint is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Scope separator is empty or contains control characters.
	#[error("Scope separator must be a non-empty printable string.")]
	InvalidScopeSeparator,
	/// Custom header name or value is not valid HTTP.
	#[error("Custom header `{name}` is not a valid HTTP header.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
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

/// Failures raised while locating and normalizing the team admin.
#[derive(Debug, ThisError)]
pub enum ProfileError {
	/// The member listing request failed.
	#[error("Team member listing request failed.")]
	Transport(#[from] TransportError),
	/// A response body or member record did not have the expected shape.
	#[error("Unable to parse the {what}.")]
	Parse {
		/// Which payload failed to parse.
		what: &'static str,
		/// Structured parsing failure including the JSON path.
		#[source]
		source: JsonPathError,
	},
	/// The listing reported more pages without handing out a cursor.
	#[error("Team member listing reported more pages without a cursor.")]
	MissingCursor,
	/// Pagination finished without any member tagged `team_admin`.
	#[error("No team admin member was located.")]
	NotFound,
}

/// Failures raised by the token endpoint exchange.
#[derive(Debug, ThisError)]
pub enum TokenExchangeError {
	/// Token endpoint answered with an OAuth error response.
	#[error("Token endpoint returned an OAuth error: {error}.")]
	Provider {
		/// OAuth `error` code.
		error: String,
		/// OAuth `error_description`, when supplied.
		description: Option<String>,
	},
	/// Token request could not be delivered.
	#[error("Token endpoint request failed.")]
	Transport(#[from] TransportError),
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
	},
	/// Token endpoint returned something the OAuth client could not classify.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Description supplied by the OAuth client.
		message: String,
	},
}

/// Transport-level failures (network, IO, non-success status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// HTTP request could not be assembled.
	#[error("HTTP request could not be built.")]
	Request(#[from] oauth2::http::Error),
	/// Provider answered with a non-success status.
	#[error("Provider responded with HTTP {status}: {body_preview}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
	/// HTTP client failed in a way it could only describe as text.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Client-supplied description.
		message: String,
	},
}
impl TransportError {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds a status failure, truncating the body to a short preview.
	pub fn status(status: u16, body: &[u8]) -> Self {
		Self::Status { status, body_preview: truncate_preview(&String::from_utf8_lossy(body)) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

fn truncate_preview(body: &str) -> String {
	if body.chars().count() <= TransportError::BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= TransportError::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}
