//! Strategy configuration (data) and the builder that fills in Dropbox defaults.
//!
//! [`StrategyConfig`] is immutable once built. Callers either drive
//! [`StrategyConfigBuilder`] directly or deserialize [`StrategyOptions`] from their own
//! configuration source and hand it to [`StrategyConfig::from_options`].

/// Builder API and serde-friendly options for assembling strategy configs.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Canonical Dropbox authorization endpoint.
pub const DEFAULT_AUTHORIZATION_URL: &str = "https://www.dropbox.com/oauth2/authorize";
/// Canonical Dropbox token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://api.dropboxapi.com/oauth2/token";
/// Base URL of the Dropbox v2 RPC API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.dropboxapi.com/2/";
/// Separator Dropbox expects between requested scopes.
pub const DEFAULT_SCOPE_SEPARATOR: &str = ",";
/// Header sent with every API call when the caller supplies none.
pub const DEFAULT_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

/// Dropbox API generations accepted by the configuration surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
	/// Legacy v1 API (accepted for compatibility, never used).
	#[serde(rename = "1")]
	V1,
	/// Current v2 RPC API.
	#[default]
	#[serde(rename = "2")]
	V2,
}
impl ApiVersion {
	/// Returns the version label used in API paths.
	pub const fn as_str(self) -> &'static str {
		match self {
			ApiVersion::V1 => "1",
			ApiVersion::V2 => "2",
		}
	}
}
impl Display for ApiVersion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Immutable configuration consumed by the strategy.
#[derive(Clone, PartialEq, Eq)]
pub struct StrategyConfig {
	/// API generation; always [`ApiVersion::V2`] after construction.
	pub api_version: ApiVersion,
	/// OAuth 2.0 client identifier (Dropbox app key).
	pub client_id: String,
	/// OAuth 2.0 client secret (Dropbox app secret).
	pub client_secret: String,
	/// Authorization endpoint users are redirected to.
	pub authorization_url: Url,
	/// Token endpoint used for the code exchange.
	pub token_url: Url,
	/// Redirect URI registered with Dropbox, if any.
	pub callback_url: Option<Url>,
	/// Base URL for API calls; always ends with `/`.
	pub api_base_url: Url,
	/// String placed between requested scopes.
	pub scope_separator: String,
	/// Headers attached to every API call.
	pub custom_headers: BTreeMap<String, String>,
}
impl StrategyConfig {
	/// Creates a new builder for the provided client credentials.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> StrategyConfigBuilder {
		StrategyConfigBuilder::new(client_id, client_secret)
	}

	/// Builds a configuration from deserialized options, applying the same defaults.
	pub fn from_options(options: StrategyOptions) -> Result<Self, ConfigError> {
		options.into_builder().build()
	}

	/// Joins the requested scopes with the configured separator.
	///
	/// Blank entries are skipped; `None` means no `scope` parameter should be sent.
	pub fn join_scopes<'a, I>(&self, scopes: I) -> Option<String>
	where
		I: IntoIterator<Item = &'a str>,
	{
		let mut buf = String::new();

		for scope in scopes.into_iter().map(str::trim).filter(|scope| !scope.is_empty()) {
			if !buf.is_empty() {
				buf.push_str(&self.scope_separator);
			}

			buf.push_str(scope);
		}

		if buf.is_empty() { None } else { Some(buf) }
	}

	/// Resolves an API route (e.g. `team/members/list`) against the base URL.
	pub fn api_endpoint(&self, route: &'static str) -> Result<Url, ConfigError> {
		self.api_base_url
			.join(route)
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: route, source })
	}
}
impl Debug for StrategyConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyConfig")
			.field("api_version", &self.api_version)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("authorization_url", &self.authorization_url)
			.field("token_url", &self.token_url)
			.field("callback_url", &self.callback_url)
			.field("api_base_url", &self.api_base_url)
			.field("scope_separator", &self.scope_separator)
			.field("custom_headers", &self.custom_headers)
			.finish()
	}
}
