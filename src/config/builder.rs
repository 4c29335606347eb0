// crates.io
use oauth2::http::{HeaderName, HeaderValue};
// self
use crate::{
	_prelude::*,
	config::{
		ApiVersion, DEFAULT_API_BASE_URL, DEFAULT_AUTHORIZATION_URL, DEFAULT_CONTENT_TYPE,
		DEFAULT_SCOPE_SEPARATOR, DEFAULT_TOKEN_URL, StrategyConfig,
	},
	error::ConfigError,
};

/// Builder for [`StrategyConfig`] values.
pub struct StrategyConfigBuilder {
	/// Requested API version; overridden to v2 on build.
	pub api_version: Option<ApiVersion>,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Optional authorization endpoint override.
	pub authorization_url: Option<Url>,
	/// Optional token endpoint override.
	pub token_url: Option<Url>,
	/// Optional redirect URI.
	pub callback_url: Option<Url>,
	/// Optional API base URL override.
	pub api_base_url: Option<Url>,
	/// Optional scope separator override.
	pub scope_separator: Option<String>,
	/// Optional custom headers; replaces the default header map when set.
	pub custom_headers: Option<BTreeMap<String, String>>,
}
impl StrategyConfigBuilder {
	/// Creates a new builder seeded with the client credentials.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			api_version: None,
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			authorization_url: None,
			token_url: None,
			callback_url: None,
			api_base_url: None,
			scope_separator: None,
			custom_headers: None,
		}
	}

	/// Records the requested API version.
	///
	/// Only the v2 API is implemented, so [`build`](Self::build) pins the version to
	/// [`ApiVersion::V2`] regardless of this value.
	pub fn api_version(mut self, version: ApiVersion) -> Self {
		self.api_version = Some(version);

		self
	}

	/// Overrides the authorization endpoint.
	pub fn authorization_url(mut self, url: Url) -> Self {
		self.authorization_url = Some(url);

		self
	}

	/// Overrides the token endpoint.
	pub fn token_url(mut self, url: Url) -> Self {
		self.token_url = Some(url);

		self
	}

	/// Sets the redirect URI sent with authorization and token requests.
	pub fn callback_url(mut self, url: Url) -> Self {
		self.callback_url = Some(url);

		self
	}

	/// Overrides the API base URL.
	pub fn api_base_url(mut self, url: Url) -> Self {
		self.api_base_url = Some(url);

		self
	}

	/// Overrides the scope separator.
	pub fn scope_separator(mut self, separator: impl Into<String>) -> Self {
		self.scope_separator = Some(separator.into());

		self
	}

	/// Adds a single custom header.
	///
	/// The first call replaces the default `Content-Type: application/json` map. API calls
	/// that carry a JSON body still fall back to that content type when none is configured.
	pub fn custom_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.custom_headers.get_or_insert_with(BTreeMap::new).insert(name.into(), value.into());

		self
	}

	/// Adds multiple custom headers.
	pub fn custom_headers<I, K, V>(mut self, headers: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let map = self.custom_headers.get_or_insert_with(BTreeMap::new);

		for (name, value) in headers.into_iter() {
			map.insert(name.into(), value.into());
		}

		self
	}

	/// Consumes the builder, applies defaults, and validates the resulting config.
	pub fn build(self) -> Result<StrategyConfig, ConfigError> {
		let authorization_url = match self.authorization_url {
			Some(url) => url,
			None => parse_default("authorization", DEFAULT_AUTHORIZATION_URL)?,
		};
		let token_url = match self.token_url {
			Some(url) => url,
			None => parse_default("token", DEFAULT_TOKEN_URL)?,
		};
		let api_base_url = match self.api_base_url {
			Some(url) => with_trailing_slash(url),
			None => parse_default("api", DEFAULT_API_BASE_URL)?,
		};
		let custom_headers = self.custom_headers.unwrap_or_else(|| {
			BTreeMap::from([(DEFAULT_CONTENT_TYPE.0.to_owned(), DEFAULT_CONTENT_TYPE.1.to_owned())])
		});
		let config = StrategyConfig {
			api_version: ApiVersion::V2,
			client_id: self.client_id,
			client_secret: self.client_secret,
			authorization_url,
			token_url,
			callback_url: self.callback_url,
			api_base_url,
			scope_separator: self
				.scope_separator
				.unwrap_or_else(|| DEFAULT_SCOPE_SEPARATOR.to_owned()),
			custom_headers,
		};

		config.validate()?;

		Ok(config)
	}
}

impl Debug for StrategyConfigBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyConfigBuilder")
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

/// Serde-friendly configuration mirror where every field is optional.
///
/// Keys are camelCase; the upper-case `URL` spellings are accepted as aliases.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategyOptions {
	/// Requested API version (`"1"` or `"2"`).
	pub api_version: Option<ApiVersion>,
	/// OAuth 2.0 client identifier.
	#[serde(alias = "clientID")]
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Authorization endpoint override.
	#[serde(alias = "authorizationURL")]
	pub authorization_url: Option<Url>,
	/// Token endpoint override.
	#[serde(alias = "tokenURL")]
	pub token_url: Option<Url>,
	/// Redirect URI.
	#[serde(alias = "callbackURL")]
	pub callback_url: Option<Url>,
	/// API base URL override.
	#[serde(alias = "apiBaseURL")]
	pub api_base_url: Option<Url>,
	/// Scope separator override.
	pub scope_separator: Option<String>,
	/// Custom headers; replaces the default header map when set.
	pub custom_headers: Option<BTreeMap<String, String>>,
}
impl StrategyOptions {
	/// Converts the options into a builder without applying defaults yet.
	pub fn into_builder(self) -> StrategyConfigBuilder {
		StrategyConfigBuilder {
			api_version: self.api_version,
			client_id: self.client_id,
			client_secret: self.client_secret,
			authorization_url: self.authorization_url,
			token_url: self.token_url,
			callback_url: self.callback_url,
			api_base_url: self.api_base_url,
			scope_separator: self.scope_separator,
			custom_headers: self.custom_headers,
		}
	}
}

impl StrategyConfig {
	/// Validates invariants for the configuration.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingClientId);
		}
		if self.scope_separator.is_empty() || self.scope_separator.chars().any(char::is_control) {
			return Err(ConfigError::InvalidScopeSeparator);
		}

		for (name, value) in &self.custom_headers {
			validate_header(name, value)?;
		}

		Ok(())
	}
}

fn parse_default(endpoint: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })
}

fn with_trailing_slash(mut url: Url) -> Url {
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url
}

fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
	let valid = HeaderName::from_bytes(name.as_bytes()).is_ok()
		&& HeaderValue::from_str(value).is_ok();

	if valid { Ok(()) } else { Err(ConfigError::InvalidHeader { name: name.to_owned() }) }
}
