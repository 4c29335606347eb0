//! OAuth 2.0 client facade configured for Dropbox.
//!
//! [`OAuth2Client`] composes an `oauth2` [`BasicClient`] with an [`ApiHttpClient`]
//! transport. The generic authorization-code mechanics (authorize URL, CSRF state, code
//! exchange) stay inside the `oauth2` crate; this module only feeds it Dropbox endpoints and
//! exposes the bearer-authenticated request capability the profile resolver needs.

pub use oauth2;

// crates.io
use oauth2::{
	AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
	RedirectUrl, RequestTokenError, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
	http::{
		HeaderMap, HeaderName, HeaderValue, Method, Request,
		header::{AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenSet},
	config::StrategyConfig,
	error::{ConfigError, TokenExchangeError, TransportError},
	http::{self, ApiHttpClient},
};

const JSON_CONTENT_TYPE: &str = "application/json";

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Boxed future returned by [`AuthorizedRequest::authorized_request`].
pub type RequestFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Vec<u8>, TransportError>> + 'a + Send>>;

/// Capability to issue bearer-authenticated API requests.
///
/// The profile resolver receives this capability as a value instead of reaching back into
/// the strategy, which keeps pagination testable without a network.
pub trait AuthorizedRequest
where
	Self: Send + Sync,
{
	/// Sends `body` to `url` with `method`, authenticated by `access_token`.
	///
	/// Resolves to the raw response body for 2xx responses; every other status surfaces as
	/// [`TransportError::Status`]. Requests with a body default to
	/// `Content-Type: application/json` unless the configured headers set one.
	fn authorized_request<'a>(
		&'a self,
		method: Method,
		url: &'a Url,
		body: Option<Vec<u8>>,
		access_token: &'a AccessToken,
	) -> RequestFuture<'a>;
}

/// Authorization redirect produced by [`OAuth2Client::authorize_url`].
#[derive(Clone, Debug)]
pub struct AuthorizationRedirect {
	/// Fully-formed authorize URL that callers should send end-users to.
	pub url: Url,
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: CsrfToken,
}
impl AuthorizationRedirect {
	/// Checks the `state` parameter returned on the callback.
	pub fn validate_state(&self, returned_state: &str) -> bool {
		self.state.secret() == returned_state
	}
}

/// Dropbox-configured OAuth 2.0 client plus the transport used for every request.
pub struct OAuth2Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	inner: ConfiguredBasicClient,
	http_client: Arc<C>,
	custom_headers: HeaderMap,
}
impl<C> OAuth2Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Configures the underlying `oauth2` client from the strategy configuration.
	pub fn from_config(config: &StrategyConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		let auth_url = AuthUrl::from_url(config.authorization_url.clone());
		let token_url = TokenUrl::from_url(config.token_url.clone());
		let mut inner = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.clone()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		if let Some(callback) = &config.callback_url {
			inner = inner.set_redirect_uri(RedirectUrl::from_url(callback.clone()));
		}

		let mut custom_headers = HeaderMap::new();

		for (name, value) in &config.custom_headers {
			let invalid = || ConfigError::InvalidHeader { name: name.clone() };
			let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
			let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;

			custom_headers.insert(header_name, header_value);
		}

		Ok(Self { inner, http_client: http_client.into(), custom_headers })
	}

	/// Builds the `Authorization` header value for an access token.
	pub fn authorization_header(&self, access_token: &AccessToken) -> String {
		format!("Bearer {}", access_token.expose())
	}

	/// Builds the authorize URL with a fresh CSRF state.
	///
	/// `scope` is the already joined scope list (see [`StrategyConfig::join_scopes`]); the
	/// parameter is omitted when it is `None`.
	pub fn authorize_url(&self, scope: Option<&str>) -> AuthorizationRedirect {
		let mut request = self.inner.authorize_url(CsrfToken::new_random);

		if let Some(scope) = scope {
			request = request.add_extra_param("scope", scope.to_owned());
		}

		let (url, state) = request.url();

		AuthorizationRedirect { url, state }
	}

	/// Exchanges an authorization code for a [`TokenSet`].
	pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, TokenExchangeError> {
		let handle = self.http_client.handle();
		let response = self
			.inner
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&handle)
			.await
			.map_err(map_request_error)?;

		Ok(TokenSet::from_response(&response, OffsetDateTime::now_utc()))
	}

	fn build_request(
		&self,
		method: Method,
		url: &Url,
		body: Option<Vec<u8>>,
		access_token: &AccessToken,
	) -> Result<Request<Vec<u8>>, TransportError> {
		let mut builder = Request::builder().method(method).uri(url.as_str());

		for (name, value) in &self.custom_headers {
			builder = builder.header(name, value);
		}

		// Every API body is JSON; callers that replaced the header map still need this.
		if body.is_some() && !self.custom_headers.contains_key(CONTENT_TYPE) {
			builder = builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE);
		}

		builder = builder.header(AUTHORIZATION, self.authorization_header(access_token));

		Ok(builder.body(body.unwrap_or_default())?)
	}
}
impl<C> AuthorizedRequest for OAuth2Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn authorized_request<'a>(
		&'a self,
		method: Method,
		url: &'a Url,
		body: Option<Vec<u8>>,
		access_token: &'a AccessToken,
	) -> RequestFuture<'a> {
		Box::pin(async move {
			let request = self.build_request(method, url, body, access_token)?;
			let handle = self.http_client.handle();
			let response = oauth2::AsyncHttpClient::call(&handle, request)
				.await
				.map_err(http::map_http_client_error)?;

			if !response.status().is_success() {
				return Err(TransportError::status(response.status().as_u16(), response.body()));
			}

			Ok(response.into_body())
		})
	}
}
impl<C> Debug for OAuth2Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Client")
			.field("client_id", self.inner.client_id())
			.field("custom_headers", &self.custom_headers)
			.finish()
	}
}

fn map_request_error<E>(
	err: BasicRequestTokenError<oauth2::HttpClientError<E>>,
) -> TokenExchangeError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		RequestTokenError::ServerResponse(response) => map_server_response(response),
		RequestTokenError::Request(error) =>
			TokenExchangeError::Transport(http::map_http_client_error(error)),
		RequestTokenError::Parse(source, _body) => TokenExchangeError::Parse { source },
		RequestTokenError::Other(message) => TokenExchangeError::Unexpected { message },
	}
}

fn map_server_response(response: BasicErrorResponse) -> TokenExchangeError {
	TokenExchangeError::Provider {
		error: response.error().as_ref().to_owned(),
		description: response.error_description().cloned(),
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::http::ReqwestHttpClient;

	fn client(config: &StrategyConfig) -> OAuth2Client<ReqwestHttpClient> {
		OAuth2Client::from_config(config, ReqwestHttpClient::default())
			.expect("Failed to configure the OAuth client.")
	}

	#[test]
	fn authorize_url_carries_client_and_joined_scopes() {
		let config = StrategyConfig::builder("app-key", "app-secret")
			.callback_url(
				Url::parse("https://app.example.com/callback")
					.expect("Failed to parse callback URL."),
			)
			.build()
			.expect("Failed to build configuration.");
		let scope = config.join_scopes(["team_data.member", "members.read"]);
		let redirect = client(&config).authorize_url(scope.as_deref());
		let pairs: BTreeMap<_, _> = redirect.url.query_pairs().into_owned().collect();

		assert!(redirect.url.as_str().starts_with("https://www.dropbox.com/oauth2/authorize?"));
		assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
		assert_eq!(pairs.get("client_id").map(String::as_str), Some("app-key"));
		assert_eq!(
			pairs.get("redirect_uri").map(String::as_str),
			Some("https://app.example.com/callback")
		);
		assert_eq!(pairs.get("scope").map(String::as_str), Some("team_data.member,members.read"));
		assert_eq!(pairs.get("state").map(String::as_str), Some(redirect.state.secret().as_str()));
		assert!(redirect.validate_state(redirect.state.secret()));
		assert!(!redirect.validate_state("forged"));
	}

	#[test]
	fn authorization_header_uses_bearer_scheme() {
		let config = StrategyConfig::builder("app-key", "app-secret")
			.build()
			.expect("Failed to build configuration.");

		assert_eq!(
			client(&config).authorization_header(&AccessToken::new("sl.token")),
			"Bearer sl.token"
		);
	}

	#[test]
	fn requests_carry_custom_headers_and_bearer_token() {
		let config = StrategyConfig::builder("app-key", "app-secret")
			.build()
			.expect("Failed to build configuration.");
		let url = config.api_endpoint("team/members/list").expect("Failed to resolve endpoint.");
		let request = client(&config)
			.build_request(Method::POST, &url, None, &AccessToken::new("sl.token"))
			.expect("Failed to build request.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri().to_string(), url.as_str());
		assert_eq!(
			request.headers().get("content-type").and_then(|value| value.to_str().ok()),
			Some("application/json")
		);
		assert_eq!(
			request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()),
			Some("Bearer sl.token")
		);
		assert!(request.body().is_empty());
	}
	#[test]
	fn json_bodies_keep_a_content_type_when_headers_are_replaced() {
		let config = StrategyConfig::builder("app-key", "app-secret")
			.custom_header("User-Agent", "dropbox-team-auth-test")
			.build()
			.expect("Failed to build configuration.");
		let url = config.api_endpoint("team/members/list").expect("Failed to resolve endpoint.");
		let client = client(&config);
		let request = client
			.build_request(
				Method::POST,
				&url,
				Some(b"null".to_vec()),
				&AccessToken::new("sl.token"),
			)
			.expect("Failed to build request.");

		assert_eq!(
			request.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
			Some("application/json")
		);
		assert_eq!(
			request.headers().get("user-agent").and_then(|value| value.to_str().ok()),
			Some("dropbox-team-auth-test")
		);

		let bodyless = client
			.build_request(Method::GET, &url, None, &AccessToken::new("sl.token"))
			.expect("Failed to build request.");

		assert!(bodyless.headers().get(CONTENT_TYPE).is_none());
	}

	#[test]
	fn configured_content_type_is_not_overridden() {
		let config = StrategyConfig::builder("app-key", "app-secret")
			.custom_header("Content-Type", "application/json; charset=utf-8")
			.build()
			.expect("Failed to build configuration.");
		let url = config.api_endpoint("team/members/list").expect("Failed to resolve endpoint.");
		let request = client(&config)
			.build_request(
				Method::POST,
				&url,
				Some(b"null".to_vec()),
				&AccessToken::new("sl.token"),
			)
			.expect("Failed to build request.");
		let values: Vec<_> = request
			.headers()
			.get_all(CONTENT_TYPE)
			.iter()
			.filter_map(|value| value.to_str().ok())
			.collect();

		assert_eq!(values, vec!["application/json; charset=utf-8"]);
	}
}
