//! The Dropbox team strategy exposed to host authentication frameworks.
//!
//! [`DropboxTeamStrategy`] owns the configuration, the `oauth2`-backed client, and the
//! caller's [`Verify`] callback. Hosts route requests to it by [`STRATEGY_NAME`], send
//! users to [`DropboxTeamStrategy::start_authorization`], and finish the callback leg with
//! [`DropboxTeamStrategy::authenticate`]. Construction never touches the network.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenSet},
	config::StrategyConfig,
	http::ApiHttpClient,
	oauth::{AuthorizationRedirect, OAuth2Client},
	obs::{self, FlowKind, FlowSpan},
	profile::NormalizedProfile,
	team::{self, TeamEndpoints},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Name under which hosts register this strategy.
pub const STRATEGY_NAME: &str = "dropbox-team";

#[cfg(feature = "reqwest")]
/// Strategy specialized for the crate's default reqwest transport.
pub type ReqwestStrategy<V> = DropboxTeamStrategy<V, ReqwestHttpClient>;

/// Application-supplied verification step run after the profile is resolved.
///
/// Receives the issued tokens and the normalized profile and decides which application user
/// (if any) they map to. Async closures taking `(TokenSet, NormalizedProfile)` implement the
/// trait automatically.
pub trait Verify
where
	Self: Send + Sync,
{
	/// Application user produced on success.
	type User: Send;
	/// Rejection reason.
	type Error: 'static + Send + Sync + StdError;

	/// Maps the authenticated identity onto an application user.
	fn verify(
		&self,
		tokens: TokenSet,
		profile: NormalizedProfile,
	) -> impl Future<Output = Result<Self::User, Self::Error>> + Send;
}
impl<F, Fut, U, E> Verify for F
where
	F: Send + Sync + Fn(TokenSet, NormalizedProfile) -> Fut,
	Fut: Send + Future<Output = Result<U, E>>,
	U: Send,
	E: 'static + Send + Sync + StdError,
{
	type Error = E;
	type User = U;

	fn verify(
		&self,
		tokens: TokenSet,
		profile: NormalizedProfile,
	) -> impl Future<Output = Result<Self::User, Self::Error>> + Send {
		self(tokens, profile)
	}
}

/// OAuth 2.0 strategy that signs in the Dropbox team administrator.
pub struct DropboxTeamStrategy<V, C>
where
	V: Verify,
	C: ?Sized + ApiHttpClient,
{
	config: StrategyConfig,
	oauth: OAuth2Client<C>,
	endpoints: TeamEndpoints,
	verify: V,
}
#[cfg(feature = "reqwest")]
impl<V> DropboxTeamStrategy<V, ReqwestHttpClient>
where
	V: Verify,
{
	/// Creates a strategy backed by a reqwest transport that never follows redirects.
	pub fn new(config: StrategyConfig, verify: V) -> Result<Self> {
		Self::with_http_client(config, verify, ReqwestHttpClient::without_redirects()?)
	}
}
impl<V, C> DropboxTeamStrategy<V, C>
where
	V: Verify,
	C: ?Sized + ApiHttpClient,
{
	/// Creates a strategy that reuses the caller-provided transport.
	pub fn with_http_client(
		config: StrategyConfig,
		verify: V,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		let oauth = OAuth2Client::from_config(&config, http_client)?;
		let endpoints = TeamEndpoints::from_config(&config)?;

		Ok(Self { config, oauth, endpoints, verify })
	}

	/// Returns the routing name registered with the host framework.
	pub fn name(&self) -> &'static str {
		STRATEGY_NAME
	}

	/// Returns the resolved configuration.
	pub fn config(&self) -> &StrategyConfig {
		&self.config
	}

	/// Returns the underlying OAuth client.
	pub fn oauth(&self) -> &OAuth2Client<C> {
		&self.oauth
	}

	/// Returns the resolved member listing endpoints.
	pub fn endpoints(&self) -> &TeamEndpoints {
		&self.endpoints
	}

	/// Builds the authorize redirect for the requested scopes.
	///
	/// Scopes are joined with the configured separator; blank entries are dropped and no
	/// `scope` parameter is sent when nothing remains.
	pub fn start_authorization(&self, scopes: &[&str]) -> AuthorizationRedirect {
		let _guard = FlowSpan::new(FlowKind::Authenticate, "start_authorization").entered();
		let scope = self.config.join_scopes(scopes.iter().copied());

		self.oauth.authorize_url(scope.as_deref())
	}

	/// Exchanges an authorization code for tokens.
	pub async fn exchange_code(&self, code: &str) -> Result<TokenSet> {
		obs::observe(FlowKind::CodeExchange, "exchange_code", async {
			self.oauth.exchange_code(code).await.map_err(Error::from)
		})
		.await
	}

	/// Resolves the team admin behind `access_token` into a normalized profile.
	///
	/// Every failure (transport, malformed page, exhausted listing) is reported as
	/// [`Error::ProfileFetch`] with the cause attached.
	pub async fn user_profile(&self, access_token: &AccessToken) -> Result<NormalizedProfile> {
		obs::observe(FlowKind::ProfileFetch, "user_profile", async {
			team::fetch_admin_profile(&self.oauth, &self.endpoints, access_token)
				.await
				.map_err(Error::from)
		})
		.await
	}

	/// Runs the callback leg: code exchange, profile lookup, then verification.
	pub async fn authenticate(&self, code: &str) -> Result<V::User> {
		obs::observe(FlowKind::Authenticate, "authenticate", async {
			let tokens = self.exchange_code(code).await?;
			let profile = self.user_profile(&tokens.access_token).await?;

			self.verify.verify(tokens, profile).await.map_err(Error::verify)
		})
		.await
	}

	/// Runs profile lookup and verification for tokens obtained elsewhere.
	pub async fn authenticate_with_tokens(&self, tokens: TokenSet) -> Result<V::User> {
		obs::observe(FlowKind::Authenticate, "authenticate_with_tokens", async {
			let profile = self.user_profile(&tokens.access_token).await?;

			self.verify.verify(tokens, profile).await.map_err(Error::verify)
		})
		.await
	}
}
impl<V, C> Debug for DropboxTeamStrategy<V, C>
where
	V: Verify,
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DropboxTeamStrategy")
			.field("name", &STRATEGY_NAME)
			.field("config", &self.config)
			.field("endpoints", &self.endpoints)
			.finish()
	}
}
