//! Token set returned by a successful authorization-code exchange.

// crates.io
use oauth2::TokenResponse;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RefreshToken},
};

/// Tokens issued by the Dropbox token endpoint for one authentication attempt.
///
/// The set is handed to the verification callback and never persisted by the strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenSet {
	/// Access token used to call the Dropbox API.
	pub access_token: AccessToken,
	/// Refresh token, present when offline access was granted.
	pub refresh_token: Option<RefreshToken>,
	/// Instant at which the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `expires_in`, when the provider sent one.
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenSet {
	/// Wraps a bare access token (no refresh token, unknown expiry).
	pub fn from_access_token(access_token: AccessToken) -> Self {
		Self {
			access_token,
			refresh_token: None,
			issued_at: OffsetDateTime::now_utc(),
			expires_at: None,
		}
	}

	/// Maps an `oauth2` token response issued at `issued_at`.
	pub fn from_response<R>(response: &R, issued_at: OffsetDateTime) -> Self
	where
		R: TokenResponse,
	{
		let expires_at = response
			.expires_in()
			.and_then(|value| Duration::try_from(value).ok())
			.and_then(|value| issued_at.checked_add(value));

		Self {
			access_token: AccessToken::new(response.access_token().secret().to_owned()),
			refresh_token: response
				.refresh_token()
				.map(|token| RefreshToken::new(token.secret().to_owned())),
			issued_at,
			expires_at,
		}
	}

	/// Returns `true` when the access token is known to be expired at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}
}
