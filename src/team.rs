//! Team member listing and the team-admin lookup.
//!
//! Dropbox pages `team/members/list` through an opaque cursor handed to
//! `team/members/list/continue`. [`resolve_team_admin`] walks those pages strictly in order
//! until the first member tagged `team_admin` shows up, the listing runs dry, or a request
//! fails. Nothing is retried and nothing is cached between invocations.

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::StrategyConfig,
	error::{ConfigError, ProfileError},
	oauth::AuthorizedRequest,
	obs,
	profile::{self, NormalizedProfile},
};

/// Route of the initial member listing call.
pub const MEMBERS_LIST_ROUTE: &str = "team/members/list";
/// Route of the cursor-driven continuation call.
pub const MEMBERS_LIST_CONTINUE_ROUTE: &str = "team/members/list/continue";

// Dropbox RPC endpoints without arguments expect a JSON `null` body.
const EMPTY_BODY: &[u8] = b"null";

/// Role assigned to a team member, read from the `.tag` discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = ".tag", rename_all = "snake_case")]
pub enum TeamRole {
	/// Full team administrator.
	TeamAdmin,
	/// Administrator limited to member management.
	UserManagementAdmin,
	/// Administrator limited to support tasks.
	SupportAdmin,
	/// Regular member.
	MemberOnly,
	/// Any role this crate does not know about.
	#[serde(other)]
	Other,
}

/// Single entry of a member listing page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
	/// Role tag of the member.
	pub role: TeamRole,
	/// Raw provider profile record.
	pub profile: JsonValue,
}

/// One page of the member listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberPage {
	/// Members in provider order.
	pub members: Vec<TeamMember>,
	/// Whether another page can be fetched with [`cursor`](Self::cursor).
	pub has_more: bool,
	/// Opaque continuation cursor.
	#[serde(default)]
	pub cursor: Option<String>,
}
impl TeamMemberPage {
	/// Removes and returns the first member tagged `team_admin`, if any.
	pub fn take_team_admin(&mut self) -> Option<TeamMember> {
		let idx = self.members.iter().position(|member| member.role == TeamRole::TeamAdmin)?;

		Some(self.members.swap_remove(idx))
	}

	/// Cursor to continue with, ignoring empty strings.
	fn next_cursor(self) -> Option<String> {
		self.cursor.filter(|cursor| !cursor.is_empty())
	}
}

/// Resolved listing endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamEndpoints {
	/// `team/members/list`.
	pub list: Url,
	/// `team/members/list/continue`.
	pub list_continue: Url,
}
impl TeamEndpoints {
	/// Resolves both listing endpoints against the configured API base.
	pub fn from_config(config: &StrategyConfig) -> Result<Self, ConfigError> {
		Ok(Self {
			list: config.api_endpoint(MEMBERS_LIST_ROUTE)?,
			list_continue: config.api_endpoint(MEMBERS_LIST_CONTINUE_ROUTE)?,
		})
	}
}

/// Walks the member listing until the team admin is found.
///
/// Each page depends on the cursor of the previous one, so requests are issued one at a
/// time. Failure cases:
///
/// - transport failures surface as [`ProfileError::Transport`] and stop pagination;
/// - malformed pages surface as [`ProfileError::Parse`] and stop pagination;
/// - `has_more = true` without a cursor surfaces as [`ProfileError::MissingCursor`];
/// - a final page without a match surfaces as [`ProfileError::NotFound`].
pub async fn resolve_team_admin<R>(
	requester: &R,
	endpoints: &TeamEndpoints,
	access_token: &AccessToken,
) -> Result<TeamMember, ProfileError>
where
	R: ?Sized + AuthorizedRequest,
{
	let mut cursor: Option<String> = None;
	let mut page_number = 0_usize;

	loop {
		page_number += 1;

		let mut page = fetch_page(requester, endpoints, access_token, cursor.as_deref()).await?;

		obs::record_member_page(page_number, page.members.len(), page.has_more);

		if let Some(admin) = page.take_team_admin() {
			return Ok(admin);
		}
		if !page.has_more {
			return Err(ProfileError::NotFound);
		}

		cursor = Some(page.next_cursor().ok_or(ProfileError::MissingCursor)?);
	}
}

/// Locates the team admin and normalizes its profile record.
pub async fn fetch_admin_profile<R>(
	requester: &R,
	endpoints: &TeamEndpoints,
	access_token: &AccessToken,
) -> Result<NormalizedProfile, ProfileError>
where
	R: ?Sized + AuthorizedRequest,
{
	let admin = resolve_team_admin(requester, endpoints, access_token).await?;

	profile::normalize(admin.profile)
}

async fn fetch_page<R>(
	requester: &R,
	endpoints: &TeamEndpoints,
	access_token: &AccessToken,
	cursor: Option<&str>,
) -> Result<TeamMemberPage, ProfileError>
where
	R: ?Sized + AuthorizedRequest,
{
	let (url, body) = match cursor {
		Some(cursor) => (
			&endpoints.list_continue,
			serde_json::json!({ "cursor": cursor }).to_string().into_bytes(),
		),
		None => (&endpoints.list, EMPTY_BODY.to_vec()),
	};
	let raw = requester.authorized_request(Method::POST, url, Some(body), access_token).await?;

	parse_page(&raw)
}

fn parse_page(raw: &[u8]) -> Result<TeamMemberPage, ProfileError> {
	let mut de = serde_json::Deserializer::from_slice(raw);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| ProfileError::Parse { what: "team member page", source })
}

#[cfg(test)]
mod tests {
	// std
	use std::{collections::VecDeque, sync::Mutex};
	// self
	use super::*;
	use crate::{error::TransportError, oauth::RequestFuture};

	#[derive(Clone, Debug, PartialEq, Eq)]
	struct RecordedCall {
		url: String,
		body: String,
		token: String,
	}

	#[derive(Default)]
	struct ScriptedRequester {
		responses: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
		calls: Mutex<Vec<RecordedCall>>,
	}
	impl ScriptedRequester {
		fn with_pages<I>(pages: I) -> Self
		where
			I: IntoIterator<Item = JsonValue>,
		{
			let responses = pages.into_iter().map(|page| Ok(page.to_string().into_bytes())).collect();

			Self { responses: Mutex::new(responses), calls: Default::default() }
		}

		fn push_raw(&self, response: Result<Vec<u8>, TransportError>) {
			self.responses.lock().expect("Scripted responses lock poisoned.").push_back(response);
		}

		fn calls(&self) -> Vec<RecordedCall> {
			self.calls.lock().expect("Recorded calls lock poisoned.").clone()
		}
	}
	impl AuthorizedRequest for ScriptedRequester {
		fn authorized_request<'a>(
			&'a self,
			method: Method,
			url: &'a Url,
			body: Option<Vec<u8>>,
			access_token: &'a AccessToken,
		) -> RequestFuture<'a> {
			assert_eq!(method, Method::POST, "Member listing must use POST.");

			self.calls.lock().expect("Recorded calls lock poisoned.").push(RecordedCall {
				url: url.to_string(),
				body: String::from_utf8(body.unwrap_or_default())
					.expect("Request bodies should be UTF-8."),
				token: access_token.expose().to_owned(),
			});

			let response = self
				.responses
				.lock()
				.expect("Scripted responses lock poisoned.")
				.pop_front()
				.expect("Resolver issued more requests than scripted.");

			Box::pin(async move { response })
		}
	}

	fn endpoints() -> TeamEndpoints {
		let config = StrategyConfig::builder("app-key", "app-secret")
			.build()
			.expect("Failed to build configuration.");

		TeamEndpoints::from_config(&config).expect("Failed to resolve team endpoints.")
	}

	fn member(role: &str, account_id: &str) -> JsonValue {
		serde_json::json!({
			"role": { ".tag": role },
			"profile": {
				"account_id": account_id,
				"email": format!("{account_id}@co.com"),
				"name": {
					"display_name": format!("User {account_id}"),
					"surname": "User",
					"given_name": account_id
				}
			}
		})
	}

	fn page(members: Vec<JsonValue>, has_more: bool, cursor: Option<&str>) -> JsonValue {
		let mut value = serde_json::json!({ "members": members, "has_more": has_more });

		if let Some(cursor) = cursor {
			value["cursor"] = JsonValue::from(cursor);
		}

		value
	}

	fn token() -> AccessToken {
		AccessToken::new("sl.test-token")
	}

	#[tokio::test]
	async fn single_page_match_uses_one_call() {
		let requester = ScriptedRequester::with_pages([page(
			vec![member("member_only", "dbid:1"), member("team_admin", "dbid:2")],
			false,
			Some("unused"),
		)]);
		let admin = resolve_team_admin(&requester, &endpoints(), &token())
			.await
			.expect("Team admin should be located on the first page.");

		assert_eq!(admin.role, TeamRole::TeamAdmin);
		assert_eq!(admin.profile["account_id"], "dbid:2");

		let calls = requester.calls();

		assert_eq!(calls.len(), 1);
		assert_eq!(calls[0].url, "https://api.dropboxapi.com/2/team/members/list");
		assert_eq!(calls[0].body, "null");
		assert_eq!(calls[0].token, "sl.test-token");
	}

	#[tokio::test]
	async fn pagination_follows_cursors_until_match() {
		let requester = ScriptedRequester::with_pages([
			page(vec![member("member_only", "dbid:1")], true, Some("cursor-1")),
			page(vec![member("support_admin", "dbid:2")], true, Some("cursor-2")),
			page(vec![member("team_admin", "dbid:3")], true, Some("cursor-3")),
		]);
		let admin = resolve_team_admin(&requester, &endpoints(), &token())
			.await
			.expect("Team admin should be located on the third page.");

		assert_eq!(admin.profile["account_id"], "dbid:3");

		let calls = requester.calls();

		assert_eq!(calls.len(), 3);
		assert_eq!(calls[1].url, "https://api.dropboxapi.com/2/team/members/list/continue");
		assert_eq!(
			serde_json::from_str::<JsonValue>(&calls[1].body)
				.expect("Continuation body should be JSON."),
			serde_json::json!({ "cursor": "cursor-1" })
		);
		assert_eq!(
			serde_json::from_str::<JsonValue>(&calls[2].body)
				.expect("Continuation body should be JSON."),
			serde_json::json!({ "cursor": "cursor-2" })
		);
	}

	#[tokio::test]
	async fn first_admin_on_a_page_wins() {
		let requester = ScriptedRequester::with_pages([page(
			vec![member("team_admin", "dbid:first"), member("team_admin", "dbid:second")],
			false,
			None,
		)]);
		let admin = resolve_team_admin(&requester, &endpoints(), &token())
			.await
			.expect("Team admin should be located.");

		assert_eq!(admin.profile["account_id"], "dbid:first");
	}

	#[tokio::test]
	async fn exhausted_listing_reports_not_found() {
		let requester = ScriptedRequester::with_pages([
			page(vec![member("member_only", "dbid:1")], true, Some("cursor-1")),
			page(vec![member("user_management_admin", "dbid:2")], false, None),
		]);
		let err = resolve_team_admin(&requester, &endpoints(), &token())
			.await
			.expect_err("Listing without an admin should fail.");

		assert!(matches!(err, ProfileError::NotFound));
		assert_eq!(requester.calls().len(), 2);
	}

	#[tokio::test]
	async fn malformed_page_stops_pagination() {
		let requester = ScriptedRequester::with_pages([page(
			vec![member("member_only", "dbid:1")],
			true,
			Some("cursor-1"),
		)]);

		requester.push_raw(Ok(b"<html>maintenance</html>".to_vec()));
		requester.push_raw(Ok(page(vec![member("team_admin", "dbid:2")], false, None)
			.to_string()
			.into_bytes()));

		let err = resolve_team_admin(&requester, &endpoints(), &token())
			.await
			.expect_err("Malformed pages should fail the lookup.");

		assert!(matches!(err, ProfileError::Parse { what: "team member page", .. }));
		assert_eq!(requester.calls().len(), 2);
	}

	#[tokio::test]
	async fn transport_failures_propagate() {
		let requester = ScriptedRequester::default();

		requester.push_raw(Err(TransportError::status(401, b"{\"error\":\"invalid_access_token\"}")));

		let err = resolve_team_admin(&requester, &endpoints(), &token())
			.await
			.expect_err("Transport failures should fail the lookup.");

		assert!(matches!(err, ProfileError::Transport(TransportError::Status { status: 401, .. })));
	}

	#[tokio::test]
	async fn has_more_without_cursor_is_rejected() {
		let requester = ScriptedRequester::with_pages([page(
			vec![member("member_only", "dbid:1")],
			true,
			Some(""),
		)]);
		let err = resolve_team_admin(&requester, &endpoints(), &token())
			.await
			.expect_err("A continuation without a cursor should fail.");

		assert!(matches!(err, ProfileError::MissingCursor));
		assert_eq!(requester.calls().len(), 1);
	}

	#[tokio::test]
	async fn unknown_roles_are_tolerated() {
		let requester = ScriptedRequester::with_pages([page(
			vec![member("billing_admin", "dbid:1"), member("team_admin", "dbid:2")],
			false,
			None,
		)]);
		let admin = resolve_team_admin(&requester, &endpoints(), &token())
			.await
			.expect("Unknown roles should be skipped.");

		assert_eq!(admin.profile["account_id"], "dbid:2");
	}

	#[tokio::test]
	async fn admin_profile_is_normalized() {
		let requester = ScriptedRequester::with_pages([page(
			vec![member("team_admin", "dbid:123")],
			false,
			None,
		)]);
		let profile = fetch_admin_profile(&requester, &endpoints(), &token())
			.await
			.expect("Admin profile should normalize.");

		assert_eq!(profile.id, "dbid:123");
		assert_eq!(profile.emails[0].value, "dbid:123@co.com");
	}
}
