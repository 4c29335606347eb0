#![allow(dead_code)]

// crates.io
use httpmock::MockServer;
use reqwest::Client as ReqwestClient;
use serde_json::{Value, json};
use url::Url;
// self
use dropbox_team_auth::{
	config::StrategyConfig,
	http::ReqwestHttpClient,
	strategy::{DropboxTeamStrategy, ReqwestStrategy, Verify},
};

pub const CLIENT_ID: &str = "app-key-it";
pub const CLIENT_SECRET: &str = "app-secret-it";
pub const ACCESS_TOKEN: &str = "sl.access-it";

/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
/// `httpmock` during tests.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse mock provider URL.")
}

/// Points every endpoint of the strategy at the mock server.
pub fn mock_config(server: &MockServer) -> StrategyConfig {
	StrategyConfig::builder(CLIENT_ID, CLIENT_SECRET)
		.authorization_url(url(&server.url("/oauth2/authorize")))
		.token_url(url(&server.url("/oauth2/token")))
		.callback_url(url("https://app.example.com/auth/dropbox/callback"))
		.api_base_url(url(&server.url("/2/")))
		.build()
		.expect("Mock strategy configuration should build.")
}

pub fn build_test_strategy<V>(config: StrategyConfig, verify: V) -> ReqwestStrategy<V>
where
	V: Verify,
{
	DropboxTeamStrategy::with_http_client(config, verify, test_reqwest_http_client())
		.expect("Strategy should build against the mock server.")
}

pub fn member(role: &str, account_id: &str, given_name: &str, surname: &str) -> Value {
	json!({
		"role": { ".tag": role },
		"profile": {
			"account_id": account_id,
			"team_member_id": format!("dbmid:{account_id}"),
			"email": format!("{}@co.com", given_name.to_ascii_lowercase()),
			"email_verified": true,
			"status": { ".tag": "active" },
			"membership_type": { ".tag": "full" },
			"name": {
				"display_name": format!("{given_name} {surname}"),
				"surname": surname,
				"given_name": given_name,
				"familiar_name": given_name,
				"abbreviated_name": format!("{}{}", &given_name[..1], &surname[..1])
			}
		}
	})
}

pub fn page(members: Vec<Value>, has_more: bool, cursor: &str) -> Value {
	json!({ "members": members, "has_more": has_more, "cursor": cursor })
}
