//! Normalized cross-provider profile and the Dropbox member mapping.

// self
use crate::{_prelude::*, error::ProfileError};

/// Provider label stamped on every normalized profile.
pub const PROVIDER: &str = "dropbox";

/// Canonical identity record handed to the verification callback.
///
/// Serializes with camelCase keys (`displayName`, `givenName`, ...) so hosts can forward it
/// to session layers that expect the conventional profile shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProfile {
	/// Provider label, always [`PROVIDER`].
	pub provider: String,
	/// Stable Dropbox account identifier (`account_id`).
	pub id: String,
	/// Human-readable display name.
	pub display_name: String,
	/// Structured name parts.
	pub name: ProfileName,
	/// Email addresses, primary first.
	pub emails: Vec<ProfileEmail>,
	/// Unmodified provider profile record.
	pub raw: JsonValue,
}

/// Structured name parts of a [`NormalizedProfile`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileName {
	/// Given (first) name.
	pub given_name: String,
	/// Family name (surname).
	pub family_name: String,
	/// Middle name; Dropbox does not expose one, so this stays empty.
	pub middle_name: String,
}

/// Email entry of a [`NormalizedProfile`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEmail {
	/// Email address.
	pub value: String,
}

#[derive(Deserialize)]
struct MemberProfile {
	account_id: String,
	email: String,
	name: MemberName,
}

#[derive(Deserialize)]
struct MemberName {
	display_name: String,
	surname: String,
	given_name: String,
}

/// Maps a raw Dropbox team member profile into a [`NormalizedProfile`].
///
/// Missing or mistyped fields fail with [`ProfileError::Parse`] naming the JSON path; no
/// partially filled profile is ever returned.
pub fn normalize(raw: JsonValue) -> Result<NormalizedProfile, ProfileError> {
	let member: MemberProfile = serde_path_to_error::deserialize(&raw)
		.map_err(|source| ProfileError::Parse { what: "team admin profile", source })?;

	Ok(NormalizedProfile {
		provider: PROVIDER.to_owned(),
		id: member.account_id,
		display_name: member.name.display_name,
		name: ProfileName {
			given_name: member.name.given_name,
			family_name: member.name.surname,
			middle_name: String::new(),
		},
		emails: vec![ProfileEmail { value: member.email }],
		raw,
	})
}
