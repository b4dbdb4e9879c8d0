//! Normalized Daldalso user profile.
//!
//! The user-info endpoint returns a JSON document keyed by `key` (subject id), `name`,
//! `account`, `libra` (standing), `foveon` (reputation score) and `profile` (presentation).
//! [`Profile::parse`] maps that document onto a fixed shape:
//!
//! - `key` is the only mandatory field; a missing `key` is a parse failure.
//! - Every other field becomes `None` when it is missing, `null`, or not shaped as expected, so an
//!   evolving upstream schema never breaks normalization. Nested blocks map member by member: a
//!   partial `libra` or `profile` keeps the members it has.
//! - The raw body and the parsed JSON tree always travel with the profile so callers can recover
//!   fields that are not mapped yet.

// crates.io
use serde::{
	Deserializer,
	de::{DeserializeOwned, Error as DeError},
};
// self
use crate::{_prelude::*, error::ProfileError, provider::ProviderTag};

/// Provider standing tier: the current level plus the thresholds around it.
///
/// Values are carried as sent, fractions included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Libra {
	/// Current level.
	#[serde(deserialize_with = "lenient")]
	pub level: Option<f64>,
	/// Score at which the current level started.
	#[serde(deserialize_with = "lenient")]
	pub prev: Option<f64>,
	/// Score required for the next level.
	#[serde(deserialize_with = "lenient")]
	pub next: Option<f64>,
}

/// Public presentation block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presentation {
	/// Profile image reference.
	pub image: Option<String>,
	/// Free-form introduction text.
	pub text: Option<String>,
}

/// Normalized profile handed to the verification hook.
///
/// Serializes with the provider-neutral key names (`displayName`, `_raw`, `_json`). Absent values
/// serialize as `null` rather than being omitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
	/// Always [`ProviderTag::Daldalso`].
	pub provider: ProviderTag,
	/// Subject identifier taken from `key`.
	pub id: String,
	/// Display name taken from `name`.
	#[serde(rename = "displayName")]
	pub display_name: Option<String>,
	/// Account handle.
	pub account: Option<String>,
	/// Standing tier.
	pub libra: Option<Libra>,
	/// Reputation score.
	pub foveon: Option<f64>,
	/// Presentation block.
	pub profile: Option<Presentation>,
	/// Response body exactly as received.
	#[serde(rename = "_raw")]
	pub raw: String,
	/// Parsed response body.
	#[serde(rename = "_json")]
	pub json: Value,
}
impl Profile {
	/// Parses a raw user-info response body; a body that is not UTF-8 is a parse failure, so
	/// `_raw` always holds the bytes exactly as received.
	pub fn from_bytes(body: Vec<u8>) -> Result<Self, ProfileError> {
		let raw = String::from_utf8(body).map_err(serde_json::Error::custom)?;

		Self::parse(raw)
	}

	/// Parses a user-info response body into a normalized profile.
	pub fn parse(body: impl Into<String>) -> Result<Self, ProfileError> {
		let raw = body.into();
		let json = serde_json::from_str::<Value>(&raw)?;
		let document = serde_path_to_error::deserialize::<_, UserInfoDocument>(&json)?;

		Ok(Self {
			provider: ProviderTag::Daldalso,
			id: document.key.into_string(),
			display_name: document.name,
			account: document.account,
			libra: document.libra,
			foveon: document.foveon,
			profile: document.profile,
			raw,
			json,
		})
	}

	/// Reads an unmapped top-level field from the parsed body.
	pub fn extra(&self, field: &str) -> Option<&Value> {
		self.json.get(field).filter(|value| !value.is_null())
	}
}

#[derive(Deserialize)]
struct UserInfoDocument {
	key: SubjectKey,
	#[serde(default, deserialize_with = "lenient")]
	name: Option<String>,
	#[serde(default, deserialize_with = "lenient")]
	account: Option<String>,
	#[serde(default, deserialize_with = "lenient")]
	libra: Option<Libra>,
	#[serde(default, deserialize_with = "lenient")]
	foveon: Option<f64>,
	#[serde(default, deserialize_with = "lenient")]
	profile: Option<Presentation>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubjectKey {
	Text(String),
	Number(serde_json::Number),
}
impl SubjectKey {
	fn into_string(self) -> String {
		match self {
			SubjectKey::Text(text) => text,
			SubjectKey::Number(number) => number.to_string(),
		}
	}
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let value = <Option<Value>>::deserialize(deserializer)?;

	Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}
