//! Normalized user record produced by the profile fetch adapter.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Provider-agnostic view of the authenticated user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
	/// Stable provider-side user identifier.
	pub uid: String,
	/// Human-readable display name.
	pub display_name: Option<String>,
	/// Email address, when the provider exposes one.
	pub email: Option<String>,
	/// Login or handle.
	pub username: Option<String>,
	/// Avatar URL or reference.
	pub avatar: Option<String>,
	/// Unmodified profile object returned by the identity endpoint.
	pub raw: Map<String, Value>,
}
