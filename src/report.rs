//! Host-facing success and failure reports.
//!
//! Web frameworks that drive the handshake usually forward a flat record to their own
//! authentication layer. [`AuthSuccess`] carries the uid, the user info block, the credential and
//! the raw profile; [`AuthFailure`] carries a stable code, a message and whatever raw payload the
//! failure preserved.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, Identity, ProviderId, TokenSecret},
	error::{ErrorCode, RawPayload},
};

/// User info block of a success report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
	/// Display name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Email address.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Login or handle.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// Avatar URL.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub image: Option<String>,
}

/// Credential block of a success report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCredentials {
	/// Access token.
	pub token: String,
	/// Access token secret.
	pub secret: TokenSecret,
}

/// Successful login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthSuccess {
	/// Provider that authenticated the user.
	pub provider: ProviderId,
	/// Provider-side user identifier.
	pub uid: String,
	/// User info.
	pub info: AuthInfo,
	/// Issued credential.
	pub credentials: AuthCredentials,
	/// Unmodified profile record.
	pub raw: Map<String, Value>,
}
impl AuthSuccess {
	/// Assembles the report from a mapped identity and the issued credential.
	pub fn new(provider: ProviderId, identity: Identity, credential: AccessCredential) -> Self {
		Self {
			provider,
			uid: identity.uid,
			info: AuthInfo {
				name: identity.display_name,
				email: identity.email,
				username: identity.username,
				image: identity.avatar,
			},
			credentials: AuthCredentials { token: credential.token, secret: credential.secret },
			raw: identity.raw,
		}
	}
}

/// Failed login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFailure {
	/// Stable failure code.
	pub code: ErrorCode,
	/// Human-readable message.
	pub message: String,
	/// Callback parameters or provider response behind the failure.
	#[serde(default)]
	pub raw: RawPayload,
}
impl From<&Error> for AuthFailure {
	fn from(err: &Error) -> Self {
		Self { code: err.code(), message: err.to_string(), raw: err.raw() }
	}
}
impl From<Error> for AuthFailure {
	fn from(err: Error) -> Self {
		Self::from(&err)
	}
}
