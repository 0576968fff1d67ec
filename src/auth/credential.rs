//! Token pairs issued by the request-token and access-token endpoints.

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Permanent credential produced by a successful handshake.
///
/// The broker hands ownership to the caller and never persists it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCredential {
	/// `oauth_token` issued by the access-token endpoint.
	pub token: String,
	/// `oauth_token_secret` issued by the access-token endpoint.
	pub secret: TokenSecret,
}
impl AccessCredential {
	/// Creates a credential from its token + secret parts.
	pub fn new(token: impl Into<String>, secret: impl Into<TokenSecret>) -> Self {
		Self { token: token.into(), secret: secret.into() }
	}
}

/// Form-encoded token response shared by the request-token and access-token endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenResponse {
	/// Every field of the response, verbatim.
	pub fields: BTreeMap<String, String>,
}
impl TokenResponse {
	/// Parses an `application/x-www-form-urlencoded` body.
	///
	/// Repeated keys keep their first value.
	pub fn parse(body: &str) -> Self {
		let mut fields = BTreeMap::new();

		for (key, value) in form_urlencoded::parse(body.trim().as_bytes()) {
			fields.entry(key.into_owned()).or_insert_with(|| value.into_owned());
		}

		Self { fields }
	}

	/// Returns a field value, treating empty strings as absent.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.fields.get(key).map(String::as_str).filter(|value| !value.is_empty())
	}

	/// Returns the non-empty `oauth_token` + `oauth_token_secret` pair, if both are present.
	pub fn token_pair(&self) -> Option<(&str, &str)> {
		Some((self.get("oauth_token")?, self.get("oauth_token_secret")?))
	}

	/// Indicates whether the provider confirmed the callback (`oauth_callback_confirmed=true`).
	pub fn callback_confirmed(&self) -> bool {
		self.get("oauth_callback_confirmed") == Some("true")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_token_pair_and_extras() {
		let response = TokenResponse::parse(
			"oauth_token=rt1&oauth_token_secret=rts1&oauth_callback_confirmed=true\n",
		);

		assert_eq!(response.token_pair(), Some(("rt1", "rts1")));
		assert!(response.callback_confirmed());
		assert_eq!(response.fields.len(), 3);
	}

	#[test]
	fn empty_values_count_as_missing() {
		let response = TokenResponse::parse("oauth_token=at1&oauth_token_secret=");

		assert_eq!(response.get("oauth_token"), Some("at1"));
		assert_eq!(response.token_pair(), None);
		assert_eq!(TokenResponse::parse("invalid signature").token_pair(), None);
	}

	#[test]
	fn decodes_percent_encoded_values() {
		let response = TokenResponse::parse("oauth_token=a%2Bb&oauth_token_secret=c%3Dd");

		assert_eq!(response.token_pair(), Some(("a+b", "c=d")));
	}

	#[test]
	fn credential_debug_redacts_secret() {
		let credential = AccessCredential::new("at1", "ats1");

		assert!(!format!("{credential:?}").contains("ats1"));
	}
}
