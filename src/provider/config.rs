//! Validated provider configuration consumed by the handshake engine.

/// Builder API for assembling provider configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ScopeFlags, TokenSecret},
	provider::IdentityMapping,
	sign::{SignatureMethod, SignaturePlacement},
};

/// Default lifetime of a pending flow.
pub const DEFAULT_FLOW_TTL: Duration = Duration::minutes(10);
/// Default separator used when joining enabled scopes.
pub const DEFAULT_SCOPE_DELIMITER: char = ',';

/// Resolved OAuth 1.0a endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Temporary credential (request token) endpoint.
	pub request_token: Url,
	/// Resource owner authorization page.
	pub authorize: Url,
	/// Token credential (access token) endpoint.
	pub access_token: Url,
}

/// Parameters rendered onto the authorize page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayParams {
	/// Application name shown to the user (`name`).
	#[serde(default)]
	pub name: Option<String>,
	/// Token lifetime hint (`expiration`), e.g. `never` or `30days`.
	#[serde(default)]
	pub expiration: Option<String>,
	/// Permission toggles joined into `scope`.
	#[serde(default)]
	pub scopes: ScopeFlags,
	/// Separator placed between enabled scopes.
	#[serde(default = "default_scope_delimiter")]
	pub scope_delimiter: char,
}
impl DisplayParams {
	/// Renders the non-empty display parameters as `(key, value)` pairs.
	pub fn pairs(&self) -> Vec<(String, String)> {
		let mut pairs = Vec::new();

		if let Some(name) = self.name.as_ref().filter(|name| !name.is_empty()) {
			pairs.push(("name".into(), name.clone()));
		}
		if let Some(expiration) = self.expiration.as_ref().filter(|value| !value.is_empty()) {
			pairs.push(("expiration".into(), expiration.clone()));
		}
		if let Some(scope) = self.scopes.joined(self.scope_delimiter) {
			pairs.push(("scope".into(), scope));
		}

		pairs
	}
}
impl Default for DisplayParams {
	fn default() -> Self {
		Self {
			name: None,
			expiration: None,
			scopes: ScopeFlags::default(),
			scope_delimiter: DEFAULT_SCOPE_DELIMITER,
		}
	}
}

/// How the identity endpoint authenticates the call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum IdentityAuth {
	/// Consumer key and access token travel as plain query parameters.
	KeyToken {
		/// Query parameter carrying the consumer key.
		key_param: String,
		/// Query parameter carrying the access token.
		token_param: String,
	},
	/// The call is OAuth 1.0a signed with the access credential.
	Signed,
}

/// Body encoding returned by the identity endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileFormat {
	/// A JSON object.
	#[default]
	Json,
	/// A form-encoded body.
	Form,
}

/// Identity endpoint description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEndpoint {
	/// Absolute URL of the endpoint.
	pub url: Url,
	/// Authentication scheme.
	pub auth: IdentityAuth,
	/// Body encoding.
	#[serde(default)]
	pub format: ProfileFormat,
	/// Field mapping applied to the parsed record.
	pub mapping: IdentityMapping,
}

/// Immutable provider configuration consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// Provider identifier.
	pub id: ProviderId,
	/// Consumer key issued by the provider.
	pub consumer_key: String,
	/// Consumer secret issued by the provider.
	pub consumer_secret: TokenSecret,
	/// Base URL the endpoint paths were resolved against.
	pub base_url: Url,
	/// Resolved endpoint URLs.
	pub endpoints: ProviderEndpoints,
	/// Where the provider redirects after authorization.
	pub callback_url: Url,
	/// Signature method used for every signed call.
	#[serde(default)]
	pub signature_method: SignatureMethod,
	/// Where protocol parameters travel.
	#[serde(default)]
	pub placement: SignaturePlacement,
	/// Authorize page parameters.
	#[serde(default)]
	pub display: DisplayParams,
	/// Extra parameters signed into the request-token call.
	#[serde(default)]
	pub request_token_params: Vec<(String, String)>,
	/// Extra parameters appended to the authorize URL.
	#[serde(default)]
	pub authorize_params: Vec<(String, String)>,
	/// Optional identity endpoint.
	#[serde(default)]
	pub identity: Option<IdentityEndpoint>,
	/// Lifetime of a pending flow.
	#[serde(default = "default_flow_ttl", with = "ttl_seconds")]
	pub flow_ttl: Duration,
}
impl ProviderConfig {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(id)
	}

	/// Re-checks the invariants enforced by [`ProviderConfigBuilder::build`].
	///
	/// Configurations loaded through serde skip the builder, so hosts should call this after
	/// deserializing.
	pub fn validate(&self) -> Result<(), ProviderConfigError> {
		if self.consumer_key.is_empty() {
			return Err(ProviderConfigError::MissingConsumerKey);
		}
		if self.consumer_secret.is_empty() {
			return Err(ProviderConfigError::MissingConsumerSecret);
		}
		if self.display.scope_delimiter.is_control() {
			return Err(ProviderConfigError::InvalidScopeDelimiter {
				delimiter: self.display.scope_delimiter,
			});
		}
		if !self.flow_ttl.is_positive() {
			return Err(ProviderConfigError::NonPositiveTtl);
		}

		Ok(())
	}
}

fn default_scope_delimiter() -> char {
	DEFAULT_SCOPE_DELIMITER
}

fn default_flow_ttl() -> Duration {
	DEFAULT_FLOW_TTL
}

/// TTLs travel as whole seconds in serialized configs.
mod ttl_seconds {
	// crates.io
	use serde::{Deserializer, Serializer};
	// self
	use crate::_prelude::*;

	pub fn serialize<S>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(ttl.whole_seconds())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		i64::deserialize(deserializer).map(Duration::seconds)
	}
}
