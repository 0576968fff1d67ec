//! Trello preset.
//!
//! Trello speaks plain OAuth 1.0a with HMAC-SHA1 and query-string signatures. Its authorize page
//! understands `name`, `expiration` and a comma-separated `scope` drawn from `read`, `write` and
//! `account`; the profile lives at `members/me` and is fetched with `key` + `token` query
//! parameters rather than a signed call.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, TokenSecret},
	provider::{AvatarRule, IdentityAuth, IdentityMapping, ProviderConfig, ProviderConfigBuilder},
};

/// Provider identifier used by the preset.
pub const PROVIDER_ID: &str = "trello";
/// API base every Trello path resolves against.
pub const BASE_URL: &str = "https://trello.com/1/";
/// Request-token path.
pub const REQUEST_TOKEN_PATH: &str = "OAuthGetRequestToken";
/// Authorize page path.
pub const AUTHORIZE_PATH: &str = "OAuthAuthorizeToken";
/// Access-token path.
pub const ACCESS_TOKEN_PATH: &str = "OAuthGetAccessToken";
/// Profile endpoint path.
pub const IDENTITY_PATH: &str = "members/me";
/// Avatar URL template filled with the member's `gravatarHash`.
pub const GRAVATAR_TEMPLATE: &str = "http://www.gravatar.com/avatar/{}";

/// Returns a builder pre-populated with Trello's endpoints, scopes and profile mapping.
///
/// Scopes start as `read`; enable more through [`ProviderConfigBuilder::scope`]
/// (e.g. `"read,write"`). The authorize page is asked for a non-expiring token unless
/// [`ProviderConfigBuilder::expiration`] says otherwise.
pub fn builder(
	key: impl Into<String>,
	secret: impl Into<TokenSecret>,
	callback: Url,
) -> ProviderConfigBuilder {
	ProviderConfig::builder(ProviderId::from_static(PROVIDER_ID))
		.consumer(key, secret)
		.base_url(BASE_URL)
		.request_token_path(REQUEST_TOKEN_PATH)
		.authorize_path(AUTHORIZE_PATH)
		.access_token_path(ACCESS_TOKEN_PATH)
		.callback_url(callback)
		.declare_scope("read", true)
		.declare_scope("write", false)
		.declare_scope("account", false)
		.expiration("never")
		.identity(
			IDENTITY_PATH,
			IdentityAuth::KeyToken { key_param: "key".into(), token_param: "token".into() },
			member_mapping(),
		)
}

/// Maps a Trello member record (`id`, `fullName`, `email`, `username`, `gravatarHash`).
pub fn member_mapping() -> IdentityMapping {
	IdentityMapping::new("id").name("fullName").email("email").username("username").avatar(
		AvatarRule::Template { template: GRAVATAR_TEMPLATE.into(), field: "gravatarHash".into() },
	)
}
