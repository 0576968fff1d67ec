// crates.io
use time::Duration;
// self
use oauth1_broker::{
	auth::ProviderId,
	provider::{AvatarRule, IdentityAuth, ProviderConfig, ProviderConfigError, trello},
	sign::{SignatureMethod, SignaturePlacement},
	url::Url,
};

fn callback() -> Url {
	Url::parse("https://app.test/auth/trello/oauth_callback").expect("Callback should parse.")
}

#[test]
fn trello_preset_matches_the_documented_endpoints_and_defaults() {
	let config = trello::builder("k", "s", callback()).build().expect("Preset should build.");

	assert_eq!(config.base_url.as_str(), "https://trello.com/1/");
	assert_eq!(
		config.endpoints.request_token.as_str(),
		"https://trello.com/1/OAuthGetRequestToken"
	);
	assert_eq!(config.endpoints.authorize.as_str(), "https://trello.com/1/OAuthAuthorizeToken");
	assert_eq!(
		config.endpoints.access_token.as_str(),
		"https://trello.com/1/OAuthGetAccessToken"
	);
	assert_eq!(config.signature_method, SignatureMethod::HmacSha1);
	assert_eq!(config.placement, SignaturePlacement::Query);
	assert_eq!(config.flow_ttl, Duration::minutes(10));
	assert_eq!(config.display.expiration.as_deref(), Some("never"));
	assert_eq!(config.display.name, None);
	assert!(config.display.scopes.is_enabled("read"));
	assert!(!config.display.scopes.is_enabled("write"));
	assert!(!config.display.scopes.is_enabled("account"));

	let identity = config.identity.expect("Preset should configure an identity endpoint.");

	assert_eq!(identity.url.as_str(), "https://trello.com/1/members/me");
	assert_eq!(
		identity.auth,
		IdentityAuth::KeyToken { key_param: "key".into(), token_param: "token".into() }
	);
	assert_eq!(identity.mapping.uid, "id");
	assert_eq!(identity.mapping.name.as_deref(), Some("fullName"));
	assert_eq!(
		identity.mapping.avatar,
		AvatarRule::Template {
			template: "http://www.gravatar.com/avatar/{}".into(),
			field: "gravatarHash".into(),
		}
	);
}

#[test]
fn scope_option_enables_listed_flags() {
	let config = trello::builder("k", "s", callback())
		.scope("write")
		.expiration("30days")
		.name("Board Sync")
		.build()
		.expect("Preset should build.");
	let pairs = config.display.pairs();

	assert!(pairs.contains(&("scope".to_owned(), "read,write".to_owned())));
	assert!(pairs.contains(&("expiration".to_owned(), "30days".to_owned())));
	assert!(pairs.contains(&("name".to_owned(), "Board Sync".to_owned())));
}

#[test]
fn config_round_trips_through_json_and_keeps_secrets_out_of_debug() {
	let config = trello::builder("k", "very-secret", callback())
		.scope("read,account")
		.authorize_param("response_type", "token")
		.build()
		.expect("Preset should build.");
	let json = serde_json::to_value(&config).expect("Config should serialize.");

	assert_eq!(json["flow_ttl"], serde_json::json!(600));
	assert_eq!(json["consumer_secret"], serde_json::json!("very-secret"));

	let decoded: ProviderConfig =
		serde_json::from_value(json).expect("Config should deserialize.");

	assert_eq!(decoded, config);
	assert!(decoded.validate().is_ok());
	assert!(!format!("{config:?}").contains("very-secret"));
}

#[test]
fn minimal_json_config_fills_defaults() {
	let config: ProviderConfig = serde_json::from_value(serde_json::json!({
		"id": "custom",
		"consumer_key": "k",
		"consumer_secret": "s",
		"base_url": "https://api.example.test/",
		"endpoints": {
			"request_token": "https://api.example.test/request",
			"authorize": "https://api.example.test/authorize",
			"access_token": "https://api.example.test/access"
		},
		"callback_url": "https://app.test/cb"
	}))
	.expect("Minimal config should deserialize.");

	assert_eq!(config.id, ProviderId::new("custom").expect("Id should be valid."));
	assert_eq!(config.flow_ttl, Duration::minutes(10));
	assert_eq!(config.display.scope_delimiter, ',');
	assert_eq!(config.identity, None);
	assert!(config.validate().is_ok());

	let mut broken = config;

	broken.consumer_key.clear();

	assert_eq!(broken.validate(), Err(ProviderConfigError::MissingConsumerKey));
}

#[test]
fn builder_requires_consumer_credentials() {
	assert_eq!(
		trello::builder("", "s", callback()).build().unwrap_err(),
		ProviderConfigError::MissingConsumerKey
	);
	assert_eq!(
		trello::builder("k", "", callback()).build().unwrap_err(),
		ProviderConfigError::MissingConsumerSecret
	);
}
