#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::{Map, Value};
// self
use common::*;
use oauth1_broker::{
	auth::{AccessCredential, Identity, ProviderId},
	error::{Error, ErrorCode, ProfileFetchError, RawPayload},
	flows::{CallbackParams, ReqwestHandshake},
	http::HttpResponse,
	provider::{IdentityAuth, IdentityMapping, ProfileFormat, ProviderConfig, trello},
	sign::{FixedStamp, SignaturePlacement},
	store::MemoryStore,
};

fn reqwest_handshake(config: ProviderConfig) -> ReqwestHandshake {
	ReqwestHandshake::with_transport(
		Arc::new(MemoryStore::default()),
		config,
		insecure_reqwest_transport(),
	)
	.with_stamps(Arc::new(FixedStamp(stamp())))
}

#[tokio::test]
async fn trello_flow_over_http() {
	let server = MockServer::start_async().await;
	let handshake = reqwest_handshake(trello_config(&server.url("/1/")));
	let request_token = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/1/OAuthGetRequestToken")
				.query_param("oauth_callback", CALLBACK)
				.query_param("oauth_consumer_key", CONSUMER_KEY)
				.query_param("oauth_signature_method", "HMAC-SHA1")
				.query_param_exists("oauth_signature");
			then.status(200)
				.body("oauth_token=rt1&oauth_token_secret=rts1&oauth_callback_confirmed=true");
		})
		.await;
	let access_token = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/1/OAuthGetAccessToken")
				.query_param("oauth_token", "rt1")
				.query_param("oauth_verifier", "v1")
				.query_param_exists("oauth_signature");
			then.status(200).body("oauth_token=at1&oauth_token_secret=ats1");
		})
		.await;
	let member = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/1/members/me")
				.query_param("key", CONSUMER_KEY)
				.query_param("token", "at1");
			then.status(200).header("content-type", "application/json").body(
				r#"{"id":"m1","fullName":"Grace Hopper","email":"grace@example.test","username":"grace","gravatarHash":"abc"}"#,
			);
		})
		.await;
	let flow = flow("session-http");
	let authorization = handshake.begin(flow.clone()).await.expect("Begin should succeed.");

	request_token.assert_async().await;

	assert_eq!(authorization.request_token, "rt1");
	assert!(authorization.authorize_url.path().ends_with("/1/OAuthAuthorizeToken"));

	let callback = CallbackParams::from_query("oauth_token=rt1&oauth_verifier=v1");
	let success =
		handshake.authenticate(&flow, &callback).await.expect("Authenticate should succeed.");

	access_token.assert_async().await;
	member.assert_async().await;

	assert_eq!(success.uid, "m1");
	assert_eq!(success.info.email.as_deref(), Some("grace@example.test"));
	assert_eq!(success.info.image.as_deref(), Some("http://www.gravatar.com/avatar/abc"));
	assert_eq!(success.credentials.token, "at1");
}

#[tokio::test]
async fn profile_errors_report_missing_user_details_with_raw_body() {
	let server = MockServer::start_async().await;
	let handshake = reqwest_handshake(trello_config(&server.url("/1/")));
	let credential = AccessCredential::new("revoked", "ats1");
	let member = server
		.mock_async(|when, then| {
			when.method(GET).path("/1/members/me").query_param("token", "revoked");
			then.status(401).body("invalid token");
		})
		.await;
	let err = handshake.fetch_identity(&credential).await.expect_err("Profile fetch should fail.");

	member.assert_async().await;

	assert_eq!(err.code(), ErrorCode::MissingUserDetails);
	assert_eq!(err.raw(), RawPayload::response(401, "invalid token"));
}

#[tokio::test]
async fn profile_without_uid_or_object_body_is_rejected() {
	let server = MockServer::start_async().await;
	let handshake = reqwest_handshake(trello_config(&server.url("/1/")));
	let credential = AccessCredential::new("no-id", "ats1");
	let not_object = AccessCredential::new("array", "ats1");

	server
		.mock_async(|when, then| {
			when.method(GET).path("/1/members/me").query_param("token", "no-id");
			then.status(203).body(r#"{"fullName":"Nobody"}"#);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/1/members/me").query_param("token", "array");
			then.status(200).body("[]");
		})
		.await;

	let err = handshake.fetch_identity(&credential).await.expect_err("Missing uid should fail.");

	assert!(matches!(
		err,
		Error::ProfileFetch(ProfileFetchError::MissingField { ref field, .. }) if field == "id"
	));
	assert_eq!(err.raw(), RawPayload::response(203, r#"{"fullName":"Nobody"}"#));

	let err = handshake.fetch_identity(&not_object).await.expect_err("Arrays should fail.");

	assert!(matches!(err, Error::ProfileFetch(ProfileFetchError::Parse { .. })));
	assert_eq!(err.code(), ErrorCode::MissingUserDetails);
}

#[tokio::test]
async fn signed_identity_endpoint_with_form_body() {
	let server = MockServer::start_async().await;
	let config =
		ProviderConfig::builder(ProviderId::new("form-provider").expect("Id should be valid."))
			.consumer(CONSUMER_KEY, CONSUMER_SECRET)
			.base_url(server.url("/oauth"))
			.request_token_path("request_token")
			.authorize_path("authorize")
			.access_token_path("access_token")
			.callback_url(callback_url())
			.placement(SignaturePlacement::Header)
			.identity(
				"account/verify",
				IdentityAuth::Signed,
				IdentityMapping::new("user_id").username("screen_name"),
			)
			.identity_format(ProfileFormat::Form)
			.build()
			.expect("Form provider should build.");
	let account = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/account/verify").header_exists("authorization");
			then.status(200).body("user_id=7&screen_name=ada");
		})
		.await;
	let handshake = reqwest_handshake(config);
	let identity = handshake
		.fetch_identity(&AccessCredential::new("at1", "ats1"))
		.await
		.expect("Signed profile fetch should succeed.");

	account.assert_async().await;

	assert_eq!(identity.uid, "7");
	assert_eq!(identity.username.as_deref(), Some("ada"));
	assert_eq!(identity.raw.get("screen_name"), Some(&Value::String("ada".into())));
}

#[tokio::test]
async fn custom_identity_mapper_overrides_configured_mapping() {
	let server = MockServer::start_async().await;
	let mapper =
		|record: Map<String, Value>, _: &HttpResponse| -> Result<Identity, ProfileFetchError> {
			let uid = record.get("idMember").and_then(Value::as_str).unwrap_or("anonymous");

			Ok(Identity { uid: format!("trello:{uid}"), raw: record, ..Default::default() })
		};
	let handshake = reqwest_handshake(
		trello::builder(CONSUMER_KEY, CONSUMER_SECRET, callback_url())
			.base_url(server.url("/1/"))
			.build()
			.expect("Trello fixture should build."),
	)
	.with_identity_mapper(Arc::new(mapper));

	server
		.mock_async(|when, then| {
			when.method(GET).path("/1/members/me");
			then.status(200).body(r#"{"idMember":"x9"}"#);
		})
		.await;

	let identity = handshake
		.fetch_identity(&AccessCredential::new("at1", "ats1"))
		.await
		.expect("Custom mapper should succeed.");

	assert_eq!(identity.uid, "trello:x9");
}
