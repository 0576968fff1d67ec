//! Walks a Trello login end to end against a local mock of Trello's OAuth 1.0a endpoints: begin a
//! flow, send the user to the authorize page, then finish it from the callback query.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth1_broker::{
	auth::FlowId,
	flows::{CallbackParams, ReqwestHandshake},
	http::ReqwestTransport,
	provider::trello,
	report::AuthFailure,
	reqwest::Client,
	store::MemoryStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/1/OAuthGetRequestToken");
			then.status(200).body(
				"oauth_token=demo-request&oauth_token_secret=demo-request-secret&oauth_callback_confirmed=true",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/1/OAuthGetAccessToken").query_param("oauth_verifier", "demo");
			then.status(200).body("oauth_token=demo-access&oauth_token_secret=demo-access-secret");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/1/members/me").query_param("token", "demo-access");
			then.status(200).header("content-type", "application/json").body(
				"{\"id\":\"4ee7deffe582acdec80000ac\",\"fullName\":\"Demo Member\",\"username\":\"demo\"}",
			);
		})
		.await;

	let config = trello::builder(
		"demo-key",
		"demo-secret",
		Url::parse("https://app.example.com/auth/trello/oauth_callback")?,
	)
	.base_url(server.url("/1/"))
	.name("Demo Board Sync")
	.scope("read,write")
	.build()?;
	// The mock server presents a self-signed certificate.
	let transport = ReqwestTransport::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let handshake =
		ReqwestHandshake::with_transport(Arc::new(MemoryStore::default()), config, transport);
	let flow = FlowId::new("browser-session-42")?;
	let authorization = handshake.begin(flow.clone()).await?;

	println!("Send your user to {}.", authorization.authorize_url);
	println!("The pending flow expires at {}.", authorization.expires_at);

	// Trello redirects back with the request token and a verifier.
	let callback = CallbackParams::from_query(&format!(
		"oauth_token={}&oauth_verifier=demo",
		authorization.request_token
	));

	match handshake.authenticate(&flow, &callback).await {
		Ok(success) => println!("{}", serde_json::to_string_pretty(&success)?),
		Err(e) => println!("{}", serde_json::to_string_pretty(&AuthFailure::from(&e))?),
	}

	// Replaying the same callback finds nothing to complete.
	if let Err(e) = handshake.authenticate(&flow, &callback).await {
		println!("Replay rejected with `{}`.", e.code());
	}

	Ok(())
}
