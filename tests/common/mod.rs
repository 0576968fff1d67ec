//! Fixtures shared by the integration suites.

#![allow(dead_code)]

// std
use std::collections::VecDeque;
// crates.io
use parking_lot::Mutex;
// self
use oauth1_broker::{
	auth::FlowId,
	error::TransportError,
	flows::Handshake,
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	provider::{ProviderConfig, trello},
	sign::{FixedStamp, Stamp},
	store::MemoryStore,
	url::Url,
};

pub use std::sync::Arc;

/// Reqwest transport that accepts the self-signed certificates served by `httpmock`.
#[cfg(feature = "reqwest")]
pub fn insecure_reqwest_transport() -> oauth1_broker::http::ReqwestTransport {
	let client = oauth1_broker::reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	oauth1_broker::http::ReqwestTransport::with_client(client)
}

pub const CONSUMER_KEY: &str = "k";
pub const CONSUMER_SECRET: &str = "s";
pub const CALLBACK: &str = "https://app.test/auth/trello/oauth_callback";
pub const NONCE: &str = "fixednonce0123456789";
pub const TIMESTAMP: i64 = 1_700_000_000;

enum Scripted {
	Respond(HttpResponse),
	Fail,
}

/// In-memory transport that replays queued responses and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
	script: Mutex<VecDeque<Scripted>>,
	requests: Mutex<Vec<HttpRequest>>,
}
impl ScriptedTransport {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn respond(&self, status: u16, body: &str) -> &Self {
		self.script.lock().push_back(Scripted::Respond(HttpResponse::new(status, body)));

		self
	}

	pub fn fail(&self) -> &Self {
		self.script.lock().push_back(Scripted::Fail);

		self
	}

	pub fn calls(&self) -> usize {
		self.requests.lock().len()
	}

	pub fn request(&self, idx: usize) -> HttpRequest {
		self.requests.lock()[idx].clone()
	}
}
impl HttpTransport for ScriptedTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		self.requests.lock().push(request);

		let next = self.script.lock().pop_front();

		Box::pin(async move {
			match next {
				Some(Scripted::Respond(response)) => Ok(response),
				Some(Scripted::Fail) => Err(TransportError::Io(std::io::Error::new(
					std::io::ErrorKind::ConnectionReset,
					"scripted connection reset",
				))),
				None => panic!("Transport script exhausted."),
			}
		})
	}
}

pub fn flow(id: &str) -> FlowId {
	FlowId::new(id).expect("Flow fixture should be valid.")
}

pub fn callback_url() -> Url {
	Url::parse(CALLBACK).expect("Callback fixture should parse.")
}

/// Trello preset pointed at `base`.
pub fn trello_config(base: &str) -> ProviderConfig {
	trello::builder(CONSUMER_KEY, CONSUMER_SECRET, callback_url())
		.base_url(base)
		.build()
		.expect("Trello fixture should build.")
}

pub fn stamp() -> Stamp {
	Stamp::new(NONCE, TIMESTAMP)
}

/// Handshake over a scripted transport with a pinned nonce + timestamp.
pub fn scripted_handshake(
	config: ProviderConfig,
	transport: Arc<ScriptedTransport>,
) -> (Handshake<ScriptedTransport>, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::default());
	let handshake =
		Handshake::<ScriptedTransport>::with_transport(store.clone(), config, transport)
			.with_stamps(Arc::new(FixedStamp(stamp())));

	(handshake, store)
}

/// Query pairs of a URL as a map (first value wins).
pub fn query_map(url: &Url) -> std::collections::BTreeMap<String, String> {
	let mut map = std::collections::BTreeMap::new();

	for (key, value) in url.query_pairs().into_owned() {
		map.entry(key).or_insert(value);
	}

	map
}
