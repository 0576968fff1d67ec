//! OAuth 1.0a request signing (RFC 5849 §3.4).
//!
//! [`sign`] merges the caller's parameters with the protocol parameters
//! (`oauth_consumer_key`, `oauth_nonce`, `oauth_signature_method`, `oauth_timestamp`,
//! `oauth_version`), builds the canonical base string, and asks a [`Signer`] for the
//! signature. The result is a [`SignedRequest`] that renders either as a fully signed URL or as an
//! `Authorization: OAuth ...` header. Signing is pure: the same inputs, nonce and timestamp
//! included, always produce the same output.

pub mod encode;
pub mod hmac_sha1;
pub mod plaintext;
pub mod stamp;

pub use encode::*;
pub use hmac_sha1::*;
pub use plaintext::*;
pub use stamp::*;

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::{HttpMethod, HttpRequest},
};

const OAUTH_VERSION: &str = "1.0";
const PROTOCOL_PREFIX: &str = "oauth_";

/// Signature scheme capability.
///
/// Implementations receive the canonical base string and the
/// `enc(consumer_secret)&enc(token_secret)` key, so alternative schemes can be swapped in without
/// touching the handshake engine.
pub trait Signer: Send + Sync {
	/// Value sent as `oauth_signature_method`.
	fn method(&self) -> &'static str;

	/// Computes the (unencoded) `oauth_signature` value.
	fn signature(&self, base_string: &str, key: &str) -> Result<String, ConfigError>;
}

/// Signature methods selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum SignatureMethod {
	/// HMAC-SHA1 over the base string.
	#[default]
	HmacSha1,
	/// Key-as-signature; only safe over TLS.
	Plaintext,
}
impl SignatureMethod {
	/// Returns the built-in signer for this method.
	pub fn signer(self) -> Arc<dyn Signer> {
		match self {
			SignatureMethod::HmacSha1 => Arc::new(HmacSha1Signer),
			SignatureMethod::Plaintext => Arc::new(PlaintextSigner),
		}
	}
}

/// Where the protocol parameters travel on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignaturePlacement {
	/// Every parameter, signature included, is appended to the query string.
	#[default]
	Query,
	/// `oauth_*` parameters go into the `Authorization` header; the rest stay in the query.
	Header,
}

/// Unsigned request description handed to [`sign`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthRequest {
	/// HTTP method that will be used on the wire.
	pub method: HttpMethod,
	/// Target URL; any query pairs it carries are signed too.
	pub url: Url,
	/// Request parameters, keys unique.
	pub params: BTreeMap<String, String>,
}
impl OAuthRequest {
	/// Creates a request for the provided method + URL.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, params: BTreeMap::new() }
	}

	/// Shorthand for a `GET` request.
	pub fn get(url: Url) -> Self {
		Self::new(HttpMethod::Get, url)
	}

	/// Adds (or replaces) a parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(key.into(), value.into());

		self
	}

	/// Adds every pair from `params`, replacing duplicates.
	pub fn params<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.params.extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));

		self
	}
}

/// Fully signed request ready to be rendered onto the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
	/// HTTP method used in the base string.
	pub method: HttpMethod,
	/// Base URL without query or fragment.
	pub url: Url,
	/// Every signed parameter plus `oauth_signature`.
	pub parameters: BTreeMap<String, String>,
	/// The unencoded `oauth_signature` value.
	pub signature: String,
}
impl SignedRequest {
	/// Renders every parameter, the signature included, into the query string.
	pub fn to_url(&self) -> Url {
		self.url_with(|_| true)
	}

	/// Renders the `Authorization` header value carrying the `oauth_*` parameters.
	pub fn authorization_header(&self) -> String {
		let fields = self
			.parameters
			.iter()
			.filter(|(key, _)| is_protocol_param(key))
			.map(|(key, value)| format!("{}=\"{}\"", percent_encode(key), percent_encode(value)))
			.collect::<Vec<_>>();

		format!("OAuth {}", fields.join(", "))
	}

	/// Converts the signed request into a transport request using `placement`.
	pub fn into_http_request(self, placement: SignaturePlacement) -> HttpRequest {
		match placement {
			SignaturePlacement::Query => HttpRequest::new(self.method, self.to_url()),
			SignaturePlacement::Header => {
				let url = self.url_with(|key| !is_protocol_param(key));

				HttpRequest::new(self.method, url)
					.header("Authorization", self.authorization_header())
			},
		}
	}

	fn url_with(&self, include: impl Fn(&str) -> bool) -> Url {
		let mut url = self.url.clone();
		let query = self
			.parameters
			.iter()
			.filter(|(key, _)| include(key))
			.map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
			.collect::<Vec<_>>();

		if !query.is_empty() {
			url.set_query(Some(&query.join("&")));
		}

		url
	}
}

/// Signs `request` on behalf of the consumer, optionally bound to a token secret.
///
/// Fails with [`ConfigError::MissingConsumerKey`] or [`ConfigError::MissingConsumerSecret`] when
/// either half of the consumer pair is empty.
pub fn sign(
	signer: &dyn Signer,
	request: OAuthRequest,
	consumer_key: &str,
	consumer_secret: &str,
	token_secret: Option<&str>,
	stamp: &Stamp,
) -> Result<SignedRequest, ConfigError> {
	if consumer_key.is_empty() {
		return Err(ConfigError::MissingConsumerKey);
	}
	if consumer_secret.is_empty() {
		return Err(ConfigError::MissingConsumerSecret);
	}

	let OAuthRequest { method, mut url, params } = request;
	let mut parameters = url.query_pairs().into_owned().collect::<BTreeMap<String, String>>();

	url.set_query(None);
	url.set_fragment(None);
	parameters.extend(params);
	parameters.insert("oauth_consumer_key".into(), consumer_key.into());
	parameters.insert("oauth_nonce".into(), stamp.nonce.clone());
	parameters.insert("oauth_signature_method".into(), signer.method().into());
	parameters.insert("oauth_timestamp".into(), stamp.timestamp.to_string());
	parameters.insert("oauth_version".into(), OAUTH_VERSION.into());
	parameters.remove("oauth_signature");

	let base = base_string(method, &url, &parameters);
	let key = signing_key(consumer_secret, token_secret.unwrap_or_default());
	let signature = signer.signature(&base, &key)?;

	parameters.insert("oauth_signature".into(), signature.clone());

	Ok(SignedRequest { method, url, parameters, signature })
}

fn is_protocol_param(key: &str) -> bool {
	key.starts_with(PROTOCOL_PREFIX)
}
