//! RFC 3986 percent-encoding and signature base string construction.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
// self
use crate::{_prelude::*, http::HttpMethod};

/// Everything except the RFC 3986 unreserved characters (`ALPHA / DIGIT / - . _ ~`).
pub const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes a value using uppercase hex and the OAuth unreserved set.
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Encodes every pair, sorts by encoded key then encoded value, and joins them as `k=v&k=v`.
pub fn normalize_parameters<'a, I>(params: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut encoded = params
		.into_iter()
		.map(|(key, value)| (percent_encode(key), percent_encode(value)))
		.collect::<Vec<_>>();

	encoded.sort();

	let mut buf = String::new();

	for (idx, (key, value)) in encoded.iter().enumerate() {
		if idx > 0 {
			buf.push('&');
		}

		buf.push_str(key);
		buf.push('=');
		buf.push_str(value);
	}

	buf
}

/// Builds `METHOD&enc(base_url)&enc(normalized_params)`.
///
/// `url` must already be stripped of its query and fragment.
pub fn base_string(method: HttpMethod, url: &Url, params: &BTreeMap<String, String>) -> String {
	let normalized = normalize_parameters(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

	format!("{}&{}&{}", method.as_str(), percent_encode(url.as_str()), percent_encode(&normalized))
}

/// Builds the `enc(consumer_secret)&enc(token_secret)` key shared by HMAC-SHA1 and PLAINTEXT.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
	format!("{}&{}", percent_encode(consumer_secret), percent_encode(token_secret))
}
