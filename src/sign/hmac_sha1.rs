//! HMAC-SHA1 signature method (RFC 5849 §3.4.2).

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
// self
use crate::{error::ConfigError, sign::Signer};

type HmacSha1 = Hmac<Sha1>;

/// Signs the base string with HMAC-SHA1 and base64-encodes the digest.
#[derive(Clone, Copy, Debug, Default)]
pub struct HmacSha1Signer;
impl HmacSha1Signer {
	/// Wire name sent as `oauth_signature_method`.
	pub const METHOD: &'static str = "HMAC-SHA1";
}
impl Signer for HmacSha1Signer {
	fn method(&self) -> &'static str {
		Self::METHOD
	}

	fn signature(&self, base_string: &str, key: &str) -> Result<String, ConfigError> {
		let mut mac = <HmacSha1 as Mac>::new_from_slice(key.as_bytes())
			.map_err(|_| ConfigError::InvalidSigningKey { method: Self::METHOD })?;

		mac.update(base_string.as_bytes());

		Ok(STANDARD.encode(mac.finalize().into_bytes()))
	}
}
