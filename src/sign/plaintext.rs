//! PLAINTEXT signature method (RFC 5849 §3.4.4), only safe over TLS.

// self
use crate::{error::ConfigError, sign::Signer};

/// Uses the signing key itself as the signature.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaintextSigner;
impl PlaintextSigner {
	/// Wire name sent as `oauth_signature_method`.
	pub const METHOD: &'static str = "PLAINTEXT";
}
impl Signer for PlaintextSigner {
	fn method(&self) -> &'static str {
		Self::METHOD
	}

	fn signature(&self, _base_string: &str, key: &str) -> Result<String, ConfigError> {
		Ok(key.to_owned())
	}
}
