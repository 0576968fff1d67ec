//! Nonce + timestamp sources injected into every signature.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

const NONCE_LEN: usize = 32;

/// The only wall-clock and randomness inputs to a signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stamp {
	/// `oauth_nonce`; unique per request.
	pub nonce: String,
	/// `oauth_timestamp`; seconds since the UNIX epoch.
	pub timestamp: i64,
}
impl Stamp {
	/// Creates a stamp from explicit parts.
	pub fn new(nonce: impl Into<String>, timestamp: i64) -> Self {
		Self { nonce: nonce.into(), timestamp }
	}
}

/// Supplies a [`Stamp`] for each outbound signed request.
pub trait StampSource: Send + Sync {
	/// Produces the nonce/timestamp pair for the next request.
	fn stamp(&self) -> Stamp;
}

/// Production source: CSPRNG alphanumeric nonce and the current UTC time.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomStamps;
impl StampSource for RandomStamps {
	fn stamp(&self) -> Stamp {
		let nonce = rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect();

		Stamp { nonce, timestamp: OffsetDateTime::now_utc().unix_timestamp() }
	}
}

/// Deterministic source returning the same stamp every time; meant for tests and replays.
#[derive(Clone, Debug)]
pub struct FixedStamp(pub Stamp);
impl StampSource for FixedStamp {
	fn stamp(&self) -> Stamp {
		self.0.clone()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn random_stamps_differ_per_request() {
		let first = RandomStamps.stamp();
		let second = RandomStamps.stamp();

		assert_eq!(first.nonce.len(), NONCE_LEN);
		assert!(first.nonce.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(first.nonce, second.nonce);
		assert!(first.timestamp > 1_600_000_000);
	}
}
