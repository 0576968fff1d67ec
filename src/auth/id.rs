//! Flow and provider identifiers.
//!
//! A [`FlowId`] is the key that ties the `begin` leg to the callback: hosts usually derive it from
//! their session, or mint one with [`FlowId::generate`]. Both kinds end up as store keys and
//! span fields, so they must be non-empty, bounded, and free of whitespace or control characters.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 256;
const GENERATED_FLOW_ID_LEN: usize = 32;

macro_rules! def_id {
	($name:ident, $kind:literal, $doc:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Validates and wraps `value`.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				check($kind, &value)?;

				Ok(Self(value))
			}

			#[allow(dead_code)]
			pub(crate) fn from_static(value: &'static str) -> Self {
				debug_assert!(check($kind, value).is_ok());

				Self(value.to_owned())
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

/// Error returned when an identifier is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Identifier kind (`Flow` or `Provider`).
		kind: &'static str,
	},
	/// The identifier contains whitespace or a control character.
	#[error("{kind} identifier contains whitespace or control characters.")]
	InvalidCharacter {
		/// Identifier kind (`Flow` or `Provider`).
		kind: &'static str,
	},
	/// The identifier is longer than 256 bytes.
	#[error("{kind} identifier exceeds {max} bytes.")]
	TooLong {
		/// Identifier kind (`Flow` or `Provider`).
		kind: &'static str,
		/// Maximum permitted length in bytes.
		max: usize,
	},
}

def_id! { FlowId, "Flow", "Host-supplied key for one login attempt, e.g. a session id." }
def_id! { ProviderId, "Provider", "Identifier of a provider configuration, e.g. `trello`." }

impl FlowId {
	/// Mints a random 32-character alphanumeric flow id for hosts without a session key.
	pub fn generate() -> Self {
		let id = rand::rng()
			.sample_iter(Alphanumeric)
			.take(GENERATED_FLOW_ID_LEN)
			.map(char::from)
			.collect();

		Self(id)
	}
}

fn check(kind: &'static str, value: &str) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
		return Err(IdentifierError::InvalidCharacter { kind });
	}
	if value.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
