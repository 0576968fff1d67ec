//! Ordered scope flags rendered into the authorize URL.

// self
use crate::_prelude::*;

/// Errors emitted when validating scope names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace or the list separator.
	#[error("Scope contains whitespace or a comma: {scope}.")]
	InvalidCharacter {
		/// The offending scope string.
		scope: String,
	},
}

/// A single named permission toggle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFlag {
	/// Scope name as the provider expects it.
	pub name: String,
	/// Whether the scope is requested.
	pub enabled: bool,
}

/// Declaration-ordered set of scope flags.
///
/// Providers such as Trello take a fixed vocabulary (`read`, `write`, `account`) where each entry
/// is switched on or off; only enabled flags are sent, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeFlags(Vec<ScopeFlag>);
impl ScopeFlags {
	/// Creates an empty flag set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares (or overrides) a flag, keeping its original position when it already exists.
	pub fn declare(
		mut self,
		name: impl Into<String>,
		enabled: bool,
	) -> Result<Self, ScopeValidationError> {
		self.set(name.into(), enabled)?;

		Ok(self)
	}

	/// Enables every scope in a comma-separated list, appending names not yet declared.
	pub fn enable_list(mut self, list: &str) -> Result<Self, ScopeValidationError> {
		for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
			self.set(name.to_owned(), true)?;
		}

		Ok(self)
	}

	/// Returns true if the named flag is declared and enabled.
	pub fn is_enabled(&self, name: &str) -> bool {
		self.0.iter().any(|flag| flag.name == name && flag.enabled)
	}

	/// Iterator over enabled scope names, in declaration order.
	pub fn enabled(&self) -> impl Iterator<Item = &str> {
		self.0.iter().filter(|flag| flag.enabled).map(|flag| flag.name.as_str())
	}

	/// Joins enabled scopes with `delimiter`, or returns `None` when nothing is enabled.
	pub fn joined(&self, delimiter: char) -> Option<String> {
		let mut buf = String::new();

		for (idx, name) in self.enabled().enumerate() {
			if idx > 0 {
				buf.push(delimiter);
			}

			buf.push_str(name);
		}

		if buf.is_empty() { None } else { Some(buf) }
	}

	fn set(&mut self, name: String, enabled: bool) -> Result<(), ScopeValidationError> {
		validate(&name)?;

		match self.0.iter_mut().find(|flag| flag.name == name) {
			Some(flag) => flag.enabled = enabled,
			None => self.0.push(ScopeFlag { name, enabled }),
		}

		Ok(())
	}
}

fn validate(name: &str) -> Result<(), ScopeValidationError> {
	if name.is_empty() {
		return Err(ScopeValidationError::Empty);
	}
	if name.chars().any(|c| c.is_whitespace() || c == ',') {
		return Err(ScopeValidationError::InvalidCharacter { scope: name.to_owned() });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn trello_flags() -> ScopeFlags {
		ScopeFlags::new()
			.declare("read", true)
			.and_then(|flags| flags.declare("write", false))
			.and_then(|flags| flags.declare("account", false))
			.expect("Trello scope fixture should be valid.")
	}

	#[test]
	fn joins_enabled_flags_in_declaration_order() {
		let flags = trello_flags();

		assert_eq!(flags.joined(','), Some("read".into()));

		let flags = flags.enable_list("account, write").expect("Scope list should be valid.");

		assert_eq!(flags.joined(','), Some("read,write,account".into()));
		assert!(flags.is_enabled("write"));
	}

	#[test]
	fn enable_list_appends_unknown_scopes() {
		let flags = trello_flags().enable_list("boards").expect("Scope list should be valid.");

		assert_eq!(flags.joined(','), Some("read,boards".into()));
	}

	#[test]
	fn disabled_everything_renders_nothing() {
		let flags = trello_flags().declare("read", false).expect("Override should be valid.");

		assert_eq!(flags.joined(','), None);
		assert_eq!(ScopeFlags::new().joined(' '), None);
	}

	#[test]
	fn rejects_malformed_names() {
		assert_eq!(ScopeFlags::new().declare("", true), Err(ScopeValidationError::Empty));
		assert!(ScopeFlags::new().declare("read write", true).is_err());
	}
}
