//! Identity mapping: turns a provider's profile record into an [`Identity`].

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::Identity, error::ProfileFetchError, http::HttpResponse};

/// Maps a parsed profile record onto an [`Identity`].
///
/// The default implementation is the data-driven [`IdentityMapping`]; hosts with exotic profile
/// payloads can plug in their own mapper (closures with the same signature work too).
pub trait IdentityMapper: Send + Sync {
	/// Produces an identity from `record`; `response` is kept verbatim for diagnostics.
	fn map_identity(
		&self,
		record: Map<String, Value>,
		response: &HttpResponse,
	) -> Result<Identity, ProfileFetchError>;
}
impl<F> IdentityMapper for F
where
	F: Fn(Map<String, Value>, &HttpResponse) -> Result<Identity, ProfileFetchError> + Send + Sync,
{
	fn map_identity(
		&self,
		record: Map<String, Value>,
		response: &HttpResponse,
	) -> Result<Identity, ProfileFetchError> {
		self(record, response)
	}
}

/// How the avatar URL is derived.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AvatarRule {
	/// No avatar.
	#[default]
	None,
	/// Copy a field verbatim.
	Field {
		/// Field path.
		field: String,
	},
	/// Substitute a field value for `{}` in `template`.
	Template {
		/// URL template, e.g. `http://www.gravatar.com/avatar/{}`.
		template: String,
		/// Field path providing the substitution.
		field: String,
	},
}

/// Field paths used to build an [`Identity`]. Paths may be dotted (`profile.name`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMapping {
	/// Required identifier field.
	pub uid: String,
	/// Display name field.
	#[serde(default)]
	pub name: Option<String>,
	/// Email field.
	#[serde(default)]
	pub email: Option<String>,
	/// Username field.
	#[serde(default)]
	pub username: Option<String>,
	/// Avatar derivation.
	#[serde(default)]
	pub avatar: AvatarRule,
}
impl IdentityMapping {
	/// Creates a mapping that only extracts the identifier.
	pub fn new(uid: impl Into<String>) -> Self {
		Self { uid: uid.into(), name: None, email: None, username: None, avatar: AvatarRule::None }
	}

	/// Sets the display name field.
	pub fn name(mut self, field: impl Into<String>) -> Self {
		self.name = Some(field.into());

		self
	}

	/// Sets the email field.
	pub fn email(mut self, field: impl Into<String>) -> Self {
		self.email = Some(field.into());

		self
	}

	/// Sets the username field.
	pub fn username(mut self, field: impl Into<String>) -> Self {
		self.username = Some(field.into());

		self
	}

	/// Sets the avatar rule.
	pub fn avatar(mut self, rule: AvatarRule) -> Self {
		self.avatar = rule;

		self
	}
}
impl IdentityMapper for IdentityMapping {
	fn map_identity(
		&self,
		record: Map<String, Value>,
		response: &HttpResponse,
	) -> Result<Identity, ProfileFetchError> {
		let uid = lookup(&record, &self.uid).filter(|uid| !uid.is_empty()).ok_or_else(|| {
			ProfileFetchError::MissingField {
				field: self.uid.clone(),
				status: response.status,
				body: response.body.clone(),
			}
		})?;
		let field = |path: &Option<String>| path.as_deref().and_then(|path| lookup(&record, path));
		let avatar = match &self.avatar {
			AvatarRule::None => None,
			AvatarRule::Field { field } => lookup(&record, field),
			AvatarRule::Template { template, field } =>
				lookup(&record, field).map(|value| template.replace("{}", &value)),
		};

		Ok(Identity {
			uid,
			display_name: field(&self.name),
			email: field(&self.email),
			username: field(&self.username),
			avatar,
			raw: record,
		})
	}
}

/// Resolves a dotted path to a scalar rendered as a string; objects, arrays and nulls are absent.
fn lookup(record: &Map<String, Value>, path: &str) -> Option<String> {
	let mut segments = path.split('.');
	let mut current = record.get(segments.next()?)?;

	for segment in segments {
		current = current.as_object()?.get(segment)?;
	}

	match current {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}
