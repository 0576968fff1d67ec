// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ScopeFlags, ScopeValidationError, TokenSecret},
	provider::{
		DEFAULT_FLOW_TTL, DisplayParams, IdentityAuth, IdentityEndpoint, IdentityMapping,
		ProfileFormat, ProviderConfig, ProviderEndpoints,
	},
	sign::{SignatureMethod, SignaturePlacement},
};

/// Errors raised while constructing or validating provider configurations.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderConfigError {
	/// The consumer key is required to sign anything.
	#[error("Missing consumer key.")]
	MissingConsumerKey,
	/// The consumer secret is required to sign anything.
	#[error("Missing consumer secret.")]
	MissingConsumerSecret,
	/// Endpoint paths are resolved against a base URL.
	#[error("Missing base URL.")]
	MissingBaseUrl,
	/// The base URL is not an absolute URL.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// URL as configured.
		url: String,
		/// Parser failure.
		#[source]
		source: url::ParseError,
	},
	/// Every handshake advertises a callback.
	#[error("Missing callback URL.")]
	MissingCallbackUrl,
	/// One of the three OAuth endpoints was never configured.
	#[error("Missing {endpoint} endpoint path.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// An endpoint path did not resolve against the base URL.
	#[error("The {endpoint} endpoint `{path}` does not resolve to an absolute URL.")]
	InvalidEndpoint {
		/// Which endpoint failed to resolve.
		endpoint: &'static str,
		/// Path or URL as configured.
		path: String,
		/// Parser failure.
		#[source]
		source: url::ParseError,
	},
	/// Scope names must be non-empty and free of separators.
	#[error(transparent)]
	InvalidScope(#[from] ScopeValidationError),
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
	/// Pending flows must be allowed to live for some time.
	#[error("Flow TTL must be positive.")]
	NonPositiveTtl,
}

/// Identity endpoint settings collected before the base URL is known.
#[derive(Clone, Debug)]
pub struct IdentitySettings {
	/// Path relative to the base URL, or an absolute URL.
	pub path: String,
	/// Authentication scheme.
	pub auth: IdentityAuth,
	/// Body encoding.
	pub format: ProfileFormat,
	/// Field mapping.
	pub mapping: IdentityMapping,
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
	/// Identifier for the configuration being constructed.
	pub id: ProviderId,
	/// Consumer key.
	pub consumer_key: String,
	/// Consumer secret.
	pub consumer_secret: TokenSecret,
	/// Base URL endpoint paths resolve against.
	pub base_url: Option<String>,
	/// Request-token endpoint path.
	pub request_token_path: Option<String>,
	/// Authorize endpoint path.
	pub authorize_path: Option<String>,
	/// Access-token endpoint path.
	pub access_token_path: Option<String>,
	/// Callback URL.
	pub callback_url: Option<Url>,
	/// Signature method.
	pub signature_method: SignatureMethod,
	/// Signature placement.
	pub placement: SignaturePlacement,
	/// Authorize page parameters.
	pub display: DisplayParams,
	/// Scope flags declared through [`ProviderConfigBuilder::declare_scope`], validated on build.
	pub declared_scopes: Vec<(String, bool)>,
	/// Comma-separated scopes enabled on top of the declared flags.
	pub scope_list: Option<String>,
	/// Extra request-token parameters.
	pub request_token_params: Vec<(String, String)>,
	/// Extra authorize parameters.
	pub authorize_params: Vec<(String, String)>,
	/// Identity endpoint settings.
	pub identity: Option<IdentitySettings>,
	/// Pending flow lifetime.
	pub flow_ttl: Duration,
}
impl ProviderConfigBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			consumer_key: String::new(),
			consumer_secret: TokenSecret::default(),
			base_url: None,
			request_token_path: None,
			authorize_path: None,
			access_token_path: None,
			callback_url: None,
			signature_method: SignatureMethod::default(),
			placement: SignaturePlacement::default(),
			display: DisplayParams::default(),
			declared_scopes: Vec::new(),
			scope_list: None,
			request_token_params: Vec::new(),
			authorize_params: Vec::new(),
			identity: None,
			flow_ttl: DEFAULT_FLOW_TTL,
		}
	}

	/// Sets the consumer key + secret pair.
	pub fn consumer(mut self, key: impl Into<String>, secret: impl Into<TokenSecret>) -> Self {
		self.consumer_key = key.into();
		self.consumer_secret = secret.into();

		self
	}

	/// Sets the base URL endpoint paths are joined onto.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Sets the request-token path.
	pub fn request_token_path(mut self, path: impl Into<String>) -> Self {
		self.request_token_path = Some(path.into());

		self
	}

	/// Sets the authorize path.
	pub fn authorize_path(mut self, path: impl Into<String>) -> Self {
		self.authorize_path = Some(path.into());

		self
	}

	/// Sets the access-token path.
	pub fn access_token_path(mut self, path: impl Into<String>) -> Self {
		self.access_token_path = Some(path.into());

		self
	}

	/// Sets the callback URL.
	pub fn callback_url(mut self, url: Url) -> Self {
		self.callback_url = Some(url);

		self
	}

	/// Overrides the signature method.
	pub fn signature_method(mut self, method: SignatureMethod) -> Self {
		self.signature_method = method;

		self
	}

	/// Overrides where protocol parameters travel.
	pub fn placement(mut self, placement: SignaturePlacement) -> Self {
		self.placement = placement;

		self
	}

	/// Sets the application name shown on the authorize page.
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.display.name = Some(name.into());

		self
	}

	/// Sets the token expiration hint.
	pub fn expiration(mut self, expiration: impl Into<String>) -> Self {
		self.display.expiration = Some(expiration.into());

		self
	}

	/// Replaces the declared scope flags.
	pub fn scopes(mut self, scopes: ScopeFlags) -> Self {
		self.display.scopes = scopes;

		self
	}

	/// Declares a scope flag, keeping its position if it already exists.
	pub fn declare_scope(mut self, name: impl Into<String>, enabled: bool) -> Self {
		self.declared_scopes.push((name.into(), enabled));

		self
	}

	/// Enables a comma-separated scope list when the configuration is built.
	pub fn scope(mut self, list: impl Into<String>) -> Self {
		self.scope_list = Some(list.into());

		self
	}

	/// Overrides the scope delimiter.
	pub fn scope_delimiter(mut self, delimiter: char) -> Self {
		self.display.scope_delimiter = delimiter;

		self
	}

	/// Adds an extra request-token parameter.
	pub fn request_token_param(
		mut self,
		key: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		self.request_token_params.push((key.into(), value.into()));

		self
	}

	/// Adds an extra authorize parameter.
	pub fn authorize_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.authorize_params.push((key.into(), value.into()));

		self
	}

	/// Configures a JSON identity endpoint.
	pub fn identity(
		mut self,
		path: impl Into<String>,
		auth: IdentityAuth,
		mapping: IdentityMapping,
	) -> Self {
		let format = ProfileFormat::Json;

		self.identity = Some(IdentitySettings { path: path.into(), auth, format, mapping });

		self
	}

	/// Overrides the identity body encoding; has no effect without an identity endpoint.
	pub fn identity_format(mut self, format: ProfileFormat) -> Self {
		if let Some(identity) = self.identity.as_mut() {
			identity.format = format;
		}

		self
	}

	/// Removes the identity endpoint.
	pub fn without_identity(mut self) -> Self {
		self.identity = None;

		self
	}

	/// Overrides the pending flow lifetime.
	pub fn flow_ttl(mut self, ttl: Duration) -> Self {
		self.flow_ttl = ttl;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ProviderConfigError> {
		let raw_base = self.base_url.ok_or(ProviderConfigError::MissingBaseUrl)?;
		let mut base_url = Url::parse(&raw_base)
			.map_err(|source| ProviderConfigError::InvalidBaseUrl { url: raw_base, source })?;

		// Paths are appended to the base, never substituted for its last segment.
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		let callback_url = self.callback_url.ok_or(ProviderConfigError::MissingCallbackUrl)?;
		let endpoints = ProviderEndpoints {
			request_token: resolve(&base_url, "request_token", self.request_token_path)?,
			authorize: resolve(&base_url, "authorize", self.authorize_path)?,
			access_token: resolve(&base_url, "access_token", self.access_token_path)?,
		};
		let identity = self
			.identity
			.map(|settings| {
				Ok::<_, ProviderConfigError>(IdentityEndpoint {
					url: join(&base_url, "identity", &settings.path)?,
					auth: settings.auth,
					format: settings.format,
					mapping: settings.mapping,
				})
			})
			.transpose()?;
		let mut display = self.display;

		for (name, enabled) in self.declared_scopes {
			display.scopes = display.scopes.declare(name, enabled)?;
		}
		if let Some(list) = self.scope_list.as_deref() {
			display.scopes = display.scopes.enable_list(list)?;
		}

		let config = ProviderConfig {
			id: self.id,
			consumer_key: self.consumer_key,
			consumer_secret: self.consumer_secret,
			base_url,
			endpoints,
			callback_url,
			signature_method: self.signature_method,
			placement: self.placement,
			display,
			request_token_params: self.request_token_params,
			authorize_params: self.authorize_params,
			identity,
			flow_ttl: self.flow_ttl,
		};

		config.validate()?;

		Ok(config)
	}
}

fn resolve(
	base: &Url,
	endpoint: &'static str,
	path: Option<String>,
) -> Result<Url, ProviderConfigError> {
	let path = path.ok_or(ProviderConfigError::MissingEndpoint { endpoint })?;

	join(base, endpoint, &path)
}

fn join(base: &Url, endpoint: &'static str, path: &str) -> Result<Url, ProviderConfigError> {
	base.join(path).map_err(|source| ProviderConfigError::InvalidEndpoint {
		endpoint,
		path: path.to_owned(),
		source,
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn builder() -> ProviderConfigBuilder {
		ProviderConfig::builder(ProviderId::new("mock").expect("Provider id should be valid."))
			.consumer("key", "secret")
			.base_url("https://api.example.test/oauth")
			.request_token_path("request")
			.authorize_path("https://www.example.test/authorize")
			.access_token_path("access")
			.callback_url(Url::parse("https://app.test/cb").expect("Callback should parse."))
	}

	#[test]
	fn paths_resolve_against_slash_terminated_base() {
		let config = builder().build().expect("Configuration should build.");

		assert_eq!(config.base_url.as_str(), "https://api.example.test/oauth/");
		assert_eq!(
			config.endpoints.request_token.as_str(),
			"https://api.example.test/oauth/request"
		);
		assert_eq!(config.endpoints.authorize.as_str(), "https://www.example.test/authorize");
		assert_eq!(
			config.endpoints.access_token.as_str(),
			"https://api.example.test/oauth/access"
		);
		assert_eq!(config.flow_ttl, DEFAULT_FLOW_TTL);
	}

	#[test]
	fn build_rejects_missing_pieces() {
		assert_eq!(
			builder().consumer("", "secret").build().unwrap_err(),
			ProviderConfigError::MissingConsumerKey
		);
		assert_eq!(
			builder().consumer("key", "").build().unwrap_err(),
			ProviderConfigError::MissingConsumerSecret
		);

		let mut without_access = builder();

		without_access.access_token_path = None;

		assert_eq!(
			without_access.build().unwrap_err(),
			ProviderConfigError::MissingEndpoint { endpoint: "access_token" }
		);

		let mut without_callback = builder();

		without_callback.callback_url = None;

		assert_eq!(without_callback.build().unwrap_err(), ProviderConfigError::MissingCallbackUrl);
		assert!(matches!(
			builder().base_url("not a url").build(),
			Err(ProviderConfigError::InvalidBaseUrl { .. })
		));
	}

	#[test]
	fn build_rejects_bad_delimiter_and_ttl() {
		assert_eq!(
			builder().scope_delimiter('\n').build().unwrap_err(),
			ProviderConfigError::InvalidScopeDelimiter { delimiter: '\n' }
		);
		assert_eq!(
			builder().flow_ttl(Duration::ZERO).build().unwrap_err(),
			ProviderConfigError::NonPositiveTtl
		);
		assert!(matches!(
			builder().scope("read,has space").build(),
			Err(ProviderConfigError::InvalidScope(_))
		));
	}

	#[test]
	fn display_pairs_skip_empty_values() {
		let config = builder()
			.name("")
			.expiration("30days")
			.scopes(
				ScopeFlags::new()
					.declare("read", true)
					.and_then(|flags| flags.declare("write", false))
					.expect("Scope fixture should be valid."),
			)
			.scope("write")
			.scope_delimiter(' ')
			.build()
			.expect("Configuration should build.");

		assert_eq!(
			config.display.pairs(),
			vec![
				("expiration".to_owned(), "30days".to_owned()),
				("scope".to_owned(), "read write".to_owned()),
			]
		);
	}
}
