//! Broker-level error types shared across signing, flows, providers, and stores.

// self
use crate::{_prelude::*, auth::FlowId, obs::FlowStage, provider::ProviderConfigError};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem; the caller must fix the provider setup.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Provider endpoint failed or answered with something unusable.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Identity endpoint failed after a valid token exchange.
	#[error(transparent)]
	ProfileFetch(#[from] ProfileFetchError),

	/// The user declined authorization or the provider refused the verifier.
	#[error("Access denied: {reason}.")]
	AccessDenied {
		/// Broker-supplied reason string.
		reason: String,
		/// Callback parameters or provider response that triggered the denial.
		raw: RawPayload,
	},
	/// The flow is unknown, expired, or was already completed; restart the login.
	#[error("Flow `{flow}` is expired or unknown; restart the login.")]
	FlowExpiredOrUnknown {
		/// Flow identifier supplied by the caller.
		flow: FlowId,
	},
}
impl Error {
	/// Returns the host-facing failure code for this error.
	pub fn code(&self) -> ErrorCode {
		match self {
			Self::Config(_) => ErrorCode::InvalidConfig,
			Self::Upstream(_) | Self::Storage(_) => ErrorCode::UpstreamError,
			Self::ProfileFetch(_) => ErrorCode::MissingUserDetails,
			Self::AccessDenied { .. } => ErrorCode::AccessDenied,
			Self::FlowExpiredOrUnknown { .. } => ErrorCode::FlowExpired,
		}
	}

	/// Returns the raw upstream payload preserved for diagnostics.
	pub fn raw(&self) -> RawPayload {
		match self {
			Self::Upstream(e) => e.raw(),
			Self::ProfileFetch(e) => e.raw(),
			Self::AccessDenied { raw, .. } => raw.clone(),
			Self::Config(_) | Self::Storage(_) | Self::FlowExpiredOrUnknown { .. } =>
				RawPayload::None,
		}
	}
}

/// Failure codes surfaced to the host framework.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
	/// User declined, or the verifier/token exchange was refused.
	AccessDenied,
	/// Identity endpoint could not deliver a usable profile.
	MissingUserDetails,
	/// Transport or provider failure.
	UpstreamError,
	/// Stale, replayed, or unknown flow.
	FlowExpired,
	/// Provider configuration is incomplete or invalid.
	InvalidConfig,
}
impl ErrorCode {
	/// Returns a stable label suitable for reports and log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorCode::AccessDenied => "access_denied",
			ErrorCode::MissingUserDetails => "missing_user_details",
			ErrorCode::UpstreamError => "upstream_error",
			ErrorCode::FlowExpired => "flow_expired",
			ErrorCode::InvalidConfig => "invalid_config",
		}
	}
}
impl Display for ErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Raw upstream material attached to failures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPayload {
	/// Nothing was received.
	#[default]
	None,
	/// Callback query parameters as delivered by the user agent.
	Params(BTreeMap<String, String>),
	/// HTTP response returned by a provider endpoint.
	Response {
		/// HTTP status code.
		status: u16,
		/// Response body, verbatim.
		body: String,
	},
}
impl RawPayload {
	/// Captures a provider response.
	pub fn response(status: u16, body: impl Into<String>) -> Self {
		Self::Response { status, body: body.into() }
	}
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Provider configuration failed validation.
	#[error(transparent)]
	Provider(#[from] ProviderConfigError),

	/// Signing requires a consumer key.
	#[error("Consumer key is missing.")]
	MissingConsumerKey,
	/// Signing requires a consumer secret.
	#[error("Consumer secret is missing.")]
	MissingConsumerSecret,
	/// The signing key was rejected by the MAC implementation.
	#[error("Signing key was rejected by {method}.")]
	InvalidSigningKey {
		/// Signature method label.
		method: &'static str,
	},
	/// Profile fetch was requested but no identity endpoint is configured.
	#[error("Provider `{provider}` has no identity endpoint configured.")]
	MissingIdentityEndpoint {
		/// Provider identifier string.
		provider: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures while talking to the request-token or access-token endpoints.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// The HTTP call itself failed.
	#[error("Transport failure during the {stage} stage.")]
	Transport {
		/// Handshake stage that issued the call.
		stage: FlowStage,
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
	/// The endpoint answered with a non-success status.
	#[error("The {stage} endpoint returned HTTP {status}.")]
	Status {
		/// Handshake stage that issued the call.
		stage: FlowStage,
		/// HTTP status code.
		status: u16,
		/// Response body, verbatim.
		body: String,
	},
	/// The endpoint answered 2xx without a usable `oauth_token`/`oauth_token_secret` pair.
	#[error("The {stage} endpoint returned a malformed token response.")]
	MalformedTokenResponse {
		/// Handshake stage that issued the call.
		stage: FlowStage,
		/// HTTP status code.
		status: u16,
		/// Response body, verbatim.
		body: String,
	},
}
impl UpstreamError {
	/// Returns the raw response, when one was received.
	pub fn raw(&self) -> RawPayload {
		match self {
			Self::Transport { .. } => RawPayload::None,
			Self::Status { status, body, .. } | Self::MalformedTokenResponse { status, body, .. } =>
				RawPayload::response(*status, body.clone()),
		}
	}
}

/// Failures raised by the identity endpoint adapter.
#[derive(Debug, ThisError)]
pub enum ProfileFetchError {
	/// The HTTP call itself failed.
	#[error("Transport failure while fetching the user profile.")]
	Transport(#[source] TransportError),
	/// The identity endpoint answered with a non-success status.
	#[error("Identity endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body, verbatim.
		body: String,
	},
	/// The body could not be parsed into an object.
	#[error("Identity endpoint returned an unparsable body.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
		/// Response body, verbatim.
		body: String,
	},
	/// The mapped record lacks a required field.
	#[error("Identity record is missing the `{field}` field.")]
	MissingField {
		/// Configured field path.
		field: String,
		/// HTTP status code.
		status: u16,
		/// Response body, verbatim.
		body: String,
	},
}
impl ProfileFetchError {
	/// Returns the raw response body, when one was received.
	pub fn raw(&self) -> RawPayload {
		match self {
			Self::Transport(_) => RawPayload::None,
			Self::Status { status, body }
			| Self::Parse { status, body, .. }
			| Self::MissingField { status, body, .. } =>
				RawPayload::response(*status, body.clone()),
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
