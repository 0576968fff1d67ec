//! Second leg: trade the verifier for the permanent credential.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, FlowId, TokenResponse},
	error::{RawPayload, UpstreamError},
	flows::{FlowProgress, Handshake, HandshakeState},
	http::HttpTransport,
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	sign::OAuthRequest,
};

/// Query parameters delivered to the callback URL.
///
/// Repeated keys keep their first value. Everything is preserved so denials can report exactly
/// what the user agent sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
	/// Every callback parameter, verbatim.
	pub params: BTreeMap<String, String>,
}
impl CallbackParams {
	/// Parses a raw query string; a leading `?` is ignored.
	pub fn from_query(query: &str) -> Self {
		let query = query.strip_prefix('?').unwrap_or(query);

		Self::from_pairs(form_urlencoded::parse(query.as_bytes()))
	}

	/// Reads the query string of the callback URL.
	pub fn from_url(url: &Url) -> Self {
		Self::from_pairs(url.query_pairs())
	}

	/// Collects parameters already decoded by the host framework.
	pub fn from_pairs<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut params = BTreeMap::new();

		for (key, value) in pairs {
			params.entry(key.into()).or_insert_with(|| value.into());
		}

		Self { params }
	}

	/// Non-empty `oauth_token`.
	pub fn token(&self) -> Option<&str> {
		self.non_empty("oauth_token")
	}

	/// Non-empty `oauth_verifier`.
	pub fn verifier(&self) -> Option<&str> {
		self.non_empty("oauth_verifier")
	}

	/// Returns the parameters as a diagnostic payload.
	pub fn raw(&self) -> RawPayload {
		RawPayload::Params(self.params.clone())
	}

	fn non_empty(&self, key: &str) -> Option<&str> {
		self.params.get(key).map(String::as_str).filter(|value| !value.is_empty())
	}
}

/// Outcome of a successful access-token exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
	/// Flow that was completed.
	pub flow_id: FlowId,
	/// Permanent credential; the broker keeps no copy.
	pub credential: AccessCredential,
	/// Every field of the access-token response (providers may add extras).
	pub raw: BTreeMap<String, String>,
}

impl<T> Handshake<T>
where
	T: ?Sized + HttpTransport,
{
	/// Consumes the pending flow and exchanges the callback's verifier for an access credential.
	///
	/// - A callback without a non-empty `oauth_token` or `oauth_verifier` is an
	///   [`Error::AccessDenied`]; the pending state is discarded and no provider call is made.
	/// - A missing or expired flow, or a callback token that differs from the stored request token,
	///   is [`Error::FlowExpiredOrUnknown`]. The state is consumed either way, so a replayed
	///   callback always fails.
	/// - Transport failures and 5xx responses are [`UpstreamError`]s; other non-2xx statuses and
	///   responses without a non-empty token pair are [`Error::AccessDenied`].
	pub async fn complete(
		&self,
		flow_id: &FlowId,
		callback: &CallbackParams,
	) -> Result<Completion> {
		const STAGE: FlowStage = FlowStage::AccessToken;

		let span = FlowSpan::new(STAGE, Some(flow_id));
		let mut progress =
			FlowProgress::starting_at(flow_id, HandshakeState::AwaitingUserAuthorization);

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let now = OffsetDateTime::now_utc();
				let (Some(token), Some(verifier)) = (callback.token(), callback.verifier()) else {
					self.store.take(flow_id, now).await?;

					return Err(Error::AccessDenied {
						reason: "User denied access".into(),
						raw: callback.raw(),
					});
				};
				let state = self
					.store
					.take(flow_id, now)
					.await?
					.filter(|state| state.request_token == token)
					.ok_or_else(|| Error::FlowExpiredOrUnknown { flow: flow_id.clone() })?;

				progress.advance(HandshakeState::AccessTokenRequested);

				let request = OAuthRequest::get(self.config.endpoints.access_token.clone())
					.param("oauth_token", token)
					.param("oauth_verifier", verifier);
				let request = self.sign_request(
					request,
					Some(state.request_token_secret.expose()),
					self.config.placement,
				)?;
				let response = self
					.dispatch(request)
					.await
					.map_err(|source| UpstreamError::Transport { stage: STAGE, source })?;

				if response.is_server_error() {
					return Err(UpstreamError::Status {
						stage: STAGE,
						status: response.status,
						body: response.body,
					}
					.into());
				}
				if !response.is_success() {
					let reason =
						format!("Access-token endpoint refused the verifier ({})", response.status);

					return Err(Error::AccessDenied {
						reason,
						raw: RawPayload::response(response.status, response.body),
					});
				}

				let tokens = TokenResponse::parse(&response.body);
				let Some((access_token, access_secret)) = tokens.token_pair() else {
					return Err(Error::AccessDenied {
						reason: "Access-token response carried no credential".into(),
						raw: RawPayload::response(response.status, response.body),
					});
				};
				let credential = AccessCredential::new(access_token, access_secret);

				progress.advance(HandshakeState::Completed);

				Ok(Completion { flow_id: flow_id.clone(), credential, raw: tokens.fields })
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(STAGE, FlowOutcome::Success),
			Err(_) => {
				progress.fail();
				obs::record_flow_outcome(STAGE, FlowOutcome::Failure);
			},
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn callback_parsing_keeps_first_value_and_ignores_question_mark() {
		let callback =
			CallbackParams::from_query("?oauth_token=rt1&oauth_verifier=v1&oauth_token=x");

		assert_eq!(callback.token(), Some("rt1"));
		assert_eq!(callback.verifier(), Some("v1"));
		assert_eq!(callback.params.len(), 2);
	}

	#[test]
	fn empty_values_are_treated_as_missing() {
		let callback = CallbackParams::from_pairs([("oauth_token", "rt1"), ("oauth_verifier", "")]);

		assert_eq!(callback.verifier(), None);
		assert_eq!(
			callback.raw(),
			RawPayload::Params(BTreeMap::from([
				("oauth_token".to_owned(), "rt1".to_owned()),
				("oauth_verifier".to_owned(), String::new()),
			]))
		);
	}

	#[test]
	fn reads_callback_url_query() {
		let url = Url::parse("https://app.test/cb?oauth_token=a%2Bb&oauth_verifier=v")
			.expect("Callback URL should parse.");
		let callback = CallbackParams::from_url(&url);

		assert_eq!(callback.token(), Some("a+b"));
		assert_eq!(callback.verifier(), Some("v"));
	}
}
