//! First leg: obtain a request token and build the authorize URL.

// self
use crate::{
	_prelude::*,
	auth::{FlowId, TokenResponse},
	error::UpstreamError,
	flows::{FlowProgress, Handshake, HandshakeState},
	http::HttpTransport,
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	sign::{OAuthRequest, SignaturePlacement},
	store::FlowState,
};

/// Where to send the user next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authorization {
	/// Flow the host must present again on callback.
	pub flow_id: FlowId,
	/// Request token the provider issued.
	pub request_token: String,
	/// Signed authorize URL to redirect the user agent to.
	pub authorize_url: Url,
	/// Whether the provider echoed `oauth_callback_confirmed=true`.
	pub callback_confirmed: bool,
	/// Instant after which the pending flow is discarded.
	pub expires_at: OffsetDateTime,
}

impl<T> Handshake<T>
where
	T: ?Sized + HttpTransport,
{
	/// Requests a temporary credential, stores it under `flow_id`, and returns the authorize URL.
	///
	/// Transport failures, non-2xx statuses, and bodies without a non-empty
	/// `oauth_token`/`oauth_token_secret` pair surface as [`UpstreamError`]; nothing is stored in
	/// those cases. Calling `begin` again for the same flow replaces the earlier pending state.
	pub async fn begin(&self, flow_id: FlowId) -> Result<Authorization> {
		const STAGE: FlowStage = FlowStage::RequestToken;

		let span = FlowSpan::new(STAGE, Some(&flow_id));
		let mut progress = FlowProgress::starting_at(&flow_id, HandshakeState::Idle);

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				progress.advance(HandshakeState::RequestTokenRequested);

				let request = OAuthRequest::get(self.config.endpoints.request_token.clone())
					.param("oauth_callback", self.config.callback_url.as_str())
					.params(self.config.request_token_params.iter().cloned());
				let request = self.sign_request(request, None, self.config.placement)?;
				let response = self
					.dispatch(request)
					.await
					.map_err(|source| UpstreamError::Transport { stage: STAGE, source })?;

				if !response.is_success() {
					return Err(UpstreamError::Status {
						stage: STAGE,
						status: response.status,
						body: response.body,
					}
					.into());
				}

				let tokens = TokenResponse::parse(&response.body);
				let Some((token, secret)) = tokens.token_pair() else {
					return Err(UpstreamError::MalformedTokenResponse {
						stage: STAGE,
						status: response.status,
						body: response.body,
					}
					.into());
				};
				let state = FlowState::new(
					flow_id.clone(),
					token,
					secret,
					OffsetDateTime::now_utc(),
					self.config.flow_ttl,
				);
				let expires_at = state.expires_at;

				self.store.put(state).await?;

				let authorize_url = self.authorize_url(token, secret)?;

				progress.advance(HandshakeState::AwaitingUserAuthorization);

				Ok(Authorization {
					flow_id: flow_id.clone(),
					request_token: token.to_owned(),
					authorize_url,
					callback_confirmed: tokens.callback_confirmed(),
					expires_at,
				})
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

	/// Builds the signed authorize URL for a request token.
	///
	/// The URL carries `oauth_token`, the display parameters (`name`, `expiration`, `scope`) and
	/// any configured extras, and is always signed in the query string because it travels through
	/// the user agent.
	pub fn authorize_url(&self, request_token: &str, request_token_secret: &str) -> Result<Url> {
		let request = OAuthRequest::get(self.config.endpoints.authorize.clone())
			.param("oauth_token", request_token)
			.params(self.config.display.pairs())
			.params(self.config.authorize_params.iter().cloned());
		let request =
			self.sign_request(request, Some(request_token_secret), SignaturePlacement::Query)?;

		Ok(request.url)
	}
}
