//! Profile fetch after a successful exchange, and the chained `authenticate` helper.

// crates.io
use serde_json::{Map, Value};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, FlowId, Identity},
	error::{ConfigError, ProfileFetchError},
	flows::{CallbackParams, Handshake},
	http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport},
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	provider::{IdentityAuth, IdentityMapper, ProfileFormat},
	report::AuthSuccess,
	sign::OAuthRequest,
};

impl<T> Handshake<T>
where
	T: ?Sized + HttpTransport,
{
	/// Fetches and maps the authenticated user's profile.
	///
	/// Requires an identity endpoint in the provider configuration; without one this is an
	/// [`ConfigError::MissingIdentityEndpoint`]. Non-2xx statuses, transport failures, unparsable
	/// bodies, and records without a uid are [`ProfileFetchError`]s carrying the raw body.
	pub async fn fetch_identity(&self, credential: &AccessCredential) -> Result<Identity> {
		self.fetch_identity_for(None, credential).await
	}

	/// Completes the flow and fetches the profile, producing the host success report.
	///
	/// Hosts that want to keep the credential when the profile fetch fails should call
	/// [`Handshake::complete`] and [`Handshake::fetch_identity`] separately.
	pub async fn authenticate(
		&self,
		flow_id: &FlowId,
		callback: &CallbackParams,
	) -> Result<AuthSuccess> {
		let completion = self.complete(flow_id, callback).await?;
		let identity = self.fetch_identity_for(Some(flow_id), &completion.credential).await?;

		Ok(AuthSuccess::new(self.config.id.clone(), identity, completion.credential))
	}

	async fn fetch_identity_for(
		&self,
		flow: Option<&FlowId>,
		credential: &AccessCredential,
	) -> Result<Identity> {
		const STAGE: FlowStage = FlowStage::Identity;

		let span = FlowSpan::new(STAGE, flow);

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let endpoint = self.config.identity.as_ref().ok_or_else(|| {
					ConfigError::MissingIdentityEndpoint { provider: self.config.id.to_string() }
				})?;
				let request = match &endpoint.auth {
					IdentityAuth::KeyToken { key_param, token_param } => {
						let mut url = endpoint.url.clone();

						url.query_pairs_mut()
							.append_pair(key_param, &self.config.consumer_key)
							.append_pair(token_param, &credential.token);

						HttpRequest::new(HttpMethod::Get, url)
					},
					IdentityAuth::Signed => self.sign_request(
						OAuthRequest::get(endpoint.url.clone())
							.param("oauth_token", credential.token.as_str()),
						Some(credential.secret.expose()),
						self.config.placement,
					)?,
				};
				let response =
					self.dispatch(request).await.map_err(ProfileFetchError::Transport)?;

				if !response.is_success() {
					return Err(ProfileFetchError::Status {
						status: response.status,
						body: response.body,
					}
					.into());
				}

				let record = parse_record(endpoint.format, &response)?;
				let identity = match &self.identity_mapper {
					Some(mapper) => mapper.map_identity(record, &response)?,
					None => endpoint.mapping.map_identity(record, &response)?,
				};

				Ok(identity)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(STAGE, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(STAGE, FlowOutcome::Failure),
		}

		result
	}
}

fn parse_record(
	format: ProfileFormat,
	response: &HttpResponse,
) -> Result<Map<String, Value>, ProfileFetchError> {
	match format {
		ProfileFormat::Json => {
			let mut deserializer = serde_json::Deserializer::from_str(&response.body);

			serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
				ProfileFetchError::Parse {
					source,
					status: response.status,
					body: response.body.clone(),
				}
			})
		},
		ProfileFormat::Form => {
			let mut record = Map::new();

			for (key, value) in form_urlencoded::parse(response.body.trim().as_bytes()) {
				record.entry(key.into_owned()).or_insert_with(|| Value::String(value.into_owned()));
			}

			Ok(record)
		},
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn json_records_must_be_objects() {
		let record =
			parse_record(ProfileFormat::Json, &HttpResponse::new(200, r#"{"id":"u1","n":{"x":1}}"#))
				.expect("Object body should parse.");

		assert_eq!(record.get("id"), Some(&Value::String("u1".into())));

		for body in ["[1,2]", "not json", ""] {
			let Err(ProfileFetchError::Parse { status, body: raw, .. }) =
				parse_record(ProfileFormat::Json, &HttpResponse::new(203, body))
			else {
				panic!("Body `{body}` should fail to parse.");
			};

			assert_eq!(status, 203);
			assert_eq!(raw, body);
		}
	}

	#[test]
	fn form_records_become_string_fields() {
		let response = HttpResponse::new(200, "user_id=7&screen_name=ada\n");
		let record = parse_record(ProfileFormat::Form, &response).expect("Form body should parse.");

		assert_eq!(record.get("user_id"), Some(&Value::String("7".into())));
		assert_eq!(record.get("screen_name"), Some(&Value::String("ada".into())));
	}
}
