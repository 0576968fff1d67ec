//! Shared helpers for handshake stages (signing and dispatch).

// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	flows::Handshake,
	http::{HttpRequest, HttpResponse, HttpTransport},
	sign::{self, OAuthRequest, SignaturePlacement},
};

impl<T> Handshake<T>
where
	T: ?Sized + HttpTransport,
{
	/// Signs `request` with the consumer pair (and `token_secret`, when bound to a token).
	pub(crate) fn sign_request(
		&self,
		request: OAuthRequest,
		token_secret: Option<&str>,
		placement: SignaturePlacement,
	) -> Result<HttpRequest, ConfigError> {
		let signed = sign::sign(
			self.signer.as_ref(),
			request,
			&self.config.consumer_key,
			self.config.consumer_secret.expose(),
			token_secret,
			&self.stamps.stamp(),
		)?;

		Ok(signed.into_http_request(placement))
	}

	/// Executes a request, leaving error mapping to the caller's stage.
	pub(crate) async fn dispatch(
		&self,
		request: HttpRequest,
	) -> Result<HttpResponse, TransportError> {
		self.transport.execute(request).await
	}
}
