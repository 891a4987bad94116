//! First leg: obtain a request token, store it, and redirect the user.

// self
use crate::{
	_prelude::*,
	auth::RequestToken,
	flows::{
		AuthOutcome, AuthRequest, AuthenticateOptions, Authenticator, Handshake, HandshakeContext,
		HandshakeState,
	},
	provider::ProviderError,
};

impl<P> Authenticator<P>
where
	P: 'static + Send,
{
	pub(super) async fn begin(
		&self,
		handshake: &mut Handshake,
		request: &AuthRequest,
		options: &AuthenticateOptions,
	) -> Result<AuthOutcome<P>> {
		handshake.advance(HandshakeState::RequestingToken)?;

		let callback = options.callback_url.as_deref().or(self.descriptor.callback_url.as_deref());
		let context = HandshakeContext::resolve(
			request,
			callback,
			options.extra_params.clone(),
			self.settings.proxy,
		)?;
		let mut params = context.extra_params.clone();

		params.extend(self.strategy.request_token_params(options));

		let response = self
			.facade
			.fetch_request_token(
				self.strategy.as_ref(),
				&self.descriptor.endpoints.request_token,
				&context.callback_url,
				&params,
			)
			.await?;
		let confirmed = response.callback_confirmed();

		if self.descriptor.quirks.require_callback_confirmed && !confirmed {
			return Err(ProviderError::new(
				"Provider did not confirm the callback URL.",
				200,
				String::new(),
			)
			.into());
		}

		let token =
			RequestToken::new(context.correlation_id, response.token.clone(), response.token_secret)
				.with_callback_confirmed(confirmed);

		// Replaces any unconsumed token previously stored for this correlation id.
		self.store.put(token).await?;

		let mut location = self.descriptor.endpoints.user_authorization.clone();

		{
			let mut query = location.query_pairs_mut();

			query.append_pair("oauth_token", &response.token);

			for (key, value) in self.strategy.user_authorization_params(options) {
				query.append_pair(&key, &value);
			}
		}

		handshake.advance(HandshakeState::AwaitingUserAuthorization)?;

		Ok(AuthOutcome::Redirect { location })
	}
}
