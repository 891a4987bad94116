//! Third leg: exchange the authorized request token, then resolve the user's identity.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Profile, RequestToken},
	ext::SignedFetcher,
	flows::{
		AuthOutcome, AuthRequest, Authenticator, Failure, FailureReason, Handshake,
		HandshakeState, Verdict, VerifyInput, common::FlowGuard,
	},
	oauth::TokenCredentials,
	obs::{self, HandshakeOutcome, HandshakeStage},
	provider::ProfileRequest,
	store::StoreKey,
};

impl<P> Authenticator<P>
where
	P: 'static + Send,
{
	pub(super) async fn complete(
		&self,
		handshake: &mut Handshake,
		request: AuthRequest,
		token: String,
		verifier: Option<String>,
	) -> Result<AuthOutcome<P>> {
		handshake.advance(HandshakeState::ExchangingAccessToken)?;

		let key = StoreKey::new(request.correlation_id.clone(), token);
		let flow = FlowGuard::acquire(&self.flow_guards, &key);
		let exchanged = {
			let _singleflight = flow.slot().lock().await;

			self.exchange(&key, verifier.as_deref()).await
		};

		drop(flow);

		let access_token = exchanged?;

		handshake.advance(HandshakeState::VerifyingIdentity)?;

		let profile = self.resolve_profile(&access_token).await?;
		let input = VerifyInput {
			request: self.settings.pass_req_to_callback.then_some(request),
			access_token,
			profile,
		};

		match self.run_verify(input).await? {
			Verdict::Accept { principal, info } => {
				handshake.advance(HandshakeState::Complete)?;

				Ok(AuthOutcome::Success { principal, info })
			},
			Verdict::Reject { info } => {
				handshake.advance(HandshakeState::Failed)?;

				Ok(AuthOutcome::Failure(Failure::new(FailureReason::Rejected, info)))
			},
		}
	}

	/// Claims the request token from the store, then calls the access-token endpoint.
	///
	/// The claim is the store's atomic `take`, so authenticators sharing one store exchange a
	/// token at most once. Provider and transport failures put the token back for a retry.
	/// Callers hold the key's singleflight guard.
	async fn exchange(&self, key: &StoreKey, verifier: Option<&str>) -> Result<AccessToken> {
		let secret = self.store.take(key).await?;
		let exchanged = self
			.facade
			.fetch_access_token(
				self.strategy.as_ref(),
				&self.descriptor.endpoints.access_token,
				TokenCredentials { token: &key.token, secret: secret.expose() },
				verifier,
			)
			.await;

		match exchanged {
			Ok(response) =>
				Ok(AccessToken::new(response.token, response.token_secret).with_params(response.params)),
			Err(e) => {
				if !e.is_fatal() {
					self.store
						.put(RequestToken::new(key.correlation_id.clone(), key.token.clone(), secret))
						.await?;
				}

				Err(e)
			},
		}
	}

	async fn resolve_profile(&self, access_token: &AccessToken) -> Result<Profile> {
		const STAGE: HandshakeStage = HandshakeStage::Profile;

		if self.settings.skip_user_profile {
			return Ok(Profile::empty(self.descriptor.id.clone()));
		}

		obs::record_stage_outcome(STAGE, HandshakeOutcome::Attempt);

		let fetcher = SignedFetcher::new(self.facade.clone(), access_token.clone());
		let request =
			ProfileRequest { provider: &self.descriptor.id, access_token, fetcher: &fetcher };

		match self.strategy.user_profile(request).await {
			Ok(mut profile) => {
				obs::record_stage_outcome(STAGE, HandshakeOutcome::Success);

				profile.provider.get_or_insert_with(|| self.descriptor.id.clone());

				Ok(profile)
			},
			Err(e) => {
				obs::record_stage_outcome(STAGE, HandshakeOutcome::Failure);

				if self.settings.profile_optional {
					#[cfg(feature = "tracing")]
					tracing::warn!(error = %e, "profile fetch failed, using the empty profile");
					#[cfg(not(feature = "tracing"))]
					let _ = e;

					Ok(Profile::empty(self.descriptor.id.clone()))
				} else {
					Err(Error::profile_fetch(e))
				}
			},
		}
	}

	async fn run_verify(&self, input: VerifyInput) -> Result<Verdict<P>> {
		const STAGE: HandshakeStage = HandshakeStage::Verify;

		obs::record_stage_outcome(STAGE, HandshakeOutcome::Attempt);

		let timeout = self.settings.verify_timeout;
		let result = match tokio::time::timeout(timeout.unsigned_abs(), self.verify.verify(input)).await
		{
			Ok(Ok(verdict)) => Ok(verdict),
			Ok(Err(e)) => Err(Error::identity_resolution(e)),
			Err(_) => Err(Error::VerifyTimeout { timeout }),
		};
		let outcome = match &result {
			Ok(Verdict::Accept { .. }) => HandshakeOutcome::Success,
			Ok(Verdict::Reject { .. }) => HandshakeOutcome::Rejected,
			Err(_) => HandshakeOutcome::Failure,
		};

		obs::record_stage_outcome(STAGE, outcome);

		result
	}
}
