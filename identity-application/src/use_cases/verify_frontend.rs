use identity_core::{IdentityError, UserId, VerificationTokenRepository};

#[derive(Debug)]
pub struct VerifyFrontendRequest {
    pub token: String,
}

#[derive(Debug, PartialEq)]
pub struct VerifyFrontendResponse {
    pub valid: bool,
    pub user_id: Option<UserId>,
}

impl VerifyFrontendResponse {
    fn invalid() -> Self {
        Self {
            valid: false,
            user_id: None,
        }
    }
}

/// Frontend token redemption use case.
///
/// This endpoint is polled by untrusted frontend code, so every failure
/// path - missing token, wrong type, expired, already used, lost race -
/// collapses into `{valid: false}` with no detail about which it was.
pub struct VerifyFrontendUseCase<V>
where
    V: VerificationTokenRepository,
{
    verifications: V,
}

impl<V> VerifyFrontendUseCase<V>
where
    V: VerificationTokenRepository,
{
    pub fn new(verifications: V) -> Self {
        Self { verifications }
    }

    #[tracing::instrument(name = "VerifyFrontendUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        request: VerifyFrontendRequest,
    ) -> Result<VerifyFrontendResponse, IdentityError> {
        let Ok(Some(mut token)) = self.verifications.find_by_token(&request.token).await else {
            return Ok(VerifyFrontendResponse::invalid());
        };

        if token.validate_for_frontend().is_err() {
            return Ok(VerifyFrontendResponse::invalid());
        }

        let Ok(used_at) = token.mark_used() else {
            return Ok(VerifyFrontendResponse::invalid());
        };

        if self
            .verifications
            .mark_used(token.token(), used_at)
            .await
            .is_err()
        {
            return Ok(VerifyFrontendResponse::invalid());
        }

        Ok(VerifyFrontendResponse {
            valid: true,
            user_id: token.user_id(),
        })
    }
}
