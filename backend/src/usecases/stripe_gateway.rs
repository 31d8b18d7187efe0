use anyhow::Result as AnyResult;
use async_trait::async_trait;
use crates::payments::stripe_client::{
    PaymentIntentRequest, StripeClient, StripeEvent, StripePaymentIntent,
    WebhookVerificationError,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StripeGateway: Send + Sync {
    async fn create_connected_account(&self, email: &str, country: &str) -> AnyResult<String>;

    async fn create_onboarding_link(
        &self,
        account_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> AnyResult<String>;

    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> AnyResult<StripePaymentIntent>;

    async fn retrieve_payment_intent(&self, intent_id: &str) -> AnyResult<StripePaymentIntent>;

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<StripeEvent, WebhookVerificationError>;
}

#[async_trait]
impl StripeGateway for StripeClient {
    async fn create_connected_account(&self, email: &str, country: &str) -> AnyResult<String> {
        self.create_connected_account(email, country).await
    }

    async fn create_onboarding_link(
        &self,
        account_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> AnyResult<String> {
        self.create_onboarding_link(account_id, refresh_url, return_url)
            .await
    }

    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> AnyResult<StripePaymentIntent> {
        self.create_payment_intent(&request).await
    }

    async fn retrieve_payment_intent(&self, intent_id: &str) -> AnyResult<StripePaymentIntent> {
        self.retrieve_payment_intent(intent_id).await
    }

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<StripeEvent, WebhookVerificationError> {
        self.verify_webhook_signature(payload, signature)
    }
}
