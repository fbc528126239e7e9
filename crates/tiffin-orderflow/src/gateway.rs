//! Payment-provider seam.
//!
//! [`PaymentGateway`] is what the checkout flow programs against;
//! [`StripeGateway`] is the production implementation. It speaks the
//! provider's browser-facing REST surface with the publishable key:
//! create a payment method from the card, then confirm the intent named
//! by the client secret. That is what the hosted SDK does under the
//! hood. Card data never touches the site backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::{OrderflowError, Result};

const STRIPE_API_BASE: &str = "https://api.stripe.com";
const FALLBACK_PROVIDER_ERROR: &str = "Payment failed";

/// Card input as collected by the widget.
#[derive(Debug, Clone)]
pub struct CardDetails {
    pub number: String,
    pub exp_month: u32,
    pub exp_year: u32,
    pub cvc: String,
}

impl CardDetails {
    /// Provider-style validation message for obviously bad input, mirrored
    /// into the checkout error display the way the hosted widget's change
    /// events are. `None` means nothing to complain about yet.
    pub fn validation_error(&self) -> Option<String> {
        let digits = self.number.chars().filter(|c| c.is_ascii_digit()).count();
        if digits == 0 || digits != self.number.chars().filter(|c| *c != ' ').count() {
            return Some("Your card number is invalid.".to_string());
        }
        if digits < 12 {
            return Some("Your card number is incomplete.".to_string());
        }
        if self.exp_month == 0 || self.exp_month > 12 {
            return Some("Your card's expiration month is invalid.".to_string());
        }
        if self.exp_year < 2000 {
            return Some("Your card's expiration year is invalid.".to_string());
        }
        if self.cvc.len() < 3 || !self.cvc.chars().all(|c| c.is_ascii_digit()) {
            return Some("Your card's security code is incomplete.".to_string());
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct BillingDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Lifecycle status of a payment intent. Only `Succeeded` is the success
/// sentinel; everything else means the money has not moved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Succeeded,
    Processing,
    RequiresAction,
    Other(String),
}

impl PaymentStatus {
    pub fn from_wire(status: &str) -> Self {
        match status {
            "succeeded" => PaymentStatus::Succeeded,
            "processing" => PaymentStatus::Processing,
            "requires_action" => PaymentStatus::RequiresAction,
            other => PaymentStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Processing => "processing",
            PaymentStatus::RequiresAction => "requires_action",
            PaymentStatus::Other(s) => s,
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded)
    }
}

#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub payment_intent_id: String,
    pub status: PaymentStatus,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Confirms the payment intent authorized by `client_secret` with the
    /// given card. Provider rejections come back as
    /// [`OrderflowError::Provider`] with the provider's own message.
    async fn confirm_card_payment(
        &self,
        client_secret: &str,
        card: &CardDetails,
        billing: &BillingDetails,
    ) -> Result<PaymentConfirmation>;
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentMethodBody {
    id: String,
}

#[derive(Debug, Deserialize)]
struct IntentBody {
    id: String,
    status: String,
}

pub struct StripeGateway {
    http: reqwest::Client,
    api_base: Url,
    publishable_key: String,
}

impl StripeGateway {
    pub fn new(publishable_key: impl Into<String>) -> Result<Self> {
        let api_base = Url::parse(STRIPE_API_BASE)?;
        Self::with_api_base(publishable_key, api_base)
    }

    /// Overridable base URL, for staging environments and tests.
    pub fn with_api_base(publishable_key: impl Into<String>, api_base: Url) -> Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_base,
            publishable_key: publishable_key.into(),
        })
    }

    async fn create_payment_method(
        &self,
        card: &CardDetails,
        billing: &BillingDetails,
    ) -> Result<String> {
        let params = [
            ("type", "card".to_string()),
            ("card[number]", card.number.replace(' ', "")),
            ("card[exp_month]", card.exp_month.to_string()),
            ("card[exp_year]", card.exp_year.to_string()),
            ("card[cvc]", card.cvc.clone()),
            ("billing_details[name]", billing.name.clone()),
            ("billing_details[email]", billing.email.clone()),
            ("billing_details[phone]", billing.phone.clone()),
        ];
        let response = self
            .http
            .post(self.api_base.join("/v1/payment_methods")?)
            .basic_auth(&self.publishable_key, None::<&str>)
            .form(&params)
            .send()
            .await?;
        let body: PaymentMethodBody = Self::read(response).await?;
        Ok(body.id)
    }

    async fn read<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let message = response
                .json::<ProviderErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| FALLBACK_PROVIDER_ERROR.to_string());
            tracing::warn!(error = %message, "provider rejected request");
            return Err(OrderflowError::Provider(message));
        }
        Ok(response.json().await?)
    }
}

/// The intent id is the client secret's prefix: `pi_..._secret_...`.
fn intent_id(client_secret: &str) -> Result<&str> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| OrderflowError::Provider("malformed client secret".to_string()))
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn confirm_card_payment(
        &self,
        client_secret: &str,
        card: &CardDetails,
        billing: &BillingDetails,
    ) -> Result<PaymentConfirmation> {
        let payment_method = self.create_payment_method(card, billing).await?;

        let id = intent_id(client_secret)?;
        let params = [
            ("payment_method", payment_method.as_str()),
            ("client_secret", client_secret),
        ];
        let response = self
            .http
            .post(self.api_base.join(&format!("/v1/payment_intents/{id}/confirm"))?)
            .basic_auth(&self.publishable_key, None::<&str>)
            .form(&params)
            .send()
            .await?;
        let body: IntentBody = Self::read(response).await?;

        Ok(PaymentConfirmation {
            payment_intent_id: body.id,
            status: PaymentStatus::from_wire(&body.status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str, exp_month: u32, exp_year: u32, cvc: &str) -> CardDetails {
        CardDetails {
            number: number.to_string(),
            exp_month,
            exp_year,
            cvc: cvc.to_string(),
        }
    }

    #[test]
    fn only_succeeded_is_the_success_sentinel() {
        assert!(PaymentStatus::from_wire("succeeded").is_succeeded());
        assert!(!PaymentStatus::from_wire("processing").is_succeeded());
        assert!(!PaymentStatus::from_wire("requires_action").is_succeeded());
        assert!(!PaymentStatus::from_wire("requires_payment_method").is_succeeded());
        assert_eq!(
            PaymentStatus::from_wire("canceled").as_str(),
            "canceled"
        );
    }

    #[test]
    fn intent_id_comes_from_the_client_secret() {
        assert_eq!(intent_id("pi_123_secret_abc").unwrap(), "pi_123");
        assert!(intent_id("_secret_abc").is_err());
        assert!(intent_id("not-a-secret").is_err());
    }

    #[test]
    fn card_validation_messages() {
        assert!(card("4242 4242 4242 4242", 12, 2030, "123")
            .validation_error()
            .is_none());
        assert_eq!(
            card("", 12, 2030, "123").validation_error().unwrap(),
            "Your card number is invalid."
        );
        assert_eq!(
            card("4242", 12, 2030, "123").validation_error().unwrap(),
            "Your card number is incomplete."
        );
        assert_eq!(
            card("4242 4242 4242 4242", 13, 2030, "123")
                .validation_error()
                .unwrap(),
            "Your card's expiration month is invalid."
        );
        assert_eq!(
            card("4242 4242 4242 4242", 12, 2030, "1")
                .validation_error()
                .unwrap(),
            "Your card's security code is incomplete."
        );
    }
}
