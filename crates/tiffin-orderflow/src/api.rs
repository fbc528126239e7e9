//! Typed client for the site backend. Response bodies are treated as
//! opaque beyond the handful of fields the flow actually reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    config::Config,
    error::{OrderflowError, Result},
};

const FALLBACK_COMPLAINT_ERROR: &str = "Something went wrong";
const FALLBACK_INTENT_ERROR: &str = "Failed to create payment intent";
const CONFIRMATION_FAILED: &str = "Payment confirmation failed";

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentIntentRequest<'a> {
    pub plan_id: &'a str,
    /// Paise, taken from the resolved catalog plan, never from user input.
    pub amount: i64,
    pub currency: &'a str,
    pub description: &'a str,
    pub customer: &'a CustomerDetails,
}

/// Capability token for a provider-side payment intent. Only the client
/// secret is ever inspected.
#[derive(Debug, Deserialize)]
pub struct PaymentIntentHandle {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentConfig {
    #[serde(rename = "publishableKey")]
    pub publishable_key: String,
}

#[derive(Debug, Clone)]
pub struct ComplaintReceipt {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckBody {
    #[serde(default)]
    success: bool,
    error: Option<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base: config.backend_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    /// Single-attempt complaint POST. The field mapping is serialized
    /// verbatim; no client-side schema validation.
    pub async fn submit_complaint(
        &self,
        fields: &BTreeMap<String, String>,
    ) -> Result<ComplaintReceipt> {
        let response = self
            .http
            .post(self.endpoint("/submit_complaint")?)
            .json(fields)
            .send()
            .await?;

        // The backend reports outcome via the body, not the HTTP status.
        let body: AckBody = response.json().await?;
        if body.success {
            Ok(ComplaintReceipt {
                message: body.message,
            })
        } else {
            let message = body
                .error
                .unwrap_or_else(|| FALLBACK_COMPLAINT_ERROR.to_string());
            tracing::warn!(error = %message, "complaint submission rejected");
            Err(OrderflowError::Backend(message))
        }
    }

    pub async fn payment_config(&self) -> Result<PaymentConfig> {
        let response = self
            .http
            .get(self.endpoint("/get_stripe_config")?)
            .send()
            .await?;
        Ok(response.json().await?)
    }

    pub async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest<'_>,
    ) -> Result<PaymentIntentHandle> {
        tracing::debug!(plan_id = request.plan_id, amount = request.amount, "creating payment intent");
        let response = self
            .http
            .post(self.endpoint("/create_payment_intent")?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| FALLBACK_INTENT_ERROR.to_string());
            tracing::warn!(error = %message, "payment intent creation failed");
            return Err(OrderflowError::Backend(message));
        }

        Ok(response.json().await?)
    }

    pub async fn confirm_payment(&self, payment_intent_id: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("/confirm_payment")?)
            .json(&serde_json::json!({ "payment_intent_id": payment_intent_id }))
            .send()
            .await?;

        let body: AckBody = response.json().await?;
        if body.success {
            Ok(())
        } else {
            tracing::warn!(payment_intent_id, "backend refused payment confirmation");
            Err(OrderflowError::Backend(CONFIRMATION_FAILED.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_body_defaults_success_to_false() {
        let body: AckBody = serde_json::from_str(r#"{"error":"nope"}"#).unwrap();
        assert!(!body.success);
        assert_eq!(body.error.as_deref(), Some("nope"));
    }

    #[test]
    fn intent_handle_reads_camel_case_secret() {
        let handle: PaymentIntentHandle =
            serde_json::from_str(r#"{"clientSecret":"pi_1_secret_2"}"#).unwrap();
        assert_eq!(handle.client_secret, "pi_1_secret_2");
    }

    #[test]
    fn intent_request_wire_shape() {
        let customer = CustomerDetails {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: "+911234567890".into(),
        };
        let request = CreatePaymentIntentRequest {
            plan_id: "basic-weekly",
            amount: 79_900,
            currency: "INR",
            description: "Basic Weekly Plan",
            customer: &customer,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["plan_id"], "basic-weekly");
        assert_eq!(value["amount"], 79_900);
        assert_eq!(value["currency"], "INR");
        assert_eq!(value["customer"]["phone"], "+911234567890");
    }
}
