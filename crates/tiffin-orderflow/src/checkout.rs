//! Checkout controller: resolves the plan from the page query, renders
//! its details, and drives the three-step payment sequence (create
//! intent, confirm with the provider, confirm with the backend). Each
//! step gates the next; a failure anywhere rolls the session back to
//! `Ready` with the message in the error display slot.

use std::sync::Arc;

use tiffin_catalog::Plan;
use url::form_urlencoded;

use crate::{
    api::{BackendClient, CreatePaymentIntentRequest, CustomerDetails},
    error::{OrderflowError, Result},
    gateway::{BillingDetails, CardDetails, PaymentGateway},
};

/// Fixed for the whole shop; never taken from user input.
pub const CURRENCY: &str = "INR";

const INVALID_PLAN_MESSAGE: &str = "Invalid plan selected";
const GATEWAY_INIT_MESSAGE: &str = "Failed to load payment system. Please refresh the page.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Ready,
    Submitting,
    Succeeded,
}

/// Display fields for the order summary, resolved once from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanView {
    pub name: String,
    pub duration: String,
    pub meals: String,
    pub price_display: String,
}

impl From<&Plan> for PlanView {
    fn from(plan: &Plan) -> Self {
        Self {
            name: plan.name.to_string(),
            duration: plan.duration.to_string(),
            meals: plan.meals.to_string(),
            price_display: plan.price_display(),
        }
    }
}

/// A navigation the page should perform. Query values are
/// percent-encoded the way a browser would encode them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    target: String,
}

impl Redirect {
    fn payment_success(plan_id: &str, price_display: &str) -> Self {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("plan", plan_id)
            .append_pair("amount", price_display)
            .finish();
        Self {
            target: format!("/payment_success?{query}"),
        }
    }

    pub fn plans() -> Self {
        Self {
            target: "/plans".to_string(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// What initialization decided. A missing or unknown plan never gets a
/// session at all, and neither does a page whose gateway failed to come
/// up; submit is unreachable instead of "present but unusable".
pub enum InitOutcome {
    Ready(CheckoutSession),
    RedirectToPlans {
        redirect: Redirect,
        message: String,
    },
    GatewayUnavailable {
        message: String,
    },
}

pub struct CheckoutSession {
    plan: &'static Plan,
    view: PlanView,
    backend: BackendClient,
    gateway: Arc<dyn PaymentGateway>,
    state: CheckoutState,
    error_display: Option<String>,
}

impl CheckoutSession {
    /// Resolves the `plan` query parameter against the catalog and brings
    /// up the payment gateway with the backend's publishable key.
    pub async fn initialize(
        query: &str,
        backend: BackendClient,
        make_gateway: impl FnOnce(&str) -> Result<Arc<dyn PaymentGateway>>,
    ) -> InitOutcome {
        let plan_id = plan_param(query);
        let plan = match plan_id.as_deref().and_then(tiffin_catalog::find) {
            Some(plan) => plan,
            None => {
                tracing::warn!(plan = ?plan_id, "unknown plan requested at checkout");
                return InitOutcome::RedirectToPlans {
                    redirect: Redirect::plans(),
                    message: INVALID_PLAN_MESSAGE.to_string(),
                };
            }
        };

        let gateway = match backend.payment_config().await {
            Ok(config) => match make_gateway(&config.publishable_key) {
                Ok(gateway) => gateway,
                Err(err) => {
                    tracing::error!(error = %err, "payment gateway construction failed");
                    return InitOutcome::GatewayUnavailable {
                        message: GATEWAY_INIT_MESSAGE.to_string(),
                    };
                }
            },
            Err(err) => {
                tracing::error!(error = %err, "could not fetch payment configuration");
                return InitOutcome::GatewayUnavailable {
                    message: GATEWAY_INIT_MESSAGE.to_string(),
                };
            }
        };

        tracing::info!(plan = plan.id, "checkout ready");
        InitOutcome::Ready(CheckoutSession {
            plan,
            view: PlanView::from(plan),
            backend,
            gateway,
            state: CheckoutState::Ready,
            error_display: None,
        })
    }

    pub fn plan_view(&self) -> &PlanView {
        &self.view
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// The submit control is enabled exactly while the session can accept
    /// a new attempt; it is reverted together with the state on failure.
    pub fn submit_enabled(&self) -> bool {
        self.state == CheckoutState::Ready
    }

    pub fn error_display(&self) -> Option<&str> {
        self.error_display.as_deref()
    }

    /// Mirrors the card widget's own validation text. Each event replaces
    /// the previous text; `None` clears it.
    pub fn card_input_changed(&mut self, validation_error: Option<String>) {
        self.error_display = validation_error;
    }

    /// Runs the payment sequence. A second call while an attempt is in
    /// flight fails with [`OrderflowError::SubmissionInFlight`] before
    /// any I/O.
    pub async fn submit(
        &mut self,
        customer: CustomerDetails,
        card: CardDetails,
    ) -> Result<Redirect> {
        if !self.submit_enabled() {
            return Err(OrderflowError::SubmissionInFlight);
        }
        self.state = CheckoutState::Submitting;
        self.error_display = None;

        match self.run_payment(&customer, &card).await {
            Ok(redirect) => {
                self.state = CheckoutState::Succeeded;
                tracing::info!(plan = self.plan.id, "payment succeeded");
                Ok(redirect)
            }
            Err(err) => {
                tracing::warn!(plan = self.plan.id, error = %err, "payment attempt failed");
                self.error_display = Some(err.user_message());
                self.state = CheckoutState::Ready;
                Err(err)
            }
        }
    }

    async fn run_payment(
        &self,
        customer: &CustomerDetails,
        card: &CardDetails,
    ) -> Result<Redirect> {
        let intent = self
            .backend
            .create_payment_intent(CreatePaymentIntentRequest {
                plan_id: self.plan.id,
                amount: self.plan.price,
                currency: CURRENCY,
                description: self.plan.name,
                customer,
            })
            .await?;

        let billing = BillingDetails {
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
        };
        let confirmation = self
            .gateway
            .confirm_card_payment(&intent.client_secret, card, &billing)
            .await?;

        if !confirmation.status.is_succeeded() {
            return Err(OrderflowError::PaymentIncomplete(
                confirmation.status.as_str().to_string(),
            ));
        }

        self.backend
            .confirm_payment(&confirmation.payment_intent_id)
            .await?;

        Ok(Redirect::payment_success(
            self.plan.id,
            &self.view.price_display,
        ))
    }
}

fn plan_param(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "plan")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{
        config::Config,
        gateway::{PaymentConfirmation, PaymentStatus},
    };

    struct NeverGateway;

    #[async_trait]
    impl PaymentGateway for NeverGateway {
        async fn confirm_card_payment(
            &self,
            _client_secret: &str,
            _card: &CardDetails,
            _billing: &BillingDetails,
        ) -> Result<PaymentConfirmation> {
            panic!("gateway must not be reached");
        }
    }

    fn session_in(state: CheckoutState) -> CheckoutSession {
        let plan = tiffin_catalog::find("basic-weekly").unwrap();
        CheckoutSession {
            plan,
            view: PlanView::from(plan),
            backend: BackendClient::new(&Config::default()).unwrap(),
            gateway: Arc::new(NeverGateway),
            state,
            error_display: None,
        }
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: "+911234567890".into(),
        }
    }

    fn card() -> CardDetails {
        CardDetails {
            number: "4242 4242 4242 4242".into(),
            exp_month: 12,
            exp_year: 2030,
            cvc: "123".into(),
        }
    }

    #[test]
    fn plan_param_extraction() {
        assert_eq!(plan_param("plan=basic-weekly").as_deref(), Some("basic-weekly"));
        assert_eq!(
            plan_param("utm=x&plan=premium-monthly").as_deref(),
            Some("premium-monthly")
        );
        assert_eq!(plan_param("").as_deref(), None);
        assert_eq!(plan_param("plans=basic-weekly").as_deref(), None);
    }

    #[test]
    fn success_redirect_encodes_the_rupee_amount() {
        let redirect = Redirect::payment_success("basic-weekly", "₹799");
        let query = redirect.target().split_once('?').unwrap().1;
        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(redirect.target().starts_with("/payment_success?"));
        assert!(pairs.contains(&("plan".to_string(), "basic-weekly".to_string())));
        assert!(pairs.contains(&("amount".to_string(), "₹799".to_string())));
    }

    #[tokio::test]
    async fn submit_is_rejected_while_in_flight() {
        let mut session = session_in(CheckoutState::Submitting);
        let err = session.submit(customer(), card()).await.unwrap_err();
        assert!(matches!(err, OrderflowError::SubmissionInFlight));
        // The guard fires before any network or gateway call.
        assert_eq!(session.state(), CheckoutState::Submitting);
    }

    #[tokio::test]
    async fn submit_is_rejected_after_success() {
        let mut session = session_in(CheckoutState::Succeeded);
        assert!(!session.submit_enabled());
        let err = session.submit(customer(), card()).await.unwrap_err();
        assert!(matches!(err, OrderflowError::SubmissionInFlight));
    }

    #[test]
    fn card_errors_replace_rather_than_accumulate() {
        let mut session = session_in(CheckoutState::Ready);
        session.card_input_changed(Some("Your card number is incomplete.".into()));
        session.card_input_changed(Some("Your card's security code is incomplete.".into()));
        assert_eq!(
            session.error_display(),
            Some("Your card's security code is incomplete.")
        );
        session.card_input_changed(None);
        assert_eq!(session.error_display(), None);
    }
}
