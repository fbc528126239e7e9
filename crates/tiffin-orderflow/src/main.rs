//! CLI smoke driver: runs one checkout against a real backend without a
//! browser. Plan id comes from argv; customer and test-card details come
//! from the environment.

use std::{env, sync::Arc};

use anyhow::{Context, anyhow};
use tiffin_orderflow::{
    BackendClient, CardDetails, CheckoutSession, Config, CustomerDetails, InitOutcome,
    PaymentGateway, StripeGateway,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiffin_orderflow=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    let plan_id = env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: tiffin-orderflow <plan-id>"))?;
    tracing::info!(backend = %config.backend_url, plan = %plan_id, "starting checkout");

    let backend = BackendClient::new(&config)?;
    let customer = customer_from_env()?;
    let card = card_from_env()?;

    let query = format!("plan={plan_id}");
    let outcome = CheckoutSession::initialize(&query, backend, |publishable_key| {
        Ok(Arc::new(StripeGateway::new(publishable_key)?) as Arc<dyn PaymentGateway>)
    })
    .await;

    let mut session = match outcome {
        InitOutcome::Ready(session) => session,
        InitOutcome::RedirectToPlans { message, .. } => {
            return Err(anyhow!("{message} (id {plan_id:?} is not in the catalog)"));
        }
        InitOutcome::GatewayUnavailable { message } => {
            return Err(anyhow!(message));
        }
    };

    let view = session.plan_view().clone();
    println!(
        "{}: {}, {}, {}",
        view.name, view.duration, view.meals, view.price_display
    );

    match session.submit(customer, card).await {
        Ok(redirect) => {
            println!("payment succeeded, redirect: {}", redirect.target());
            Ok(())
        }
        Err(err) => Err(anyhow!(err.user_message())),
    }
}

fn customer_from_env() -> anyhow::Result<CustomerDetails> {
    Ok(CustomerDetails {
        name: env::var("TIFFIN_CUSTOMER_NAME").context("TIFFIN_CUSTOMER_NAME not set")?,
        email: env::var("TIFFIN_CUSTOMER_EMAIL").context("TIFFIN_CUSTOMER_EMAIL not set")?,
        phone: env::var("TIFFIN_CUSTOMER_PHONE").context("TIFFIN_CUSTOMER_PHONE not set")?,
    })
}

fn card_from_env() -> anyhow::Result<CardDetails> {
    // Defaults to the provider's standard test card.
    let number = env::var("TIFFIN_TEST_CARD").unwrap_or_else(|_| "4242424242424242".to_string());
    let exp_month = env::var("TIFFIN_TEST_CARD_EXP_MONTH")
        .unwrap_or_else(|_| "12".to_string())
        .parse()
        .context("invalid TIFFIN_TEST_CARD_EXP_MONTH")?;
    let exp_year = env::var("TIFFIN_TEST_CARD_EXP_YEAR")
        .unwrap_or_else(|_| "2030".to_string())
        .parse()
        .context("invalid TIFFIN_TEST_CARD_EXP_YEAR")?;
    let cvc = env::var("TIFFIN_TEST_CARD_CVC").unwrap_or_else(|_| "123".to_string());

    let card = CardDetails {
        number,
        exp_month,
        exp_year,
        cvc,
    };
    if let Some(problem) = card.validation_error() {
        return Err(anyhow!(problem));
    }
    Ok(card)
}
