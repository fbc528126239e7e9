//! Headless client for the tiffin subscription ordering flow: the
//! complaint modal, the plan toggle, and the checkout payment sequence.
//!
//! Each controller is an explicit state object with typed outcomes, so
//! every flow can be driven and asserted on without a live page. Network
//! effects go through [`BackendClient`] (the site backend) and the
//! [`PaymentGateway`] seam (the payment provider).

pub mod api;
pub mod checkout;
pub mod complaint;
pub mod config;
pub mod error;
pub mod gateway;
pub mod plans;

pub use api::{BackendClient, CustomerDetails};
pub use checkout::{CheckoutSession, CheckoutState, InitOutcome, PlanView, Redirect};
pub use complaint::{ClickTarget, ComplaintModal, Notice};
pub use config::Config;
pub use error::{OrderflowError, Result};
pub use gateway::{
    BillingDetails, CardDetails, PaymentConfirmation, PaymentGateway, PaymentStatus, StripeGateway,
};
pub use plans::PlanToggle;
