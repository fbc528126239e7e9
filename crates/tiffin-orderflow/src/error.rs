use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrderflowError>;

/// Failure taxonomy for the ordering flow. Every variant is terminal for
/// the current attempt only; the user can always retry. The remaining
/// case from the taxonomy, an unknown plan id, is not an error value at
/// all: checkout initialization answers it with a redirect.
#[derive(Error, Debug)]
pub enum OrderflowError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend-reported business error. The message is surfaced verbatim.
    #[error("{0}")]
    Backend(String),

    /// Payment-provider error (declined card, validation). Surfaced verbatim.
    #[error("{0}")]
    Provider(String),

    /// The provider confirmed the payment into a non-succeeded status
    /// (processing, requires_action, ...). Not a success; the attempt is
    /// over and the user is told what state the payment is in.
    #[error("payment not completed, status: {0}")]
    PaymentIncomplete(String),

    #[error("a submission is already in progress")]
    SubmissionInFlight,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl OrderflowError {
    /// Text for the dedicated error display element. Backend and provider
    /// messages pass through verbatim; transport failures collapse to a
    /// generic message since their details help nobody at the checkout.
    pub fn user_message(&self) -> String {
        match self {
            OrderflowError::Transport(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            OrderflowError::Backend(msg) | OrderflowError::Provider(msg) => msg.clone(),
            OrderflowError::PaymentIncomplete(status) => {
                format!("Payment not completed (status: {status}). Please try again.")
            }
            OrderflowError::SubmissionInFlight => {
                "A payment is already being processed.".to_string()
            }
            OrderflowError::Config(msg) => msg.clone(),
            OrderflowError::InvalidUrl(_) => "Invalid address".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_and_provider_messages_pass_through() {
        assert_eq!(
            OrderflowError::Backend("card declined".into()).user_message(),
            "card declined"
        );
        assert_eq!(
            OrderflowError::Provider("Your card was declined.".into()).user_message(),
            "Your card was declined."
        );
    }

    #[test]
    fn incomplete_payment_names_the_status() {
        let msg = OrderflowError::PaymentIncomplete("requires_action".into()).user_message();
        assert!(msg.contains("requires_action"));
    }
}
