//! Complaint modal controller: open/close, backdrop dismissal, and a
//! single-attempt JSON submit. All state lives in the controller so the
//! whole flow runs headless.

use std::collections::BTreeMap;

use crate::{
    api::BackendClient,
    error::OrderflowError,
};

const SUCCESS_NOTICE: &str = "Complaint submitted successfully! We will contact you soon.";
const TRANSPORT_NOTICE: &str = "Failed to submit complaint. Please try again.";

/// Where a click landed relative to the modal content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Backdrop,
    Content,
}

/// The last user-facing acknowledgment, replaced on every submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Debug, Default)]
pub struct ComplaintModal {
    visible: bool,
    fields: BTreeMap<String, String>,
    notice: Option<Notice>,
}

impl ComplaintModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: opening an open modal is a no-op.
    pub fn open(&mut self) {
        self.visible = true;
    }

    /// Idempotent: closing a closed modal is a no-op.
    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    /// Clicking the dimmed backdrop closes the modal; clicking inside the
    /// content does not.
    pub fn backdrop_click(&mut self, target: ClickTarget) {
        if target == ClickTarget::Backdrop {
            self.close();
        }
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// One POST, no retry. On success the modal closes and the form
    /// clears; on any failure the modal stays open with the entered
    /// values intact. Returns whether the submission was accepted.
    pub async fn submit(&mut self, backend: &BackendClient) -> bool {
        match backend.submit_complaint(&self.fields).await {
            Ok(_) => {
                self.notice = Some(Notice::Success(SUCCESS_NOTICE.to_string()));
                self.close();
                self.fields.clear();
                true
            }
            Err(err @ OrderflowError::Transport(_)) => {
                tracing::error!(error = %err, "complaint submission failed in transit");
                self.notice = Some(Notice::Error(TRANSPORT_NOTICE.to_string()));
                false
            }
            Err(err) => {
                self.notice = Some(Notice::Error(err.user_message()));
                false
            }
        }
    }
}
