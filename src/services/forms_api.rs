//! Trait for the portal's contact endpoints.

use anyhow::Result;
use serde_json::Value;

use crate::forms::{AlertSubscription, FeedbackSubmission};

/// Alert subscription and feedback submission.
///
/// Implementations validate nothing; call `validate()` on the payload first.
#[async_trait::async_trait]
pub trait FormsApi: Send + Sync {
    async fn subscribe(&self, subscription: &AlertSubscription) -> Result<Value>;

    /// `id` is the subscriber id carried by the unsubscribe link.
    async fn unsubscribe(&self, id: &str) -> Result<Value>;

    async fn submit_feedback(&self, feedback: &FeedbackSubmission) -> Result<Value>;
}
