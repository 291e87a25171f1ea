//! Scenario-based notification dispatch
//!
//! The run's scenario selects a message template and a set of recipient groups.
//! Group membership is resolved from configuration, and the rendered
//! [`Notification`] is handed to a [`Notifier`] transport exactly once. Transport
//! failures are folded into a [`NotificationOutcome`] and never abort the run.
//!
//! Report files are read into the notification when it is built. The archive phase
//! moves them out of staging right after dispatch, so a transport never sees a path.

pub mod templates;
mod webhook;

pub use templates::{ExtractionSummary, Message, MessageContext, Unavailability};
pub use webhook::WebhookNotifier;

use crate::config::{NotificationConfig, NotifierKind, RecipientGroup};
use crate::error::{Error, Result};
use crate::types::{NotificationOutcome, RunId, Scenario};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Serialize, Serializer};
use std::path::Path;
use std::sync::Arc;

/// A report file carried inside a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// File name shown to recipients
    pub file_name: String,
    /// File contents, base64 encoded on the wire
    #[serde(rename = "content_base64", serialize_with = "serialize_base64")]
    pub content: Vec<u8>,
}

impl Attachment {
    /// Read `path` into an attachment named after its final component
    pub async fn read(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::Notification(format!("attachment {} has no file name", path.display()))
            })?
            .to_string();
        let content = tokio::fs::read(path).await.map_err(|e| {
            Error::Notification(format!("cannot read attachment {}: {e}", path.display()))
        })?;
        Ok(Self { file_name, content })
    }
}

fn serialize_base64<S: Serializer>(
    content: &[u8],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(content))
}

/// A fully resolved message ready for a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Run that produced the message
    pub run_id: RunId,
    /// Template identifier
    pub template: String,
    /// Scenario of the run
    pub scenario: Scenario,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
    /// Report files, read from staging
    pub attachments: Vec<Attachment>,
    /// Groups selected for the scenario
    pub recipient_groups: Vec<RecipientGroup>,
    /// Distinct addresses of those groups, in first-seen order
    pub recipients: Vec<String>,
}

impl Notification {
    /// Combine a rendered message with the recipients configured for `scenario`
    ///
    /// Fails with [`Error::Notification`] if an attachment cannot be read.
    pub async fn new(
        run_id: RunId,
        scenario: Scenario,
        message: Message,
        config: &NotificationConfig,
    ) -> Result<Self> {
        let mut attachments = Vec::with_capacity(message.attachments.len());
        for path in &message.attachments {
            attachments.push(Attachment::read(path).await?);
        }

        let groups = config.routing.groups_for(scenario).to_vec();
        let recipients = config.resolve_recipients(&groups);
        Ok(Self {
            run_id,
            template: message.template.to_string(),
            scenario,
            subject: message.subject,
            body: message.body,
            attachments,
            recipient_groups: groups,
            recipients,
        })
    }
}

/// Delivers notifications
///
/// Implementations should bound their own waits; the orchestrator calls `send`
/// once per run and does not retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification
    async fn send(&self, notification: &Notification) -> Result<()>;

    /// Whether this transport actually sends anything
    fn enabled(&self) -> bool {
        true
    }

    /// Short name used in log lines
    fn name(&self) -> &'static str;
}

/// Transport used when notifications are switched off
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }

    fn enabled(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Build the transport selected in configuration
pub fn notifier_from_config(config: &NotificationConfig) -> Result<Arc<dyn Notifier>> {
    match config.kind {
        NotifierKind::Disabled => Ok(Arc::new(DisabledNotifier)),
        NotifierKind::Webhook => Ok(Arc::new(WebhookNotifier::from_config(config)?)),
    }
}

/// Make the single dispatch attempt of a run
///
/// A disabled transport yields [`NotificationOutcome::Disabled`]. An empty
/// recipient set fails without calling the transport.
pub async fn dispatch(notifier: &dyn Notifier, notification: &Notification) -> NotificationOutcome {
    if !notifier.enabled() {
        tracing::info!(
            template = %notification.template,
            "notifications disabled, message not sent"
        );
        return NotificationOutcome::Disabled;
    }

    if notification.recipients.is_empty() {
        tracing::warn!(
            groups = ?notification.recipient_groups,
            "no email recipients configured"
        );
        return NotificationOutcome::Failed {
            cause: "no recipients configured".to_string(),
        };
    }

    for group in &notification.recipient_groups {
        tracing::debug!(group = %group, "recipient group selected");
    }

    match notifier.send(notification).await {
        Ok(()) => {
            tracing::info!(
                transport = notifier.name(),
                template = %notification.template,
                recipients = notification.recipients.len(),
                attachments = notification.attachments.len(),
                "notification sent"
            );
            NotificationOutcome::Delivered {
                recipients: notification.recipients.len(),
            }
        }
        Err(e) => {
            tracing::error!(
                transport = notifier.name(),
                error = %e,
                code = e.error_code(),
                "notification failed"
            );
            NotificationOutcome::Failed {
                cause: e.to_string(),
            }
        }
    }
}
