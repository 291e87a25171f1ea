//! Webhook transport
//!
//! POSTs the notification as JSON to a relay that turns it into email (or a chat
//! message). Each attachment travels inline as `{file_name, content_base64}`, so
//! the relay needs no access to the reports folders.

use super::{Notification, Notifier};
use crate::config::NotificationConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Sends notifications to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    auth_header: Option<String>,
    timeout: Duration,
}

impl WebhookNotifier {
    /// Build a notifier from the webhook settings
    ///
    /// Fails when no URL is configured.
    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        let url = config
            .webhook_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                Error::config(
                    "webhook notifier requires a URL",
                    "notifications.webhook_url",
                )
            })?;

        Ok(Self {
            client: reqwest::Client::new(),
            url,
            auth_header: config.auth_header.clone(),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let mut request = self
            .client
            .post(&self.url)
            .json(notification)
            .timeout(self.timeout);

        if let Some(auth) = &self.auth_header {
            request = request.header("Authorization", auth);
        }

        let result = tokio::time::timeout(self.timeout, request.send()).await;

        match result {
            Ok(Ok(response)) => {
                if !response.status().is_success() {
                    let status = response.status();
                    let error_msg = format!(
                        "webhook returned status {}: {}",
                        status,
                        response.text().await.unwrap_or_default()
                    );
                    tracing::warn!(url = %self.url, error = %error_msg, "webhook failed");
                    return Err(Error::Notification(error_msg));
                }
                tracing::debug!(url = %self.url, "webhook sent successfully");
                Ok(())
            }
            Ok(Err(e)) => {
                let error_msg = format!("failed to send webhook: {e}");
                tracing::warn!(url = %self.url, error = %error_msg, "webhook failed");
                Err(Error::Notification(error_msg))
            }
            Err(_) => {
                let error_msg = format!("webhook timed out after {:?}", self.timeout);
                tracing::warn!(url = %self.url, error = %error_msg, "webhook timeout");
                Err(Error::Notification(error_msg))
            }
        }
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
