//! Best-effort notification fan-out (customer email + admin chat).
//!
//! Nothing in here ever returns an error to the caller: failures and timeouts are logged and
//! dropped. Background sends are detached tasks and are never joined back into a request.

mod chat;
mod email;
pub mod messages;

use std::{sync::Arc, time::Duration};

use thiserror::Error;

pub use chat::{ChatNotifier, NoopChat, WebhookChat};
pub use email::{EmailMessage, HttpMailer, Mailer, NoopMailer};

use crate::config::NotifyConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint answered {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    chat: Arc<dyn ChatNotifier>,
    timeout: Duration,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, chat: Arc<dyn ChatNotifier>, timeout: Duration) -> Self {
        Self {
            mailer,
            chat,
            timeout,
        }
    }

    /// Real transports where credentials exist, logging no-ops elsewhere.
    pub fn from_config(config: &NotifyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.send_timeout)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to default http client");
                reqwest::Client::new()
            });

        let mailer: Arc<dyn Mailer> = match &config.email {
            Some(email) => Arc::new(HttpMailer::new(client.clone(), email.clone())),
            None => {
                tracing::info!("email credentials absent, emails will only be logged");
                Arc::new(NoopMailer)
            }
        };
        let chat: Arc<dyn ChatNotifier> = match &config.chat_webhook_url {
            Some(url) => Arc::new(WebhookChat::new(client, url.clone())),
            None => {
                tracing::info!("chat webhook absent, admin messages will only be logged");
                Arc::new(NoopChat)
            }
        };

        Self::new(mailer, chat, config.send_timeout)
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopMailer), Arc::new(NoopChat), Duration::from_secs(5))
    }

    /// Sends and waits, but swallows any failure.
    pub async fn send_email(&self, message: EmailMessage) {
        let outcome = match tokio::time::timeout(self.timeout, self.mailer.send(&message)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::TimedOut(self.timeout)),
        };
        match outcome {
            Ok(()) => tracing::debug!(to = %message.to, subject = %message.subject, "email sent"),
            Err(err) => tracing::warn!(
                to = %message.to,
                subject = %message.subject,
                error = %err,
                "email notification failed"
            ),
        }
    }

    pub async fn send_chat(&self, text: String) {
        let outcome = match tokio::time::timeout(self.timeout, self.chat.notify(&text)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::TimedOut(self.timeout)),
        };
        if let Err(err) = outcome {
            tracing::warn!(error = %err, "chat notification failed");
        }
    }

    pub fn email_in_background(&self, message: EmailMessage) {
        let this = self.clone();
        tokio::spawn(async move { this.send_email(message).await });
    }

    pub fn chat_in_background(&self, text: String) {
        let this = self.clone();
        tokio::spawn(async move { this.send_chat(text).await });
    }
}
