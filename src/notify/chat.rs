use async_trait::async_trait;
use serde_json::json;

use super::NotifyError;

/// Admin chat channel. Messages may use `*bold*` markup.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;
}

pub struct WebhookChat {
    client: reqwest::Client,
    url: String,
}

impl WebhookChat {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl ChatNotifier for WebhookChat {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

pub struct NoopChat;

#[async_trait]
impl ChatNotifier for NoopChat {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        tracing::info!(chars = text.len(), "chat message skipped (no webhook configured)");
        Ok(())
    }
}
