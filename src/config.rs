use std::{env, path::PathBuf, time::Duration};

use anyhow::anyhow;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub checkout: CheckoutConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Shipping fee used when the client sends none (or garbage) below the free-shipping threshold.
    pub flat_shipping_rate: i64,
    /// When false, any status may move to any other status.
    pub strict_status_transitions: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            flat_shipping_rate: 85,
            strict_status_transitions: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub store_name: String,
    pub email: Option<EmailConfig>,
    pub chat_webhook_url: Option<String>,
    pub send_timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            store_name: "Glow Skincare".to_string(),
            email: None,
            chat_webhook_url: None,
            send_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL is not set"))?;
        let jwt_secret = var("JWT_SECRET").ok_or_else(|| anyhow!("JWT_SECRET is not set"))?;
        let host = var("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("APP_PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let upload_dir = var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("uploads"));
        let max_upload_bytes = var("MAX_UPLOAD_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(5 * 1024 * 1024);

        let defaults = CheckoutConfig::default();
        let checkout = CheckoutConfig {
            flat_shipping_rate: var("SHIPPING_FLAT_RATE")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|rate| *rate >= 0)
                .unwrap_or(defaults.flat_shipping_rate),
            strict_status_transitions: var("ORDER_STRICT_TRANSITIONS")
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(defaults.strict_status_transitions),
        };

        // Email is only wired up when both a key and a sender are present.
        let email = match (var("EMAIL_API_KEY"), var("EMAIL_SENDER")) {
            (Some(api_key), Some(sender_email)) => Some(EmailConfig {
                api_url: var("EMAIL_API_URL")
                    .unwrap_or_else(|| "https://api.brevo.com/v3/smtp/email".to_string()),
                api_key,
                sender_name: var("EMAIL_SENDER_NAME").unwrap_or_else(|| sender_email.clone()),
                sender_email,
            }),
            _ => None,
        };

        let notify_defaults = NotifyConfig::default();
        let notify = NotifyConfig {
            store_name: var("STORE_NAME").unwrap_or(notify_defaults.store_name),
            email,
            chat_webhook_url: var("CHAT_WEBHOOK_URL"),
            send_timeout: var("NOTIFY_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(notify_defaults.send_timeout),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            upload_dir,
            max_upload_bytes,
            checkout,
            notify,
        })
    }
}
