//! Outbound email. `AppState` holds an `Arc<dyn EmailSender>`, chosen at
//! startup: Resend when `RESEND_API_KEY` is set, otherwise a no-op sender.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::notifications::alerts::DrinkingWindowAlert;
use crate::text::escape_html;

const RESEND_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;

    /// False for senders that drop mail; callers skip digest rendering.
    fn is_configured(&self) -> bool {
        true
    }
}

pub struct NoopEmailSender;

#[async_trait]
impl EmailSender for NoopEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        debug!("Email delivery disabled; dropping \"{}\"", message.subject);
        Ok(())
    }

    fn is_configured(&self) -> bool {
        false
    }
}

pub struct ResendEmailSender {
    client: Client,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendEmailSender {
    pub fn new(api_key: String, from: String) -> Result<Self, EmailError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(15)).build()?,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let response = self
            .client
            .post(RESEND_URL)
            .bearer_auth(&self.api_key)
            .json(&ResendRequest {
                from: &self.from,
                to: [message.to.as_str()],
                subject: &message.subject,
                html: &message.html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }
}

pub fn sender_from_config(config: &Config) -> Result<Arc<dyn EmailSender>, EmailError> {
    match &config.resend_api_key {
        Some(key) => {
            info!("Email digests enabled via Resend");
            Ok(Arc::new(ResendEmailSender::new(
                key.clone(),
                config.email_from.clone(),
            )?))
        }
        None => {
            info!("RESEND_API_KEY not set; email digests disabled");
            Ok(Arc::new(NoopEmailSender))
        }
    }
}

/// Renders the drinking-window digest as a plain HTML list.
pub fn render_digest(to: &str, alerts: &[DrinkingWindowAlert], app_base_url: &str) -> EmailMessage {
    let subject = match alerts.len() {
        1 => "1 wine in your cellar needs attention".to_string(),
        n => format!("{n} wines in your cellar need attention"),
    };

    let items: String = alerts
        .iter()
        .map(|a| {
            format!(
                "<li><strong>{}</strong> ({})<br>{}</li>",
                escape_html(&a.title),
                a.urgency.as_str(),
                escape_html(&a.message)
            )
        })
        .collect();

    let html = format!(
        "<h2>Your cellar this week</h2><ul>{items}</ul>\
         <p><a href=\"{}/cellar\">Open your cellar</a></p>",
        escape_html(app_base_url.trim_end_matches('/'))
    );

    EmailMessage {
        to: to.to_string(),
        subject,
        html,
    }
}
