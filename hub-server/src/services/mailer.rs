//! Mail delivery

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a password reset code valid for `ttl_minutes`
    async fn send_reset_code(&self, to: &str, code: &str, ttl_minutes: i64) -> Result<(), MailError>;
}

fn reset_body(code: &str, ttl_minutes: i64) -> String {
    format!(
        "Your FreelanceHub password reset code is: {code}\n\
         Valid for {ttl_minutes} minutes.\n\n\
         If you did not ask for a reset, ignore this message."
    )
}

/// Writes mail to the log instead of sending it (development, tests)
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_reset_code(&self, to: &str, code: &str, ttl_minutes: i64) -> Result<(), MailError> {
        tracing::info!(
            target: "mail",
            to = to,
            body = %reset_body(code, ttl_minutes),
            "Password reset code (not sent, log backend)"
        );
        Ok(())
    }
}

/// Amazon SES v2 mailer
#[derive(Debug, Clone)]
pub struct SesMailer {
    client: SesClient,
    from: String,
}

impl SesMailer {
    pub fn new(client: SesClient, from: impl Into<String>) -> Self {
        Self {
            client,
            from: from.into(),
        }
    }

    /// Build a client from the default AWS chain, optionally pinning the region
    pub async fn from_env(from: impl Into<String>, region: Option<&str>) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = match region {
            Some(region) => {
                let ses_config = aws_config
                    .to_builder()
                    .region(aws_config::Region::new(region.to_string()))
                    .build();
                SesClient::new(&ses_config)
            }
            None => SesClient::new(&aws_config),
        };
        Self::new(client, from)
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send_reset_code(&self, to: &str, code: &str, ttl_minutes: i64) -> Result<(), MailError> {
        let subject = Content::builder()
            .data("Reset your FreelanceHub password")
            .build()
            .map_err(|e| MailError::Build(e.to_string()))?;

        let body = Body::builder()
            .text(
                Content::builder()
                    .data(reset_body(code, ttl_minutes))
                    .build()
                    .map_err(|e| MailError::Build(e.to_string()))?,
            )
            .build();

        let message = Message::builder().subject(subject).body(body).build();

        self.client
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| MailError::Delivery(e.to_string()))?;

        tracing::info!(to = to, "Password reset code sent");
        Ok(())
    }
}
