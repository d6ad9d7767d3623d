use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use scribe_config::EmailConfig;

#[derive(Debug, Error)]
pub enum EmailError {
    /// No sender address is configured; emailing is disabled.
    #[error("email sending is not configured")]
    NotConfigured,

    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("message build failed: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("invalid attachment content type: {0}")]
    ContentType(String),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sends rendered transcripts over SMTP.
#[derive(Debug)]
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl EmailService {
    /// Fails with `NotConfigured` when no sender address is set.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let sender = config.sender.clone().ok_or(EmailError::NotConfigured)?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port);
        if let Some(password) = config.password.clone() {
            let username = config.username.clone().unwrap_or_else(|| sender.clone());
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            sender,
        })
    }

    /// Sends the transcript as plain text + HTML, with an optional PDF
    /// attachment named after the title.
    pub async fn send_transcript(
        &self,
        to: &str,
        title: &str,
        body_text: String,
        body_html: String,
        pdf: Option<Vec<u8>>,
    ) -> Result<(), EmailError> {
        let message = build_message(&self.sender, to, title, body_text, body_html, pdf)?;
        self.transport.send(message).await?;
        info!(%to, %title, "Transcript email sent");
        Ok(())
    }
}

fn build_message(
    sender: &str,
    to: &str,
    title: &str,
    body_text: String,
    body_html: String,
    pdf: Option<Vec<u8>>,
) -> Result<Message, EmailError> {
    let alternative = MultiPart::alternative_plain_html(body_text, body_html);

    let body = match pdf {
        Some(bytes) => {
            let content_type = ContentType::parse("application/pdf")
                .map_err(|e| EmailError::ContentType(e.to_string()))?;
            MultiPart::mixed()
                .multipart(alternative)
                .singlepart(Attachment::new(format!("{title}.pdf")).body(bytes, content_type))
        }
        None => alternative,
    };

    Message::builder()
        .from(sender.parse()?)
        .to(to.parse()?)
        .subject(format!("Transcript: {title}"))
        .multipart(body)
        .map_err(EmailError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_carries_both_bodies_and_the_subject() {
        let message = build_message(
            "sender@example.com",
            "someone@example.com",
            "Standup",
            "plain body".to_string(),
            "<p>html body</p>".to_string(),
            None,
        )
        .unwrap();

        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("Subject: Transcript: Standup"));
        assert!(raw.contains("plain body"));
        assert!(raw.contains("<p>html body</p>"));
        assert!(!raw.contains("application/pdf"));
    }

    #[test]
    fn pdf_attachment_is_named_after_the_title() {
        let message = build_message(
            "sender@example.com",
            "someone@example.com",
            "Standup",
            "text".to_string(),
            "<p>html</p>".to_string(),
            Some(vec![0x25, 0x50, 0x44, 0x46]),
        )
        .unwrap();

        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("Standup.pdf"));
    }

    #[test]
    fn bad_recipient_address_is_rejected() {
        let err = build_message(
            "sender@example.com",
            "not an address",
            "T",
            String::new(),
            String::new(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, EmailError::Address(_)));
    }

    #[test]
    fn unconfigured_sender_disables_the_service() {
        let err = EmailService::new(&EmailConfig::default()).unwrap_err();
        assert!(matches!(err, EmailError::NotConfigured));
    }
}
