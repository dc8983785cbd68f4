//! # Notification Mail
//!
//! Admin gets one plain-text email per stored application.
//!
//! Delivery is best-effort: the caller spawns the send and only logs the outcome,
//! the applicant's submission already succeeded once the record is stored. No retries.
use std::time::Duration;

use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    address::AddressError,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::{BoxFuture, application::ApplicationRecord, config::Config};

const SENDER_NAME: &str = "Careers Portal";
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Applicant name {0:?} cannot be written into a mail header")]
    UnsafeHeader(String),
}

/// Outbound notification for newly stored applications.
pub trait Mailer: Send + Sync {
    fn send_application<'a>(
        &'a self,
        record: &'a ApplicationRecord,
    ) -> BoxFuture<'a, Result<(), MailError>>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    /// Builds a pooled implicit-TLS transport authenticated as the admin account.
    ///
    /// No connection is opened until the first send.
    pub fn new(config: &Config) -> Result<Self, MailError> {
        let admin: Address = config.admin_email.parse()?;

        let credentials = Credentials::new(
            config.admin_email.clone(),
            config.admin_email_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self {
            transport,
            from: Mailbox::new(Some(SENDER_NAME.to_string()), admin.clone()),
            to: Mailbox::new(None, admin),
        })
    }
}

impl Mailer for SmtpMailer {
    fn send_application<'a>(
        &'a self,
        record: &'a ApplicationRecord,
    ) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let message = compose_notification(record, &self.from, &self.to)?;
            self.transport.send(message).await?;

            Ok::<(), MailError>(())
        })
    }
}

pub fn compose_notification(
    record: &ApplicationRecord,
    from: &Mailbox,
    to: &Mailbox,
) -> Result<Message, MailError> {
    // lettre panics on header values with line breaks instead of returning an error.
    let name = record.full_name();
    if name.chars().any(char::is_control) {
        return Err(MailError::UnsafeHeader(name));
    }

    let mut builder = Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(notification_subject(record))
        .header(ContentType::TEXT_PLAIN);

    // Replying from the inbox should reach the applicant.
    if let Ok(applicant) = record.email.parse::<Address>() {
        builder = builder.reply_to(Mailbox::new(Some(name), applicant));
    }

    Ok(builder.body(notification_body(record))?)
}

pub fn notification_subject(record: &ApplicationRecord) -> String {
    format!("New Job Application: {}", record.full_name())
}

pub fn notification_body(record: &ApplicationRecord) -> String {
    let mut body = format!(
        "A new job application was submitted.\n\n\
         Name: {}\n\
         Email: {}\n\
         Country: {}\n\
         Submitted: {}\n\
         Reference: {}\n\n\
         Search filters:\n",
        record.full_name(),
        record.email,
        record.country,
        record.created_at.to_rfc3339(),
        record.id,
    );

    if record.search_filters.is_empty() {
        body.push_str("  (none)\n");
    }

    for (key, value) in &record.search_filters {
        body.push_str(&format!("  {key}: {value}\n"));
    }

    body
}
