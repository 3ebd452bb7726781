use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{error::ApiError, models::Contact};

/// Mailer Trait
///
/// Outbound notification transport. The only consumer today is the
/// contact-inquiry notice, but the trait keeps handlers independent of the
/// mail provider's wire format.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ApiError>;
}

/// Shared, thread-safe handle to the mail layer used across the app state.
pub type MailerState = Arc<dyn Mailer>;

/// Renders the admin-facing inquiry notice for a stored contact.
/// Returns (subject, HTML body).
pub fn contact_inquiry_email(contact: &Contact) -> (String, String) {
    let subject = "New Contact Inquiry Received".to_string();
    let newsletter = if contact.newsletter_opt_in {
        "subscribed"
    } else {
        "not subscribed"
    };

    let html_body = format!(
        "<h2>New Contact Inquiry</h2>\
         <p><strong>Name:</strong> {}</p>\
         <p><strong>Email:</strong> {}</p>\
         <p><strong>Phone:</strong> {}</p>\
         <p><strong>Newsletter:</strong> {}</p>\
         <p><strong>Message:</strong></p>\
         <p>{}</p>",
        contact.full_name, contact.email, contact.phone_number, newsletter, contact.message,
    );

    (subject, html_body)
}

// --- Live HTTP Implementation ---

/// HttpMailer
///
/// Mail delivery through an HTTP mail API: a bearer-authenticated JSON POST
/// of `{from, to, subject, html}`. Non-2xx answers are failures.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    sender: String,
}

impl HttpMailer {
    pub fn new(api_url: &str, api_key: &str, sender: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            sender: sender.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "from": self.sender,
                "to": [to],
                "subject": subject,
                "html": html_body,
            }))
            .send()
            .await
            .map_err(|e| ApiError::MailFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::MailFailed(format!(
                "mail API answered {}",
                response.status()
            )));
        }

        tracing::debug!("notification email dispatched to {}", to);
        Ok(())
    }
}

// --- Mock Implementation for Testing ---

/// One captured outbound message.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// MockMailer
///
/// Recording twin of the live mailer: captures every send for assertions, or
/// fails each one when constructed failing.
pub struct MockMailer {
    pub should_fail: bool,
    sent: Mutex<Vec<SentMail>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    pub fn sent_mail(&self) -> Vec<SentMail> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ApiError> {
        if self.should_fail {
            return Err(ApiError::MailFailed("mock mail failure".to_string()));
        }

        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(SentMail {
                to: to.to_string(),
                subject: subject.to_string(),
                html_body: html_body.to_string(),
            });

        Ok(())
    }
}
