//! Order notifications
//!
//! [`Notifier`] is the capability the order service calls after a commit.
//! [`NotificationService`] fans a notification out over SMS and email; each
//! channel call is bounded by the configured timeout.

pub mod email;
pub mod message;
pub mod sms;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use shared::models::Order;
use thiserror::Error;

use crate::core::Config;
pub use sms::SmsClient;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("{0} channel is not configured")]
    NotConfigured(&'static str),

    #[error("Order {0} has no customer attached")]
    MissingCustomer(i64),

    #[error("SMS delivery failed: {0}")]
    Sms(String),

    #[error("Email delivery failed: {0}")]
    Email(String),

    #[error("{0} delivery timed out")]
    Timeout(&'static str),
}

/// Outbound order notifications
///
/// Implementations expect an order with its customer and items hydrated.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send_order_confirmation(&self, order: &Order) -> Result<(), NotifyError>;
    async fn send_status_update(&self, order: &Order) -> Result<(), NotifyError>;
}

struct EmailChannel {
    ses: SesClient,
    from: String,
}

/// SMS + email notifier
pub struct NotificationService {
    sms: Option<SmsClient>,
    email: Option<EmailChannel>,
    admin_email: Option<String>,
    currency: String,
    timeout: Duration,
}

impl NotificationService {
    /// Channels whose configuration is missing stay disabled and report
    /// [`NotifyError::NotConfigured`] when used.
    pub fn new(config: &Config, http: reqwest::Client, ses: Option<SesClient>) -> Self {
        let sms = match (&config.africa_talking_api_key, &config.africa_talking_username) {
            (Some(api_key), Some(username)) => Some(SmsClient::new(
                http,
                api_key.clone(),
                username.clone(),
                config.sms_sender_id.clone(),
            )),
            _ => None,
        };
        let email = match (ses, &config.ses_from_email) {
            (Some(ses), Some(from)) => Some(EmailChannel {
                ses,
                from: from.clone(),
            }),
            _ => None,
        };

        if sms.is_none() {
            tracing::warn!("SMS notifications disabled: Africa's Talking credentials not set");
        }
        if email.is_none() {
            tracing::warn!("Email notifications disabled: SES_FROM_EMAIL not set");
        }

        Self {
            sms,
            email,
            admin_email: config.admin_email.clone(),
            currency: config.currency.clone(),
            timeout: config.notify_timeout(),
        }
    }

    async fn bounded<F>(&self, channel: &'static str, fut: F) -> Result<(), NotifyError>
    where
        F: Future<Output = Result<(), NotifyError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| NotifyError::Timeout(channel))?
    }

    /// Customers without a phone number are skipped
    async fn send_sms(&self, order: &Order, text: &str) -> Result<(), NotifyError> {
        let customer = order
            .customer
            .as_ref()
            .ok_or(NotifyError::MissingCustomer(order.id))?;
        let Some(phone) = customer.phone.as_deref().filter(|p| !p.is_empty()) else {
            tracing::debug!(order_id = order.id, "Customer has no phone, SMS skipped");
            return Ok(());
        };
        let sms = self.sms.as_ref().ok_or(NotifyError::NotConfigured("sms"))?;
        self.bounded("sms", sms.send(phone, text)).await
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let email = self
            .email
            .as_ref()
            .ok_or(NotifyError::NotConfigured("email"))?;
        self.bounded(
            "email",
            email::send_text_email(&email.ses, &email.from, to, subject, body),
        )
        .await
    }
}

#[async_trait]
impl Notifier for NotificationService {
    async fn send_order_confirmation(&self, order: &Order) -> Result<(), NotifyError> {
        let customer = order
            .customer
            .as_ref()
            .ok_or(NotifyError::MissingCustomer(order.id))?;

        self.send_sms(order, &message::confirmation_sms(order, &self.currency))
            .await?;

        self.send_email(
            &customer.email,
            &message::confirmation_subject(order),
            &message::confirmation_body(order, &self.currency),
        )
        .await?;

        match &self.admin_email {
            Some(admin) => {
                self.send_email(
                    admin,
                    &message::admin_subject(order),
                    &message::admin_body(order, &self.currency),
                )
                .await
            }
            None => Err(NotifyError::NotConfigured("admin email")),
        }
    }

    async fn send_status_update(&self, order: &Order) -> Result<(), NotifyError> {
        let customer = order
            .customer
            .as_ref()
            .ok_or(NotifyError::MissingCustomer(order.id))?;

        self.send_sms(order, &message::status_sms(order)).await?;
        self.send_email(
            &customer.email,
            &message::status_subject(order),
            &message::status_body(order),
        )
        .await
    }
}
