use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

use super::NotifyError;

/// Send a plain-text email through SES
pub async fn send_text_email(
    ses: &SesClient,
    from: &str,
    to: &str,
    subject: &str,
    body_text: &str,
) -> Result<(), NotifyError> {
    let subject = Content::builder()
        .data(subject)
        .build()
        .map_err(|e| NotifyError::Email(e.to_string()))?;

    let body = Body::builder()
        .text(
            Content::builder()
                .data(body_text)
                .build()
                .map_err(|e| NotifyError::Email(e.to_string()))?,
        )
        .build();

    let message = Message::builder().subject(subject).body(body).build();

    ses.send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(to).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await
        .map_err(|e| NotifyError::Email(e.to_string()))?;

    tracing::info!(to = to, "Email sent");
    Ok(())
}
