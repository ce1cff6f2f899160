//! Report delivery by email
//!
//! The [`Notifier`] trait is the seam the job runner depends on;
//! [`SendGridNotifier`] implements it with the SendGrid v3 `mail/send` API.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::{DeliveryError, DeliveryResult};
use crate::models::{DeliveryReceipt, Recipient, ReportEmail};

const CSV_MIME_TYPE: &str = "text/csv";
const MESSAGE_ID_HEADER: &str = "x-message-id";

/// Sends a formatted report to its recipients
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_report(&self, email: &ReportEmail) -> DeliveryResult<DeliveryReceipt>;
}

/// SendGrid v3 API notifier
pub struct SendGridNotifier {
    client: Client,
    api_key: String,
    base_url: String,
    sender: Recipient,
}

impl SendGridNotifier {
    pub fn new<K: Into<String>, B: Into<String>>(
        api_key: K,
        base_url: B,
        sender: Recipient,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("Spot-Saver/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            sender,
        }
    }

    fn send_url(&self) -> String {
        format!("{}/v3/mail/send", self.base_url.trim_end_matches('/'))
    }

    fn build_payload<'a>(&'a self, email: &'a ReportEmail) -> MailSendRequest<'a> {
        MailSendRequest {
            personalizations: vec![Personalization {
                to: &email.to,
                cc: if email.cc.is_empty() {
                    None
                } else {
                    Some(&email.cc)
                },
            }],
            from: &self.sender,
            subject: &email.subject,
            content: vec![Content {
                content_type: "text/plain",
                value: &email.body,
            }],
            attachments: vec![Attachment {
                content: STANDARD.encode(&email.report.content),
                content_type: CSV_MIME_TYPE,
                filename: &email.report.filename,
                disposition: "attachment",
            }],
        }
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn send_report(&self, email: &ReportEmail) -> DeliveryResult<DeliveryReceipt> {
        if email.to.is_empty() {
            return Err(DeliveryError::NoRecipients);
        }

        let payload = self.build_payload(email);
        debug!(
            "Sending '{}' to {} recipient(s), {} cc, attachment {} ({} bytes)",
            email.subject,
            email.to.len(),
            email.cc.len(),
            email.report.filename,
            email.report.content.len()
        );

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::transport(format!("request timed out: {e}"))
                } else {
                    DeliveryError::transport(e.to_string())
                }
            })?;

        let status = response.status();
        let message_id = response
            .headers()
            .get(MESSAGE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Email provider rejected message with {}: {}", status, body);
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("SendReport - Response Code: {}", status.as_u16());
        Ok(DeliveryReceipt {
            status: status.as_u16(),
            message_id,
        })
    }
}

#[derive(Serialize)]
struct MailSendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: &'a Recipient,
    subject: &'a str,
    content: Vec<Content<'a>>,
    attachments: Vec<Attachment<'a>>,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: &'a [Recipient],
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<&'a [Recipient]>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct Attachment<'a> {
    content: String,
    #[serde(rename = "type")]
    content_type: &'a str,
    filename: &'a str,
    disposition: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Report;
    use serde_json::json;

    fn notifier() -> SendGridNotifier {
        SendGridNotifier::new(
            "SG.test",
            "https://api.sendgrid.com/",
            Recipient::new("spotsaver@example.com", Some("Spot Saver".to_string())),
            Duration::from_secs(5),
        )
    }

    fn email(cc: Vec<Recipient>) -> ReportEmail {
        ReportEmail {
            to: vec![Recipient::new("ops@example.com", Some("Ops".to_string()))],
            cc,
            subject: "1 SEA Spot Saver Flights for 2024-06-01".to_string(),
            body: "body".to_string(),
            report: Report {
                filename: "2024-06-01SEASpotSaverFlights.csv".to_string(),
                content: b"a,b\n1,2\n".to_vec(),
                rows: 1,
            },
        }
    }

    #[test]
    fn test_send_url_trims_trailing_slash() {
        assert_eq!(notifier().send_url(), "https://api.sendgrid.com/v3/mail/send");
    }

    #[test]
    fn test_payload_shape() {
        let notifier = notifier();
        let email = email(Vec::new());
        let payload = serde_json::to_value(notifier.build_payload(&email)).unwrap();

        assert_eq!(
            payload,
            json!({
                "personalizations": [{
                    "to": [{"email": "ops@example.com", "name": "Ops"}]
                }],
                "from": {"email": "spotsaver@example.com", "name": "Spot Saver"},
                "subject": "1 SEA Spot Saver Flights for 2024-06-01",
                "content": [{"type": "text/plain", "value": "body"}],
                "attachments": [{
                    "content": STANDARD.encode(b"a,b\n1,2\n"),
                    "type": "text/csv",
                    "filename": "2024-06-01SEASpotSaverFlights.csv",
                    "disposition": "attachment"
                }]
            })
        );
    }

    #[test]
    fn test_payload_includes_cc_when_present() {
        let notifier = notifier();
        let email = email(vec![Recipient::new("audit@example.com", None)]);
        let payload = serde_json::to_value(notifier.build_payload(&email)).unwrap();
        assert_eq!(
            payload["personalizations"][0]["cc"],
            json!([{"email": "audit@example.com"}])
        );
    }

    #[tokio::test]
    async fn test_no_recipients_fails_before_network() {
        let notifier = SendGridNotifier::new(
            "SG.test",
            "http://127.0.0.1:9",
            Recipient::new("spotsaver@example.com", None),
            Duration::from_secs(1),
        );
        let mut email = email(Vec::new());
        email.to.clear();

        let err = notifier.send_report(&email).await.unwrap_err();
        assert!(matches!(err, DeliveryError::NoRecipients));
    }
}
