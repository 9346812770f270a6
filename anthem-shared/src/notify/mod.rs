/// Outbound notification seam
///
/// Anthem triggers out-of-band deliveries — verification emails,
/// password-reset emails, WhatsApp verification codes, event announcements —
/// but never blocks a request on them. Delivery sits behind the `Notifier`
/// trait; the shipped implementation logs via `tracing` and a real
/// transport (SMTP relay, WhatsApp business API) plugs in without touching
/// callers.
///
/// # Contract
///
/// Callers wrap `send` in a fixed `tokio::time::timeout` and
/// log-and-continue on timeout or error: a failed delivery never rolls back
/// the write that triggered it.
///
/// # Example
///
/// ```
/// use anthem_shared::notify::{LogNotifier, Notification, NotificationChannel, Notifier};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let notifier = LogNotifier;
///
/// notifier
///     .send(Notification {
///         channel: NotificationChannel::Email {
///             to: "user@example.com".to_string(),
///         },
///         subject: "Verify your email".to_string(),
///         body: "Your verification code is ...".to_string(),
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Error type for notification delivery
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The transport rejected or failed the delivery
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    /// The recipient address/number is unusable
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// Where a notification goes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "channel")]
pub enum NotificationChannel {
    /// Email to an address
    Email {
        /// Recipient address
        to: String,
    },

    /// WhatsApp message to a phone number
    Whatsapp {
        /// Recipient phone number (E.164)
        phone: String,
    },
}

/// One outbound notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Delivery channel and recipient
    pub channel: NotificationChannel,

    /// Subject line (ignored by channels without one)
    pub subject: String,

    /// Message body
    pub body: String,
}

/// Outbound delivery transport
///
/// Implementations must not retry internally; callers own the timeout and
/// the decision to drop a failed delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable transport name, for logs
    fn name(&self) -> &str;

    /// Delivers one notification
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Logging transport
///
/// Writes the would-be delivery to the log instead of sending it. This is
/// the default transport in development and tests.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        match &notification.channel {
            NotificationChannel::Email { to } => {
                info!(
                    to = %to,
                    subject = %notification.subject,
                    "Would send email"
                );
            }
            NotificationChannel::Whatsapp { phone } => {
                info!(
                    phone = %phone,
                    subject = %notification.subject,
                    "Would send WhatsApp message"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_accepts_email() {
        let notifier = LogNotifier;

        let result = notifier
            .send(Notification {
                channel: NotificationChannel::Email {
                    to: "user@example.com".to_string(),
                },
                subject: "Subject".to_string(),
                body: "Body".to_string(),
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_notifier_accepts_whatsapp() {
        let notifier = LogNotifier;

        let result = notifier
            .send(Notification {
                channel: NotificationChannel::Whatsapp {
                    phone: "+15555550100".to_string(),
                },
                subject: "Code".to_string(),
                body: "123456".to_string(),
            })
            .await;

        assert!(result.is_ok());
    }

    #[test]
    fn test_notifier_name() {
        assert_eq!(LogNotifier.name(), "log");
    }
}
