use reqwest::Client;
use serde::Serialize;
use std::{sync::Mutex, time::Duration};
use tracing::{error, info};

/// Outbound channel for reminder messages
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    /// Returns whether the message was accepted for delivery. Failures are
    /// logged by the implementation.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> bool;
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts messages as JSON to a mail relay
pub struct WebhookNotifier {
    client: Client,
    url: String,
    api_key: Option<String>,
    from: String,
}

impl WebhookNotifier {
    pub fn new(
        url: String,
        api_key: Option<String>,
        from: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            api_key,
            from,
        })
    }
}

#[async_trait::async_trait]
impl INotifier for WebhookNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> bool {
        let body = MailRequest {
            from: &self.from,
            to,
            subject,
            html: html_body,
        };
        let mut req = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        match req.send().await {
            Ok(res) if res.status().is_success() => true,
            Ok(res) => {
                error!(
                    "Mail relay rejected message to {} with status: {}",
                    to,
                    res.status()
                );
                false
            }
            Err(e) => {
                error!("Error sending message to {}: {:?}", to, e);
                false
            }
        }
    }
}

/// Used when no mail relay is configured
pub struct LogNotifier {}

#[async_trait::async_trait]
impl INotifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> bool {
        info!("Reminder to {}: {}", to, subject);
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Keeps every message in memory. Used for testing.
#[derive(Default)]
pub struct InMemoryNotifier {
    sent: Mutex<Vec<SentMessage>>,
    /// Number of upcoming sends that should fail
    failures: Mutex<usize>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, count: usize) {
        if let Ok(mut failures) = self.failures.lock() {
            *failures = count;
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl INotifier for InMemoryNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> bool {
        if let Ok(mut failures) = self.failures.lock() {
            if *failures > 0 {
                *failures -= 1;
                return false;
            }
        }
        match self.sent.lock() {
            Ok(mut sent) => {
                sent.push(SentMessage {
                    to: to.to_string(),
                    subject: subject.to_string(),
                    html_body: html_body.to_string(),
                });
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inmemory_notifier_records_and_fails_on_demand() {
        let notifier = InMemoryNotifier::new();
        notifier.fail_next(1);
        assert!(!notifier.send("a@b.c", "Hi", "<p>Hi</p>").await);
        assert!(notifier.send("a@b.c", "Hi", "<p>Hi</p>").await);
        assert_eq!(
            notifier.sent(),
            vec![SentMessage {
                to: "a@b.c".into(),
                subject: "Hi".into(),
                html_body: "<p>Hi</p>".into()
            }]
        );
    }

    #[tokio::test]
    async fn webhook_notifier_reports_unreachable_relays() {
        let notifier = WebhookNotifier::new(
            "http://127.0.0.1:9/mail".into(),
            Some("key".into()),
            "noreply@studyplanner.app".into(),
            Duration::from_secs(2),
        )
        .unwrap();
        assert!(!notifier.send("a@b.c", "Hi", "<p>Hi</p>").await);
    }
}
