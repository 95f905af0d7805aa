use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

/// Outbound email delivery abstraction.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a plain-text message or return an error.
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Delivers mail through an HTTP mail API (JSON body, bearer-key auth).
pub struct HttpMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: String, from: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("build mail http client")?;
        Ok(Self {
            http,
            api_url,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let payload = json!({
            "from": self.from,
            "to": [to],
            "subject": subject,
            "text": body,
        });
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("mail api request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("mail api returned {status}: {detail}");
        }
        info!(%to, %subject, "email dispatched");
        Ok(())
    }
}

/// Local dev sender that logs the message instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(%to, %subject, %body, "email delivery stub");
        Ok(())
    }
}

/// Subject and body for the account-verification email.
pub fn verification_email(base_url: &str, name: &str, token: &str) -> (String, String) {
    let link = format!(
        "{}/api/verify-email/{}",
        base_url.trim_end_matches('/'),
        token
    );
    let subject = "Verify your CodeCoach account".to_string();
    let body = format!(
        "Hi {name},\n\n\
         Welcome to CodeCoach! Confirm your email address by opening the link below:\n\n\
         {link}\n\n\
         The link expires in 24 hours. If you did not create an account, you can ignore this message.\n"
    );
    (subject, body)
}

/// Subject and body for the password-reset email.
pub fn reset_email(base_url: &str, name: &str, token: &str) -> (String, String) {
    let link = format!(
        "{}/reset-password/{}",
        base_url.trim_end_matches('/'),
        token
    );
    let subject = "Reset your CodeCoach password".to_string();
    let body = format!(
        "Hi {name},\n\n\
         We received a request to reset your password. Open the link below within 24 hours to choose a new one:\n\n\
         {link}\n\n\
         If you did not request a reset, no action is needed.\n"
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Captures messages for assertions instead of delivering them.
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingMailer {
        pub(crate) fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((to.into(), subject.into(), body.into()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn recording_mailer_captures_messages() {
        let mailer = RecordingMailer::new();
        mailer
            .send("user@example.com", "Hello", "body text")
            .await
            .expect("send should succeed");
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "user@example.com");
    }

    #[test]
    fn verification_email_embeds_token_link() {
        let (subject, body) = verification_email("http://localhost:8080/", "Ada", "tok123");
        assert!(subject.contains("Verify"));
        assert!(body.contains("http://localhost:8080/api/verify-email/tok123"));
        assert!(body.contains("Ada"));
    }

    #[test]
    fn reset_email_embeds_token_link() {
        let (_, body) = reset_email("http://localhost:8080", "Ada", "tok456");
        assert!(body.contains("http://localhost:8080/reset-password/tok456"));
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        assert!(LogMailer.send("a@b.c", "s", "b").await.is_ok());
    }
}
