use anyhow::Context;
use async_trait::async_trait;

use super::EmailProvider;

/// Transactional mail via an HTTP relay (SendGrid-compatible API).
pub struct HttpMailProvider {
    api_key: String,
    from: String,
    client: reqwest::Client,
}

impl HttpMailProvider {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            api_key,
            from,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmailProvider for HttpMailProvider {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let payload = serde_json::json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        self.client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("failed to send email")?
            .error_for_status()
            .context("mail API returned error")?;

        Ok(())
    }
}
