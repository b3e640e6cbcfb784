//! SendGrid transactional email over the v3 REST API.

use crate::outreach::{EmailProvider, OutboundEmail};
use anyhow::{bail, Context};
use serde_json::json;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

pub struct SendGridProvider;

impl SendGridProvider {
    pub fn new() -> Self {
        Self
    }

    fn api_key() -> anyhow::Result<String> {
        match std::env::var("SENDGRID_API_KEY") {
            Ok(key) if !key.is_empty() => {
                // Keys are issued as "SG.<id>.<secret>"; a wrong shape usually
                // means a truncated paste, worth flagging before the 401.
                if !key.starts_with("SG.") {
                    log::warn!("SENDGRID_API_KEY does not look like a SendGrid key (expected 'SG.' prefix)");
                }
                Ok(key)
            }
            _ => bail!("SENDGRID_API_KEY is not configured"),
        }
    }
}

impl EmailProvider for SendGridProvider {
    fn name(&self) -> &'static str {
        "sendgrid"
    }

    fn send(&self, email: &OutboundEmail) -> anyhow::Result<()> {
        let api_key = Self::api_key()?;

        let body = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": email.from },
            "subject": email.subject,
            "content": [{ "type": "text/html", "value": email.html }],
        });

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&api_key)
            .json(&body)
            .send()
            .context("sendgrid request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            if status.as_u16() == 401 {
                bail!("sendgrid rejected the API key (401 Unauthorized): {detail}");
            }
            bail!("sendgrid returned {status}: {detail}");
        }

        log::info!("email sent to {} via sendgrid, status {status}", email.to);
        Ok(())
    }
}
