//! Voice-agent call provider: hands the call script to an HTTP voice API.

use crate::outreach::{OutboundCall, VoiceProvider};
use anyhow::{bail, Context};
use serde_json::json;

pub struct VoiceAgentProvider {
    endpoint: String,
}

impl VoiceAgentProvider {
    pub fn new(endpoint: String) -> Self {
        Self { endpoint }
    }

    fn api_key() -> anyhow::Result<String> {
        match std::env::var("VOICE_AGENT_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => bail!("VOICE_AGENT_API_KEY is not configured"),
        }
    }
}

impl VoiceProvider for VoiceAgentProvider {
    fn name(&self) -> &'static str {
        "voice-agent"
    }

    fn place_call(&self, call: &OutboundCall) -> anyhow::Result<()> {
        let api_key = Self::api_key()?;

        let body = json!({
            "phone_number": call.to,
            "task": call.script,
            "metadata": { "influencer_name": call.influencer_name },
        });

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(&self.endpoint)
            .header("authorization", api_key)
            .json(&body)
            .send()
            .context("voice agent request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            bail!("voice agent returned {status}: {detail}");
        }

        log::info!("call to {} queued via voice agent, status {status}", call.to);
        Ok(())
    }
}
