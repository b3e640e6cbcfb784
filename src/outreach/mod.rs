//! Outreach orchestration: transactional email and voice-agent calls.
//!
//! Providers sit behind small traits and are tried in a configured fallback
//! order — real provider first, mock last when fallback is allowed. A provider
//! failure is logged and the chain moves on; only full exhaustion surfaces as
//! an error. Delivery of an outreach event with influencer/campaign ids is
//! logged as a placeholder (no persistence layer in scope).

pub mod sendgrid;
pub mod voice;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::OutreachConfig;
use sendgrid::SendGridProvider;
use voice::VoiceAgentProvider;

#[derive(Debug, thiserror::Error)]
pub enum OutreachError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("all providers failed: {0}")]
    ProvidersExhausted(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailRequest {
    pub influencer_name: String,
    pub influencer_email: String,
    pub campaign_name: String,
    pub message: String,

    pub influencer_id: Option<u64>,
    pub campaign_id: Option<u64>,

    /// Skip real providers and use the mock service for this request.
    #[serde(default)]
    pub use_mock: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallRequest {
    pub influencer_name: String,
    pub phone_number: String,
    pub campaign_name: String,
    /// What the voice agent should say.
    pub script: String,

    pub influencer_id: Option<u64>,
    pub campaign_id: Option<u64>,

    #[serde(default)]
    pub use_mock: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutreachResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Fully rendered email, ready for any transport.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct OutboundCall {
    pub to: String,
    pub influencer_name: String,
    pub script: String,
}

pub trait EmailProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn send(&self, email: &OutboundEmail) -> anyhow::Result<()>;
}

pub trait VoiceProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn place_call(&self, call: &OutboundCall) -> anyhow::Result<()>;
}

/// Dev/test transport: logs the email and reports success.
pub struct MockEmailProvider;

impl EmailProvider for MockEmailProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn send(&self, email: &OutboundEmail) -> anyhow::Result<()> {
        log::info!("[MOCK EMAIL] Would send email to {}", email.to);
        log::info!("[MOCK EMAIL] Subject: {}", email.subject);
        log::info!("[MOCK EMAIL] Content: {}", email.html);
        Ok(())
    }
}

pub struct MockVoiceProvider;

impl VoiceProvider for MockVoiceProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn place_call(&self, call: &OutboundCall) -> anyhow::Result<()> {
        log::info!("[MOCK CALL] Would call {} at {}", call.influencer_name, call.to);
        log::info!("[MOCK CALL] Script: {}", call.script);
        Ok(())
    }
}

pub fn email_subject(campaign_name: &str) -> String {
    format!("Collaboration Opportunity: {campaign_name}")
}

pub fn render_email_html(influencer_name: &str, message: &str) -> String {
    format!(
        "<html>\n    <body>\n        <p>Dear {influencer_name},</p>\n        \
         <p>{message}</p>\n        <p>Best regards,<br>BrandSync Team</p>\n    \
         </body>\n</html>"
    )
}

/// Minimal shape check, not RFC validation.
pub fn is_valid_email(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

pub struct OutreachService {
    config: OutreachConfig,
}

impl OutreachService {
    pub fn new(config: OutreachConfig) -> Self {
        Self { config }
    }

    pub fn send_email(&self, request: &EmailRequest) -> Result<OutreachResponse, OutreachError> {
        if !is_valid_email(&request.influencer_email) {
            return Err(OutreachError::InvalidRequest(format!(
                "invalid email address: {}",
                request.influencer_email
            )));
        }

        let email = OutboundEmail {
            from: self.config.sender_email.clone(),
            to: request.influencer_email.clone(),
            subject: email_subject(&request.campaign_name),
            html: render_email_html(&request.influencer_name, &request.message),
        };

        let chain = self.email_chain(request.use_mock);
        let provider = deliver_email(&chain, &email)?;

        log_outreach_event(request.influencer_id, request.campaign_id);

        Ok(OutreachResponse {
            success: true,
            message: format!(
                "Email sent successfully to {} via {provider}",
                request.influencer_email
            ),
            timestamp: Utc::now(),
        })
    }

    pub fn send_call(&self, request: &CallRequest) -> Result<OutreachResponse, OutreachError> {
        if request.phone_number.trim().is_empty() {
            return Err(OutreachError::InvalidRequest(
                "phone number must not be empty".to_string(),
            ));
        }

        let call = OutboundCall {
            to: request.phone_number.clone(),
            influencer_name: request.influencer_name.clone(),
            script: request.script.clone(),
        };

        let chain = self.voice_chain(request.use_mock);
        let provider = deliver_call(&chain, &call)?;

        log_outreach_event(request.influencer_id, request.campaign_id);

        Ok(OutreachResponse {
            success: true,
            message: format!(
                "Call to {} queued via {provider}",
                request.phone_number
            ),
            timestamp: Utc::now(),
        })
    }

    fn email_chain(&self, use_mock: bool) -> Vec<Box<dyn EmailProvider>> {
        if use_mock || self.config.use_mock_email {
            return vec![Box::new(MockEmailProvider)];
        }

        let mut chain: Vec<Box<dyn EmailProvider>> = vec![Box::new(SendGridProvider::new())];
        if self.config.fallback_to_mock {
            chain.push(Box::new(MockEmailProvider));
        }
        chain
    }

    fn voice_chain(&self, use_mock: bool) -> Vec<Box<dyn VoiceProvider>> {
        if use_mock || self.config.use_mock_voice {
            return vec![Box::new(MockVoiceProvider)];
        }

        let mut chain: Vec<Box<dyn VoiceProvider>> = vec![Box::new(VoiceAgentProvider::new(
            self.config.voice_endpoint.clone(),
        ))];
        if self.config.fallback_to_mock {
            chain.push(Box::new(MockVoiceProvider));
        }
        chain
    }
}

/// Try providers in order; first success wins. Returns the winning provider's
/// name for the response message.
fn deliver_email(
    chain: &[Box<dyn EmailProvider>],
    email: &OutboundEmail,
) -> Result<&'static str, OutreachError> {
    let mut last_error = "no email providers configured".to_string();

    for provider in chain {
        log::info!("attempting email to {} via {}", email.to, provider.name());
        match provider.send(email) {
            Ok(()) => return Ok(provider.name()),
            Err(e) => {
                log::error!("email provider {} failed: {e:?}", provider.name());
                last_error = format!("{}: {e}", provider.name());
            }
        }
    }

    Err(OutreachError::ProvidersExhausted(last_error))
}

fn deliver_call(
    chain: &[Box<dyn VoiceProvider>],
    call: &OutboundCall,
) -> Result<&'static str, OutreachError> {
    let mut last_error = "no voice providers configured".to_string();

    for provider in chain {
        log::info!("attempting call to {} via {}", call.to, provider.name());
        match provider.place_call(call) {
            Ok(()) => return Ok(provider.name()),
            Err(e) => {
                log::error!("voice provider {} failed: {e:?}", provider.name());
                last_error = format!("{}: {e}", provider.name());
            }
        }
    }

    Err(OutreachError::ProvidersExhausted(last_error))
}

// Placeholder for outreach event persistence.
fn log_outreach_event(influencer_id: Option<u64>, campaign_id: Option<u64>) {
    if let (Some(influencer_id), Some(campaign_id)) = (influencer_id, campaign_id) {
        log::info!(
            "Logging outreach event: Influencer ID {influencer_id}, Campaign ID {campaign_id}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FailingProvider;

    impl EmailProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn send(&self, _email: &OutboundEmail) -> anyhow::Result<()> {
            anyhow::bail!("simulated transport failure")
        }
    }

    struct CountingProvider(Arc<AtomicUsize>);

    impl EmailProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn send(&self, _email: &OutboundEmail) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn test_email() -> OutboundEmail {
        OutboundEmail {
            from: "outreach@brandsync.example".to_string(),
            to: "test@example.com".to_string(),
            subject: email_subject("Test Campaign"),
            html: render_email_html("Test Influencer", "Hello"),
        }
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("priya@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("priya@"));
    }

    #[test]
    fn test_email_subject_format() {
        assert_eq!(
            email_subject("Summer Launch"),
            "Collaboration Opportunity: Summer Launch"
        );
    }

    #[test]
    fn test_render_email_html() {
        let html = render_email_html("Priya Sharma", "Join our campaign");
        assert!(html.contains("Dear Priya Sharma,"));
        assert!(html.contains("<p>Join our campaign</p>"));
        assert!(html.contains("BrandSync Team"));
    }

    #[test]
    fn test_chain_falls_through_to_next_provider() {
        let sent = Arc::new(AtomicUsize::new(0));
        let chain: Vec<Box<dyn EmailProvider>> = vec![
            Box::new(FailingProvider),
            Box::new(CountingProvider(sent.clone())),
        ];

        let winner = deliver_email(&chain, &test_email()).unwrap();
        assert_eq!(winner, "counting");
        assert_eq!(sent.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_chain_first_success_short_circuits() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let chain: Vec<Box<dyn EmailProvider>> = vec![
            Box::new(CountingProvider(first.clone())),
            Box::new(CountingProvider(second.clone())),
        ];

        deliver_email(&chain, &test_email()).unwrap();
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_chain_exhaustion_is_an_error() {
        let chain: Vec<Box<dyn EmailProvider>> =
            vec![Box::new(FailingProvider), Box::new(FailingProvider)];

        let result = deliver_email(&chain, &test_email());
        assert!(matches!(result, Err(OutreachError::ProvidersExhausted(_))));
    }

    #[test]
    fn test_mock_request_uses_mock_chain_only() {
        let service = OutreachService::new(OutreachConfig {
            use_mock_email: false,
            fallback_to_mock: false,
            ..Default::default()
        });
        let chain = service.email_chain(true);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name(), "mock");
    }

    #[test]
    fn test_real_chain_includes_fallback_when_configured() {
        let service = OutreachService::new(OutreachConfig {
            use_mock_email: false,
            fallback_to_mock: true,
            ..Default::default()
        });
        let chain = service.email_chain(false);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].name(), "sendgrid");
        assert_eq!(chain[1].name(), "mock");
    }

    #[test]
    fn test_send_email_rejects_invalid_address() {
        let service = OutreachService::new(OutreachConfig::default());
        let request = EmailRequest {
            influencer_name: "Test".to_string(),
            influencer_email: "not-an-email".to_string(),
            campaign_name: "Campaign".to_string(),
            message: "Hi".to_string(),
            influencer_id: None,
            campaign_id: None,
            use_mock: true,
        };

        let result = service.send_email(&request);
        assert!(matches!(result, Err(OutreachError::InvalidRequest(_))));
    }

    #[test]
    fn test_send_email_mock_succeeds() {
        let service = OutreachService::new(OutreachConfig::default());
        let request = EmailRequest {
            influencer_name: "Test Influencer".to_string(),
            influencer_email: "test@example.com".to_string(),
            campaign_name: "Test Campaign".to_string(),
            message: "This is a test message.".to_string(),
            influencer_id: Some(1),
            campaign_id: Some(1),
            use_mock: true,
        };

        let response = service.send_email(&request).unwrap();
        assert!(response.success);
        assert!(response.message.contains("test@example.com"));
    }

    #[test]
    fn test_send_call_rejects_empty_number() {
        let service = OutreachService::new(OutreachConfig::default());
        let request = CallRequest {
            influencer_name: "Test".to_string(),
            phone_number: "  ".to_string(),
            campaign_name: "Campaign".to_string(),
            script: "Hello".to_string(),
            influencer_id: None,
            campaign_id: None,
            use_mock: true,
        };

        let result = service.send_call(&request);
        assert!(matches!(result, Err(OutreachError::InvalidRequest(_))));
    }

    #[test]
    fn test_send_call_mock_succeeds() {
        let service = OutreachService::new(OutreachConfig::default());
        let request = CallRequest {
            influencer_name: "Test Influencer".to_string(),
            phone_number: "+15550100".to_string(),
            campaign_name: "Test Campaign".to_string(),
            script: "Collaboration pitch".to_string(),
            influencer_id: None,
            campaign_id: None,
            use_mock: true,
        };

        let response = service.send_call(&request).unwrap();
        assert!(response.success);
    }
}
