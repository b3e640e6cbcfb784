use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default embedding model for profile search
const DEFAULT_SEARCH_MODEL: &str = "all-MiniLM-L6-v2";
/// Default number of hits returned by the search endpoint
const DEFAULT_RESULT_CAP: usize = 2;
/// Default candidate fetch size before re-ranking
const DEFAULT_CANDIDATE_POOL: usize = 10;
/// Default deadline for the embed-and-query step in seconds
const DEFAULT_EMBED_TIMEOUT_SECS: u64 = 10;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SENDER_EMAIL: &str = "outreach@brandsync.example";
const DEFAULT_VOICE_ENDPOINT: &str = "https://api.bland.ai/v1/calls";

/// Configuration for the semantic search pipeline
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2")
    #[serde(default = "default_search_model")]
    pub model: String,

    /// Maximum hits returned per query
    #[serde(default = "default_result_cap")]
    pub result_cap: usize,

    /// Candidates fetched from the index before re-ranking
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,

    /// Include similarity scores in search responses
    #[serde(default)]
    pub include_scores: bool,

    /// Deadline for the embed-and-query step in seconds
    #[serde(default = "default_embed_timeout_secs")]
    pub embed_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_SEARCH_MODEL.to_string(),
            result_cap: DEFAULT_RESULT_CAP,
            candidate_pool: DEFAULT_CANDIDATE_POOL,
            include_scores: false,
            embed_timeout_secs: DEFAULT_EMBED_TIMEOUT_SECS,
        }
    }
}

/// Configuration for outreach delivery chains
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutreachConfig {
    /// From-address for outreach email
    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    /// Skip real email providers entirely
    #[serde(default = "default_true")]
    pub use_mock_email: bool,

    /// Append the mock provider when real providers fail
    #[serde(default = "default_true")]
    pub fallback_to_mock: bool,

    /// Skip real voice providers entirely
    #[serde(default = "default_true")]
    pub use_mock_voice: bool,

    /// Voice-agent API endpoint
    #[serde(default = "default_voice_endpoint")]
    pub voice_endpoint: String,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            sender_email: DEFAULT_SENDER_EMAIL.to_string(),
            use_mock_email: true,
            fallback_to_mock: true,
            use_mock_voice: true,
            voice_endpoint: DEFAULT_VOICE_ENDPOINT.to_string(),
        }
    }
}

fn default_search_model() -> String {
    DEFAULT_SEARCH_MODEL.to_string()
}

fn default_result_cap() -> usize {
    DEFAULT_RESULT_CAP
}

fn default_candidate_pool() -> usize {
    DEFAULT_CANDIDATE_POOL
}

fn default_embed_timeout_secs() -> u64 {
    DEFAULT_EMBED_TIMEOUT_SECS
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_sender_email() -> String {
    DEFAULT_SENDER_EMAIL.to_string()
}

fn default_voice_endpoint() -> String {
    DEFAULT_VOICE_ENDPOINT.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub outreach: OutreachConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            search: SearchConfig::default(),
            outreach: OutreachConfig::default(),
            base_path: String::new(),
        }
    }
}

impl Config {
    fn validate(&self) {
        if self.search.result_cap == 0 {
            panic!("search.result_cap must be greater than 0");
        }
        if self.search.candidate_pool == 0 {
            panic!("search.candidate_pool must be greater than 0");
        }
        if self.search.embed_timeout_secs == 0 {
            panic!("search.embed_timeout_secs must be greater than 0");
        }
        if !self.outreach.sender_email.contains('@') {
            panic!(
                "outreach.sender_email is not a usable address: {}",
                self.outreach.sender_email
            );
        }
    }

    /// Base data directory: `BRANDSYNC_BASE_PATH` or `~/.local/share/brandsync`.
    pub fn resolve_base_path() -> String {
        std::env::var("BRANDSYNC_BASE_PATH").unwrap_or_else(|_| {
            format!(
                "{}/.local/share/brandsync",
                homedir::my_home()
                    .expect("couldnt find home dir")
                    .expect("couldnt find home dir")
                    .to_string_lossy()
            )
        })
    }

    pub fn load() -> Self {
        Self::load_with(&Self::resolve_base_path())
    }

    pub fn load_with(base_path: &str) -> Self {
        std::fs::create_dir_all(base_path).expect("couldnt create base dir");

        let config_path = Path::new(base_path).join("config.yaml");

        // create new if does not exist
        if !config_path.exists() {
            std::fs::write(
                &config_path,
                serde_yml::to_string(&Self::default()).unwrap(),
            )
            .expect("couldnt write default config");
        }

        let config_str =
            std::fs::read_to_string(&config_path).expect("couldnt read config file");
        let mut config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        config.base_path = base_path.to_string();

        config.validate();

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config).unwrap() {
            config.save();
        }

        config
    }

    pub fn save(&self) {
        let config_path = Path::new(&self.base_path).join("config.yaml");
        let config_str = serde_yml::to_string(&self).unwrap();
        std::fs::write(config_path, config_str).expect("couldnt write config file");
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}
