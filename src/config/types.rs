use serde::{Deserialize, Serialize};

/// Main configuration structure for Audit-Scout
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub curation: CurationConfig,
}

/// Discovery pipeline tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Populations at or below this size are not sampled; also the sample bound
    #[serde(rename = "max-candidates")]
    pub max_candidates: usize,

    /// Number of shortest URLs always kept when sampling
    #[serde(rename = "shortest-kept")]
    pub shortest_kept: usize,

    /// Number of URLs requested from the first curation call
    #[serde(rename = "narrow-size")]
    pub narrow_size: usize,

    /// Number of URLs requested from the second curation call; bounds the result
    #[serde(rename = "final-size")]
    pub final_size: usize,

    /// Delay between consecutive head fetches (milliseconds)
    #[serde(rename = "head-delay-ms")]
    pub head_delay_ms: u64,

    /// Maximum sitemap index nesting below the root sitemap
    #[serde(rename = "max-sitemap-depth")]
    pub max_sitemap_depth: u32,

    /// Deadline for a whole discovery run (seconds)
    #[serde(rename = "run-timeout-secs", skip_serializing_if = "Option::is_none")]
    pub run_timeout_secs: Option<u64>,

    /// Fixed sampling seed; a fresh entropy seed is used per run when absent
    #[serde(rename = "sample-seed", skip_serializing_if = "Option::is_none")]
    pub sample_seed: Option<u64>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_candidates: 200,
            shortest_kept: 20,
            narrow_size: 15,
            final_size: 10,
            head_delay_ms: 100,
            max_sitemap_depth: 3,
            run_timeout_secs: None,
            sample_seed: None,
        }
    }
}

/// User agent identification and HTTP client limits
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,

    /// Total timeout for a single request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connect timeout for a single request (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "AuditScout".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Text-generation service used for curation
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CurationConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Model name sent with every request
    pub model: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Output token limit for the narrow-down call
    #[serde(rename = "narrow-max-tokens")]
    pub narrow_max_tokens: u32,

    /// Output token limit for the select-and-categorize call
    #[serde(rename = "select-max-tokens")]
    pub select_max_tokens: u32,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            narrow_max_tokens: 2048,
            select_max_tokens: 4096,
            temperature: None,
        }
    }
}
