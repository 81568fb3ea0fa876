use crate::config::types::{Config, CurationConfig, DiscoveryConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_discovery_config(&config.discovery)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_curation_config(&config.curation)?;
    Ok(())
}

/// Validates discovery pipeline settings
fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.max_candidates < 1 {
        return Err(ConfigError::Validation(
            "max_candidates must be >= 1".to_string(),
        ));
    }

    if config.shortest_kept > config.max_candidates {
        return Err(ConfigError::Validation(format!(
            "shortest_kept ({}) cannot exceed max_candidates ({})",
            config.shortest_kept, config.max_candidates
        )));
    }

    if config.final_size < 1 {
        return Err(ConfigError::Validation(format!(
            "final_size must be >= 1, got {}",
            config.final_size
        )));
    }

    if config.final_size > config.narrow_size {
        return Err(ConfigError::Validation(format!(
            "final_size ({}) cannot exceed narrow_size ({})",
            config.final_size, config.narrow_size
        )));
    }

    if config.max_sitemap_depth < 1 || config.max_sitemap_depth > 10 {
        return Err(ConfigError::Validation(format!(
            "max_sitemap_depth must be between 1 and 10, got {}",
            config.max_sitemap_depth
        )));
    }

    if config.run_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "run_timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    if config.request_timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request and connect timeouts must be >= 1s, got {}s and {}s",
            config.request_timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates curation service settings
fn validate_curation_config(config: &CurationConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid curation base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "curation base_url must be http or https, got '{}'",
            config.base_url
        )));
    }

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "curation model cannot be empty".to_string(),
        ));
    }

    if config.api_key_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "api_key_env cannot be empty".to_string(),
        ));
    }

    if config.narrow_max_tokens == 0 || config.select_max_tokens == 0 {
        return Err(ConfigError::Validation(
            "curation token limits must be >= 1".to_string(),
        ));
    }

    if let Some(temperature) = config.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Validation(format!(
                "temperature must be between 0 and 2, got {}",
                temperature
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
