use crate::config::types::{AssetConfig, Config, CrawlerConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_asset_config(&config.assets)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the base URL and explicit page list
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.base_url.trim().is_empty() {
        return Err(ConfigError::Validation("base-url is required".to_string()));
    }

    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    if base.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    for page in &config.pages {
        base.join(page).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid page URL '{}': {}", page, e))
        })?;
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl pool configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "crawler concurrency must be between 1 and 32, got {}",
            config.concurrency
        )));
    }

    if config.navigation_timeout_ms < 1_000 {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout-ms must be >= 1000ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err(ConfigError::Validation(format!(
            "viewport must be non-empty, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates asset pool configuration
fn validate_asset_config(config: &AssetConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "asset concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.quality < 1 || config.quality > 100 {
        return Err(ConfigError::Validation(format!(
            "quality must be between 1 and 100, got {}",
            config.quality
        )));
    }

    if config.download_timeout_ms < 1_000 {
        return Err(ConfigError::Validation(format!(
            "download-timeout-ms must be >= 1000ms, got {}ms",
            config.download_timeout_ms
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    Ok(())
}
