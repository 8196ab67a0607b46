use super::models::{Config, StorageProvider};
use thiserror::Error;

const MAX_PAYLOAD_BYTES: u64 = 5 * 1024 * 1024; // 5 MB
const MAX_PAGE_SIZE: u32 = 5000;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("max_payload_bytes ({actual}) exceeds limit of 5MB ({limit})")]
    PayloadSizeExceedsLimit { actual: u64, limit: u64 },

    #[error("max_concurrent_requests must be positive")]
    InvalidConcurrency,

    #[error("adlib.graph_base_url must be an http(s) URL, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("adlib.page_size must be between 1 and {max}, got {actual}")]
    InvalidPageSize { actual: u32, max: u32 },

    #[error("adlib.max_pages must be positive")]
    InvalidMaxPages,

    #[error("adlib.default_country must be a two-letter upper-case code, got '{0}'")]
    InvalidDefaultCountry(String),

    #[error("media.max_retries must be positive")]
    InvalidRetries,

    #[error("media.max_assets_per_ad must be positive")]
    InvalidMaxAssets,

    #[error("media.output_dir is required for the local storage provider")]
    MissingOutputDir,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_adlib(config)?;
    validate_media(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    let actual = config.server.api.max_payload_bytes.as_u64();
    if actual > MAX_PAYLOAD_BYTES {
        return Err(ValidationError::PayloadSizeExceedsLimit {
            actual,
            limit: MAX_PAYLOAD_BYTES,
        });
    }

    if config.server.max_concurrent_requests == 0 {
        return Err(ValidationError::InvalidConcurrency);
    }

    Ok(())
}

fn validate_adlib(config: &Config) -> Result<(), ValidationError> {
    let adlib = &config.adlib;

    if !adlib.graph_base_url.starts_with("http://") && !adlib.graph_base_url.starts_with("https://")
    {
        return Err(ValidationError::InvalidBaseUrl(adlib.graph_base_url.clone()));
    }

    if !(1..=MAX_PAGE_SIZE).contains(&adlib.page_size) {
        return Err(ValidationError::InvalidPageSize {
            actual: adlib.page_size,
            max: MAX_PAGE_SIZE,
        });
    }

    if adlib.max_pages == 0 {
        return Err(ValidationError::InvalidMaxPages);
    }

    let country = &adlib.default_country;
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidDefaultCountry(country.clone()));
    }

    Ok(())
}

fn validate_media(config: &Config) -> Result<(), ValidationError> {
    if config.media.max_retries == 0 {
        return Err(ValidationError::InvalidRetries);
    }

    if config.media.max_assets_per_ad == 0 {
        return Err(ValidationError::InvalidMaxAssets);
    }

    if config.media.storage == StorageProvider::Local
        && config.media.output_dir.as_os_str().is_empty()
    {
        return Err(ValidationError::MissingOutputDir);
    }

    Ok(())
}
