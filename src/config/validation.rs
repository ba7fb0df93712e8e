use crate::config::types::{Config, SectionConfig, Settings};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Structural problems that make the whole file unusable are fatal here.
/// Per-section problems are not: they are caught by [`validate_section`]
/// at compile time so one bad section skips only itself.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if !config.has_documents() && !config.has_sections() {
        return Err(ConfigError::Validation(
            "config must define at least one document or section".to_string(),
        ));
    }

    validate_settings(&config.settings)?;

    let any_usable = config
        .documents
        .iter()
        .flat_map(|d| d.sections.iter())
        .chain(config.sections.iter())
        .any(|s| validate_section(s).is_ok());
    if !any_usable {
        return Err(ConfigError::Validation(
            "config has no usable section (every section failed validation)".to_string(),
        ));
    }

    Ok(())
}

fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.timeout_secs < 1 || settings.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            settings.timeout_secs
        )));
    }

    if settings.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be at most 10, got {}",
            settings.max_retries
        )));
    }

    Ok(())
}

/// Validates one section before it is crawled
///
/// A failure here skips this section and is reported in the run summary;
/// the rest of the run continues.
pub fn validate_section(section: &SectionConfig) -> Result<(), ConfigError> {
    if section.section_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "section_name cannot be empty".to_string(),
        ));
    }

    if section.pages.is_empty() {
        return Err(ConfigError::Validation(format!(
            "section '{}' has no entry pages",
            section.section_name
        )));
    }

    for page in &section.pages {
        let url = Url::parse(&page.url)
            .map_err(|_| ConfigError::InvalidUrl(page.url.clone()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(page.url.clone()));
        }
    }

    if let Some(base_url) = &section.base_url {
        let url = Url::parse(base_url).map_err(|_| ConfigError::InvalidUrl(base_url.clone()))?;
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(base_url.clone()));
        }
    }

    Ok(())
}
