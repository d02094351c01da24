//! Centralized validation functions.
//!
//! This module provides:
//! - [`validate_lists`] - size invariants between the standard and light lists
//! - [`validate_source_url`] - source URL scheme check
//! - [`validate_address_list_name`] - RouterOS address-list name check

use tracing::{error, info};

use crate::config::Source;
use crate::error::{BlacklistError, ValidationError};

/// Check both list sizes before any artifact is written.
///
/// Every check runs so that all violations are reported together.
///
/// # Examples
/// ```
/// use routeros_blacklist::validation::validate_lists;
/// assert!(validate_lists(2000, 800, 1000, 500).is_ok());
/// assert_eq!(validate_lists(500, 100, 1000, 500).unwrap_err().messages.len(), 2);
/// ```
pub fn validate_lists(
    standard_count: usize,
    light_count: usize,
    min_standard: usize,
    min_light: usize,
) -> Result<(), ValidationError> {
    let mut messages = Vec::new();

    if standard_count < min_standard {
        messages.push(format!(
            "Standard list too small: {} < {} (minimum)",
            standard_count, min_standard
        ));
    }

    if light_count < min_light {
        messages.push(format!(
            "Light list too small: {} < {} (minimum)",
            light_count, min_light
        ));
    }

    if light_count > standard_count {
        messages.push(format!(
            "Light list larger than standard: {} > {}",
            light_count, standard_count
        ));
    }

    if !messages.is_empty() {
        for message in &messages {
            error!("{}", message);
        }
        return Err(ValidationError { messages });
    }

    info!("All validation checks passed");
    info!("  Standard list: {} entries", standard_count);
    info!("  Light list: {} entries", light_count);
    info!("  Difference: {} entries", standard_count - light_count);

    Ok(())
}

/// Sources are fetched with plain GET requests over HTTP(S) only.
pub fn validate_source_url(source: &Source) -> Result<(), BlacklistError> {
    let url = source.url.as_str();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match rest {
        Some(host) if !host.is_empty() && !url.chars().any(char::is_whitespace) => Ok(()),
        _ => Err(BlacklistError::InvalidUrl {
            name: source.name.clone(),
            url: source.url.clone(),
        }),
    }
}

/// The name is spliced unquoted into the generated script, so it must be a
/// single RouterOS word.
///
/// # Examples
/// ```
/// use routeros_blacklist::validation::validate_address_list_name;
/// assert!(validate_address_list_name("pwlgrzs-blacklist").is_ok());
/// assert!(validate_address_list_name("bad name").is_err());
/// ```
pub fn validate_address_list_name(name: &str) -> Result<(), BlacklistError> {
    if name.is_empty() {
        return Err(BlacklistError::Config(
            "Address list name cannot be empty".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c))
    {
        return Err(BlacklistError::Config(format!(
            "Invalid address list name '{}': only letters, digits, '-', '_' and '.' allowed",
            name
        )));
    }

    Ok(())
}
