use crate::utils::error::{Result, SyncError};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Tag keys are matched literally, so the prefix must not carry stray whitespace.
pub fn validate_tag_prefix(field_name: &str, prefix: &str) -> Result<()> {
    validate_non_empty_string(field_name, prefix)?;

    if prefix.trim() != prefix {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: prefix.to_string(),
            reason: "Tag prefix cannot start or end with whitespace".to_string(),
        });
    }

    // AWS tag keys are limited to 128 characters
    if prefix.chars().count() >= 128 {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: prefix.to_string(),
            reason: "Tag prefix leaves no room for a namespace within the 128 character key limit"
                .to_string(),
        });
    }

    Ok(())
}

pub fn validate_event_names(field_name: &str, names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "[]".to_string(),
            reason: "At least one event name is required".to_string(),
        });
    }

    for name in names {
        validate_non_empty_string(field_name, name)?;
    }

    Ok(())
}

pub fn validate_disjoint(field_name: &str, left: &[String], right: &[String]) -> Result<()> {
    let left_set: HashSet<&str> = left.iter().map(String::as_str).collect();

    if let Some(shared) = right.iter().find(|name| left_set.contains(name.as_str())) {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: shared.clone(),
            reason: "Event name cannot both register and deregister".to_string(),
        });
    }

    Ok(())
}

pub fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}
