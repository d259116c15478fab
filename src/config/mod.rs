#[cfg(feature = "cli")]
pub mod cli;
pub mod lambda;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::domain::event::{LAUNCH_SUCCESSFUL, TERMINATE_LIFECYCLE_ACTION, TERMINATE_SUCCESSFUL};
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_TAG_PREFIX: &str = "plos/";

/// Which resource's tags carry the service declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSource {
    #[default]
    Instance,
    #[serde(alias = "asg")]
    Group,
}

impl FromStr for TagSource {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "instance" => Ok(TagSource::Instance),
            "group" | "asg" => Ok(TagSource::Group),
            other => Err(SyncError::InvalidConfigValueError {
                field: "tag_source".to_string(),
                value: other.to_string(),
                reason: "Expected 'instance' or 'group'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub tag_prefix: String,
    pub tag_source: TagSource,
    pub register_events: Vec<String>,
    pub deregister_events: Vec<String>,
    pub region: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
            tag_source: TagSource::Instance,
            register_events: vec![LAUNCH_SUCCESSFUL.to_string()],
            deregister_events: vec![
                TERMINATE_SUCCESSFUL.to_string(),
                TERMINATE_LIFECYCLE_ACTION.to_string(),
            ],
            region: None,
        }
    }
}

impl SyncConfig {
    /// 從 TOML 字串載入配置，未提供的欄位使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SyncConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    pub fn with_tag_source(mut self, source: TagSource) -> Self {
        self.tag_source = source;
        self
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_tag_prefix("tag_prefix", &self.tag_prefix)?;
        validate_event_names("register_events", &self.register_events)?;
        validate_event_names("deregister_events", &self.deregister_events)?;
        validate_disjoint("deregister_events", &self.register_events, &self.deregister_events)?;

        if let Some(region) = &self.region {
            validate_aws_region("region", region)?;
        }

        tracing::debug!("✅ Sync configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.tag_prefix, "plos/");
        assert_eq!(config.tag_source, TagSource::Instance);
        assert!(config.register_events.contains(&LAUNCH_SUCCESSFUL.to_string()));
        assert!(config.deregister_events.contains(&TERMINATE_LIFECYCLE_ACTION.to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SyncConfig::from_toml_str(
            r#"
tag_prefix = "svc:"
tag_source = "group"
"#,
        )
        .unwrap();

        assert_eq!(config.tag_prefix, "svc:");
        assert_eq!(config.tag_source, TagSource::Group);
        assert_eq!(config.register_events, SyncConfig::default().register_events);
    }

    #[test]
    fn test_overlapping_events_fail_validation() {
        let config = SyncConfig::from_toml_str(
            r#"
register_events = ["EC2 Instance Launch Successful"]
deregister_events = ["EC2 Instance Launch Successful"]
"#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_tag_source() {
        assert!(SyncConfig::from_toml_str(r#"tag_source = "vpc""#).is_err());
        assert_eq!(
            SyncConfig::from_toml_str(r#"tag_source = "asg""#).unwrap().tag_source,
            TagSource::Group
        );
        assert!("vpc".parse::<TagSource>().is_err());
        assert_eq!("ASG".parse::<TagSource>().unwrap(), TagSource::Group);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"tag_prefix = \"plos/\"\nregion = \"ap-southeast-2\"\n")
            .unwrap();

        let config = SyncConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.region.as_deref(), Some("ap-southeast-2"));
        assert!(config.validate().is_ok());
    }
}
