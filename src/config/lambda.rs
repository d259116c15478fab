use crate::config::{SyncConfig, TagSource};
use crate::utils::error::Result;
use std::env;

impl SyncConfig {
    /// 從環境變量建立配置（Lambda 部署使用）
    ///
    /// `TAG_PREFIX`, `TAG_SOURCE`, `REGISTER_EVENTS` and `DEREGISTER_EVENTS`
    /// override the defaults; event lists are comma-separated. `AWS_REGION`
    /// is picked up when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SyncConfig::default();

        let tag_source = match lookup("TAG_SOURCE") {
            Some(value) => value.parse::<TagSource>()?,
            None => defaults.tag_source,
        };

        Ok(Self {
            tag_prefix: lookup("TAG_PREFIX").unwrap_or(defaults.tag_prefix),
            tag_source,
            register_events: lookup("REGISTER_EVENTS")
                .map(|v| split_event_list(&v))
                .unwrap_or(defaults.register_events),
            deregister_events: lookup("DEREGISTER_EVENTS")
                .map(|v| split_event_list(&v))
                .unwrap_or(defaults.deregister_events),
            region: lookup("AWS_REGION").filter(|r| !r.is_empty()),
        })
    }
}

fn split_event_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
