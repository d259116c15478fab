use crate::domain::model::{ResourceTag, ServiceDeclaration};
use std::collections::{BTreeMap, HashMap};

/// 從資源標籤解析 namespace → service 宣告
///
/// Key `<prefix><namespace>[/rest]` declares the comma-separated services in
/// its value. A key without `/` after the prefix uses the whole remainder as
/// the namespace. Values are split literally: no whitespace is trimmed, and
/// empty segments are skipped. Duplicate keys keep their last value.
pub fn parse_service_tags(tags: &[ResourceTag], prefix: &str) -> ServiceDeclaration {
    let mut by_key: Vec<(&str, &str)> = Vec::with_capacity(tags.len());
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(tags.len());
    for tag in tags {
        match positions.get(tag.key.as_str()) {
            Some(&index) => by_key[index].1 = tag.value.as_str(),
            None => {
                positions.insert(tag.key.as_str(), by_key.len());
                by_key.push((tag.key.as_str(), tag.value.as_str()));
            }
        }
    }

    let mut declaration: ServiceDeclaration = BTreeMap::new();

    for (key, value) in by_key {
        let Some(remainder) = key.strip_prefix(prefix) else {
            continue;
        };

        let namespace = remainder.split('/').next().unwrap_or_default();
        if namespace.is_empty() {
            tracing::warn!("⚠️ Tag '{}' has no namespace after prefix '{}', skipping", key, prefix);
            continue;
        }

        let services = value
            .split(',')
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        declaration
            .entry(namespace.to_string())
            .or_default()
            .extend(services);
    }

    declaration.retain(|_, services| !services.is_empty());
    declaration
}
