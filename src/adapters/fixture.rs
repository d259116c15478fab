//! In-memory collaborators backed by a TOML fixture.
//!
//! Used by the replay CLI and the test suites. Every call is recorded, and
//! registrations are kept per `(service_id, instance_id)` so repeating a
//! registration overwrites the previous attributes the way Cloud Map does.

use crate::domain::model::{
    InstanceDescription, NamespaceSummary, RegisterRequest, ResourceTag, ServiceSummary,
};
use crate::domain::ports::{Registrar, ResourceLookup, ServiceDirectory};
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureSet {
    #[serde(default)]
    pub instances: Vec<FixtureInstance>,
    #[serde(default)]
    pub groups: Vec<FixtureGroup>,
    #[serde(default)]
    pub namespaces: Vec<FixtureNamespace>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureInstance {
    pub id: String,
    pub private_address: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureGroup {
    pub name: String,
    pub arn: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureNamespace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub services: Vec<FixtureService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureService {
    pub id: String,
    pub name: String,
}

impl FixtureService {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureCall {
    GetInstance {
        instance_id: String,
    },
    GetGroupTags {
        group_name: String,
    },
    ListNamespaces,
    ListServices {
        namespace_id: String,
    },
    RegisterInstance {
        service_id: String,
        instance_id: String,
        creator_request_id: String,
    },
    DeregisterInstance {
        service_id: String,
        instance_id: String,
    },
}

#[derive(Debug, Default)]
struct FixtureState {
    calls: Vec<FixtureCall>,
    registrations: HashMap<(String, String), HashMap<String, String>>,
    failing_services: HashSet<String>,
    failing_service_listings: HashSet<String>,
    fail_namespace_listing: bool,
}

#[derive(Debug, Clone)]
pub struct FixtureBackend {
    set: Arc<FixtureSet>,
    state: Arc<Mutex<FixtureState>>,
}

impl FixtureBackend {
    pub fn new(set: FixtureSet) -> Self {
        Self {
            set: Arc::new(set),
            state: Arc::new(Mutex::new(FixtureState::default())),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let set: FixtureSet = toml::from_str(content)?;
        Ok(Self::new(set))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub async fn calls(&self) -> Vec<FixtureCall> {
        self.state.lock().await.calls.clone()
    }

    /// Attributes currently registered for the pair, if any.
    pub async fn registration(
        &self,
        service_id: &str,
        instance_id: &str,
    ) -> Option<HashMap<String, String>> {
        let state = self.state.lock().await;
        state
            .registrations
            .get(&(service_id.to_string(), instance_id.to_string()))
            .cloned()
    }

    pub async fn registration_count(&self) -> usize {
        self.state.lock().await.registrations.len()
    }

    /// Register and deregister calls against this service id will fail.
    pub async fn fail_registration(&self, service_id: &str) {
        self.state
            .lock()
            .await
            .failing_services
            .insert(service_id.to_string());
    }

    pub async fn fail_namespace_listing(&self) {
        self.state.lock().await.fail_namespace_listing = true;
    }

    pub async fn fail_service_listing(&self, namespace_id: &str) {
        self.state
            .lock()
            .await
            .failing_service_listings
            .insert(namespace_id.to_string());
    }

    async fn record(&self, call: FixtureCall) {
        self.state.lock().await.calls.push(call);
    }
}

fn to_tags(tags: &BTreeMap<String, String>) -> Vec<ResourceTag> {
    tags.iter().map(|(k, v)| ResourceTag::new(k, v)).collect()
}

#[async_trait]
impl ResourceLookup for FixtureBackend {
    async fn get_instance(&self, instance_id: &str) -> Result<InstanceDescription> {
        self.record(FixtureCall::GetInstance {
            instance_id: instance_id.to_string(),
        })
        .await;

        self.set
            .instances
            .iter()
            .find(|i| i.id == instance_id)
            .map(|i| InstanceDescription {
                id: i.id.clone(),
                private_address: i.private_address.clone(),
                tags: to_tags(&i.tags),
            })
            .ok_or_else(|| SyncError::NotFound {
                resource: format!("instance {}", instance_id),
            })
    }

    async fn get_group_tags(
        &self,
        group_name: &str,
        arn: Option<&str>,
    ) -> Result<Vec<ResourceTag>> {
        self.record(FixtureCall::GetGroupTags {
            group_name: group_name.to_string(),
        })
        .await;

        self.set
            .groups
            .iter()
            .find(|g| g.name == group_name && arn.is_none_or(|arn| g.arn == arn))
            .map(|g| to_tags(&g.tags))
            .ok_or_else(|| SyncError::NotFound {
                resource: format!("auto scaling group {}", group_name),
            })
    }
}

#[async_trait]
impl ServiceDirectory for FixtureBackend {
    async fn list_namespaces(&self) -> Result<Vec<NamespaceSummary>> {
        self.record(FixtureCall::ListNamespaces).await;

        if self.state.lock().await.fail_namespace_listing {
            return Err(SyncError::lookup("ListNamespaces", "fixture listing failure"));
        }

        Ok(self
            .set
            .namespaces
            .iter()
            .map(|n| NamespaceSummary {
                id: n.id.clone(),
                name: n.name.clone(),
            })
            .collect())
    }

    async fn list_services(&self, namespace_id: &str) -> Result<Vec<ServiceSummary>> {
        self.record(FixtureCall::ListServices {
            namespace_id: namespace_id.to_string(),
        })
        .await;

        if self
            .state
            .lock()
            .await
            .failing_service_listings
            .contains(namespace_id)
        {
            return Err(SyncError::lookup(
                "ListServices",
                format!("fixture listing failure for {}", namespace_id),
            ));
        }

        Ok(self
            .set
            .namespaces
            .iter()
            .filter(|n| n.id == namespace_id)
            .flat_map(|n| n.services.iter())
            .map(|s| ServiceSummary {
                id: s.id.clone(),
                name: s.name.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl Registrar for FixtureBackend {
    async fn register_instance(&self, request: RegisterRequest) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.push(FixtureCall::RegisterInstance {
            service_id: request.service_id.clone(),
            instance_id: request.instance_id.clone(),
            creator_request_id: request.creator_request_id.clone(),
        });

        if state.failing_services.contains(&request.service_id) {
            return Err(SyncError::Registration {
                service_id: request.service_id,
                instance_id: request.instance_id,
                message: "fixture registration failure".to_string(),
            });
        }

        state
            .registrations
            .insert((request.service_id, request.instance_id), request.attributes);
        Ok(())
    }

    async fn deregister_instance(&self, service_id: &str, instance_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.push(FixtureCall::DeregisterInstance {
            service_id: service_id.to_string(),
            instance_id: instance_id.to_string(),
        });

        if state.failing_services.contains(service_id) {
            return Err(SyncError::Registration {
                service_id: service_id.to_string(),
                instance_id: instance_id.to_string(),
                message: "fixture deregistration failure".to_string(),
            });
        }

        // 不存在的註冊視為已完成
        state
            .registrations
            .remove(&(service_id.to_string(), instance_id.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
[[instances]]
id = "i-1"
private_address = "10.0.0.5"

[instances.tags]
"plos/web" = "api,edge"
Name = "web-1"

[[groups]]
name = "web"
arn = "arn:aws:autoscaling:ap-southeast-2:123456789012:autoScalingGroup:abcd:autoScalingGroupName/web"

[[namespaces]]
id = "ns-1"
name = "web"

[[namespaces.services]]
id = "svc-1"
name = "api"
"#;

    #[test]
    fn test_fixture_from_toml() {
        let backend = FixtureBackend::from_toml_str(FIXTURE).unwrap();

        let instance = tokio_test::block_on(backend.get_instance("i-1")).unwrap();
        assert_eq!(instance.private_address.as_deref(), Some("10.0.0.5"));
        assert_eq!(instance.tags.len(), 2);

        let services = tokio_test::block_on(backend.list_services("ns-1")).unwrap();
        assert_eq!(services, vec![ServiceSummary { id: "svc-1".into(), name: "api".into() }]);
    }

    #[test]
    fn test_group_arn_must_match() {
        let backend = FixtureBackend::from_toml_str(FIXTURE).unwrap();

        assert!(tokio_test::block_on(backend.get_group_tags("web", None)).is_ok());
        let err = tokio_test::block_on(
            backend.get_group_tags("web", Some("arn:aws:autoscaling:::autoScalingGroup:other")),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deregister_removes_registration() {
        let backend = FixtureBackend::new(FixtureSet::default());
        backend
            .register_instance(RegisterRequest {
                service_id: "svc-1".to_string(),
                instance_id: "i-1".to_string(),
                attributes: HashMap::new(),
                creator_request_id: "req-1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(backend.registration_count().await, 1);

        backend.deregister_instance("svc-1", "i-1").await.unwrap();
        assert_eq!(backend.registration_count().await, 0);
        assert_eq!(backend.calls().await.len(), 2);
    }
}
