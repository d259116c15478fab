use crate::domain::model::{
    InstanceDescription, NamespaceSummary, RegisterRequest, ResourceTag, ServiceSummary,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// EC2 / Auto Scaling lookups for the resource that triggered the event.
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    /// Fails with `SyncError::NotFound` when the id is unknown.
    async fn get_instance(&self, instance_id: &str) -> Result<InstanceDescription>;

    /// Tags of the named group. When `arn` is given the group must also match it.
    async fn get_group_tags(&self, group_name: &str, arn: Option<&str>)
        -> Result<Vec<ResourceTag>>;
}

#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<NamespaceSummary>>;
    async fn list_services(&self, namespace_id: &str) -> Result<Vec<ServiceSummary>>;
}

#[async_trait]
pub trait Registrar: Send + Sync {
    async fn register_instance(&self, request: RegisterRequest) -> Result<()>;
    async fn deregister_instance(&self, service_id: &str, instance_id: &str) -> Result<()>;
}
