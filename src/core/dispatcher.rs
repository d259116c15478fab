use crate::config::{SyncConfig, TagSource};
use crate::core::registration::RegistrationEngine;
use crate::core::resolver::ServiceResolver;
use crate::core::tags::parse_service_tags;
use crate::domain::event::AutoScalingEvent;
use crate::domain::model::{Action, DispatchReport, ResourceTag, TargetInstance};
use crate::domain::ports::{Registrar, ResourceLookup, ServiceDirectory};
use crate::utils::error::{Result, SyncError};

pub struct EventDispatcher<L: ResourceLookup, D: ServiceDirectory, R: Registrar> {
    config: SyncConfig,
    lookup: L,
    directory: D,
    registrar: R,
}

impl<L: ResourceLookup, D: ServiceDirectory, R: Registrar> EventDispatcher<L, D, R> {
    pub fn new(config: SyncConfig, lookup: L, directory: D, registrar: R) -> Self {
        Self {
            config,
            lookup,
            directory,
            registrar,
        }
    }

    /// 依事件類型決定註冊、註銷或忽略
    pub fn classify(&self, detail_type: &str) -> Option<Action> {
        if self.config.register_events.iter().any(|e| e == detail_type) {
            Some(Action::Register)
        } else if self.config.deregister_events.iter().any(|e| e == detail_type) {
            Some(Action::Deregister)
        } else {
            None
        }
    }

    /// Handles one event end to end.
    ///
    /// Errors are fatal for the invocation: the instance id is missing or
    /// unknown, the tag source cannot be read, a listing call fails, or a
    /// register target has no private address. Per-service registration
    /// failures are only reported in the returned outcomes.
    pub async fn dispatch(&self, event: &AutoScalingEvent) -> Result<DispatchReport> {
        let Some(action) = self.classify(&event.detail_type) else {
            tracing::info!("Ignoring event '{}'", event.detail_type);
            return Ok(DispatchReport::Ignored {
                detail_type: event.detail_type.clone(),
            });
        };

        let instance_id = event.instance_id().ok_or_else(|| SyncError::InvalidEvent {
            message: format!("'{}' event carries no EC2InstanceId", event.detail_type),
        })?;

        tracing::info!(instance_id = %instance_id, "🚀 Handling {} for '{}'", action, event.detail_type);
        if let Some(hook) = event.lifecycle_hook() {
            tracing::info!(
                instance_id = %instance_id,
                hook = %hook,
                transition = event.detail.lifecycle_transition.as_deref().unwrap_or_default(),
                "Event raised by lifecycle hook"
            );
        }

        let instance = self.lookup.get_instance(instance_id).await?;
        let target = TargetInstance::from(&instance);

        let tags = match self.config.tag_source {
            TagSource::Instance => instance.tags,
            TagSource::Group => self.group_tags(event).await?,
        };

        let declaration = parse_service_tags(&tags, &self.config.tag_prefix);
        if declaration.is_empty() {
            tracing::info!(
                instance_id = %target.id,
                "No '{}' service tags found, nothing to do",
                self.config.tag_prefix
            );
            return Ok(DispatchReport::Applied {
                action,
                instance_id: target.id,
                outcomes: Vec::new(),
            });
        }
        tracing::debug!("Service declaration: {:?}", declaration);

        if action == Action::Register && target.private_address.is_none() {
            return Err(SyncError::MissingAddress {
                instance_id: target.id,
            });
        }

        let services = ServiceResolver::new(&self.directory)
            .resolve_services(&declaration)
            .await?;

        let outcomes = RegistrationEngine::new(&self.registrar)
            .apply(action, &services, &target)
            .await;

        let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
        tracing::info!(
            instance_id = %target.id,
            attempted = outcomes.len(),
            succeeded = outcomes.len() - failed,
            failed,
            "📋 {} finished",
            action
        );

        Ok(DispatchReport::Applied {
            action,
            instance_id: target.id,
            outcomes,
        })
    }

    async fn group_tags(&self, event: &AutoScalingEvent) -> Result<Vec<ResourceTag>> {
        let group_name = event.group_name().ok_or_else(|| SyncError::InvalidEvent {
            message: format!("'{}' event carries no AutoScalingGroupName", event.detail_type),
        })?;

        self.lookup.get_group_tags(group_name, event.group_arn()).await
    }
}
