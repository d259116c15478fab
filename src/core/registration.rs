use crate::domain::model::{
    Action, OutcomeStatus, RegisterRequest, RegistrationOutcome, ResolvedService, TargetInstance,
    INSTANCE_IPV4_ATTRIBUTE,
};
use crate::domain::ports::Registrar;
use std::collections::HashMap;
use uuid::Uuid;

pub struct RegistrationEngine<'a, R: Registrar + ?Sized> {
    registrar: &'a R,
}

impl<'a, R: Registrar + ?Sized> RegistrationEngine<'a, R> {
    pub fn new(registrar: &'a R) -> Self {
        Self { registrar }
    }

    /// 對每個 service 執行註冊或註銷，單一失敗不影響其他 service
    ///
    /// Never fails as a whole: each call's result is collected into an
    /// outcome, in the same order as `services`.
    pub async fn apply(
        &self,
        action: Action,
        services: &[ResolvedService],
        target: &TargetInstance,
    ) -> Vec<RegistrationOutcome> {
        let mut outcomes = Vec::with_capacity(services.len());

        for service in services {
            let outcome = match action {
                Action::Register => self.register(service, target).await,
                Action::Deregister => self.deregister(service, target).await,
            };

            match &outcome.status {
                OutcomeStatus::Succeeded => tracing::info!(
                    action = %action,
                    instance_id = %target.id,
                    service_id = %service.id,
                    service = %service.name,
                    namespace = %service.namespace_name,
                    "✅ Service {} succeeded",
                    action
                ),
                OutcomeStatus::Failed { reason } => tracing::warn!(
                    action = %action,
                    instance_id = %target.id,
                    service_id = %service.id,
                    service = %service.name,
                    namespace = %service.namespace_name,
                    error = %reason,
                    "❌ Service {} failed",
                    action
                ),
            }

            outcomes.push(outcome);
        }

        outcomes
    }

    async fn register(&self, service: &ResolvedService, target: &TargetInstance) -> RegistrationOutcome {
        let request_id = Uuid::new_v4().to_string();

        let status = match &target.private_address {
            Some(address) => {
                let mut attributes = HashMap::new();
                attributes.insert(INSTANCE_IPV4_ATTRIBUTE.to_string(), address.clone());

                let request = RegisterRequest {
                    service_id: service.id.clone(),
                    instance_id: target.id.clone(),
                    attributes,
                    creator_request_id: request_id.clone(),
                };

                match self.registrar.register_instance(request).await {
                    Ok(()) => OutcomeStatus::Succeeded,
                    Err(e) => OutcomeStatus::Failed {
                        reason: e.to_string(),
                    },
                }
            }
            None => OutcomeStatus::Failed {
                reason: format!("instance {} has no private address", target.id),
            },
        };

        RegistrationOutcome {
            service: service.clone(),
            instance_id: target.id.clone(),
            action: Action::Register,
            request_id: Some(request_id),
            status,
        }
    }

    async fn deregister(&self, service: &ResolvedService, target: &TargetInstance) -> RegistrationOutcome {
        let status = match self.registrar.deregister_instance(&service.id, &target.id).await {
            Ok(()) => OutcomeStatus::Succeeded,
            Err(e) => OutcomeStatus::Failed {
                reason: e.to_string(),
            },
        };

        RegistrationOutcome {
            service: service.clone(),
            instance_id: target.id.clone(),
            action: Action::Deregister,
            request_id: None,
            status,
        }
    }
}
