use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Attribute Cloud Map uses to route traffic to an instance's IPv4 address.
pub const INSTANCE_IPV4_ATTRIBUTE: &str = "AWS_INSTANCE_IPV4";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTag {
    pub key: String,
    pub value: String,
}

impl ResourceTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Namespace name → declared service names, in tag order.
pub type ServiceDeclaration = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedService {
    pub id: String,
    pub name: String,
    pub namespace_name: String,
}

/// Instance as returned by the lookup collaborator, tags included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDescription {
    pub id: String,
    pub private_address: Option<String>,
    #[serde(default)]
    pub tags: Vec<ResourceTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInstance {
    pub id: String,
    pub private_address: Option<String>,
}

impl From<&InstanceDescription> for TargetInstance {
    fn from(instance: &InstanceDescription) -> Self {
        Self {
            id: instance.id.clone(),
            private_address: instance.private_address.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Register,
    Deregister,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Register => write!(f, "register"),
            Action::Deregister => write!(f, "deregister"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub service_id: String,
    pub instance_id: String,
    pub attributes: HashMap<String, String>,
    pub creator_request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    pub service: ResolvedService,
    pub instance_id: String,
    pub action: Action,
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl RegistrationOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Succeeded => None,
            OutcomeStatus::Failed { reason } => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DispatchReport {
    Ignored {
        detail_type: String,
    },
    Applied {
        action: Action,
        instance_id: String,
        outcomes: Vec<RegistrationOutcome>,
    },
}

impl DispatchReport {
    pub fn outcomes(&self) -> &[RegistrationOutcome] {
        match self {
            DispatchReport::Ignored { .. } => &[],
            DispatchReport::Applied { outcomes, .. } => outcomes,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes().iter().filter(|o| !o.succeeded()).count()
    }
}
