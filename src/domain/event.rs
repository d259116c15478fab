use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const LAUNCH_SUCCESSFUL: &str = "EC2 Instance Launch Successful";
pub const TERMINATE_SUCCESSFUL: &str = "EC2 Instance Terminate Successful";
pub const TERMINATE_LIFECYCLE_ACTION: &str = "EC2 Instance-terminate Lifecycle Action";

/// EventBridge envelope for Auto Scaling notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoScalingEvent {
    #[serde(rename = "detail-type")]
    pub detail_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub detail: EventDetail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventDetail {
    #[serde(rename = "EC2InstanceId", default)]
    pub ec2_instance_id: Option<String>,
    #[serde(default)]
    pub auto_scaling_group_name: Option<String>,
    #[serde(default)]
    pub lifecycle_hook_name: Option<String>,
    #[serde(default)]
    pub lifecycle_transition: Option<String>,
}

impl AutoScalingEvent {
    /// 觸發事件的 Auto Scaling group ARN（通常是 resources 的第一個元素）
    pub fn group_arn(&self) -> Option<&str> {
        self.resources
            .iter()
            .map(String::as_str)
            .find(|r| r.starts_with("arn:") && r.contains(":autoScalingGroup:"))
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.detail
            .ec2_instance_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    /// Set on `EC2 Instance-launch/terminate Lifecycle Action` events.
    pub fn lifecycle_hook(&self) -> Option<&str> {
        self.detail
            .lifecycle_hook_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    pub fn group_name(&self) -> Option<&str> {
        self.detail
            .auto_scaling_group_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}
