use crate::config::SyncConfig;
use crate::domain::model::{
    InstanceDescription, NamespaceSummary, RegisterRequest, ResourceTag, ServiceSummary,
};
use crate::domain::ports::{Registrar, ResourceLookup, ServiceDirectory};
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_autoscaling::Client as AutoScalingClient;
use aws_sdk_ec2::error::ProvideErrorMetadata;
use aws_sdk_ec2::Client as Ec2Client;
use aws_sdk_servicediscovery::error::DisplayErrorContext;
use aws_sdk_servicediscovery::operation::deregister_instance::DeregisterInstanceError;
use aws_sdk_servicediscovery::types::{FilterCondition, ServiceFilter, ServiceFilterName};
use aws_sdk_servicediscovery::Client as ServiceDiscoveryClient;

/// 載入 AWS SDK 配置，若有設定 region 則覆寫預設值
pub async fn load_sdk_config(config: &SyncConfig) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    loader.load().await
}

/// EC2 instance and Auto Scaling group lookups.
#[derive(Debug, Clone)]
pub struct AwsResourceLookup {
    ec2: Ec2Client,
    autoscaling: AutoScalingClient,
}

impl AwsResourceLookup {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            ec2: Ec2Client::new(sdk_config),
            autoscaling: AutoScalingClient::new(sdk_config),
        }
    }
}

#[async_trait]
impl ResourceLookup for AwsResourceLookup {
    async fn get_instance(&self, instance_id: &str) -> Result<InstanceDescription> {
        let output = self
            .ec2
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|e| match e.code() {
                Some("InvalidInstanceID.NotFound") | Some("InvalidInstanceID.Malformed") => {
                    SyncError::NotFound {
                        resource: format!("instance {}", instance_id),
                    }
                }
                _ => SyncError::lookup(
                    "DescribeInstances",
                    aws_sdk_ec2::error::DisplayErrorContext(&e),
                ),
            })?;

        let instance = output
            .reservations()
            .iter()
            .flat_map(|reservation| reservation.instances())
            .find(|instance| instance.instance_id() == Some(instance_id))
            .ok_or_else(|| SyncError::NotFound {
                resource: format!("instance {}", instance_id),
            })?;

        let tags = instance
            .tags()
            .iter()
            .filter_map(|tag| match (tag.key(), tag.value()) {
                (Some(key), value) => Some(ResourceTag::new(key, value.unwrap_or_default())),
                _ => None,
            })
            .collect();

        Ok(InstanceDescription {
            id: instance_id.to_string(),
            private_address: instance.private_ip_address().map(str::to_string),
            tags,
        })
    }

    async fn get_group_tags(
        &self,
        group_name: &str,
        arn: Option<&str>,
    ) -> Result<Vec<ResourceTag>> {
        let output = self
            .autoscaling
            .describe_auto_scaling_groups()
            .auto_scaling_group_names(group_name)
            .send()
            .await
            .map_err(|e| {
                SyncError::lookup(
                    "DescribeAutoScalingGroups",
                    aws_sdk_autoscaling::error::DisplayErrorContext(&e),
                )
            })?;

        // 同名 group 可能在刪除重建後出現，以事件中的 ARN 為準
        let group = output
            .auto_scaling_groups()
            .iter()
            .find(|group| arn.is_none_or(|arn| group.auto_scaling_group_arn() == Some(arn)))
            .ok_or_else(|| SyncError::NotFound {
                resource: format!("auto scaling group {}", group_name),
            })?;

        Ok(group
            .tags()
            .iter()
            .filter_map(|tag| match (tag.key(), tag.value()) {
                (Some(key), value) => Some(ResourceTag::new(key, value.unwrap_or_default())),
                _ => None,
            })
            .collect())
    }
}

/// Cloud Map namespace/service listing and instance registration.
#[derive(Debug, Clone)]
pub struct CloudMapClient {
    client: ServiceDiscoveryClient,
}

impl CloudMapClient {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: ServiceDiscoveryClient::new(sdk_config),
        }
    }
}

#[async_trait]
impl ServiceDirectory for CloudMapClient {
    async fn list_namespaces(&self) -> Result<Vec<NamespaceSummary>> {
        let mut namespaces = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_namespaces()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| SyncError::lookup("ListNamespaces", DisplayErrorContext(&e)))?;

            namespaces.extend(output.namespaces().iter().filter_map(|namespace| {
                Some(NamespaceSummary {
                    id: namespace.id()?.to_string(),
                    name: namespace.name()?.to_string(),
                })
            }));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(namespaces)
    }

    async fn list_services(&self, namespace_id: &str) -> Result<Vec<ServiceSummary>> {
        let filter = ServiceFilter::builder()
            .name(ServiceFilterName::NamespaceId)
            .values(namespace_id)
            .condition(FilterCondition::Eq)
            .build()
            .map_err(|e| SyncError::lookup("ListServices", e))?;

        let mut services = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_services()
                .filters(filter.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| SyncError::lookup("ListServices", DisplayErrorContext(&e)))?;

            services.extend(output.services().iter().filter_map(|service| {
                Some(ServiceSummary {
                    id: service.id()?.to_string(),
                    name: service.name()?.to_string(),
                })
            }));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(services)
    }
}

#[async_trait]
impl Registrar for CloudMapClient {
    async fn register_instance(&self, request: RegisterRequest) -> Result<()> {
        let output = self
            .client
            .register_instance()
            .service_id(&request.service_id)
            .instance_id(&request.instance_id)
            .creator_request_id(&request.creator_request_id)
            .set_attributes(Some(request.attributes))
            .send()
            .await
            .map_err(|e| SyncError::Registration {
                service_id: request.service_id.clone(),
                instance_id: request.instance_id.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::debug!(
            "RegisterInstance accepted, operation {:?}",
            output.operation_id()
        );
        Ok(())
    }

    async fn deregister_instance(&self, service_id: &str, instance_id: &str) -> Result<()> {
        let result = self
            .client
            .deregister_instance()
            .service_id(service_id)
            .instance_id(instance_id)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            // 終止成功與生命週期事件都會觸發註銷，第二次呼叫時實例已不存在
            Err(e) if e.as_service_error().is_some_and(is_already_deregistered) => {
                tracing::debug!(
                    instance_id = %instance_id,
                    service_id = %service_id,
                    "Instance already deregistered"
                );
                Ok(())
            }
            Err(e) => Err(SyncError::Registration {
                service_id: service_id.to_string(),
                instance_id: instance_id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            }),
        }
    }
}

fn is_already_deregistered(err: &DeregisterInstanceError) -> bool {
    matches!(err, DeregisterInstanceError::InstanceNotFound(_))
}
