use anyhow::Result;
use asg_cloudmap_sync::utils::validation::Validate;
use asg_cloudmap_sync::{
    AutoScalingEvent, DispatchReport, EventDispatcher, FixtureBackend, SyncConfig, TagSource,
};
use tempfile::TempDir;

const FIXTURE: &str = r#"
[[instances]]
id = "i-0abc"
private_address = "10.20.0.4"

[instances.tags]
Name = "worker"
"plos/jobs/primary" = "scheduler,runner"
"plos/jobs/secondary" = "reporter"
"plos/metrics" = "exporter"

[[groups]]
name = "workers"
arn = "arn:aws:autoscaling:ap-southeast-2:123456789012:autoScalingGroup:ffff:autoScalingGroupName/workers"

[groups.tags]
"plos/jobs" = "runner"

[[namespaces]]
id = "ns-jobs"
name = "jobs"

[[namespaces.services]]
id = "srv-sched"
name = "scheduler"

[[namespaces.services]]
id = "srv-runner"
name = "runner"

[[namespaces.services]]
id = "srv-report"
name = "reporter"
"#;

const LAUNCH_EVENT: &str = r#"{
    "version": "0",
    "id": "7bf73129-1428-4cd3-a780-95db273d1602",
    "detail-type": "EC2 Instance Launch Successful",
    "source": "aws.autoscaling",
    "account": "123456789012",
    "time": "2026-10-18T03:41:12Z",
    "region": "ap-southeast-2",
    "resources": [
        "arn:aws:autoscaling:ap-southeast-2:123456789012:autoScalingGroup:ffff:autoScalingGroupName/workers",
        "arn:aws:ec2:ap-southeast-2:123456789012:instance/i-0abc"
    ],
    "detail": {
        "StatusCode": "InProgress",
        "AutoScalingGroupName": "workers",
        "ActivityId": "87654321-4321-4321-4321-210987654321",
        "EC2InstanceId": "i-0abc",
        "Cause": "At 2026-10-18T03:40:00Z a user request created an AutoScalingGroup"
    }
}"#;

fn write_files(temp_dir: &TempDir, config: &str) -> Result<()> {
    std::fs::write(temp_dir.path().join("fixture.toml"), FIXTURE)?;
    std::fs::write(temp_dir.path().join("event.json"), LAUNCH_EVENT)?;
    std::fs::write(temp_dir.path().join("config.toml"), config)?;
    Ok(())
}

fn service_ids(report: &DispatchReport) -> Vec<String> {
    let mut ids: Vec<String> = report
        .outcomes()
        .iter()
        .map(|o| o.service.id.clone())
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_replay_from_files_with_instance_tags() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_files(&temp_dir, "tag_prefix = \"plos/\"\n")?;

    let config = SyncConfig::from_file(temp_dir.path().join("config.toml"))?;
    config.validate()?;
    let backend = FixtureBackend::from_file(temp_dir.path().join("fixture.toml"))?;
    let event: AutoScalingEvent =
        serde_json::from_str(&std::fs::read_to_string(temp_dir.path().join("event.json"))?)?;

    let dispatcher = EventDispatcher::new(config, backend.clone(), backend.clone(), backend.clone());
    let report = dispatcher.dispatch(&event).await?;

    // "metrics" namespace 不存在，只會解析 jobs 底下的三個 service
    assert_eq!(service_ids(&report), vec!["srv-report", "srv-runner", "srv-sched"]);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(backend.registration_count().await, 3);
    Ok(())
}

#[tokio::test]
async fn test_replay_with_group_tags() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_files(&temp_dir, "tag_source = \"group\"\n")?;

    let config = SyncConfig::from_file(temp_dir.path().join("config.toml"))?;
    assert_eq!(config.tag_source, TagSource::Group);

    let backend = FixtureBackend::from_file(temp_dir.path().join("fixture.toml"))?;
    let event: AutoScalingEvent = serde_json::from_str(LAUNCH_EVENT)?;

    let dispatcher = EventDispatcher::new(config, backend.clone(), backend.clone(), backend.clone());
    let report = dispatcher.dispatch(&event).await?;

    assert_eq!(service_ids(&report), vec!["srv-runner"]);
    Ok(())
}

#[tokio::test]
async fn test_report_serializes_for_lambda_response() -> Result<()> {
    let backend = FixtureBackend::from_toml_str(FIXTURE)?;
    let event: AutoScalingEvent = serde_json::from_str(LAUNCH_EVENT)?;
    let dispatcher = EventDispatcher::new(
        SyncConfig::default(),
        backend.clone(),
        backend.clone(),
        backend,
    );

    let report = dispatcher.dispatch(&event).await?;
    let json = serde_json::to_value(&report)?;

    assert_eq!(json["result"], "applied");
    assert_eq!(json["action"], "register");
    assert_eq!(json["instance_id"], "i-0abc");
    assert_eq!(json["outcomes"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["outcomes"][0]["status"], "succeeded");
    Ok(())
}
