#[cfg(feature = "lambda")]
use asg_cloudmap_sync::adapters::aws::load_sdk_config;
#[cfg(feature = "lambda")]
use asg_cloudmap_sync::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use asg_cloudmap_sync::{
    AutoScalingEvent, AwsResourceLookup, CloudMapClient, DispatchReport, EventDispatcher,
    SyncConfig,
};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use tracing::Instrument;

#[cfg(feature = "lambda")]
type Dispatcher = EventDispatcher<AwsResourceLookup, CloudMapClient, CloudMapClient>;

#[cfg(feature = "lambda")]
async fn function_handler(
    dispatcher: &Dispatcher,
    event: LambdaEvent<AutoScalingEvent>,
) -> Result<DispatchReport, Error> {
    let span = tracing::info_span!("invocation", request_id = %event.context.request_id);

    match dispatcher.dispatch(&event.payload).instrument(span).await {
        Ok(report) => {
            if report.failed_count() > 0 {
                tracing::warn!(
                    "⚠️ {} of {} service operations failed",
                    report.failed_count(),
                    report.outcomes().len()
                );
            }
            Ok(report)
        }
        Err(e) => {
            // 回報失敗讓 EventBridge 依自身策略重試或告警
            tracing::error!("❌ Invocation failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
        }
    }
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = SyncConfig::from_env()?;
    config.validate()?;
    tracing::info!(
        "Starting asg-cloudmap-sync (prefix '{}', tag source {:?})",
        config.tag_prefix,
        config.tag_source
    );

    let sdk_config = load_sdk_config(&config).await;
    let cloud_map = CloudMapClient::new(&sdk_config);
    let dispatcher = EventDispatcher::new(
        config,
        AwsResourceLookup::new(&sdk_config),
        cloud_map.clone(),
        cloud_map,
    );
    let dispatcher = &dispatcher;

    run(service_fn(move |event: LambdaEvent<AutoScalingEvent>| async move {
        function_handler(dispatcher, event).await
    }))
    .await
}
