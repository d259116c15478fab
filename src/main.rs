use asg_cloudmap_sync::utils::{logger, validation::Validate};
use asg_cloudmap_sync::{
    AutoScalingEvent, CliConfig, EventDispatcher, FixtureBackend, SyncConfig, SyncError, TagSource,
};
use clap::Parser;

fn load_config(cli: &CliConfig) -> Result<SyncConfig, SyncError> {
    let mut config = match &cli.config {
        Some(path) => SyncConfig::from_file(path)?,
        None => SyncConfig::default(),
    };

    if let Some(prefix) = &cli.tag_prefix {
        config = config.with_tag_prefix(prefix.clone());
    }
    if let Some(source) = &cli.tag_source {
        config = config.with_tag_source(source.parse::<TagSource>()?);
    }

    config.validate()?;
    Ok(config)
}

async fn replay(cli: &CliConfig) -> Result<(), SyncError> {
    let config = load_config(cli)?;
    if cli.verbose {
        tracing::debug!("Sync config: {:?}", config);
    }

    let event: AutoScalingEvent = serde_json::from_str(&std::fs::read_to_string(&cli.event)?)?;
    let backend = FixtureBackend::from_file(&cli.fixture)?;

    let dispatcher = EventDispatcher::new(config, backend.clone(), backend.clone(), backend.clone());
    let report = dispatcher.dispatch(&event).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if cli.verbose {
        for call in backend.calls().await {
            tracing::debug!("Fixture call: {:?}", call);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌（輸出至 stderr，stdout 保留給報告）
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Replaying {} against {}", cli.event.display(), cli.fixture.display());

    if let Err(e) = replay(&cli).await {
        tracing::error!("❌ Replay failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
