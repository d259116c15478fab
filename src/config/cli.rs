use clap::Parser;
use std::path::PathBuf;

/// Replays an Auto Scaling event against a fixture of instances and Cloud Map namespaces.
#[derive(Debug, Clone, Parser)]
#[command(name = "asg-cloudmap-sync")]
#[command(about = "Replay Auto Scaling lifecycle events against a Cloud Map fixture")]
pub struct CliConfig {
    /// Event JSON file (EventBridge Auto Scaling event)
    #[arg(long)]
    pub event: PathBuf,

    /// Fixture TOML describing instances, groups and namespaces
    #[arg(long)]
    pub fixture: PathBuf,

    /// Optional sync configuration TOML
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the tag prefix
    #[arg(long)]
    pub tag_prefix: Option<String>,

    /// Override the tag source (instance or group)
    #[arg(long)]
    pub tag_source: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
