pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "aws")]
pub use adapters::{AwsResourceLookup, CloudMapClient};

pub use adapters::FixtureBackend;
pub use config::{SyncConfig, TagSource};
pub use core::dispatcher::EventDispatcher;
pub use domain::event::AutoScalingEvent;
pub use domain::model::DispatchReport;
pub use utils::error::{Result, SyncError};
