// Adapters layer: concrete collaborators for the domain ports.

#[cfg(feature = "aws")]
pub mod aws;
pub mod fixture;

#[cfg(feature = "aws")]
pub use aws::{AwsResourceLookup, CloudMapClient};
pub use fixture::FixtureBackend;
