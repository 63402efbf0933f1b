//! Origin resolution: artifact location to container name

mod artifact;

pub use artifact::ArtifactOriginResolver;
