use towerscape_common::ConfigError;

/// Errors that stop the adapter from starting.
///
/// Everything after initialization degrades to a no-op instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("container element {0:?} not found")]
    ContainerMissing(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
