use thiserror::Error;

/// Everything the registry and configuration layers can hand back to a caller.
///
/// Misusing a snapshot (calling `update` or `get_or_add` on a frozen copy) is
/// not represented here: it is a programming error and panics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A metric is already registered under this name. Unregister it first
    /// if the intent is to replace it.
    #[error("duplicate metric: {0}")]
    DuplicateMetric(String),

    /// The entry under `name` exists but is not of the requested kind.
    #[error("metric {name} is registered but is not a {expected}")]
    KindMismatch { name: String, expected: &'static str },

    #[error("invalid metrics config: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
