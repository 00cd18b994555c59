use thiserror::Error;

/// Failures at the engine's edges: loading config, content and snapshots.
/// Game-state operations themselves never fail; they clamp or no-op.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported file format '{0}' (expected json, yaml or yml)")]
    UnsupportedFormat(String),
    #[error("unknown builtin content '{0}'")]
    UnknownContent(String),
}
