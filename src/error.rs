use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse workflow JSON: {0}")]
    Workflow(#[from] serde_json::Error),

    #[error("failed to parse layout config: {0}")]
    Config(#[from] json5::Error),

    #[error("invalid layout config: `{field}` must be a finite, non-negative number (got {value})")]
    InvalidConfig { field: &'static str, value: f32 },

    #[error("failed to write layout: {0}")]
    Output(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
