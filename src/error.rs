use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan path required")]
    EmptyPath,

    #[error("Cannot access scan path {path}: {source}")]
    TargetNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan path must be a directory: {0}")]
    NotADirectory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ScanError {
    pub fn exit_code(&self) -> i32 {
        1
    }
}
