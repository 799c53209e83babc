use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrimeFoldError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown tokens: {0}")]
    UnknownTokens(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PrimeFoldError>;
