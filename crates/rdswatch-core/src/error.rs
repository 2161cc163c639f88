use thiserror::Error;

#[derive(Debug, Error)]
pub enum RdswatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required environment variable: {0}")]
    MissingSecret(&'static str),
}

pub type Result<T> = std::result::Result<T, RdswatchError>;
