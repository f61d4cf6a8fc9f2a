use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevcallError {
    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Exec error: {0}")]
    Exec(String),
}
