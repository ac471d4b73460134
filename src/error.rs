use thiserror::Error;

/// Main error type for symdoc operations
#[derive(Error, Debug)]
pub enum SymdocError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tokenizer error: {0}")]
    Tokenize(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("No source files found in {0}")]
    NoSources(String),
}

pub type Result<T> = std::result::Result<T, SymdocError>;
