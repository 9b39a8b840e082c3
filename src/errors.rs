use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarelineError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Embedding service error: {0}")]
    Embedding(String),

    #[error("Chat completion error: {0}")]
    Chat(String),

    #[error("OCR service error: {0}")]
    Ocr(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CarelineError>;
