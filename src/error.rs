use thiserror::Error;

// Enum for handling application-level errors that reach `main`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Logger error: {0}")]
    Logger(String),
}

impl From<log::SetLoggerError> for AppError {
    fn from(err: log::SetLoggerError) -> Self {
        AppError::Logger(err.to_string())
    }
}

// Failures of the text generation backend. Shown to the channel, never retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No API key configured for the text generator")]
    NotConfigured,

    #[error("Failed to generate text: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("Failed to generate text: the backend returned no usable text")]
    EmptyResponse,

    #[error("Generation task failed: {0}")]
    TaskJoin(String),
}

impl From<tokio::task::JoinError> for GenerationError {
    fn from(err: tokio::task::JoinError) -> Self {
        GenerationError::TaskJoin(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Failed to send message: {0}")]
    Send(String),

    #[error("Unknown message: {0}")]
    UnknownMessage(u64),
}

// A private notice that could not be delivered, e.g. the member blocks DMs.
#[derive(Debug, Error)]
#[error("Could not deliver private notice to {member}: {reason}")]
pub struct DeliveryError {
    pub member: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Could not read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed settings: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No home directory available")]
    NoHomeDir,
}
