use thiserror::Error;

#[derive(Error, Debug)]
pub enum MenubotError {
    #[error("Menu structure error: {0}")]
    Structural(String),

    #[error("Invalid button: {0}")]
    InvalidButton(String),

    #[error("Invalid callback pattern: {0}")]
    Pattern(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Send error: {0}")]
    Send(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by handler business logic. "Handler not found" is never an
/// error; registries report it as `None`.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("State error: {0}")]
    State(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Empty content")]
    EmptyContent,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MenubotError>;
