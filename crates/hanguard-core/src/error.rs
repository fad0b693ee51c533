use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("Malformed frame: {reason}")]
    MalformedFrame { reason: String },

    #[error("Invalid command word: {0}")]
    InvalidCommandWord(String),

    #[error("Invalid payload for command {command}: {reason}")]
    InvalidPayload { command: u8, reason: String },

    // Identifier errors
    #[error("Invalid door id: {0}")]
    InvalidDoorId(String),

    #[error("Invalid chip id: {0}")]
    InvalidChipId(String),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
