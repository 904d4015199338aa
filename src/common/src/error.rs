use thiserror::Error;

use crate::model::messages::PlayerId;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Every failure the client recovers from locally. None of these end the session; they are
/// surfaced to the player as a status message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    /// Inbound frame could not be decoded.
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// Explicit `ERROR` message from the server.
    #[error("{0}")]
    Server(String),
    #[error("Player {0} is not seated in this room")]
    PlayerNotFound(PlayerId),
    #[error("Not in a room yet")]
    NotInRoom,
    #[error("Log in before joining a game")]
    NotLoggedIn,
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        ClientError::Protocol(error.to_string())
    }
}
