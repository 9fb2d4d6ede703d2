use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Misuse of the gameplay engine. Missing data inside a protocol graph is
/// not an error; it ends the session through [`GameEvent::GameComplete`].
///
/// [`GameEvent::GameComplete`]: crate::trainer::gameplay::GameEvent::GameComplete
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown protocol: {0}")]
    UnknownProtocol(String),

    #[error("no game has been started")]
    NoActiveSession,

    #[error("state {state_id} is not a question")]
    NotAQuestion { state_id: u32 },

    #[error("the game is already complete")]
    SessionComplete,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read protocol file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
