use std::io;
use std::result;
use std::sync::PoisonError;

use serenity::prelude::SerenityError;
use thiserror::Error as ThisError;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Clone, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error("The prize \"{0}\" was not found.")]
    NotFound(String),
    #[error("The prize \"{0}\" already exists.")]
    AlreadyExists(String),
    #[error("You have already joined the \"{0}\" draw.")]
    AlreadyJoined(String),
    #[error("You haven't joined the \"{0}\" draw.")]
    NotJoined(String),
    #[error("Invalid prize data: {0}")]
    InvalidShape(String),
    #[error("Can't resolve the participant {0}.")]
    ExternalLookupFailure(String),
    #[error("Can't save the prize data: {0}")]
    PersistenceFailure(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    SerenityError(String),
    #[error("{0}")]
    Lock(String),
}

impl From<SerenityError> for Error {
    fn from(err: SerenityError) -> Error {
        let description = err.to_string();
        Error::SerenityError(description)
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Error {
        Error::Lock(format!("The prize pool lock is poisoned: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::InvalidShape(err.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::PersistenceFailure(err.to_string())
    }
}
