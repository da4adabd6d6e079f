//! Integrity errors raised by the engine.
//!
//! These describe broken content or inconsistent state, never a player
//! mistake. Player-facing refusals travel as unsuccessful [`Response`]s.
//!
//! [`Response`]: crate::command::Response

use thiserror::Error;

use crate::condition::ConditionError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown scene '{0}'")]
    UnknownScene(String),
    #[error("unknown object '{0}'")]
    UnknownObject(String),
    #[error("object '{0}' is not a container")]
    NotAContainer(String),
    #[error("object '{0}' is not a light source")]
    NotALightSource(String),
    #[error("object '{object}' is held by more than one holder")]
    MultiplePlacement { object: String },
    #[error("condition in {context}: {source}")]
    Condition {
        context: String,
        #[source]
        source: ConditionError,
    },
    #[error("snapshot rejected: {0}")]
    Snapshot(String),
    #[error("content error: {0}")]
    Content(String),
}
