use crate::events::TabId;
use thiserror::Error;

/// Errors produced by the tabsh session engine.
#[derive(Debug, Error)]
pub enum TabshError {
    #[error("executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("working directory invalid: {0}")]
    WorkingDirInvalid(String),

    #[error("process is not running")]
    ProcessNotRunning,

    #[error("no session for tab {0}")]
    SessionNotFound(TabId),

    #[error("session for tab {0} is dead")]
    SessionDead(TabId),

    #[error("write timed out")]
    WriteTimeout,

    #[error("channel error: {0}")]
    Channel(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type TabshResult<T> = Result<T, TabshError>;
