use thiserror::Error;

use crate::summary::SessionId;

/// Failures from the durable session store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no saved session with id {0}")]
    NotFound(SessionId),
    #[error("corrupt session record: {0}")]
    Corrupt(String),
}

/// Failures from bag type / throwing style management
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("unknown label: {0}")]
    UnknownLabel(String),
    #[error("label '{0}' cannot be removed")]
    ProtectedLabel(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
