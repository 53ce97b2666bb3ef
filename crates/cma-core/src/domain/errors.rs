//! Errors - エラー型と分類
//!
//! すべての公開操作は `AdapterError` を返します。
//! 呼び出し境界（CLI）は `ErrorKind` を見て報告の書式を選びます。

use thiserror::Error;

use crate::ports::{HistoryError, StoreError};

/// ErrorKind は失敗の分類
///
/// - Resolution: テンプレートやタスク名が解決できない（LookupError 相当）
/// - Collaborator: object store / execution history の障害
/// - Other: メッセージの形が壊れているなど、それ以外
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Resolution,
    Collaborator,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Resolution => "ResolutionError",
            ErrorKind::Collaborator => "CollaboratorError",
            ErrorKind::Other => "MessageError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Could not resolve path {0}")]
    UnresolvedPath(String),

    #[error("invalid path expression '{expr}': {reason}")]
    InvalidPath { expr: String, reason: String },

    #[error("cumulus_meta requires a message_source")]
    MissingSource,

    #[error("Unknown event source: {0}")]
    UnknownSource(String),

    #[error("No task found for {0}")]
    TaskNotFound(String),

    #[error("context requires invokedFunctionArn or activityArn for step function messages")]
    MissingContext,

    #[error("execution history did not identify a task for {0}")]
    TaskUnidentified(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

impl AdapterError {
    pub fn invalid_path(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        AdapterError::InvalidPath {
            expr: expr.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::UnresolvedPath(_)
            | AdapterError::InvalidPath { .. }
            | AdapterError::MissingSource
            | AdapterError::UnknownSource(_)
            | AdapterError::TaskNotFound(_)
            | AdapterError::MissingContext
            | AdapterError::TaskUnidentified(_) => ErrorKind::Resolution,
            AdapterError::Store(_) | AdapterError::History(_) => ErrorKind::Collaborator,
            AdapterError::InvalidMessage(_) | AdapterError::Json(_) => ErrorKind::Other,
        }
    }
}
