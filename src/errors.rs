use axum::http::StatusCode;
use std::fmt;

/// Failure reported by a remote collaborator, carrying its human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// True when the store rejected the request because of access-policy rules.
    pub fn is_policy_rejection(&self) -> bool {
        let lower = self.message.to_lowercase();
        ["rls", "policy", "security"]
            .iter()
            .any(|marker| lower.contains(marker))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    Load,
    Insert,
    Delete,
}

impl SyncOp {
    fn verb(self) -> &'static str {
        match self {
            SyncOp::Load => "load checked dates",
            SyncOp::Insert => "save check",
            SyncOp::Delete => "remove check",
        }
    }

    fn permission(self) -> &'static str {
        match self {
            SyncOp::Load => "READ (SELECT)",
            SyncOp::Insert => "CREATE (INSERT)",
            SyncOp::Delete => "DELETE",
        }
    }
}

impl fmt::Display for SyncOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error(
        "failed to {op}: the request was rejected by row level security. Make sure the \"checked_dates\" table has a policy that lets users {} their own rows",
        .op.permission()
    )]
    AuthorizationDenied { op: SyncOp, message: String },
    #[error("failed to {op}: {message}")]
    TransientRemoteFailure { op: SyncOp, message: String },
}

impl SyncError {
    pub fn from_remote(op: SyncOp, err: RemoteError) -> Self {
        if err.is_policy_rejection() {
            SyncError::AuthorizationDenied {
                op,
                message: err.message,
            }
        } else {
            SyncError::TransientRemoteFailure {
                op,
                message: err.message,
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is set but {1} is missing; both are required for the Supabase backend")]
    IncompleteSupabase(&'static str, &'static str),
    #[error("invalid APP_USERS entry {0:?}, expected email:password")]
    InvalidUser(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        let status = match err {
            SyncError::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,
            SyncError::TransientRemoteFailure { .. } => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
