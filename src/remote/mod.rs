//! Remote persistence for checked dates.
//!
//! The synchronizer only relies on three operations: fetch a user's rows,
//! insert one `(date, user_id)` row, and delete rows matching `(date, user_id)`.

pub mod file;
pub mod rest;

pub use file::FileRecordStore;
pub use rest::RestRecordStore;

use crate::auth::Session;
use crate::errors::RemoteError;
use crate::models::RemoteRow;
use std::future::Future;

pub const TABLE: &str = "checked_dates";

pub trait RecordStore: Send + Sync + 'static {
    fn fetch_by_user(&self, user_id: &str) -> impl Future<Output = Result<Vec<RemoteRow>, RemoteError>> + Send;

    fn insert(&self, date: &str, user_id: &str) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn delete_matching(&self, date: &str, user_id: &str) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Called whenever the active session changes so stores that forward
    /// credentials can scope requests to it.
    fn authorize(&self, _session: Option<&Session>) {}
}

/// Store picked at startup from configuration.
pub enum Backend {
    File(FileRecordStore),
    Rest(RestRecordStore),
}

impl RecordStore for Backend {
    async fn fetch_by_user(&self, user_id: &str) -> Result<Vec<RemoteRow>, RemoteError> {
        match self {
            Backend::File(store) => store.fetch_by_user(user_id).await,
            Backend::Rest(store) => store.fetch_by_user(user_id).await,
        }
    }

    async fn insert(&self, date: &str, user_id: &str) -> Result<(), RemoteError> {
        match self {
            Backend::File(store) => store.insert(date, user_id).await,
            Backend::Rest(store) => store.insert(date, user_id).await,
        }
    }

    async fn delete_matching(&self, date: &str, user_id: &str) -> Result<(), RemoteError> {
        match self {
            Backend::File(store) => store.delete_matching(date, user_id).await,
            Backend::Rest(store) => store.delete_matching(date, user_id).await,
        }
    }

    fn authorize(&self, session: Option<&Session>) {
        match self {
            Backend::File(store) => store.authorize(session),
            Backend::Rest(store) => store.authorize(session),
        }
    }
}
