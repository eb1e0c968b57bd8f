use crate::auth::{Authenticator, Session, SessionHub};
use crate::errors::AppError;
use crate::remote::Backend;
use crate::sync::{run_session_watcher, Synchronizer};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct AppState {
    pub sync: Arc<Synchronizer<Backend>>,
    pub sessions: Arc<SessionHub>,
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(store: Backend, auth: Authenticator) -> Self {
        Self {
            sync: Arc::new(Synchronizer::new(store)),
            sessions: Arc::new(SessionHub::new()),
            auth: Arc::new(auth),
        }
    }

    /// Keeps the synchronizer in step with sign-in and sign-out.
    pub fn spawn_session_watcher(&self) -> JoinHandle<()> {
        tokio::spawn(run_session_watcher(
            Arc::clone(&self.sync),
            self.sessions.subscribe(),
        ))
    }

    pub fn require_session(&self) -> Result<Session, AppError> {
        self.sessions
            .current()
            .ok_or_else(|| AppError::unauthorized("sign in first"))
    }
}
