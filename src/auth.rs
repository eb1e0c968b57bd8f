use crate::config::SupabaseConfig;
use crate::errors::RemoteError;
use crate::remote::rest::check_status;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
}

impl SessionEvent {
    /// Classifies a session transition. Switching users directly is reported
    /// as a sign-in; callers clear state for the previous user first.
    pub fn between(prev: Option<&Session>, next: Option<&Session>) -> Option<SessionEvent> {
        match (prev, next) {
            (None, None) => None,
            (Some(_), None) => Some(SessionEvent::SignedOut),
            (None, Some(next)) => Some(SessionEvent::SignedIn(next.clone())),
            (Some(prev), Some(next)) if prev.user_id == next.user_id => {
                if prev == next {
                    None
                } else {
                    Some(SessionEvent::TokenRefreshed(next.clone()))
                }
            }
            (Some(_), Some(next)) => Some(SessionEvent::SignedIn(next.clone())),
        }
    }
}

/// Holds the active session and notifies subscribers when it changes.
pub struct SessionHub {
    tx: watch::Sender<Option<Session>>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn sign_in(&self, session: Session) {
        info!(user_id = %session.user_id, "session started");
        self.tx.send_replace(Some(session));
    }

    pub fn refresh(&self, session: Session) {
        self.tx.send_replace(Some(session));
    }

    pub fn sign_out(&self) {
        if self.tx.send_replace(None).is_some() {
            info!("session ended");
        }
    }
}

/// Verifies credentials and produces a session.
pub enum Authenticator {
    /// Accounts from configuration; the user id is the lower-cased email.
    Local { users: BTreeMap<String, String> },
    Supabase { client: Client, config: SupabaseConfig },
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    email: Option<String>,
}

impl Authenticator {
    pub fn local(users: BTreeMap<String, String>) -> Self {
        Authenticator::Local { users }
    }

    pub fn supabase(config: SupabaseConfig) -> Self {
        Authenticator::Supabase {
            client: Client::new(),
            config,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(RemoteError::new("email and password are required"));
        }

        match self {
            Authenticator::Local { users } => {
                let normalized = email.to_lowercase();
                match users.get(&normalized) {
                    Some(expected) if expected == password => Ok(Session {
                        user_id: normalized.clone(),
                        email: Some(normalized),
                        access_token: None,
                    }),
                    _ => Err(RemoteError::new("Invalid login credentials")),
                }
            }
            Authenticator::Supabase { client, config } => {
                let response = client
                    .post(format!("{}/auth/v1/token", config.url))
                    .query(&[("grant_type", "password")])
                    .header("apikey", &config.anon_key)
                    .json(&PasswordGrant { email, password })
                    .send()
                    .await?;
                let token: TokenResponse = check_status(response).await?.json().await?;
                Ok(Session {
                    user_id: token.user.id,
                    email: token.user.email,
                    access_token: Some(token.access_token),
                })
            }
        }
    }

    /// Revokes the provider-side session. Local sessions have nothing to revoke.
    pub async fn sign_out(&self, session: &Session) {
        let Authenticator::Supabase { client, config } = self else {
            return;
        };
        let Some(token) = session.access_token.as_deref() else {
            return;
        };

        let result = client
            .post(format!("{}/auth/v1/logout", config.url))
            .header("apikey", &config.anon_key)
            .bearer_auth(token)
            .send()
            .await;
        match result {
            Ok(response) => {
                if let Err(err) = check_status(response).await {
                    warn!("provider sign-out failed: {err}");
                }
            }
            Err(err) => warn!("provider sign-out failed: {err}"),
        }
    }
}
