use crate::auth::Session;
use crate::config::SupabaseConfig;
use crate::errors::RemoteError;
use crate::models::RemoteRow;
use crate::remote::{RecordStore, TABLE};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tracing::debug;

/// Record store backed by a Supabase (PostgREST) table.
pub struct RestRecordStore {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: RwLock<Option<String>>,
}

#[derive(Debug, Serialize)]
struct NewRow<'a> {
    date: &'a str,
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

impl RestRecordStore {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &SupabaseConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: RwLock::new(None),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.base_url)
    }

    fn bearer(&self) -> String {
        self.access_token
            .read()
            .ok()
            .and_then(|token| token.clone())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }
}

impl RecordStore for RestRecordStore {
    async fn fetch_by_user(&self, user_id: &str) -> Result<Vec<RemoteRow>, RemoteError> {
        let user_filter = format!("eq.{user_id}");
        let response = self
            .authed(self.client.get(self.table_url()))
            .query(&[("select", "date"), ("user_id", user_filter.as_str())])
            .send()
            .await?;
        let response = check_status(response).await?;
        let rows: Vec<RemoteRow> = response.json().await?;
        debug!(count = rows.len(), "fetched rows");
        Ok(rows)
    }

    async fn insert(&self, date: &str, user_id: &str) -> Result<(), RemoteError> {
        let response = self
            .authed(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(&NewRow { date, user_id })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn delete_matching(&self, date: &str, user_id: &str) -> Result<(), RemoteError> {
        let date_filter = format!("eq.{date}");
        let user_filter = format!("eq.{user_id}");
        let response = self
            .authed(self.client.delete(self.table_url()))
            .query(&[("date", date_filter.as_str()), ("user_id", user_filter.as_str())])
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    fn authorize(&self, session: Option<&Session>) {
        if let Ok(mut token) = self.access_token.write() {
            *token = session.and_then(|session| session.access_token.clone());
        }
    }
}

/// Turns a non-2xx response into a `RemoteError` carrying the server's message.
pub(crate) async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.message.or(body.error_description).or(body.msg))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("request failed with status {status}")
            } else {
                body.trim().to_string()
            }
        });
    Err(RemoteError::new(message))
}
