use crate::errors::RemoteError;
use crate::models::{RemoteRow, SyncRecord};
use crate::remote::{RecordStore, TABLE};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreData {
    pub next_id: u64,
    pub records: Vec<SyncRecord>,
}

/// Record store kept in a local JSON file. Every mutation is written through.
pub struct FileRecordStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl FileRecordStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let data = load_data(&path).await;
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn records(&self) -> Vec<SyncRecord> {
        self.data.lock().await.records.clone()
    }
}

impl RecordStore for FileRecordStore {
    async fn fetch_by_user(&self, user_id: &str) -> Result<Vec<RemoteRow>, RemoteError> {
        ensure_owner(user_id)?;
        let data = self.data.lock().await;
        Ok(data
            .records
            .iter()
            .filter(|record| record.user_id == user_id)
            .map(|record| RemoteRow {
                date: Some(record.date.clone()),
            })
            .collect())
    }

    async fn insert(&self, date: &str, user_id: &str) -> Result<(), RemoteError> {
        ensure_owner(user_id)?;
        let mut data = self.data.lock().await;
        if data
            .records
            .iter()
            .any(|record| record.date == date && record.user_id == user_id)
        {
            return Err(RemoteError::new(format!(
                "duplicate key value violates unique constraint \"{TABLE}_date_user_id_key\""
            )));
        }

        let mut next = data.clone();
        next.next_id = next.next_id.saturating_add(1);
        let record = SyncRecord {
            id: next.next_id,
            date: date.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        debug!(id = record.id, date, "inserting record");
        next.records.push(record);

        persist_data(&self.path, &next).await?;
        *data = next;
        Ok(())
    }

    async fn delete_matching(&self, date: &str, user_id: &str) -> Result<(), RemoteError> {
        ensure_owner(user_id)?;
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        next.records
            .retain(|record| !(record.date == date && record.user_id == user_id));
        if next.records.len() == data.records.len() {
            return Ok(());
        }

        // Memory only changes once the file does.
        persist_data(&self.path, &next).await?;
        *data = next;
        Ok(())
    }
}

fn ensure_owner(user_id: &str) -> Result<(), RemoteError> {
    if user_id.trim().is_empty() {
        return Err(RemoteError::new(format!(
            "new row violates row-level security policy for table \"{TABLE}\""
        )));
    }
    Ok(())
}

pub async fn load_data(path: &Path) -> StoreData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                StoreData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            StoreData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), RemoteError> {
    let payload = serde_json::to_vec_pretty(data).map_err(|err| RemoteError::new(err.to_string()))?;
    fs::write(path, payload)
        .await
        .map_err(|err| RemoteError::new(format!("failed to write {}: {err}", path.display())))?;
    Ok(())
}
