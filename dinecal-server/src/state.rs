use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use dinecal_core::{DineCalResult, EventId, EventRecord, EventUpdate};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::ServerConfig;

const STORE_FILE: &str = "events.json";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventStore>,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub async fn open(config: &ServerConfig) -> Result<Self> {
        Self::open_at(&config.data_path(), config.upload_path()).await
    }

    pub async fn open_at(data_dir: &Path, upload_dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&upload_dir)
            .await
            .with_context(|| format!("Failed to create {}", upload_dir.display()))?;

        let store = EventStore::open(data_dir).await?;

        Ok(AppState {
            store: Arc::new(store),
            upload_dir,
        })
    }
}

/// On-disk layout of events.json
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    next_id: i64,
    events: Vec<EventRecord>,
}

/// Event records persisted as a single JSON file, rewritten on every change.
pub struct EventStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl EventStore {
    pub async fn open(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;

        let path = data_dir.join(STORE_FILE);

        let data = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            StoreData {
                next_id: 1,
                events: Vec::new(),
            }
        };

        Ok(EventStore {
            path,
            data: RwLock::new(data),
        })
    }

    /// All records, ordered by id.
    pub async fn list(&self) -> Vec<EventRecord> {
        self.data.read().await.events.clone()
    }

    pub async fn get(&self, id: i64) -> Option<EventRecord> {
        let data = self.data.read().await;
        data.events.iter().find(|e| has_id(e, id)).cloned()
    }

    /// Validate, assign the next id and persist. Any client-supplied id is ignored.
    pub async fn insert(&self, mut record: EventRecord) -> DineCalResult<EventRecord> {
        record.validate()?;

        let mut data = self.data.write().await;
        let id = data.next_id.max(1);
        record.id = Some(EventId::Number(id));
        data.next_id = id + 1;
        data.events.push(record.clone());

        if let Err(e) = self.persist(&data).await {
            data.events.pop();
            data.next_id = id;
            return Err(e);
        }

        Ok(record)
    }

    /// Apply a partial update. `Ok(None)` when no record has this id.
    pub async fn update(&self, id: i64, update: EventUpdate) -> DineCalResult<Option<EventRecord>> {
        let mut data = self.data.write().await;

        let Some(index) = data.events.iter().position(|e| has_id(e, id)) else {
            return Ok(None);
        };

        let mut updated = data.events[index].clone();
        update.apply_to(&mut updated);
        updated.id = Some(EventId::Number(id));
        updated.validate()?;

        let previous = std::mem::replace(&mut data.events[index], updated.clone());

        if let Err(e) = self.persist(&data).await {
            data.events[index] = previous;
            return Err(e);
        }

        Ok(Some(updated))
    }

    /// Returns false when no record has this id.
    pub async fn delete(&self, id: i64) -> DineCalResult<bool> {
        let mut data = self.data.write().await;

        let Some(index) = data.events.iter().position(|e| has_id(e, id)) else {
            return Ok(false);
        };

        let removed = data.events.remove(index);

        if let Err(e) = self.persist(&data).await {
            data.events.insert(index, removed);
            return Err(e);
        }

        Ok(true)
    }

    async fn persist(&self, data: &StoreData) -> DineCalResult<()> {
        let content = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn has_id(record: &EventRecord, id: i64) -> bool {
    record.id == Some(EventId::Number(id))
}
