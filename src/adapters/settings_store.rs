use crate::domain::model::{StorageArea, StorageChangeEvent, ValueChange};
use crate::domain::ports::SettingsStore;
use crate::utils::error::{Result, WageClockError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, RwLock};

type AreaValues = HashMap<String, serde_json::Value>;
type Areas = HashMap<StorageArea, AreaValues>;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Writes `values` into `area` and returns the keys whose value changed.
fn merge_values(areas: &mut Areas, area: StorageArea, values: AreaValues) -> HashMap<String, ValueChange> {
    let current = areas.entry(area).or_default();
    let mut changes = HashMap::new();
    for (key, new_value) in values {
        let old_value = current.insert(key.clone(), new_value.clone());
        if old_value.as_ref() != Some(&new_value) {
            changes.insert(
                key,
                ValueChange {
                    old_value,
                    new_value: Some(new_value),
                },
            );
        }
    }
    changes
}

fn select(areas: &Areas, area: StorageArea, keys: &[&str]) -> AreaValues {
    let Some(values) = areas.get(&area) else {
        return HashMap::new();
    };
    keys.iter()
        .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect()
}

fn publish(
    sender: &broadcast::Sender<StorageChangeEvent>,
    area: StorageArea,
    changes: HashMap<String, ValueChange>,
) {
    if changes.is_empty() {
        return;
    }
    tracing::debug!("Settings changed in {} area: {:?}", area, changes.keys());
    // no subscribers is fine
    let _ = sender.send(StorageChangeEvent { area, changes });
}

/// In-process settings store.
pub struct MemorySettingsStore {
    areas: RwLock<Areas>,
    changes: broadcast::Sender<StorageChangeEvent>,
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            areas: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Store pre-filled with values in the sync area; no change events are sent.
    pub fn with_sync_values(values: AreaValues) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let mut areas = HashMap::new();
        areas.insert(StorageArea::Sync, values);
        Self {
            areas: RwLock::new(areas),
            changes,
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<AreaValues> {
        let areas = self.areas.read().await;
        Ok(select(&areas, area, keys))
    }

    async fn set(&self, area: StorageArea, values: AreaValues) -> Result<()> {
        let changes = {
            let mut areas = self.areas.write().await;
            merge_values(&mut areas, area, values)
        };
        publish(&self.changes, area, changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChangeEvent> {
        self.changes.subscribe()
    }
}

/// Settings persisted as one JSON document keyed by area name.
pub struct JsonFileSettingsStore {
    path: PathBuf,
    areas: RwLock<Areas>,
    changes: broadcast::Sender<StorageChangeEvent>,
}

impl JsonFileSettingsStore {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let areas = Self::read_areas(&path).await?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        tracing::debug!("Opened settings file {}", path.display());
        Ok(Self {
            path,
            areas: RwLock::new(areas),
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Picks up edits made by another process and notifies subscribers of
    /// every key that differs from what was loaded before.
    pub async fn reload(&self) -> Result<()> {
        let fresh = Self::read_areas(&self.path).await?;
        let mut per_area = Vec::new();
        {
            let mut areas = self.areas.write().await;
            for (area, values) in fresh {
                per_area.push((area, merge_values(&mut areas, area, values)));
            }
        }
        for (area, changes) in per_area {
            publish(&self.changes, area, changes);
        }
        Ok(())
    }

    async fn read_areas(path: &Path) -> Result<Areas> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(HashMap::new());
        }
        let contents = tokio::fs::read_to_string(path).await?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&contents).map_err(WageClockError::SerializationError)
    }

    async fn persist(&self, areas: &Areas) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let serialized = serde_json::to_string_pretty(areas)?;
        tokio::fs::write(&self.path, serialized).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<AreaValues> {
        let areas = self.areas.read().await;
        Ok(select(&areas, area, keys))
    }

    async fn set(&self, area: StorageArea, values: AreaValues) -> Result<()> {
        let changes = {
            let mut areas = self.areas.write().await;
            let changes = merge_values(&mut areas, area, values);
            self.persist(&areas).await?;
            changes
        };
        publish(&self.changes, area, changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChangeEvent> {
        self.changes.subscribe()
    }
}
