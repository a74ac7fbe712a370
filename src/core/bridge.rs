use crate::domain::model::{
    sanitize_daily_hours, sanitize_wage, Settings, SettingsUpdate, StorageArea,
    StorageChangeEvent, STORAGE_KEY_DAILY_HOURS, STORAGE_KEY_HOURLY,
};
use crate::domain::ports::SettingsStore;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Read side of the settings store as the converter sees it: only the sync
/// area counts.
pub struct SettingsBridge<S: SettingsStore> {
    store: Arc<S>,
}

impl<S: SettingsStore> Clone for SettingsBridge<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SettingsStore> SettingsBridge<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<Settings> {
        let stored = self
            .store
            .get(StorageArea::Sync, &[STORAGE_KEY_HOURLY, STORAGE_KEY_DAILY_HOURS])
            .await?;
        let settings = Settings::from_stored(&stored);
        tracing::info!(
            "Loaded wage: {:?}, daily hours: {}",
            settings.hourly_wage,
            settings.daily_hours
        );
        Ok(settings)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageChangeEvent> {
        self.store.subscribe()
    }
}

/// Turns a store notification into a settings update. Changes outside the
/// sync area, or to unrelated keys, yield `None`.
pub fn interpret(event: &StorageChangeEvent) -> Option<SettingsUpdate> {
    if event.area != StorageArea::Sync {
        return None;
    }

    let mut update = SettingsUpdate::default();
    if let Some(change) = event.changes.get(STORAGE_KEY_HOURLY) {
        let wage = sanitize_wage(change.new_value.as_ref());
        tracing::info!("Wage updated: {:?}", wage);
        update.hourly_wage = Some(wage);
    }
    if let Some(change) = event.changes.get(STORAGE_KEY_DAILY_HOURS) {
        let hours = sanitize_daily_hours(change.new_value.as_ref());
        tracing::info!("Daily hours updated: {}", hours);
        update.daily_hours = Some(hours);
    }

    (!update.is_empty()).then_some(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::settings_store::MemorySettingsStore;
    use crate::domain::model::{ValueChange, DEFAULT_DAILY_HOURS, STORAGE_KEY_SALARY_TYPE};
    use serde_json::json;
    use std::collections::HashMap;

    fn event(area: StorageArea, changes: &[(&str, Option<serde_json::Value>)]) -> StorageChangeEvent {
        StorageChangeEvent {
            area,
            changes: changes
                .iter()
                .map(|(key, new_value)| {
                    (
                        key.to_string(),
                        ValueChange {
                            old_value: None,
                            new_value: new_value.clone(),
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_interpret_wage_change() {
        let update = interpret(&event(StorageArea::Sync, &[(STORAGE_KEY_HOURLY, Some(json!(33)))]));
        assert_eq!(
            update,
            Some(SettingsUpdate {
                hourly_wage: Some(Some(33.0)),
                daily_hours: None,
            })
        );
    }

    #[test]
    fn test_interpret_removed_values_fall_back() {
        let update = interpret(&event(
            StorageArea::Sync,
            &[(STORAGE_KEY_HOURLY, None), (STORAGE_KEY_DAILY_HOURS, None)],
        ))
        .unwrap();
        assert_eq!(update.hourly_wage, Some(None));
        assert_eq!(update.daily_hours, Some(DEFAULT_DAILY_HOURS));
    }

    #[test]
    fn test_interpret_ignores_other_areas_and_keys() {
        assert_eq!(
            interpret(&event(StorageArea::Local, &[(STORAGE_KEY_HOURLY, Some(json!(10)))])),
            None
        );
        assert_eq!(
            interpret(&event(StorageArea::Sync, &[(STORAGE_KEY_SALARY_TYPE, Some(json!("yearly")))])),
            None
        );
    }

    #[tokio::test]
    async fn test_load_reads_sync_area() {
        let mut values = HashMap::new();
        values.insert(STORAGE_KEY_HOURLY.to_string(), json!(18.5));
        let store = Arc::new(MemorySettingsStore::with_sync_values(values));
        let bridge = SettingsBridge::new(store);

        let settings = bridge.load().await.unwrap();
        assert_eq!(settings.hourly_wage, Some(18.5));
        assert_eq!(settings.daily_hours, DEFAULT_DAILY_HOURS);
    }
}
