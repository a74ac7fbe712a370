use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use wage_clock::adapters::{MemoryDom, MemorySettingsStore, NodeId};
use wage_clock::core::apply_loop::LoopEvent;
use wage_clock::domain::model::{
    StorageArea, StorageChangeEvent, ValueChange, STORAGE_KEY_DAILY_HOURS, STORAGE_KEY_HOURLY,
};
use wage_clock::domain::ports::SettingsStore;
use wage_clock::{Result, SiteConfig, TimeEngine, WageClockError};

/// Store whose reads always fail, as when sync storage is unavailable.
struct UnavailableStore {
    changes: broadcast::Sender<StorageChangeEvent>,
}

impl UnavailableStore {
    fn new() -> Self {
        let (changes, _) = broadcast::channel(8);
        Self { changes }
    }
}

#[async_trait]
impl SettingsStore for UnavailableStore {
    async fn get(&self, _area: StorageArea, _keys: &[&str]) -> Result<HashMap<String, Value>> {
        Err(WageClockError::StoreError {
            message: "sync storage unavailable".to_string(),
        })
    }

    async fn set(&self, _area: StorageArea, _values: HashMap<String, Value>) -> Result<()> {
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChangeEvent> {
        self.changes.subscribe()
    }
}

fn page_with_price(symbol: &str, whole: &str) -> (Arc<Mutex<MemoryDom>>, NodeId, SiteConfig) {
    let config = SiteConfig::default();
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let container = dom.append_price_widget(body, &config.selectors, symbol, whole, "00");
    (Arc::new(Mutex::new(dom)), container, config)
}

fn shown(dom: &Mutex<MemoryDom>, container: NodeId) -> String {
    dom.lock().unwrap().visible_text(container, &["a-offscreen"])
}

fn sync_values(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Runs on a paused clock: the sleep only completes once every task is idle,
/// after the frame timers in between have fired.
async fn wait_frames() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_engine_converts_page_on_start() -> anyhow::Result<()> {
    let (dom, container, config) = page_with_price("$", "24");
    let store = Arc::new(MemorySettingsStore::with_sync_values(sync_values(&[(
        STORAGE_KEY_HOURLY,
        json!(12),
    )])));

    let handle = TimeEngine::new(store, Arc::clone(&dom), config).start().await;
    assert_eq!(shown(&dom, container), "2h");

    handle.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_observer_is_live_during_initial_pass() -> anyhow::Result<()> {
    let (dom, _, config) = page_with_price("$", "24");
    let store = Arc::new(MemorySettingsStore::with_sync_values(sync_values(&[(
        STORAGE_KEY_HOURLY,
        json!(12),
    )])));

    let handle = TimeEngine::new(store, Arc::clone(&dom), config).start().await;

    // the initial pass's own writes were observed and queued one more pass,
    // which finds nothing left to write
    let monitor = handle.shutdown().await?;
    assert_eq!(monitor.passes(), 2);
    assert_eq!(monitor.stats().elements_written, 1);
    Ok(())
}

#[tokio::test]
async fn test_scrolled_in_prices_are_converted() -> anyhow::Result<()> {
    let (dom, _, config) = page_with_price("$", "24");
    let selectors = config.selectors.clone();
    let store = Arc::new(MemorySettingsStore::with_sync_values(sync_values(&[(
        STORAGE_KEY_HOURLY,
        json!(12),
    )])));
    let handle = TimeEngine::new(store, Arc::clone(&dom), config).start().await;

    let added = {
        let mut page = dom.lock().unwrap();
        let body = page.body();
        (0..20)
            .map(|_| page.append_price_widget(body, &selectors, "$", "6", "00"))
            .collect::<Vec<_>>()
    };

    // twenty insertions, one coalesced pass
    let monitor = handle.shutdown().await?;
    assert_eq!(monitor.passes(), 2);
    for container in added {
        assert_eq!(shown(&dom, container), "30m");
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_settings_change_relabels_page() -> anyhow::Result<()> {
    let (dom, container, config) = page_with_price("$", "24");
    let store = Arc::new(MemorySettingsStore::with_sync_values(sync_values(&[(
        STORAGE_KEY_HOURLY,
        json!(12),
    )])));
    let handle = TimeEngine::new(Arc::clone(&store), Arc::clone(&dom), config)
        .start()
        .await;

    store
        .set(StorageArea::Sync, sync_values(&[(STORAGE_KEY_HOURLY, json!(24))]))
        .await?;
    wait_frames().await;
    assert_eq!(shown(&dom, container), "1h");

    // the local area never drives conversion
    store
        .set(StorageArea::Local, sync_values(&[(STORAGE_KEY_HOURLY, json!(1))]))
        .await?;
    wait_frames().await;
    assert_eq!(shown(&dom, container), "1h");

    store
        .set(StorageArea::Sync, sync_values(&[(STORAGE_KEY_DAILY_HOURS, json!(0.5))]))
        .await?;
    wait_frames().await;
    // one hour is two half-hour workdays
    assert_eq!(shown(&dom, container), "2d");

    store
        .set(StorageArea::Sync, sync_values(&[(STORAGE_KEY_HOURLY, Value::Null)]))
        .await?;
    wait_frames().await;
    assert_eq!(shown(&dom, container), "$24.00");

    handle.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_failed_load_waits_for_settings() -> anyhow::Result<()> {
    let (dom, container, config) = page_with_price("$", "24");
    let handle = TimeEngine::new(Arc::new(UnavailableStore::new()), Arc::clone(&dom), config)
        .start()
        .await;
    assert_eq!(shown(&dom, container), "$24.00");

    // mutations alone do not start conversion
    let events = handle.events();
    events.send(LoopEvent::Mutations(4))?;

    let mut changes = HashMap::new();
    changes.insert(
        STORAGE_KEY_HOURLY.to_string(),
        ValueChange {
            old_value: None,
            new_value: Some(json!(48)),
        },
    );
    events.send(LoopEvent::Storage(StorageChangeEvent {
        area: StorageArea::Sync,
        changes,
    }))?;

    let monitor = handle.shutdown().await?;
    assert_eq!(monitor.passes(), 1);
    assert_eq!(shown(&dom, container), "30m");
    Ok(())
}
