use crate::config::site_config::SiteConfig;
use crate::core::apply_loop::{ApplyLoop, LoopEvent};
use crate::core::bridge::SettingsBridge;
use crate::core::replacer::PriceReplacer;
use crate::domain::ports::{PriceDom, SettingsStore};
use crate::utils::error::{Result, WageClockError};
use crate::utils::monitor::PassMonitor;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Wires a settings store and a page together and keeps the page converted.
pub struct TimeEngine<S: SettingsStore, D: PriceDom> {
    store: Arc<S>,
    dom: Arc<Mutex<D>>,
    config: SiteConfig,
    monitor_enabled: bool,
}

impl<S, D> TimeEngine<S, D>
where
    S: SettingsStore + 'static,
    D: PriceDom + 'static,
{
    pub fn new(store: Arc<S>, dom: Arc<Mutex<D>>, config: SiteConfig) -> Self {
        Self::new_with_monitoring(store, dom, config, false)
    }

    pub fn new_with_monitoring(
        store: Arc<S>,
        dom: Arc<Mutex<D>>,
        config: SiteConfig,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            store,
            dom,
            config,
            monitor_enabled,
        }
    }

    /// Loads settings, converts the page once and spawns the apply loop.
    ///
    /// A failed settings read is logged and leaves the page untouched; the
    /// engine keeps listening for settings changes either way.
    pub async fn start(self) -> EngineHandle {
        tracing::info!("Initializing...");
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let bridge = SettingsBridge::new(Arc::clone(&self.store));

        // subscribe before the first read so no change slips through
        let mut changes = bridge.subscribe();
        let forward_tx = events_tx.clone();
        let forwarder = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        if forward_tx.send(LoopEvent::Storage(change)).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {} settings notifications", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        // observe before the first pass; early records wait in the channel
        {
            let observer_tx = events_tx.clone();
            let mut dom = self.dom.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            dom.observe(Box::new(move |records| {
                // the loop may already be gone during teardown
                let _ = observer_tx.send(LoopEvent::Mutations(records));
            }));
        }

        let replacer = PriceReplacer::new(&self.config);
        let mut apply_loop =
            ApplyLoop::new(Arc::clone(&self.dom), replacer).with_monitoring(self.monitor_enabled);
        if let Some(report) = apply_loop.start(bridge.load().await) {
            tracing::info!(
                "Initial pass: {} containers, {} standalone, {} converted",
                report.containers,
                report.standalone,
                report.converted
            );
        }

        let task = tokio::spawn(apply_loop.run(events_rx, self.config.frame_interval()));

        EngineHandle {
            events: events_tx,
            forwarder,
            task,
        }
    }
}

/// Running engine. Dropping it leaves the loop running until every event
/// sender is gone; `shutdown` stops it deterministically.
pub struct EngineHandle {
    events: mpsc::UnboundedSender<LoopEvent>,
    forwarder: JoinHandle<()>,
    task: JoinHandle<PassMonitor>,
}

impl EngineHandle {
    /// Sender for injecting events, e.g. from a custom observer.
    pub fn events(&self) -> mpsc::UnboundedSender<LoopEvent> {
        self.events.clone()
    }

    /// Stops the loop after the events already queued, including any pass
    /// they scheduled, and returns the pass statistics.
    pub async fn shutdown(self) -> Result<PassMonitor> {
        self.forwarder.abort();
        // a closed channel means the loop has already finished
        let _ = self.events.send(LoopEvent::Shutdown);
        self.task.await.map_err(|e| WageClockError::RuntimeError {
            message: format!("Apply loop task failed: {}", e),
        })
    }
}
