use crate::core::bridge::interpret;
use crate::core::replacer::PriceReplacer;
use crate::core::scheduler::{FrameScheduler, ScheduleState};
use crate::domain::model::{PassReport, Settings, SettingsUpdate, StorageChangeEvent};
use crate::domain::ports::PriceDom;
use crate::utils::error::Result;
use crate::utils::monitor::PassMonitor;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Inputs of the apply loop.
#[derive(Debug, Clone)]
pub enum LoopEvent {
    /// A batch of structural DOM mutations with this many records.
    Mutations(usize),
    Storage(StorageChangeEvent),
    Shutdown,
}

/// Owns the live settings and decides when the page gets a replacement pass.
///
/// Triggers only ever schedule; passes run on frame boundaries, one per
/// frame at most, each with the settings in effect when it starts.
pub struct ApplyLoop<D: PriceDom> {
    dom: Arc<Mutex<D>>,
    replacer: PriceReplacer,
    settings: Settings,
    scheduler: FrameScheduler,
    observing: bool,
    monitor: PassMonitor,
}

impl<D: PriceDom> ApplyLoop<D> {
    pub fn new(dom: Arc<Mutex<D>>, replacer: PriceReplacer) -> Self {
        Self {
            dom,
            replacer,
            settings: Settings::default(),
            scheduler: FrameScheduler::new(),
            observing: false,
            monitor: PassMonitor::new(false),
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = PassMonitor::new(enabled);
        self
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn state(&self) -> ScheduleState {
        self.scheduler.state()
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn monitor(&self) -> &PassMonitor {
        &self.monitor
    }

    /// Takes the result of the initial settings read. On success the page
    /// is converted right away and mutations start being watched; on
    /// failure conversion stays off until a settings change arrives.
    pub fn start(&mut self, loaded: Result<Settings>) -> Option<PassReport> {
        match loaded {
            Ok(settings) => {
                self.settings = settings;
                let report = self.run_pass();
                self.observing = true;
                tracing::info!("Observer started");
                Some(report)
            }
            Err(e) => {
                tracing::error!("Init error: {}", e);
                None
            }
        }
    }

    /// The only way settings change once the loop is running.
    pub fn set_settings(&mut self, update: SettingsUpdate) {
        self.settings.apply(update);
    }

    /// Feeds one event through the frame gate. Returns `true` when the
    /// event scheduled a new pass rather than joining a pending one.
    pub fn handle(&mut self, event: &LoopEvent) -> bool {
        match event {
            LoopEvent::Mutations(records) => {
                if !self.observing {
                    return false;
                }
                tracing::trace!("Observed {} mutation records", records);
                self.scheduler.request()
            }
            LoopEvent::Storage(change) => match interpret(change) {
                Some(update) => {
                    self.set_settings(update);
                    if !self.observing {
                        tracing::info!("Settings received, observer started");
                        self.observing = true;
                    }
                    self.scheduler.request()
                }
                None => false,
            },
            LoopEvent::Shutdown => false,
        }
    }

    /// Frame boundary: runs the pending pass, if any.
    pub fn on_frame(&mut self) -> Option<PassReport> {
        self.scheduler.take_frame().then(|| self.run_pass())
    }

    pub fn run_pass(&mut self) -> PassReport {
        let settings = self.settings;
        let started = Instant::now();
        let report = {
            let mut dom = self.dom.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            self.replacer.apply(&mut *dom, &settings)
        };
        self.monitor.record(&report, started.elapsed());
        report
    }

    /// Drives the loop until `Shutdown` arrives or every sender is gone.
    /// A pass that is already scheduled at that point still runs.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<LoopEvent>,
        frame_interval: Duration,
    ) -> PassMonitor {
        let mut frames = tokio::time::interval(frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(LoopEvent::Shutdown) | None => break,
                    Some(event) => {
                        if self.handle(&event) {
                            // next frame, not a tick left over from earlier
                            frames.reset();
                        }
                    }
                },
                _ = frames.tick(), if self.scheduler.is_scheduled() => {
                    self.on_frame();
                }
            }
        }

        self.on_frame();
        tracing::debug!(
            "Apply loop stopped after {} requests and {} frames",
            self.scheduler.requests(),
            self.scheduler.frames()
        );
        self.monitor.log_final_stats();
        self.monitor
    }
}
