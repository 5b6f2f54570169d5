//! Engine: the pipeline's composition root
//!
//! Owns a fixed arena of per-body detectors (one per body slot, sized once
//! at startup), the shared read-only configuration and catalog, and the
//! event hub everything reports through. The host drives it with two calls:
//! `ingest` per recognition frame per body, and `update_tracking` whenever
//! the body tracker's identifier set changes.
//!
//! Detectors sit behind per-slot mutexes: frames for distinct bodies may be
//! delivered from different threads concurrently, and no cross-slot locking
//! ever happens. The engine itself never blocks, sleeps or spawns threads.

use crate::catalog::GestureCatalog;
use crate::config::PipelineConfig;
use crate::detector::GestureDetector;
use crate::events::{EventHub, TrackingChangedEvent};
use crate::types::{GestureError, GestureFrame, Result, Severity, TrackingId};
use std::sync::{Arc, Mutex, MutexGuard};

/// Default number of body slots (the sensor tracks up to 6 bodies)
pub const DEFAULT_BODY_SLOTS: usize = 6;

/// The per-body detector arena plus shared configuration and event hub
pub struct GestureEngine {
    events: Arc<EventHub>,
    config: Arc<PipelineConfig>,
    catalog: Arc<GestureCatalog>,
    detectors: Vec<Mutex<GestureDetector>>,
}

impl GestureEngine {
    /// Create an engine with the default slot count and a fresh event hub
    pub fn new(catalog: GestureCatalog, config: PipelineConfig) -> Result<Self> {
        Self::with_event_hub(
            catalog,
            config,
            DEFAULT_BODY_SLOTS,
            Arc::new(EventHub::new()),
        )
    }

    /// Create an engine reporting into an existing event hub
    ///
    /// Use this when listeners must be registered before collaborators load,
    /// so their failure diagnostics reach the listeners. Fails without
    /// creating any detector if the catalog is empty (no recognition source)
    /// or the window size is zero.
    pub fn with_event_hub(
        catalog: GestureCatalog,
        config: PipelineConfig,
        slots: usize,
        events: Arc<EventHub>,
    ) -> Result<Self> {
        if catalog.is_empty() {
            events.raise_message(
                Severity::Error,
                "No recognition source loaded, refusing to create pipeline instances",
            );
            return Err(GestureError::EmptyCatalog);
        }
        if config.window_size() == 0 {
            return Err(GestureError::InvalidWindowSize(0));
        }

        let stats = catalog.stats();
        log::info!(
            "Gesture engine starting: {} body slots, window size {}, {} discrete / {} continuous gestures, {} links",
            slots,
            config.window_size(),
            stats.num_discrete,
            stats.num_continuous,
            config.links().len()
        );

        let config = Arc::new(config);
        let catalog = Arc::new(catalog);
        let detectors = (0..slots)
            .map(|_| {
                Mutex::new(GestureDetector::new(
                    config.clone(),
                    catalog.clone(),
                    events.clone(),
                ))
            })
            .collect();

        Ok(Self {
            events,
            config,
            catalog,
            detectors,
        })
    }

    /// The hub listeners subscribe on
    pub fn events(&self) -> Arc<EventHub> {
        self.events.clone()
    }

    /// Number of body slots in the arena
    pub fn body_slots(&self) -> usize {
        self.detectors.len()
    }

    /// The shared pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The shared gesture catalog
    pub fn catalog(&self) -> &GestureCatalog {
        &self.catalog
    }

    /// Deliver one recognition frame for one body slot
    ///
    /// Locks only that slot's detector; frames for other slots may be
    /// ingested concurrently from other threads.
    pub fn ingest(&self, slot: usize, frame: &GestureFrame) -> Result<()> {
        let detector = self
            .detectors
            .get(slot)
            .ok_or(GestureError::InvalidSlot(slot))?;
        lock(detector).push_frame(frame);
        Ok(())
    }

    /// Apply the body tracker's current identifier per slot
    ///
    /// Slots beyond the given list are treated as vacant (id 0). A slot
    /// whose identifier changed is rebound (and paused when vacated); if
    /// anything changed, one `tracking_changed` event with the full list
    /// goes out.
    pub fn update_tracking(&self, tracking_ids: &[TrackingId]) {
        let mut changed = false;
        for (slot, detector) in self.detectors.iter().enumerate() {
            let id = tracking_ids.get(slot).copied().unwrap_or(0);
            let mut detector = lock(detector);
            if detector.tracking_id() != id {
                detector.set_tracking_id(id);
                changed = true;
            }
        }

        if changed {
            self.events.raise_tracking_changed(&TrackingChangedEvent {
                tracking_ids: self.tracking_ids(),
            });
        }
    }

    /// Current tracking identifier per slot (0 = vacant)
    pub fn tracking_ids(&self) -> Vec<TrackingId> {
        self.detectors
            .iter()
            .map(|d| lock(d).tracking_id())
            .collect()
    }

    /// Current tracking identifier of one slot
    pub fn tracking_id(&self, slot: usize) -> Option<TrackingId> {
        self.detectors.get(slot).map(|d| lock(d).tracking_id())
    }

    /// Explicitly pause one slot's detector
    pub fn pause_slot(&self, slot: usize) -> Result<()> {
        let detector = self
            .detectors
            .get(slot)
            .ok_or(GestureError::InvalidSlot(slot))?;
        lock(detector).pause();
        Ok(())
    }

    /// Resume one slot's detector
    pub fn resume_slot(&self, slot: usize) -> Result<()> {
        let detector = self
            .detectors
            .get(slot)
            .ok_or(GestureError::InvalidSlot(slot))?;
        lock(detector).resume();
        Ok(())
    }
}

/// Lock a detector, recovering from a poisoned mutex
fn lock(detector: &Mutex<GestureDetector>) -> MutexGuard<'_, GestureDetector> {
    detector.lock().unwrap_or_else(|e| e.into_inner())
}
