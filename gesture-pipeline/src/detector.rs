//! Per-body gesture detector
//!
//! One detector is bound to one body slot: it buffers that body's raw frames,
//! and once per window collapses the smoothed scores through the configured
//! links, reports every nonzero result, and publishes the bounded
//! most-significant shortlists.
//!
//! A detector is either Active or Paused. It starts Paused and follows its
//! tracking identifier: nonzero means a body occupies the slot, 0 means the
//! body left view. Frames pushed while Paused are discarded without touching
//! the window, so a brief leave/re-enter resumes smoothing where it left off.

use crate::catalog::GestureCatalog;
use crate::config::PipelineConfig;
use crate::events::{EventHub, GestureResultEvent, ResultSetEvent};
use crate::grouper::GestureGrouper;
use crate::types::{GestureFrame, GestureKind, ScoreMap, Shortlist, Timestamp, TrackingId};
use crate::window::ScoreWindow;
use std::sync::Arc;

/// Pipeline instance for a single body slot
pub struct GestureDetector {
    tracking_id: TrackingId,
    paused: bool,
    discrete_window: ScoreWindow,
    continuous_window: ScoreWindow,
    grouper: GestureGrouper,
    events: Arc<EventHub>,
}

impl GestureDetector {
    /// Create a detector; it starts Paused with no body assigned
    pub fn new(
        config: Arc<PipelineConfig>,
        catalog: Arc<GestureCatalog>,
        events: Arc<EventHub>,
    ) -> Self {
        let window_size = config.window_size();
        Self {
            tracking_id: 0,
            paused: true,
            discrete_window: ScoreWindow::new(window_size),
            continuous_window: ScoreWindow::new(window_size),
            grouper: GestureGrouper::new(config, catalog, events.clone()),
            events,
        }
    }

    /// The body tracking identifier currently bound to this detector
    pub fn tracking_id(&self) -> TrackingId {
        self.tracking_id
    }

    /// Bind a tracking identifier; 0 pauses the detector, nonzero activates it
    pub fn set_tracking_id(&mut self, tracking_id: TrackingId) {
        if self.tracking_id == tracking_id {
            return;
        }
        log::debug!(
            "Detector rebound: tracking id {} -> {}",
            self.tracking_id,
            tracking_id
        );
        self.tracking_id = tracking_id;
        self.paused = tracking_id == 0;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Explicitly pause; frames are discarded until resumed
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume processing frames for the currently bound body
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Feed one raw recognition frame
    ///
    /// While Paused this is a no-op. Otherwise both score maps are buffered;
    /// once the window is full the smoothed results are grouped, ranked and
    /// reported through the event hub.
    pub fn push_frame(&mut self, frame: &GestureFrame) {
        if self.paused {
            log::trace!("Detector paused, dropping frame (body {})", self.tracking_id);
            return;
        }

        // Both windows share the push cadence, so they become ready together
        let discrete = self.discrete_window.push(&frame.discrete);
        let continuous = self.continuous_window.push(&frame.continuous);
        let (Some(discrete), Some(continuous)) = (discrete, continuous) else {
            return;
        };

        log::trace!(
            "Window ready for body {} ({} discrete, {} continuous names)",
            self.tracking_id,
            discrete.len(),
            continuous.len()
        );
        self.emit_window(&discrete, &continuous, frame.timestamp);
    }

    /// Group, rank and report one ready window
    fn emit_window(&self, discrete: &ScoreMap, continuous: &ScoreMap, timestamp: Timestamp) {
        let mut confidence = Shortlist::new();
        let mut progress = Shortlist::new();

        for result in self.grouper.resolve(discrete, continuous) {
            if result.score == 0.0 {
                continue;
            }

            let event = GestureResultEvent {
                tracking_id: self.tracking_id,
                name: result.name.clone(),
                score: result.score,
                timestamp,
            };
            match result.kind {
                GestureKind::Discrete => {
                    self.events.raise_discrete_result(&event);
                    confidence.offer(&result.name, result.score);
                }
                GestureKind::Continuous => {
                    self.events.raise_continuous_result(&event);
                    progress.offer(&result.name, result.score);
                }
            }
        }

        // The combined result set is gated on discrete activity; progress-only
        // windows produce per-gesture events but no set.
        if confidence.has_nonzero() {
            self.events.raise_result_set(&ResultSetEvent {
                tracking_id: self.tracking_id,
                confidence,
                progress,
                timestamp,
            });
        }
    }

    #[cfg(test)]
    pub(crate) fn buffered_frames(&self) -> usize {
        self.discrete_window.fill_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GestureDef;
    use crate::config::GestureLink;
    use chrono::Utc;
    use std::sync::Mutex;

    struct Fixture {
        detector: GestureDetector,
        results: Arc<Mutex<Vec<GestureResultEvent>>>,
        progress: Arc<Mutex<Vec<GestureResultEvent>>>,
        sets: Arc<Mutex<Vec<ResultSetEvent>>>,
    }

    fn fixture(config: PipelineConfig, catalog: GestureCatalog) -> Fixture {
        let events = Arc::new(EventHub::new());

        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = results.clone();
        events.on_discrete_result(move |e| sink.lock().unwrap().push(e.clone()));

        let progress = Arc::new(Mutex::new(Vec::new()));
        let sink = progress.clone();
        events.on_continuous_result(move |e| sink.lock().unwrap().push(e.clone()));

        let sets = Arc::new(Mutex::new(Vec::new()));
        let sink = sets.clone();
        events.on_result_set(move |e| sink.lock().unwrap().push(e.clone()));

        Fixture {
            detector: GestureDetector::new(Arc::new(config), Arc::new(catalog), events),
            results,
            progress,
            sets,
        }
    }

    fn frame(discrete: &[(&str, f32)], continuous: &[(&str, f32)]) -> GestureFrame {
        let mut f = GestureFrame::new(Utc::now());
        f.discrete = discrete.iter().map(|(n, s)| (n.to_string(), *s)).collect();
        f.continuous = continuous.iter().map(|(n, s)| (n.to_string(), *s)).collect();
        f
    }

    fn wave_catalog() -> GestureCatalog {
        GestureCatalog::from_gestures(vec![
            GestureDef::new("Wave", GestureKind::Discrete),
            GestureDef::new("Swipe", GestureKind::Continuous),
        ])
    }

    #[test]
    fn test_starts_paused_and_drops_frames() {
        let mut fx = fixture(PipelineConfig::new().with_window_size(1), wave_catalog());
        fx.detector.push_frame(&frame(&[("Wave", 0.9)], &[]));
        assert!(fx.results.lock().unwrap().is_empty());
        assert_eq!(fx.detector.buffered_frames(), 0);
    }

    #[test]
    fn test_reports_after_window_fills() {
        let mut fx = fixture(PipelineConfig::new().with_window_size(2), wave_catalog());
        fx.detector.set_tracking_id(42);

        fx.detector.push_frame(&frame(&[("Wave", 0.4)], &[]));
        assert!(fx.results.lock().unwrap().is_empty());

        fx.detector.push_frame(&frame(&[("Wave", 0.8)], &[]));
        let results = fx.results.lock().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Wave");
        assert_eq!(results[0].tracking_id, 42);
        assert!((results[0].score - 0.6).abs() < 1e-6);

        let sets = fx.sets.lock().unwrap();
        assert_eq!(sets.len(), 1);
        assert!((sets[0].confidence.score("Wave") - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_progress_only_window_emits_no_result_set() {
        let mut fx = fixture(PipelineConfig::new().with_window_size(1), wave_catalog());
        fx.detector.set_tracking_id(7);

        fx.detector.push_frame(&frame(&[("Wave", 0.0)], &[("Swipe", 0.5)]));

        assert!(fx.results.lock().unwrap().is_empty());
        assert_eq!(fx.progress.lock().unwrap().len(), 1);
        assert!(fx.sets.lock().unwrap().is_empty());
    }

    #[test]
    fn test_result_set_carries_both_shortlists() {
        let mut fx = fixture(PipelineConfig::new().with_window_size(1), wave_catalog());
        fx.detector.set_tracking_id(7);

        fx.detector.push_frame(&frame(&[("Wave", 0.9)], &[("Swipe", 0.3)]));

        let sets = fx.sets.lock().unwrap();
        assert_eq!(sets.len(), 1);
        assert!((sets[0].confidence.score("Wave") - 0.9).abs() < 1e-6);
        assert!((sets[0].progress.score("Swipe") - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_pause_preserves_window_fill() {
        let mut fx = fixture(PipelineConfig::new().with_window_size(3), wave_catalog());
        fx.detector.set_tracking_id(42);

        fx.detector.push_frame(&frame(&[("Wave", 0.3)], &[]));
        fx.detector.push_frame(&frame(&[("Wave", 0.3)], &[]));
        assert_eq!(fx.detector.buffered_frames(), 2);

        fx.detector.pause();
        fx.detector.push_frame(&frame(&[("Wave", 0.3)], &[]));
        assert_eq!(fx.detector.buffered_frames(), 2);

        fx.detector.resume();
        fx.detector.push_frame(&frame(&[("Wave", 0.3)], &[]));
        assert_eq!(fx.results.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_tracking_id_zero_pauses() {
        let mut fx = fixture(PipelineConfig::new().with_window_size(1), wave_catalog());
        fx.detector.set_tracking_id(42);
        assert!(!fx.detector.is_paused());

        fx.detector.set_tracking_id(0);
        assert!(fx.detector.is_paused());

        fx.detector.push_frame(&frame(&[("Wave", 0.9)], &[]));
        assert!(fx.results.lock().unwrap().is_empty());

        fx.detector.set_tracking_id(43);
        fx.detector.push_frame(&frame(&[("Wave", 0.9)], &[]));
        assert_eq!(fx.results.lock().unwrap().len(), 1);
        assert_eq!(fx.results.lock().unwrap()[0].tracking_id, 43);
    }

    #[test]
    fn test_linked_gestures_report_once_under_common_name() {
        let config = PipelineConfig::new().with_window_size(1).add_link(
            GestureLink::new(
                "Pointing",
                GestureKind::Discrete,
                vec!["Pointing_Left".to_string(), "Pointing_Right".to_string()],
            ),
        );
        let catalog = GestureCatalog::from_gestures(vec![
            GestureDef::new("Pointing_Left", GestureKind::Discrete),
            GestureDef::new("Pointing_Right", GestureKind::Discrete),
        ]);
        let mut fx = fixture(config, catalog);
        fx.detector.set_tracking_id(1);

        fx.detector
            .push_frame(&frame(&[("Pointing_Left", 0.1), ("Pointing_Right", 0.9)], &[]));

        let results = fx.results.lock().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Pointing");
        assert!((results[0].score - 0.9).abs() < 1e-6);
    }
}
