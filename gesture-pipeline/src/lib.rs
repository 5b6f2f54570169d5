//! Gesture Pipeline Library
//!
//! Turns the noisy per-frame gesture scores of an external recognition
//! engine into stable, application-facing events, independently for up to
//! six tracked bodies.
//!
//! # Architecture
//!
//! The pipeline per body: raw score maps are buffered in a fixed smoothing
//! window; once per window the averaged scores are collapsed through the
//! configured gesture links and ignore list; every nonzero logical result
//! is reported, and the three most significant gestures per kind go out as
//! one combined result set. All reporting happens through a single event
//! hub with typed per-category subscriptions.
//!
//! The library does NOT:
//! - Talk to the sensor or acquire frames (the host delivers them)
//! - Load or run the trained recognition database (only its name/kind
//!   roster, via a thin JSON manifest)
//! - Extract skeletal geometry
//! - Sequence gestures or gate on confidence thresholds
//!
//! # Example Usage
//!
//! ```no_run
//! use gesture_pipeline::{
//!     GestureCatalog, GestureEngine, GestureFrame, PipelineConfig,
//! };
//! use std::path::Path;
//!
//! // Load the trained-gesture roster and grouping rules
//! let catalog = GestureCatalog::from_json_file(Path::new("gestures.json")).unwrap();
//! let config = PipelineConfig::new().with_window_size(10);
//!
//! let engine = GestureEngine::new(catalog, config).unwrap();
//!
//! // Register listeners for the events you care about
//! engine.events().on_discrete_result(|e| {
//!     println!("body {} performed {} ({:.2})", e.tracking_id, e.name, e.score);
//! });
//!
//! // Drive the engine from the host's sensor callbacks
//! engine.update_tracking(&[42]);
//! let frame = GestureFrame::new(chrono::Utc::now());
//! engine.ingest(0, &frame).unwrap();
//! ```

// Public modules
pub mod catalog;
pub mod config;
pub mod detector;
pub mod engine;
pub mod events;
pub mod types;

// Re-export main types for convenience
pub use catalog::{CatalogStats, GestureCatalog, GestureDef};
pub use config::{GestureLink, PipelineConfig, DEFAULT_WINDOW_SIZE};
pub use detector::GestureDetector;
pub use engine::{GestureEngine, DEFAULT_BODY_SLOTS};
pub use events::{
    EventHub, GestureResultEvent, MessageEvent, ResultSetEvent, SubscriptionId,
    TrackingChangedEvent,
};
pub use types::{
    GestureError, GestureFrame, GestureKind, GestureResult, Result, ScoreMap, Severity,
    Shortlist, Timestamp, TrackingId, SHORTLIST_CAPACITY,
};

// Internal modules (not exposed in public API)
mod grouper;
mod window;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an engine over a one-gesture catalog comes up
        let catalog =
            GestureCatalog::from_gestures(vec![GestureDef::new("Wave", GestureKind::Discrete)]);
        let engine = GestureEngine::new(catalog, PipelineConfig::new()).unwrap();
        assert_eq!(engine.body_slots(), DEFAULT_BODY_SLOTS);
    }
}
