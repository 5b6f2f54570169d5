//! Core types for the gesture pipeline library
//!
//! This module defines the fundamental types that flow through the pipeline:
//! raw per-frame score maps coming in from the recognition engine, and the
//! grouped, smoothed results going out to listeners. The pipeline is driven
//! entirely by the host; it does not talk to a sensor itself.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Timestamp type used throughout the pipeline
pub type Timestamp = DateTime<Utc>;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, GestureError>;

/// Body tracking identifier assigned by the host's body tracker.
/// Nonzero while a body is in view, 0 when the slot is vacant.
pub type TrackingId = u64;

/// Mapping from raw gesture name to its per-frame score
pub type ScoreMap = HashMap<String, f32>;

/// Errors that can occur while building or driving the pipeline
#[derive(Debug, thiserror::Error)]
pub enum GestureError {
    #[error("Failed to load gesture catalog: {0}")]
    CatalogLoad(String),

    #[error("Gesture catalog is empty, refusing to create pipeline instances")]
    EmptyCatalog,

    #[error("No body slot {0}")]
    InvalidSlot(usize),

    #[error("Invalid window size {0}, must be at least 1")]
    InvalidWindowSize(usize),

    #[error("Invalid gesture kind: {0}")]
    InvalidKind(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The two families of gestures a recognition engine reports
///
/// Discrete gestures score a *confidence* ("is the body doing this right
/// now"), continuous gestures score a *progress* ("how far along is the
/// motion"). Both are conventionally in `[0, 1]` with 0 meaning "not
/// currently present".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    Discrete,
    Continuous,
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureKind::Discrete => write!(f, "discrete"),
            GestureKind::Continuous => write!(f, "continuous"),
        }
    }
}

impl FromStr for GestureKind {
    type Err = GestureError;

    /// Parses a kind name case-insensitively ("Discrete", "continuous", ...)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "discrete" => Ok(GestureKind::Discrete),
            "continuous" => Ok(GestureKind::Continuous),
            _ => Err(GestureError::InvalidKind(s.to_string())),
        }
    }
}

/// One recognizer callback's worth of raw scores for a single body
///
/// The discrete and continuous maps are independent; either may be empty or
/// miss names the catalog knows about. Missing entries are treated as score
/// 0 further down the pipeline, never as an error.
#[derive(Debug, Clone)]
pub struct GestureFrame {
    /// Sensor timestamp of the frame this result was computed from
    pub timestamp: Timestamp,
    /// Confidence per discrete gesture name
    pub discrete: ScoreMap,
    /// Progress per continuous gesture name
    pub continuous: ScoreMap,
}

impl GestureFrame {
    /// Create an empty frame stamped with the given sensor time
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            discrete: ScoreMap::new(),
            continuous: ScoreMap::new(),
        }
    }
}

/// A grouped, smoothed result unit as reported to listeners
///
/// The name is either a raw gesture name or the common name of a configured
/// link that absorbed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureResult {
    pub name: String,
    pub kind: GestureKind,
    pub score: f32,
}

/// Message severity for diagnostics sent over the `message` channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl Severity {
    /// Numeric code as used by the message channel (0 = info, 1 = error)
    pub fn code(&self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Error => 1,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl Serialize for Severity {
    /// Serializes as the numeric code (0 = info, 1 = error)
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Capacity of a [`Shortlist`]
pub const SHORTLIST_CAPACITY: usize = 3;

/// The bounded set of currently most significant gestures of one kind
///
/// Holds at most [`SHORTLIST_CAPACITY`] name → score entries, rebuilt once
/// per emitted window. Entries keep insertion order; when the list is full a
/// new entry only displaces an existing one if its score is strictly greater
/// than at least one of them, and the first entry holding the minimum score
/// is the one evicted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shortlist {
    entries: Vec<(String, f32)>,
}

impl Shortlist {
    /// Create an empty shortlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a scored gesture to the shortlist
    ///
    /// Names are expected to be unique across offers within one window.
    pub fn offer(&mut self, name: &str, score: f32) {
        if self.entries.len() < SHORTLIST_CAPACITY {
            self.entries.push((name.to_string(), score));
            return;
        }

        // Full: only displace if strictly greater than some existing entry
        if !self.entries.iter().any(|(_, s)| score > *s) {
            return;
        }
        self.entries.push((name.to_string(), score));

        // Evict the first entry holding the minimum score
        let mut min_idx = 0;
        for (i, (_, s)) in self.entries.iter().enumerate() {
            if *s < self.entries[min_idx].1 {
                min_idx = i;
            }
        }
        self.entries.remove(min_idx);
    }

    /// Score stored for a name, or 0 when the name is not shortlisted
    pub fn score(&self, name: &str) -> f32 {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
            .unwrap_or(0.0)
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), *s))
    }

    /// All shortlisted names, in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if at least one entry has a nonzero score
    pub fn has_nonzero(&self) -> bool {
        self.entries.iter().any(|(_, s)| *s != 0.0)
    }
}

impl Serialize for Shortlist {
    /// Serializes as a name → score JSON object
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, score) in &self.entries {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}
