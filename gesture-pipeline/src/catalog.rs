//! Gesture catalog
//!
//! The catalog is the pipeline's view of the trained recognition database:
//! the complete set of gesture names the recognition engine can score for a
//! body, each tagged discrete or continuous. The native database format and
//! the recognition runtime itself are collaborator territory; this module
//! only carries the name/kind roster and a thin JSON manifest loader.

use crate::types::{GestureError, GestureKind, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A single trained gesture as listed by the recognition database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureDef {
    /// Gesture name as trained
    pub name: String,
    /// Whether the gesture scores a confidence or a progress
    pub kind: GestureKind,
}

impl GestureDef {
    pub fn new(name: impl Into<String>, kind: GestureKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// The complete set of recognizable gestures for a body
///
/// Shared read-only by every pipeline instance. The roster must be complete:
/// grouping decisions are resolved against all trained gestures, not only
/// the ones scoring in a given frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureCatalog {
    gestures: Vec<GestureDef>,
}

impl GestureCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of gesture definitions
    pub fn from_gestures(gestures: Vec<GestureDef>) -> Self {
        Self { gestures }
    }

    /// Load a catalog from a JSON manifest file
    ///
    /// The manifest is the thin interchange format a database-export tool
    /// writes: `{"gestures": [{"name": "...", "kind": "discrete"}, ...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        log::info!("Loading gesture catalog: {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| {
            GestureError::CatalogLoad(format!("failed to read {:?}: {}", path, e))
        })?;
        let catalog: GestureCatalog = serde_json::from_str(&content).map_err(|e| {
            GestureError::CatalogLoad(format!("failed to parse {:?}: {}", path, e))
        })?;

        let stats = catalog.stats();
        log::info!(
            "Gesture catalog loaded: {} discrete, {} continuous",
            stats.num_discrete,
            stats.num_continuous
        );
        Ok(catalog)
    }

    /// Add a gesture definition to the catalog
    pub fn add_gesture(&mut self, gesture: GestureDef) {
        self.gestures.push(gesture);
    }

    /// Iterate all trained gestures
    pub fn iter(&self) -> impl Iterator<Item = &GestureDef> {
        self.gestures.iter()
    }

    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    /// Get catalog statistics
    pub fn stats(&self) -> CatalogStats {
        let num_discrete = self
            .gestures
            .iter()
            .filter(|g| g.kind == GestureKind::Discrete)
            .count();
        CatalogStats {
            num_discrete,
            num_continuous: self.gestures.len() - num_discrete,
        }
    }
}

/// Catalog statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    /// Number of trained discrete gestures
    pub num_discrete: usize,
    /// Number of trained continuous gestures
    pub num_continuous: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_catalog() {
        let catalog = GestureCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.stats().num_discrete, 0);
    }

    #[test]
    fn test_stats_split_by_kind() {
        let catalog = GestureCatalog::from_gestures(vec![
            GestureDef::new("Wave_Left", GestureKind::Discrete),
            GestureDef::new("Wave_Right", GestureKind::Discrete),
            GestureDef::new("Swipe", GestureKind::Continuous),
        ]);
        let stats = catalog.stats();
        assert_eq!(stats.num_discrete, 2);
        assert_eq!(stats.num_continuous, 1);
    }

    #[test]
    fn test_load_manifest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"gestures": [
                {{"name": "Wave", "kind": "discrete"}},
                {{"name": "Swipe", "kind": "continuous"}}
            ]}}"#
        )
        .unwrap();

        let catalog = GestureCatalog::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.iter().next().unwrap(),
            &GestureDef::new("Wave", GestureKind::Discrete)
        );
    }

    #[test]
    fn test_load_missing_manifest() {
        let result = GestureCatalog::from_json_file(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(GestureError::CatalogLoad(_))));
    }
}
