//! Gesture grouping
//!
//! Applies the configured links and ignore list to smoothed score maps, and
//! resolves the logical gesture roster a detector iterates when reporting.
//! Grouping is resolved against the complete catalog, not just the names
//! scoring in a frame, so a silent link member is still absorbed into its
//! link instead of surfacing twice.

use crate::catalog::{GestureCatalog, GestureDef};
use crate::config::PipelineConfig;
use crate::events::EventHub;
use crate::types::{GestureKind, GestureResult, ScoreMap, Severity};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Resolves raw gesture names to ignored, linked or standalone gestures
#[derive(Clone)]
pub(crate) struct GestureGrouper {
    config: Arc<PipelineConfig>,
    catalog: Arc<GestureCatalog>,
    events: Arc<EventHub>,
}

impl GestureGrouper {
    pub(crate) fn new(
        config: Arc<PipelineConfig>,
        catalog: Arc<GestureCatalog>,
        events: Arc<EventHub>,
    ) -> Self {
        Self {
            config,
            catalog,
            events,
        }
    }

    /// Resolve one window's smoothed score maps into logical results
    ///
    /// Collapses both maps through the links and ignore list, then scores
    /// every gesture on the logical roster. Results come back in roster
    /// order; gestures not scoring this window carry score 0.
    pub(crate) fn resolve(
        &self,
        discrete: &ScoreMap,
        continuous: &ScoreMap,
    ) -> Vec<GestureResult> {
        let confidences = folded(self.collapse(discrete));
        let progresses = folded(self.collapse(continuous));

        self.roster()
            .into_iter()
            .map(|gesture| {
                let scores = match gesture.kind {
                    GestureKind::Discrete => &confidences,
                    GestureKind::Continuous => &progresses,
                };
                let score = scores
                    .get(&gesture.name.to_lowercase())
                    .copied()
                    .unwrap_or(0.0);
                GestureResult {
                    name: gesture.name,
                    kind: gesture.kind,
                    score,
                }
            })
            .collect()
    }

    /// Collapse a smoothed score map through the links and ignore list
    ///
    /// Ignored names are dropped. A linked name contributes its link's
    /// common name exactly once, scored with the maximum over all members
    /// (members missing from the map count as 0). Everything else passes
    /// through unchanged.
    pub(crate) fn collapse(&self, smoothed: &ScoreMap) -> ScoreMap {
        // Lower-cased view for case-insensitive member lookups
        let mut folded: HashMap<String, f32> = HashMap::with_capacity(smoothed.len());
        for (name, score) in smoothed {
            folded.insert(name.to_lowercase(), *score);
        }

        let mut collapsed = ScoreMap::with_capacity(smoothed.len());
        for (name, score) in smoothed {
            let key = name.to_lowercase();
            if self.config.is_ignored(&key) {
                continue;
            }
            match self.config.find_link(&key) {
                Some(link) => {
                    // One entry per link no matter how many members fired
                    if !collapsed.contains_key(link.common_name()) {
                        let best = link
                            .members()
                            .iter()
                            .map(|m| folded.get(m).copied().unwrap_or(0.0))
                            .fold(0.0_f32, f32::max);
                        collapsed.insert(link.common_name().to_string(), best);
                    }
                }
                None => {
                    collapsed.insert(name.clone(), *score);
                }
            }
        }
        collapsed
    }

    /// The logical gestures a detector reports on, derived from the whole
    /// catalog
    ///
    /// Ignored gestures are dropped, link members collapse to one entry per
    /// link, and a member whose kind differs from its link's kind is a
    /// configuration error: the gesture is dropped and a diagnostic goes out
    /// over the message channel. Frame processing continues regardless.
    pub(crate) fn roster(&self) -> Vec<GestureDef> {
        let mut logical = Vec::with_capacity(self.catalog.len());
        let mut linked: HashSet<&str> = HashSet::new();

        for gesture in self.catalog.iter() {
            let key = gesture.name.to_lowercase();
            if self.config.is_ignored(&key) {
                continue;
            }
            match self.config.find_link(&key) {
                Some(link) => {
                    if link.kind() == gesture.kind {
                        if linked.insert(link.common_name()) {
                            logical.push(GestureDef::new(link.common_name(), gesture.kind));
                        }
                    } else {
                        self.events.raise_message(
                            Severity::Error,
                            format!(
                                "Configuration error: {} gesture '{}' is a member of {} link '{}'",
                                gesture.kind,
                                gesture.name,
                                link.kind(),
                                link.common_name()
                            ),
                        );
                    }
                }
                None => logical.push(gesture.clone()),
            }
        }
        logical
    }
}

/// Lower-cased key view of a collapsed score map
fn folded(map: ScoreMap) -> HashMap<String, f32> {
    map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect()
}
