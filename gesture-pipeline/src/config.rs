//! Pipeline configuration types
//!
//! This module defines the static grouping rules a pipeline instance runs
//! with: gesture links (many raw names collapsed into one logical name),
//! the ignore list, and the smoothing window size. A configuration is
//! immutable once built; changing settings means building a new
//! configuration and a new set of pipeline instances.
//!
//! All name matching against links and the ignore list is case-insensitive.
//! Names are lower-cased once at construction so per-frame lookups never
//! case-fold configuration entries again; callers pass pre-folded keys to
//! the lookup methods.

use crate::types::GestureKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default smoothing window size when the settings omit one
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// A configured many-to-one gesture grouping
///
/// Every member gesture reports under the link's common name, scored with
/// the highest member score present in the frame. A link carries a kind;
/// members of the other kind are configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GestureLinkData")]
pub struct GestureLink {
    common_name: String,
    kind: GestureKind,
    /// Member names, lower-cased at construction
    members: Vec<String>,
}

/// Raw shape of a link as it appears in persisted settings
#[derive(Debug, Deserialize)]
struct GestureLinkData {
    common_name: String,
    kind: GestureKind,
    members: Vec<String>,
}

impl From<GestureLinkData> for GestureLink {
    fn from(data: GestureLinkData) -> Self {
        GestureLink::new(data.common_name, data.kind, data.members)
    }
}

impl GestureLink {
    /// Create a link, normalizing member names to lower case
    pub fn new(
        common_name: impl Into<String>,
        kind: GestureKind,
        members: Vec<String>,
    ) -> Self {
        Self {
            common_name: common_name.into(),
            kind,
            members: members.into_iter().map(|m| m.to_lowercase()).collect(),
        }
    }

    /// The logical name members report under
    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    /// The gesture kind this link represents
    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    /// Member names (lower-cased)
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Whether a lower-cased raw name is a member of this link
    pub fn contains(&self, folded_name: &str) -> bool {
        self.members.iter().any(|m| m == folded_name)
    }
}

/// The static grouping rules shared by all pipeline instances
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PipelineConfigData")]
pub struct PipelineConfig {
    links: Vec<GestureLink>,
    /// Ignored raw names, lower-cased at construction
    ignore: HashSet<String>,
    window_size: usize,
}

/// Raw shape of the configuration as it appears in persisted settings
#[derive(Debug, Deserialize)]
struct PipelineConfigData {
    #[serde(default)]
    links: Vec<GestureLink>,
    #[serde(default)]
    ignore: Vec<String>,
    #[serde(default = "default_window_size")]
    window_size: usize,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

impl From<PipelineConfigData> for PipelineConfig {
    fn from(data: PipelineConfigData) -> Self {
        let mut config = PipelineConfig::new().with_window_size(data.window_size);
        for link in data.links {
            config = config.add_link(link);
        }
        for name in data.ignore {
            config = config.add_ignore(name);
        }
        config
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Create a configuration with no links, no ignores and the default
    /// window size
    pub fn new() -> Self {
        Self {
            links: Vec::new(),
            ignore: HashSet::new(),
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    /// Builder method: add a gesture link
    pub fn add_link(mut self, link: GestureLink) -> Self {
        self.links.push(link);
        self
    }

    /// Builder method: add a raw gesture name to the ignore list
    pub fn add_ignore(mut self, name: impl Into<String>) -> Self {
        self.ignore.insert(name.into().to_lowercase());
        self
    }

    /// Builder method: set the smoothing window size
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Find the link a lower-cased raw name belongs to
    ///
    /// Links are scanned in declaration order, so if a name was (incorrectly)
    /// listed in several links the first-declared link wins.
    pub fn find_link(&self, folded_name: &str) -> Option<&GestureLink> {
        self.links.iter().find(|link| link.contains(folded_name))
    }

    /// Whether a lower-cased raw name is on the ignore list
    pub fn is_ignored(&self, folded_name: &str) -> bool {
        self.ignore.contains(folded_name)
    }

    /// All configured links, in declaration order
    pub fn links(&self) -> &[GestureLink] {
        &self.links
    }

    /// The smoothing window size in frames
    pub fn window_size(&self) -> usize {
        self.window_size
    }
}
