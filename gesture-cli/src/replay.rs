//! Frame stream replay
//!
//! Feeds the engine the way a live sensor would, from either a recorded
//! JSON stream or a deterministic synthetic one. Each body slot's stream is
//! independent, so replay drives them on parallel rayon workers — the same
//! concurrency shape a multi-body sensor host produces.

use anyhow::{Context, Result};
use chrono::Utc;
use gesture_pipeline::{GestureCatalog, GestureEngine, GestureFrame, GestureKind, ScoreMap};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A recorded multi-body frame stream
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Recording {
    /// Tracking identifier per body slot (0 = vacant)
    #[serde(default)]
    pub tracking_ids: Vec<u64>,
    /// One frame sequence per occupied body slot
    pub bodies: Vec<BodyStream>,
}

/// The frame sequence of one body slot
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BodyStream {
    pub slot: usize,
    pub frames: Vec<FrameRecord>,
}

/// One recorded recognizer callback
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FrameRecord {
    #[serde(default)]
    pub discrete: ScoreMap,
    #[serde(default)]
    pub continuous: ScoreMap,
}

/// Totals of one replay run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub bodies: usize,
    pub frames: usize,
}

/// Load a recording from a JSON file
pub fn load_recording(path: &Path) -> Result<Recording> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read recording: {:?}", path))?;
    let recording: Recording = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse recording: {:?}", path))?;
    Ok(recording)
}

/// Build a deterministic synthetic recording over the catalog's gestures
///
/// Scores cycle through [0, 1] with per-body and per-gesture phase shifts so
/// every gesture fires, goes silent, and overlaps differently on each body.
pub fn synthesize(catalog: &GestureCatalog, bodies: usize, frames: usize) -> Recording {
    let tracking_ids: Vec<u64> = (0..bodies).map(|slot| (slot as u64 + 1) * 100).collect();

    let body_streams = (0..bodies)
        .map(|slot| {
            let frames = (0..frames)
                .map(|frame_idx| {
                    let mut record = FrameRecord::default();
                    for (gesture_idx, gesture) in catalog.iter().enumerate() {
                        let score = ((frame_idx + 2 * gesture_idx + 3 * slot) % 11) as f32 / 10.0;
                        let scores = match gesture.kind {
                            GestureKind::Discrete => &mut record.discrete,
                            GestureKind::Continuous => &mut record.continuous,
                        };
                        scores.insert(gesture.name.clone(), score);
                    }
                    record
                })
                .collect();
            BodyStream { slot, frames }
        })
        .collect();

    Recording {
        tracking_ids,
        bodies: body_streams,
    }
}

/// Replay a recording into the engine, one rayon worker per body
pub fn run(engine: &GestureEngine, recording: &Recording) -> Result<ReplayStats> {
    engine.update_tracking(&recording.tracking_ids);

    let frames: usize = recording
        .bodies
        .par_iter()
        .map(|body| {
            log::debug!(
                "Replaying {} frames into body slot {}",
                body.frames.len(),
                body.slot
            );
            for record in &body.frames {
                let mut frame = GestureFrame::new(Utc::now());
                frame.discrete = record.discrete.clone();
                frame.continuous = record.continuous.clone();
                engine
                    .ingest(body.slot, &frame)
                    .with_context(|| format!("Failed to ingest into slot {}", body.slot))?;
            }
            Ok::<usize, anyhow::Error>(body.frames.len())
        })
        .try_reduce(|| 0, |a, b| Ok(a + b))?;

    Ok(ReplayStats {
        bodies: recording.bodies.len(),
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_pipeline::{GestureDef, PipelineConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn wave_catalog() -> GestureCatalog {
        GestureCatalog::from_gestures(vec![
            GestureDef::new("Wave", GestureKind::Discrete),
            GestureDef::new("Swipe", GestureKind::Continuous),
        ])
    }

    #[test]
    fn test_synthesize_shape() {
        let recording = synthesize(&wave_catalog(), 2, 5);
        assert_eq!(recording.tracking_ids, vec![100, 200]);
        assert_eq!(recording.bodies.len(), 2);
        assert_eq!(recording.bodies[0].frames.len(), 5);

        let frame = &recording.bodies[0].frames[0];
        assert!(frame.discrete.contains_key("Wave"));
        assert!(frame.continuous.contains_key("Swipe"));
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let a = synthesize(&wave_catalog(), 2, 8);
        let b = synthesize(&wave_catalog(), 2, 8);
        assert_eq!(
            a.bodies[1].frames[3].discrete,
            b.bodies[1].frames[3].discrete
        );
    }

    #[test]
    fn test_run_feeds_every_frame() {
        let engine = GestureEngine::new(
            wave_catalog(),
            PipelineConfig::new().with_window_size(2),
        )
        .unwrap();

        let windows = Arc::new(AtomicUsize::new(0));
        let seen = windows.clone();
        engine.events().on_result_set(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let recording = synthesize(&wave_catalog(), 2, 6);
        let stats = run(&engine, &recording).unwrap();

        assert_eq!(stats.bodies, 2);
        assert_eq!(stats.frames, 12);
        // 3 ready windows per body, each with some discrete activity
        assert!(windows.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_run_rejects_bad_slot() {
        let engine =
            GestureEngine::new(wave_catalog(), PipelineConfig::new()).unwrap();
        let mut recording = synthesize(&wave_catalog(), 1, 1);
        recording.bodies[0].slot = 99;

        assert!(run(&engine, &recording).is_err());
    }
}
