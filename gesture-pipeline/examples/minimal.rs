//! Minimal engine usage: one body, a link, a few synthetic frames.
//!
//! Run with: cargo run --example minimal

use chrono::Utc;
use gesture_pipeline::{
    GestureCatalog, GestureDef, GestureEngine, GestureFrame, GestureKind, GestureLink,
    PipelineConfig,
};

fn main() -> gesture_pipeline::Result<()> {
    env_logger::init();

    let catalog = GestureCatalog::from_gestures(vec![
        GestureDef::new("Pointing_Left", GestureKind::Discrete),
        GestureDef::new("Pointing_Right", GestureKind::Discrete),
        GestureDef::new("Swipe", GestureKind::Continuous),
    ]);

    let config = PipelineConfig::new()
        .with_window_size(4)
        .add_link(GestureLink::new(
            "Pointing",
            GestureKind::Discrete,
            vec!["Pointing_Left".to_string(), "Pointing_Right".to_string()],
        ));

    let engine = GestureEngine::new(catalog, config)?;

    engine.events().on_discrete_result(|e| {
        println!("body {} performed {} (confidence {:.2})", e.tracking_id, e.name, e.score);
    });
    engine.events().on_result_set(|e| {
        println!("top gestures for body {}: {:?}", e.tracking_id, e.confidence.names());
    });

    // A body enters view
    engine.update_tracking(&[42]);

    // Four frames fill the smoothing window and trigger one report
    for score in [0.6, 0.7, 0.8, 0.9] {
        let mut frame = GestureFrame::new(Utc::now());
        frame.discrete.insert("Pointing_Right".to_string(), score);
        frame.continuous.insert("Swipe".to_string(), score / 2.0);
        engine.ingest(0, &frame)?;
    }

    Ok(())
}
