//! Score smoothing window
//!
//! Recognition scores are noisy frame to frame. Each detector buffers raw
//! score maps in a fixed ring and emits one averaged map per `window_size`
//! frames: sample N, emit 1, repeat. The buffer is allocated once and never
//! resized; emission resets only the fill counter, not the slot contents.

use crate::types::ScoreMap;

/// Fixed-size window over per-frame score maps
///
/// The reported key set of an averaged map is the key set of the first frame
/// of the current cycle. Names that start scoring mid-cycle surface in the
/// next cycle; names missing from a later slot contribute 0 to the average.
#[derive(Debug)]
pub(crate) struct ScoreWindow {
    slots: Vec<ScoreMap>,
    cursor: usize,
    filled: usize,
}

impl ScoreWindow {
    /// Create a window of `size` slots; a size below 1 is treated as 1
    pub(crate) fn new(size: usize) -> Self {
        Self {
            slots: vec![ScoreMap::new(); size.max(1)],
            cursor: 0,
            filled: 0,
        }
    }

    /// Number of frames buffered since the last emission
    #[cfg(test)]
    pub(crate) fn fill_count(&self) -> usize {
        self.filled
    }

    /// Buffer one frame's scores; returns the averaged map once per cycle
    pub(crate) fn push(&mut self, scores: &ScoreMap) -> Option<ScoreMap> {
        self.slots[self.cursor] = scores.clone();
        self.cursor = (self.cursor + 1) % self.slots.len();
        self.filled += 1;

        if self.filled < self.slots.len() {
            return None;
        }
        self.filled = 0;
        Some(self.average())
    }

    fn average(&self) -> ScoreMap {
        let size = self.slots.len();
        if size == 1 {
            return self.slots[0].clone();
        }

        // The cursor is back at 0 whenever a cycle completes, so slot 0 is
        // always the first frame of the cycle being averaged.
        let mut averaged = ScoreMap::with_capacity(self.slots[0].len());
        for name in self.slots[0].keys() {
            let sum: f32 = self
                .slots
                .iter()
                .map(|slot| slot.get(name).copied().unwrap_or(0.0))
                .sum();
            averaged.insert(name.clone(), sum / size as f32);
        }
        averaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(entries: &[(&str, f32)]) -> ScoreMap {
        entries
            .iter()
            .map(|(n, s)| (n.to_string(), *s))
            .collect()
    }

    #[test]
    fn test_ready_exactly_every_n_pushes() {
        let mut window = ScoreWindow::new(4);
        for cycle in 0..3 {
            for i in 0..3 {
                assert!(
                    window.push(&scores(&[("g", 0.5)])).is_none(),
                    "cycle {} push {} must not be ready",
                    cycle,
                    i
                );
            }
            assert!(window.push(&scores(&[("g", 0.5)])).is_some());
        }
    }

    #[test]
    fn test_average_over_window() {
        let mut window = ScoreWindow::new(4);
        window.push(&scores(&[("g", 0.2)]));
        window.push(&scores(&[("g", 0.4)]));
        window.push(&scores(&[("g", 0.6)]));
        let averaged = window.push(&scores(&[("g", 0.8)])).unwrap();
        assert!((averaged["g"] - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_size_one_is_identity() {
        let mut window = ScoreWindow::new(1);
        let averaged = window.push(&scores(&[("g", 0.7)])).unwrap();
        assert_eq!(averaged, scores(&[("g", 0.7)]));
    }

    #[test]
    fn test_missing_keys_count_as_zero() {
        let mut window = ScoreWindow::new(2);
        window.push(&scores(&[("g", 1.0)]));
        let averaged = window.push(&scores(&[])).unwrap();
        assert!((averaged["g"] - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_first_slot_defines_reported_keys() {
        let mut window = ScoreWindow::new(2);
        window.push(&scores(&[("a", 1.0)]));
        let averaged = window.push(&scores(&[("a", 1.0), ("late", 1.0)])).unwrap();
        assert!(averaged.contains_key("a"));
        assert!(!averaged.contains_key("late"));

        // The late name surfaces in the next cycle
        window.push(&scores(&[("late", 1.0)]));
        let averaged = window.push(&scores(&[("late", 0.5)])).unwrap();
        assert!((averaged["late"] - 0.75).abs() < f32::EPSILON);
    }
}
