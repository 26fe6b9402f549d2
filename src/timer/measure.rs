//! Labeled stopwatches
//!
//! Measurements are unrelated to the countdown: each label accumulates its
//! own elapsed time across pause/resume cycles until it is stopped, at which
//! point the record is removed.

use hashbrown::HashMap;

/// Label used when the caller does not care to name a measurement
pub const DEFAULT_LABEL: &str = "";

/// One labeled stopwatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measure {
    /// Time folded in from completed segments
    pub accumulated_ms: u64,

    /// When the current segment began
    pub last_resume_ms: u64,

    pub paused: bool,
}

impl Measure {
    fn started_at(now_ms: u64) -> Self {
        Self {
            accumulated_ms: 0,
            last_resume_ms: now_ms,
            paused: false,
        }
    }

    /// Fold the running segment into the total
    fn fold(&mut self, now_ms: u64) {
        if !self.paused {
            self.accumulated_ms += now_ms.saturating_sub(self.last_resume_ms);
            self.paused = true;
        }
    }
}

/// Measurements keyed by label
#[derive(Debug, Clone, Default)]
pub struct MeasureRegistry {
    records: HashMap<String, Measure>,
}

impl MeasureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin or resume `label`. A running label restarts its current segment.
    pub fn start(&mut self, label: &str, now_ms: u64) {
        let record = self
            .records
            .entry(label.to_string())
            .or_insert_with(|| Measure::started_at(now_ms));
        record.last_resume_ms = now_ms;
        record.paused = false;
    }

    /// Pause `label`, returning its accumulated total (0 if there is no record)
    pub fn pause(&mut self, label: &str, now_ms: u64) -> u64 {
        match self.records.get_mut(label) {
            Some(record) => {
                record.fold(now_ms);
                record.accumulated_ms
            }
            None => 0,
        }
    }

    /// Milliseconds since `label` last resumed, without touching it
    pub fn lap(&self, label: &str, now_ms: u64) -> Option<u64> {
        self.records
            .get(label)
            .map(|record| now_ms.saturating_sub(record.last_resume_ms))
    }

    /// Finish `label`, returning its total and removing the record
    pub fn stop(&mut self, label: &str, now_ms: u64) -> Option<u64> {
        let mut record = self.records.remove(label)?;
        record.fold(now_ms);
        Some(record.accumulated_ms)
    }

    pub fn get(&self, label: &str) -> Option<&Measure> {
        self.records.get(label)
    }

    /// Labels with a live record, sorted
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.records.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_stop_round_trip() {
        let mut measures = MeasureRegistry::new();
        measures.start("x", 1000);
        assert_eq!(measures.stop("x", 1500), Some(500));

        // record is gone
        assert_eq!(measures.lap("x", 2000), None);
        assert_eq!(measures.pause("x", 2000), 0);
        assert_eq!(measures.stop("x", 2000), None);
        assert!(measures.is_empty());
    }

    #[test]
    fn test_pause_resume_accumulates() {
        let mut measures = MeasureRegistry::new();
        measures.start(DEFAULT_LABEL, 0);
        assert_eq!(measures.pause(DEFAULT_LABEL, 300), 300);

        // paused time does not count, repeated pause is a no-op
        assert_eq!(measures.pause(DEFAULT_LABEL, 900), 300);

        measures.start(DEFAULT_LABEL, 1000);
        assert_eq!(measures.lap(DEFAULT_LABEL, 1200), Some(200));
        assert_eq!(measures.stop(DEFAULT_LABEL, 1400), Some(700));
    }

    #[test]
    fn test_stop_while_paused_keeps_total() {
        let mut measures = MeasureRegistry::new();
        measures.start("a", 0);
        measures.pause("a", 250);
        assert_eq!(measures.stop("a", 10_000), Some(250));
    }

    #[test]
    fn test_lap_does_not_mutate() {
        let mut measures = MeasureRegistry::new();
        measures.start("lap", 100);
        assert_eq!(measures.lap("lap", 150), Some(50));
        assert_eq!(measures.lap("lap", 400), Some(300));
        let record = measures.get("lap").copied();
        assert_eq!(
            record,
            Some(Measure {
                accumulated_ms: 0,
                last_resume_ms: 100,
                paused: false,
            })
        );
    }

    #[test]
    fn test_labels_are_independent() {
        let mut measures = MeasureRegistry::new();
        measures.start("a", 0);
        measures.start("b", 100);
        measures.pause("a", 200);

        assert_eq!(measures.labels(), vec!["a", "b"]);
        assert_eq!(measures.stop("b", 600), Some(500));
        assert_eq!(measures.stop("a", 600), Some(200));
    }
}
