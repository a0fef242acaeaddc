//! Run progress shared by the fetch tasks and the layout phase.
//!
//! The counter's range is split in two halves. Each name may complete up to
//! two downloads (front and back), so for `n` names the fetch phase counts
//! up to `2n` and the layout phase moves the counter up from `2n` as pages
//! are finished. `finish` takes it to the maximum `4n` once the run is over.
//! The counter never goes down.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Layout,
    Done,
}

/// Receives every change of the progress counter.
///
/// Calls are made while the counter is locked, so a sink sees values in
/// non-decreasing order even when fetch tasks finish concurrently.
pub trait ProgressSink: Send + Sync {
    fn on_phase(&self, phase: Phase, max: usize) {
        let _ = (phase, max);
    }

    fn on_progress(&self, value: usize, max: usize) {
        let _ = (value, max);
    }
}

pub struct NoopProgress;

impl ProgressSink for NoopProgress {}

pub struct ProgressState {
    max: usize,
    value: Mutex<usize>,
    sink: Arc<dyn ProgressSink>,
}

impl std::fmt::Debug for ProgressState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressState")
            .field("max", &self.max)
            .field("value", &self.value())
            .finish()
    }
}

impl ProgressState {
    /// Progress for a run over `name_count` names.
    pub fn for_names(name_count: usize, sink: Arc<dyn ProgressSink>) -> Self {
        Self::with_max(4 * name_count, sink)
    }

    pub fn with_max(max: usize, sink: Arc<dyn ProgressSink>) -> Self {
        ProgressState {
            max,
            value: Mutex::new(0),
            sink,
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn value(&self) -> usize {
        *self.lock()
    }

    /// End of the fetch phase's range.
    pub fn halfway(&self) -> usize {
        self.max / 2
    }

    pub fn enter_phase(&self, phase: Phase) {
        let _guard = self.lock();
        self.sink.on_phase(phase, self.max);
    }

    /// Count one completed download.
    pub fn increment(&self) -> usize {
        let mut value = self.lock();
        if *value < self.max {
            *value += 1;
            self.sink.on_progress(*value, self.max);
        }
        *value
    }

    /// Move the counter up to `target`. Lower targets leave it unchanged.
    pub fn advance_to(&self, target: usize) -> usize {
        let target = target.min(self.max);
        let mut value = self.lock();
        if target > *value {
            *value = target;
            self.sink.on_progress(*value, self.max);
        }
        *value
    }

    /// Jump to the halfway mark once every fetch task has returned, covering
    /// downloads that never happened.
    pub fn finish_fetch_phase(&self) -> usize {
        self.advance_to(self.halfway())
    }

    /// Record that page `page` (0-indexed) of `total_pages` is rendered.
    /// The last page lands one step short of the maximum; `finish` closes it.
    pub fn page_finished(&self, page: usize, total_pages: usize) -> usize {
        self.advance_to(layout_checkpoint(self.max, page, total_pages))
    }

    pub fn finish(&self) -> usize {
        let value = self.advance_to(self.max);
        self.enter_phase(Phase::Done);
        value
    }
}

/// Counter value after page `page` (0-indexed) of `total_pages`:
/// `floor(max/2 + max * page / (2 * total_pages))`.
pub fn layout_checkpoint(max: usize, page: usize, total_pages: usize) -> usize {
    if total_pages == 0 {
        return max;
    }
    let page = page.min(total_pages);
    (max * total_pages + max * page) / (2 * total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        values: Mutex<Vec<usize>>,
        phases: Mutex<Vec<Phase>>,
    }

    impl ProgressSink for RecordingSink {
        fn on_phase(&self, phase: Phase, _max: usize) {
            self.phases.lock().unwrap().push(phase);
        }

        fn on_progress(&self, value: usize, _max: usize) {
            self.values.lock().unwrap().push(value);
        }
    }

    #[test]
    fn test_max_covers_both_phases() {
        let progress = ProgressState::for_names(3, Arc::new(NoopProgress));
        assert_eq!(progress.max(), 12);
        assert_eq!(progress.halfway(), 6);
        assert_eq!(progress.value(), 0);
    }

    #[test]
    fn test_checkpoints_split_the_upper_half() {
        // Two pages: page 0 stays at the halfway mark, page 1 is three quarters
        assert_eq!(layout_checkpoint(40, 0, 2), 20);
        assert_eq!(layout_checkpoint(40, 1, 2), 30);
        // floor(6 + 12 * 1 / 6) = 8
        assert_eq!(layout_checkpoint(12, 0, 3), 6);
        assert_eq!(layout_checkpoint(12, 1, 3), 8);
        assert_eq!(layout_checkpoint(12, 2, 3), 10);
        assert_eq!(layout_checkpoint(0, 0, 1), 0);
        assert_eq!(layout_checkpoint(10, 7, 3), 10);
    }

    #[test]
    fn test_last_page_stops_short_of_max_until_finish() {
        let sink = Arc::new(RecordingSink::default());
        let progress = ProgressState::with_max(40, sink.clone());
        progress.finish_fetch_phase();
        progress.page_finished(0, 2);
        progress.page_finished(1, 2);
        assert_eq!(progress.value(), 30);
        progress.finish();

        assert_eq!(*sink.values.lock().unwrap(), vec![20, 30, 40]);
    }

    #[test]
    fn test_advance_never_goes_down() {
        let progress = ProgressState::with_max(10, Arc::new(NoopProgress));
        assert_eq!(progress.advance_to(6), 6);
        assert_eq!(progress.advance_to(3), 6);
        assert_eq!(progress.advance_to(50), 10);
        assert_eq!(progress.increment(), 10);
    }

    #[test]
    fn test_sink_sees_a_non_decreasing_run_ending_at_max() {
        let sink = Arc::new(RecordingSink::default());
        let progress = ProgressState::for_names(2, sink.clone());

        progress.enter_phase(Phase::Fetching);
        progress.increment();
        progress.increment();
        progress.increment();
        progress.finish_fetch_phase();
        progress.enter_phase(Phase::Layout);
        progress.page_finished(0, 1);
        progress.finish();

        let values = sink.values.lock().unwrap().clone();
        assert_eq!(values, vec![1, 2, 3, 4, 8]);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.value(), progress.max());
        assert_eq!(
            *sink.phases.lock().unwrap(),
            vec![Phase::Fetching, Phase::Layout, Phase::Done]
        );
    }

    #[test]
    fn test_concurrent_increments_are_counted_once() {
        let sink = Arc::new(RecordingSink::default());
        let progress = Arc::new(ProgressState::for_names(200, sink.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let progress = Arc::clone(&progress);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        progress.increment();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(progress.value(), 400);
        let values = sink.values.lock().unwrap().clone();
        assert_eq!(values, (1..=400).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_run_still_finishes() {
        let progress = ProgressState::for_names(0, Arc::new(NoopProgress));
        progress.finish_fetch_phase();
        progress.page_finished(0, 1);
        assert_eq!(progress.finish(), 0);
        assert_eq!(progress.value(), progress.max());
    }
}
