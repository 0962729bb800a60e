use crate::host::ProgressSink;

/// Apportions the run's 0..=100 range across users.
///
/// Each user owns `100 / user_count`; traversal fills the first half of that
/// share and bucket flushes the second. Reported values never decrease.
pub(crate) struct RunProgress<'a> {
    sink: &'a dyn ProgressSink,
    current: f64,
    user_count: usize,
    user_share: f64,
}

impl<'a> RunProgress<'a> {
    pub(crate) fn new(sink: &'a dyn ProgressSink, user_count: usize) -> Self {
        let user_share = if user_count == 0 { 0.0 } else { 100.0 / user_count as f64 };
        Self { sink, current: 0.0, user_count, user_share }
    }

    pub(crate) fn user_share(&self) -> f64 {
        self.user_share
    }

    pub(crate) fn current(&self) -> f64 {
        self.current
    }

    /// Start of user `index`'s share; past the last user this is exactly 100.
    pub(crate) fn user_start(&self, index: usize) -> f64 {
        if index >= self.user_count {
            100.0
        } else {
            index as f64 * self.user_share
        }
    }

    /// Move forward to `target`, never backwards.
    pub(crate) fn advance_to(&mut self, target: f64) {
        let target = target.min(100.0);
        if target > self.current {
            self.current = target;
            self.sink.report(self.current);
        }
    }

    /// Snap to the end of user `index`'s share.
    pub(crate) fn finish_user(&mut self, index: usize) {
        self.advance_to(self.user_start(index + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_shares_and_monotonic_reports() {
        let reports = Mutex::new(Vec::new());
        let sink = |p: f64| reports.lock().unwrap().push(p);
        let mut progress = RunProgress::new(&sink, 4);
        assert_eq!(progress.user_share(), 25.0);

        progress.advance_to(10.0);
        progress.advance_to(5.0);
        progress.finish_user(0);
        progress.finish_user(0);
        progress.finish_user(3);
        progress.advance_to(150.0);

        let reports = reports.into_inner().unwrap();
        assert_eq!(reports, vec![10.0, 25.0, 100.0]);
    }

    #[test]
    fn test_last_user_ends_at_exactly_one_hundred() {
        let sink = |_: f64| {};
        let mut progress = RunProgress::new(&sink, 7);
        progress.finish_user(6);
        assert_eq!(progress.current(), 100.0);
    }
}
