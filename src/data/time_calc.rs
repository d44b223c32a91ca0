use std::time::Duration;

/// Accumulates per-stage durations over repeated runs.
#[derive(Debug, Default)]
pub struct TimeCalc {
    n: usize,
    duration: Vec<Duration>,
}

impl TimeCalc {
    pub fn total(&self) -> Duration {
        self.duration.iter().sum::<Duration>()
    }

    /// Number of completed runs.
    pub fn n(&self) -> usize {
        if self.duration.is_empty() {
            return 0;
        }
        self.n / self.duration.len()
    }

    pub fn avg(&self) -> Duration {
        match self.n() {
            0 => Duration::ZERO,
            n => self.total() / n as u32,
        }
    }

    pub fn avg_i(&self, i: usize) -> Option<Duration> {
        match (self.duration.get(i), self.n()) {
            (Some(_), 0) | (None, _) => None,
            (Some(d), n) => Some(*d / n as u32),
        }
    }

    pub fn add_or_push(&mut self, i: usize, x: Duration) {
        match self.duration.get_mut(i) {
            Some(elem) => *elem += x,
            None => {
                if i >= self.duration.len() {
                    self.duration.push(x)
                }
            }
        }
        self.n += 1;
    }

    /// One line of per-stage averages, e.g. `pre: 2ms | run: 4ms | avg: 6ms | n: 2`.
    pub fn summary(&self, stages: &[&str]) -> String {
        let mut parts = stages
            .iter()
            .enumerate()
            .filter_map(|(i, stage)| self.avg_i(i).map(|d| format!("{stage}: {d:?}")))
            .collect::<Vec<_>>();
        parts.push(format!("avg: {:?}", self.avg()));
        parts.push(format!("n: {}", self.n()));
        parts.join(" | ")
    }

    pub fn clear(&mut self) {
        self.n = Default::default();
        self.duration = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_per_stage() {
        let mut t = TimeCalc::default();
        assert_eq!(t.avg(), Duration::ZERO);
        for _ in 0..2 {
            t.add_or_push(0, Duration::from_millis(2));
            t.add_or_push(1, Duration::from_millis(4));
        }
        assert_eq!(t.n(), 2);
        assert_eq!(t.avg_i(1), Some(Duration::from_millis(4)));
        assert_eq!(t.avg(), Duration::from_millis(6));
        t.clear();
        assert_eq!(t.n(), 0);
    }

    #[test]
    fn summary_lists_recorded_stages() {
        let mut t = TimeCalc::default();
        assert_eq!(t.summary(&["pre", "run"]), "avg: 0ns | n: 0");
        t.add_or_push(0, Duration::from_millis(2));
        t.add_or_push(1, Duration::from_millis(4));
        assert_eq!(t.summary(&["pre", "run", "post"]), "pre: 2ms | run: 4ms | avg: 6ms | n: 1");
    }
}
