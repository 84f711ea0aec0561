use std::time::Duration;

/// Live WPM measured `t` seconds into a test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }

    /// The same sample shifted later by `offset`, used when segments are concatenated.
    pub fn shifted(self, offset: Duration) -> Self {
        Self {
            t: self.t + offset.as_secs_f64(),
            wpm: self.wpm,
        }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_moves_time_only() {
        let p = TimeSeriesPoint::new(1.5, 42.0).shifted(Duration::from_millis(2500));
        assert_eq!(p, TimeSeriesPoint::new(4.0, 42.0));
        assert_eq!(<(f64, f64)>::from(p), (4.0, 42.0));
    }
}
