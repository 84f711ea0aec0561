use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::mistakes::Mistake;
use crate::time_series::TimeSeriesPoint;

/// Characters counted as one word for WPM.
pub const CHARS_PER_WORD: u32 = 5;

pub fn chars_per_minute(correct: usize, elapsed: Duration) -> u32 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0;
    }
    (correct as f64 * 60.0 / secs) as u32
}

pub fn words_per_minute(correct: usize, elapsed: Duration) -> u32 {
    chars_per_minute(correct, elapsed) / CHARS_PER_WORD
}

/// Share of correct keystrokes in percent, 0 when nothing was typed.
pub fn accuracy(correct: usize, errors: usize) -> f64 {
    let total = correct + errors;
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        None
    } else {
        Some(data.iter().sum::<f64>() / data.len() as f64)
    }
}

/// Population standard deviation.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;
    Some(variance.sqrt())
}

/// Result of one segment that ran to completion or to its deadline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub errors: usize,
    pub correct: usize,
    pub elapsed: Duration,
    pub mistakes: Vec<Mistake>,
    pub wpm_samples: Vec<TimeSeriesPoint>,
    pub timed_out: bool,
}

impl SessionStats {
    pub fn cpm(&self) -> u32 {
        chars_per_minute(self.correct, self.elapsed)
    }

    pub fn wpm(&self) -> u32 {
        words_per_minute(self.correct, self.elapsed)
    }

    pub fn accuracy(&self) -> f64 {
        accuracy(self.correct, self.errors)
    }
}

/// Totals across the segments of one test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    pub errors: usize,
    pub correct: usize,
    pub duration: Duration,
    pub mistakes: Vec<Mistake>,
    pub wpm_samples: Vec<TimeSeriesPoint>,
    pub timed_out: bool,
}

impl AggregateResult {
    pub fn absorb(&mut self, stats: SessionStats) {
        let offset = self.duration;
        self.errors += stats.errors;
        self.correct += stats.correct;
        self.duration += stats.elapsed;
        self.mistakes.extend(stats.mistakes);
        self.wpm_samples
            .extend(stats.wpm_samples.into_iter().map(|p| p.shifted(offset)));
        self.timed_out |= stats.timed_out;
    }

    pub fn cpm(&self) -> u32 {
        chars_per_minute(self.correct, self.duration)
    }

    pub fn wpm(&self) -> u32 {
        words_per_minute(self.correct, self.duration)
    }

    pub fn accuracy(&self) -> f64 {
        accuracy(self.correct, self.errors)
    }
}

/// The reported outcome of one completed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub wpm: u32,
    pub cpm: u32,
    pub accuracy: f64,
    /// Standard deviation of the live WPM samples.
    pub consistency: f64,
    pub duration_secs: f64,
    pub timestamp: DateTime<Local>,
    pub mistakes: Vec<Mistake>,
    pub wpms: Vec<u32>,
}

impl TestResult {
    pub fn from_aggregate(aggregate: &AggregateResult, timestamp: DateTime<Local>) -> Self {
        let samples: Vec<f64> = aggregate.wpm_samples.iter().map(|p| p.wpm).collect();
        Self {
            wpm: aggregate.wpm(),
            cpm: aggregate.cpm(),
            accuracy: aggregate.accuracy(),
            consistency: std_dev(&samples).unwrap_or(0.0),
            duration_secs: aggregate.duration.as_secs_f64(),
            timestamp,
            mistakes: aggregate.mistakes.clone(),
            wpms: samples.iter().map(|w| w.round() as u32).collect(),
        }
    }
}

/// Receives one result per completed test.
pub trait ResultSink {
    fn record(&mut self, result: TestResult);
}

/// Results of the current run, kept in memory only.
#[derive(Debug, Default)]
pub struct ResultsHistory {
    results: Vec<TestResult>,
}

impl ResultsHistory {
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn best_wpm(&self) -> Option<u32> {
        self.results.iter().map(|r| r.wpm).max()
    }
}

impl ResultSink for ResultsHistory {
    fn record(&mut self, result: TestResult) {
        self.results.push(result);
    }
}
