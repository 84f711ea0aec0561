use std::time::{Duration, Instant};

use chrono::Local;
use ratatui::{backend::Backend, Terminal};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::input::Input;
use crate::reflow::{effective_width, reflow};
use crate::runtime::{EventChannel, Ticker, TICK_RATE_MS};
use crate::session::{Session, SessionOutcome};
use crate::sources::{Segment, SegmentSource};
use crate::stats::{AggregateResult, ResultSink, SessionStats, TestResult};
use crate::theme::Theme;
use crate::time_series::TimeSeriesPoint;
use crate::ui;

/// Everything a run borrows from its caller.
pub struct Context<'a, B: Backend> {
    pub terminal: &'a mut Terminal<B>,
    pub events: &'a EventChannel,
    pub theme: &'a Theme,
    pub sink: &'a mut dyn ResultSink,
}

#[derive(Debug, Clone, Copy)]
pub struct DriverOptions {
    /// Requested text width; narrowed to fit the terminal.
    pub width: usize,
    pub oneshot: bool,
    pub tick: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            width: 80,
            oneshot: false,
            tick: Duration::from_millis(TICK_RATE_MS),
        }
    }
}

/// Tests generated so far, plus the position of the one being played.
pub struct TestQueue {
    source: Box<dyn SegmentSource>,
    tests: Vec<Vec<Segment>>,
    current: usize,
}

impl TestQueue {
    pub fn new(source: Box<dyn SegmentSource>) -> Self {
        Self {
            source,
            tests: Vec::new(),
            current: 0,
        }
    }

    /// The test at the current index, pulling a new one from the source if needed.
    pub fn current(&mut self) -> Result<&[Segment]> {
        while self.tests.len() <= self.current {
            let test = self.source.next_test()?;
            if test.is_empty() || test.iter().any(|s| s.text.trim().is_empty()) {
                return Err(Error::EmptySource("segment source".to_string()));
            }
            debug!(index = self.tests.len(), segments = test.len(), "generated test");
            self.tests.push(test);
        }
        Ok(&self.tests[self.current])
    }

    pub fn advance(&mut self) {
        self.current += 1;
    }

    pub fn retreat(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn index(&self) -> usize {
        self.current
    }
}

/// How one multi-segment test ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TestOutcome {
    Complete(AggregateResult),
    Cancelled,
    EscapedOut,
    NextRequested,
    PreviousRequested,
    ResizeInterrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Cancelled,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Cancelled => 1,
        }
    }
}

/// Charge a finished segment against the test's time budget.
/// Returns what is left and whether the test is out of time.
fn charge_budget(budget: Option<Duration>, stats: &SessionStats) -> (Option<Duration>, bool) {
    let left = budget.map(|left| left.saturating_sub(stats.elapsed));
    let out_of_time = stats.timed_out || left.is_some_and(|left| left.is_zero());
    (left, out_of_time)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportAction {
    Continue,
    Cancel,
}

pub struct Driver<'a, B: Backend> {
    ctx: Context<'a, B>,
    config: &'a SessionConfig,
    options: DriverOptions,
    queue: TestQueue,
}

impl<'a, B: Backend> Driver<'a, B> {
    pub fn new(
        ctx: Context<'a, B>,
        config: &'a SessionConfig,
        options: DriverOptions,
        source: Box<dyn SegmentSource>,
    ) -> Self {
        Self {
            ctx,
            config,
            options,
            queue: TestQueue::new(source),
        }
    }

    /// Play tests until the user leaves, cancels, or a oneshot run completes.
    pub fn run(&mut self) -> Result<ExitStatus> {
        loop {
            let segments = self.queue.current()?.to_vec();
            info!(test = self.queue.index(), segments = segments.len(), "starting test");

            match self.play_test(&segments)? {
                TestOutcome::Complete(aggregate) => {
                    let result = TestResult::from_aggregate(&aggregate, Local::now());
                    info!(
                        wpm = result.wpm,
                        accuracy = result.accuracy,
                        mistakes = result.mistakes.len(),
                        "test complete"
                    );
                    self.ctx.sink.record(result.clone());

                    let attribution = match segments.as_slice() {
                        [only] => only.attribution.as_str(),
                        _ => "",
                    };
                    let action = self.show_report(&result, &aggregate.wpm_samples, attribution)?;
                    if action == ReportAction::Cancel {
                        return Ok(ExitStatus::Cancelled);
                    }
                    if self.options.oneshot {
                        return Ok(ExitStatus::Success);
                    }
                    self.queue.advance();
                }
                TestOutcome::NextRequested => self.queue.advance(),
                TestOutcome::PreviousRequested => self.queue.retreat(),
                TestOutcome::ResizeInterrupted => debug!("replaying test after resize"),
                TestOutcome::Cancelled => {
                    info!("run cancelled");
                    return Ok(ExitStatus::Cancelled);
                }
                TestOutcome::EscapedOut => return Ok(ExitStatus::Success),
            }
        }
    }

    /// Play the segments of one test in order, sharing a single time budget.
    pub fn play_test(&mut self, segments: &[Segment]) -> Result<TestOutcome> {
        let mut aggregate = AggregateResult::default();
        let mut budget = self.config.timeout;

        for (idx, segment) in segments.iter().enumerate() {
            let stats = match self.play_segment(segment, idx != 0, budget)? {
                SessionOutcome::Complete(stats) => stats,
                SessionOutcome::Cancelled => return Ok(TestOutcome::Cancelled),
                SessionOutcome::EscapedOut => return Ok(TestOutcome::EscapedOut),
                SessionOutcome::NextRequested => return Ok(TestOutcome::NextRequested),
                SessionOutcome::PreviousRequested => return Ok(TestOutcome::PreviousRequested),
                SessionOutcome::ResizeInterrupted => return Ok(TestOutcome::ResizeInterrupted),
            };

            let (left, out_of_time) = charge_budget(budget, &stats);
            budget = left;
            aggregate.absorb(stats);

            if out_of_time {
                debug!(segment = idx, "time budget exhausted");
                aggregate.timed_out = true;
                break;
            }
        }

        Ok(TestOutcome::Complete(aggregate))
    }

    fn play_segment(
        &mut self,
        segment: &Segment,
        start_immediately: bool,
        time_limit: Option<Duration>,
    ) -> Result<SessionOutcome> {
        let available = self.ctx.terminal.size()?.width as usize;
        let wrapped = reflow(&segment.text, effective_width(self.options.width, available));

        let mut session = Session::new(self.config, &wrapped, &segment.attribution, time_limit);
        if start_immediately {
            session.start(Instant::now());
        }

        let ticker = Ticker::spawn(self.ctx.events.sender(), self.options.tick);
        let outcome = self.segment_loop(&mut session);
        ticker.stop();
        outcome
    }

    fn segment_loop(&mut self, session: &mut Session) -> Result<SessionOutcome> {
        let theme = self.ctx.theme;
        loop {
            let state = session.snapshot();
            self.ctx
                .terminal
                .draw(|frame| ui::draw_session(frame, &state, theme))?;

            let event = self.ctx.events.recv()?;
            let Some(input) = Input::from_event(&event) else {
                continue;
            };

            if input == Input::Redraw {
                self.ctx.terminal.clear()?;
            }
            if let Some(outcome) = session.handle(input) {
                return Ok(outcome);
            }
        }
    }

    fn show_report(
        &mut self,
        result: &TestResult,
        samples: &[TimeSeriesPoint],
        attribution: &str,
    ) -> Result<ReportAction> {
        let theme = self.ctx.theme;
        loop {
            self.ctx
                .terminal
                .draw(|frame| ui::draw_report(frame, result, samples, attribution, theme))?;

            match Input::from_event(&self.ctx.events.recv()?) {
                Some(Input::Escape) => return Ok(ReportAction::Continue),
                Some(Input::Cancel) => return Ok(ReportAction::Cancel),
                Some(Input::Redraw) => self.ctx.terminal.clear()?,
                _ => {}
            }
        }
    }
}
