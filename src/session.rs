use std::time::{Duration, Instant};

use crate::config::SessionConfig;
use crate::input::Input;
use crate::mistakes::{extract_mistakes, tally, Tally};
use crate::reflow::text_dimensions;
use crate::snapshot::RenderState;
use crate::stats::{words_per_minute, SessionStats};
use crate::time_series::TimeSeriesPoint;

/// Live WPM is hidden until this much time has passed, so the first keystroke does not flash a
/// huge number.
pub const LIVE_WPM_THRESHOLD: Duration = Duration::from_millis(10);

/// How a session ended. Only `Complete` carries statistics.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Complete(SessionStats),
    Cancelled,
    EscapedOut,
    NextRequested,
    PreviousRequested,
    ResizeInterrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

fn is_break(c: char) -> bool {
    c == ' ' || c == '\n'
}

/// One play-through of a wrapped segment.
///
/// Positions before `cursor` are either typed or were skipped (left `None`); newline markers
/// are filled in automatically and never need a keystroke.
#[derive(Debug)]
pub struct Session<'a> {
    config: &'a SessionConfig,
    text: Vec<char>,
    typed: Vec<Option<char>>,
    cursor: usize,
    attribution: String,
    time_limit: Option<Duration>,
    started_at: Option<Instant>,
    samples: Vec<TimeSeriesPoint>,
    finished: bool,
}

impl<'a> Session<'a> {
    pub fn new(
        config: &'a SessionConfig,
        wrapped: &str,
        attribution: &str,
        time_limit: Option<Duration>,
    ) -> Self {
        let text: Vec<char> = wrapped.chars().collect();
        Self {
            config,
            typed: vec![None; text.len()],
            text,
            cursor: 0,
            attribution: attribution.to_string(),
            time_limit,
            started_at: None,
            samples: Vec::new(),
            finished: false,
        }
    }

    /// Start the clock without waiting for a keystroke.
    pub fn start(&mut self, now: Instant) {
        self.started_at.get_or_insert(now);
    }

    pub fn phase(&self) -> Phase {
        match (self.finished, self.started_at) {
            (true, _) => Phase::Finished,
            (false, Some(_)) => Phase::Running,
            (false, None) => Phase::Idle,
        }
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn typed(&self) -> &[Option<char>] {
        &self.typed
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn attribution(&self) -> &str {
        &self.attribution
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }

    /// Time left before the deadline; `None` when untimed or not started yet.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.started_at?;
        self.time_limit
            .map(|limit| limit.saturating_sub(self.elapsed(now)))
    }

    pub fn tally(&self) -> Tally {
        tally(&self.text, &self.typed, self.cursor)
    }

    pub fn live_wpm(&self, now: Instant) -> Option<u32> {
        if !self.config.show_wpm || self.started_at.is_none() {
            return None;
        }
        let elapsed = self.elapsed(now);
        (elapsed > LIVE_WPM_THRESHOLD).then(|| words_per_minute(self.tally().correct, elapsed))
    }

    pub fn handle(&mut self, input: Input) -> Option<SessionOutcome> {
        self.handle_at(input, Instant::now())
    }

    /// Apply one input event observed at `now`. Returns the outcome once the session ends;
    /// after that every further input is ignored.
    pub fn handle_at(&mut self, input: Input, now: Instant) -> Option<SessionOutcome> {
        if self.finished {
            return None;
        }

        if input.is_editing() {
            self.start(now);
        }

        match input {
            Input::Cancel => self.finish(SessionOutcome::Cancelled),
            Input::Escape => self.finish(SessionOutcome::EscapedOut),
            Input::Next => self.finish(SessionOutcome::NextRequested),
            Input::Previous => self.finish(SessionOutcome::PreviousRequested),
            Input::Resize => self.finish(SessionOutcome::ResizeInterrupted),
            Input::Redraw => None,
            Input::Tick => self.on_tick(now),
            Input::Backspace => {
                if self.config.allow_backspace {
                    self.backspace();
                }
                None
            }
            Input::DeleteWord => {
                if self.config.allow_backspace {
                    self.delete_word();
                }
                None
            }
            Input::Char(c) => {
                if !self.type_char(c) {
                    return None;
                }
                if self.cursor == self.text.len() {
                    let timed_out = self.deadline_passed(now);
                    let stats = self.stats_at(now, timed_out);
                    return self.finish(SessionOutcome::Complete(stats));
                }
                None
            }
        }
    }

    fn finish(&mut self, outcome: SessionOutcome) -> Option<SessionOutcome> {
        self.finished = true;
        Some(outcome)
    }

    fn deadline_passed(&self, now: Instant) -> bool {
        self.started_at.is_some()
            && self
                .time_limit
                .is_some_and(|limit| self.elapsed(now) >= limit)
    }

    fn on_tick(&mut self, now: Instant) -> Option<SessionOutcome> {
        self.started_at?;

        let elapsed = self.elapsed(now);
        if elapsed > LIVE_WPM_THRESHOLD {
            let wpm = words_per_minute(self.tally().correct, elapsed);
            self.samples
                .push(TimeSeriesPoint::new(elapsed.as_secs_f64(), wpm as f64));
        }

        if self.deadline_passed(now) {
            let stats = self.stats_at(now, true);
            return self.finish(SessionOutcome::Complete(stats));
        }
        None
    }

    /// A space typed here in skip-word mode does nothing.
    fn at_word_boundary(&self) -> bool {
        self.cursor == 0
            || (is_break(self.text[self.cursor - 1]) && self.text[self.cursor] != ' ')
    }

    /// Returns false when the keystroke was ignored.
    fn type_char(&mut self, c: char) -> bool {
        if self.cursor >= self.text.len() {
            return true;
        }

        if self.config.skip_word && c == ' ' {
            if self.at_word_boundary() {
                return false;
            }

            while self.cursor < self.text.len() && !is_break(self.text[self.cursor]) {
                self.typed[self.cursor] = None;
                self.cursor += 1;
            }

            if self.cursor < self.text.len() {
                self.typed[self.cursor] = Some(self.text[self.cursor]);
                self.cursor += 1;
            }
        } else {
            self.typed[self.cursor] = Some(c);
            self.cursor += 1;
        }

        self.consume_newlines();
        true
    }

    fn consume_newlines(&mut self) {
        while self.cursor < self.text.len() && self.text[self.cursor] == '\n' {
            self.typed[self.cursor] = Some('\n');
            self.cursor += 1;
        }
    }

    fn clear_from(&mut self, from: usize, to: usize) {
        for slot in &mut self.typed[from..to] {
            *slot = None;
        }
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let previous = self.cursor;

        self.cursor -= 1;
        while self.cursor > 0 && self.text[self.cursor] == '\n' {
            self.cursor -= 1;
        }

        self.clear_from(self.cursor, previous);
    }

    fn delete_word(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let previous = self.cursor;

        self.cursor -= 1;
        while self.cursor > 0 && is_break(self.text[self.cursor]) {
            self.cursor -= 1;
        }
        while self.cursor > 0 && !is_break(self.text[self.cursor]) {
            self.cursor -= 1;
        }

        if is_break(self.text[self.cursor]) {
            self.typed[self.cursor] = Some(self.text[self.cursor]);
            self.cursor += 1;
        }

        self.clear_from(self.cursor, previous);
    }

    /// Statistics over everything before the cursor.
    pub fn stats_at(&self, now: Instant, timed_out: bool) -> SessionStats {
        let Tally { correct, errors } = self.tally();
        SessionStats {
            errors,
            correct,
            elapsed: self.elapsed(now),
            mistakes: extract_mistakes(&self.text, &self.typed, self.cursor),
            wpm_samples: self.samples.clone(),
            timed_out,
        }
    }

    pub fn snapshot(&self) -> RenderState {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> RenderState {
        let (lines, cursor) = RenderState::classify(&self.text, &self.typed, self.cursor);
        let wrapped: String = self.text.iter().collect();
        RenderState {
            lines,
            cursor,
            columns: text_dimensions(&wrapped).0,
            attribution: self.attribution.clone(),
            remaining: self.remaining(now),
            live_wpm: self.live_wpm(now),
        }
    }
}
