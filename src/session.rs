use std::time::{Duration, SystemTime};

use crate::util::round2;

/// Source of wall-clock timestamps for a round
pub trait Clock {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum CharStatus {
    Match,
    Mismatch,
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterStatus {
    pub ch: char,
    pub status: CharStatus,
}

/// Render-ready view of a round: one entry per target char plus the caret index
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusProjection {
    pub chars: Vec<CharacterStatus>,
    /// index of the first untyped char; equals the input length
    pub caret: usize,
}

/// One round of typing a target text
#[derive(Debug)]
pub struct TypingSession<C: Clock = SystemClock> {
    target: String,
    input: String,
    started_at: Option<SystemTime>,
    finished_at: Option<SystemTime>,
    words_per_minute: Option<f64>,
    completed: bool,
    clock: C,
}

impl TypingSession<SystemClock> {
    pub fn new(target: impl Into<String>) -> Self {
        Self::with_clock(target, SystemClock)
    }
}

impl<C: Clock> TypingSession<C> {
    pub fn with_clock(target: impl Into<String>, clock: C) -> Self {
        Self {
            target: target.into(),
            input: String::new(),
            started_at: None,
            finished_at: None,
            words_per_minute: None,
            completed: false,
            clock,
        }
    }

    /// Start a new round on `target`, discarding everything from the previous one.
    pub fn reset(&mut self, target: impl Into<String>) {
        self.target = target.into();
        self.input.clear();
        self.started_at = None;
        self.finished_at = None;
        self.words_per_minute = None;
        self.completed = false;
        tracing::debug!(chars = self.char_count(), "round reset");
    }

    /// Feed the full current input value.
    ///
    /// The timer starts only when the value is exactly one char long and no
    /// timer is running, so a multi-char first value (a paste) leaves it
    /// stopped. Completion requires exact equality with the target and is
    /// checked after the timer start. Ignored once the round is completed.
    pub fn on_input(&mut self, value: &str) {
        if self.completed {
            return;
        }

        self.input.clear();
        self.input.push_str(value);

        if value.chars().count() == 1 && self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }

        if value == self.target {
            let finished_at = self.clock.now();
            self.finished_at = Some(finished_at);
            self.words_per_minute = Some(self.calc_wpm(finished_at));
            self.completed = true;
            tracing::info!(
                wpm = self.words_per_minute,
                words = self.word_count(),
                timed = self.started_at.is_some(),
                "round completed"
            );
        }
    }

    fn calc_wpm(&self, finished_at: SystemTime) -> f64 {
        let Some(started_at) = self.started_at else {
            return 0.0;
        };

        let elapsed_ms = finished_at
            .duration_since(started_at)
            .unwrap_or(Duration::ZERO)
            .as_millis() as f64;
        if elapsed_ms <= 0.0 {
            return 0.0;
        }

        let elapsed_minutes = elapsed_ms / 60_000.0;
        round2(self.word_count() as f64 / elapsed_minutes)
    }

    pub fn derive_per_character_status(&self) -> StatusProjection {
        let mut typed = self.input.chars();
        let chars = self
            .target
            .chars()
            .map(|ch| {
                let status = match typed.next() {
                    Some(c) if c == ch => CharStatus::Match,
                    Some(_) => CharStatus::Mismatch,
                    None => CharStatus::Pending,
                };
                CharacterStatus { ch, status }
            })
            .collect();

        StatusProjection {
            chars,
            caret: self.input.chars().count(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<SystemTime> {
        self.finished_at
    }

    pub fn words_per_minute(&self) -> Option<f64> {
        self.words_per_minute
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Words in the target, counted by splitting on single spaces.
    /// Runs of spaces and leading/trailing spaces each add a word.
    pub fn word_count(&self) -> usize {
        self.target.split(' ').count()
    }

    pub fn char_count(&self) -> usize {
        self.target.chars().count()
    }

    /// Time from first keystroke to exact match
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end.duration_since(start).unwrap_or(Duration::ZERO)),
            _ => None,
        }
    }

    /// Time since the first keystroke, up to completion if the round is over
    pub fn running_time(&self) -> Option<Duration> {
        let start = self.started_at?;
        let end = self.finished_at.unwrap_or_else(|| self.clock.now());
        Some(end.duration_since(start).unwrap_or(Duration::ZERO))
    }

    pub fn words_per_second(&self) -> Option<f64> {
        self.words_per_minute.map(|wpm| wpm / 60.0)
    }
}
