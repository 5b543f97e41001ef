//! Playback state machine.
//!
//! A [`PlaybackSession`] owns everything one playback needs: the timeline,
//! the current state and step index, elapsed-time accounting and the single
//! timer that is live in the current state.
//!
//! ## States
//!
//! ```text
//! ready -> countdown-start -> running <-> paused
//!                               |
//!                               +-> countdown-transition -> running ...
//!                               +-> completed
//! any --stop--> ready
//! ```
//!
//! All time arithmetic uses `Instant`s supplied by the caller, so elapsed
//! time stays exact regardless of how late a tick is delivered. The driver
//! asks for [`PlaybackSession::next_deadline`] and calls
//! [`PlaybackSession::fire_due`] when it passes; missed ticks are dropped,
//! never queued.

use crate::audio::{Cue, CuePlayer};
use crate::config::PlaybackConfig;
use crate::history::{SessionSummary, StepRecord};
use crate::timeline::{build_timeline, TimelineStep};
use crate::{Error, Result, WorkoutPlan};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Playback state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Ready,
    CountdownStart,
    Running,
    Paused,
    CountdownTransition,
    Completed,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Ready => "ready",
            PlaybackState::CountdownStart => "countdown-start",
            PlaybackState::Running => "running",
            PlaybackState::Paused => "paused",
            PlaybackState::CountdownTransition => "countdown-transition",
            PlaybackState::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Inputs to the state machine, from the user or from timers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    Start,
    Pause,
    Resume,
    Skip,
    Stop,
    CountdownFinished,
    StepFinished,
}

impl fmt::Display for PlaybackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackEvent::Start => "start",
            PlaybackEvent::Pause => "pause",
            PlaybackEvent::Resume => "resume",
            PlaybackEvent::Skip => "skip",
            PlaybackEvent::Stop => "stop",
            PlaybackEvent::CountdownFinished => "countdown-finished",
            PlaybackEvent::StepFinished => "step-finished",
        };
        f.write_str(name)
    }
}

/// Transition table
///
/// `has_next` tells whether a step follows the current one. Returns `None`
/// for combinations the machine does not accept.
pub fn transition(
    state: PlaybackState,
    event: PlaybackEvent,
    has_next: bool,
) -> Option<PlaybackState> {
    use PlaybackEvent as E;
    use PlaybackState as S;

    match (state, event) {
        (_, E::Stop) => Some(S::Ready),
        (S::Ready, E::Start) => Some(S::CountdownStart),
        (S::CountdownStart, E::CountdownFinished) => Some(S::Running),
        (S::CountdownTransition, E::CountdownFinished) => Some(S::Running),
        (S::Running, E::Pause) => Some(S::Paused),
        (S::Paused, E::Resume) | (S::Paused, E::Start) => Some(S::Running),
        (S::Running, E::StepFinished) if has_next => Some(S::CountdownTransition),
        (S::Running, E::StepFinished) => Some(S::Completed),
        (S::Running, E::Skip) if has_next => Some(S::CountdownTransition),
        _ => None,
    }
}

/// Status of one timeline step
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKind {
    Playback,
    Countdown,
}

/// The one repeating timer live in the current state
#[derive(Clone, Copy, Debug)]
struct ActiveTimer {
    kind: TimerKind,
    period: Duration,
    next_due: Instant,
}

impl ActiveTimer {
    fn new(kind: TimerKind, period: Duration, now: Instant) -> Self {
        Self {
            kind,
            period,
            next_due: now + period,
        }
    }
}

/// Point-in-time view of a session
#[derive(Clone, Debug)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub index: usize,
    pub step: Option<TimelineStep>,
    pub remaining: Duration,
    pub step_elapsed: Duration,
    pub total_elapsed: Duration,
    /// Seconds left on the active countdown, if counting down
    pub countdown: Option<u32>,
    pub statuses: Vec<StepStatus>,
}

/// One playback of a plan
pub struct PlaybackSession {
    plan_id: String,
    plan_name: String,
    timeline: Vec<TimelineStep>,
    config: PlaybackConfig,
    cues: CuePlayer,

    state: PlaybackState,
    index: usize,
    statuses: Vec<StepStatus>,
    step_records: Vec<Duration>,

    /// Elapsed time credited to steps before the current one
    elapsed_before_step: Duration,
    /// Current-step elapsed time from running segments that have ended
    step_accumulated: Duration,
    /// Start of the running segment in progress
    segment_started_at: Option<Instant>,
    elapsed_at_pause: Option<Duration>,
    countdown_remaining: u32,
    warned: Vec<u32>,
    timer: Option<ActiveTimer>,

    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl PlaybackSession {
    /// Create a session in `ready` with a freshly built timeline
    pub fn new(plan: &WorkoutPlan, config: PlaybackConfig, cues: CuePlayer) -> Self {
        let timeline = build_timeline(plan);
        let mut session = Self {
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
            statuses: Vec::new(),
            step_records: Vec::new(),
            timeline,
            config,
            cues,
            state: PlaybackState::Ready,
            index: 0,
            elapsed_before_step: Duration::ZERO,
            step_accumulated: Duration::ZERO,
            segment_started_at: None,
            elapsed_at_pause: None,
            countdown_remaining: 0,
            warned: Vec::new(),
            timer: None,
            started_at: None,
            finished_at: None,
        };
        session.reset_progress();
        session
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn timeline(&self) -> &[TimelineStep] {
        &self.timeline
    }

    pub fn statuses(&self) -> &[StepStatus] {
        &self.statuses
    }

    pub fn current_step(&self) -> Option<&TimelineStep> {
        self.timeline.get(self.index)
    }

    fn has_next(&self) -> bool {
        self.index + 1 < self.timeline.len()
    }

    /// Total elapsed time recorded at the most recent pause
    pub fn elapsed_at_pause(&self) -> Option<Duration> {
        self.elapsed_at_pause
    }

    /// Whether stopping would discard progress and should be confirmed
    pub fn requires_stop_confirmation(&self) -> bool {
        matches!(
            self.state,
            PlaybackState::CountdownStart
                | PlaybackState::Running
                | PlaybackState::Paused
                | PlaybackState::CountdownTransition
        )
    }

    // ------------------------------------------------------------------
    // Time accounting
    // ------------------------------------------------------------------

    /// Elapsed time of the current step
    pub fn step_elapsed(&self, now: Instant) -> Duration {
        let live = self
            .segment_started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default();
        self.step_accumulated + live
    }

    /// Remaining time of the current step, never negative
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.current_step() {
            Some(step) => step_duration(step).saturating_sub(self.step_elapsed(now)),
            None => Duration::ZERO,
        }
    }

    /// Elapsed time of the whole session
    pub fn total_elapsed(&self, now: Instant) -> Duration {
        if self.state == PlaybackState::Completed {
            return self.elapsed_before_step;
        }
        let current = match self.current_step() {
            Some(step) => self.step_elapsed(now).min(step_duration(step)),
            None => Duration::ZERO,
        };
        self.elapsed_before_step + current
    }

    pub fn snapshot(&self, now: Instant) -> PlaybackSnapshot {
        let counting_down = matches!(
            self.state,
            PlaybackState::CountdownStart | PlaybackState::CountdownTransition
        );
        PlaybackSnapshot {
            state: self.state,
            index: self.index,
            step: self.current_step().cloned(),
            remaining: self.remaining(now),
            step_elapsed: self.step_elapsed(now),
            total_elapsed: self.total_elapsed(now),
            countdown: counting_down.then_some(self.countdown_remaining),
            statuses: self.statuses.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    /// When the live timer next wants to fire, if any timer is live
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.map(|t| t.next_due)
    }

    /// Fire the live timer if its deadline has passed
    ///
    /// Returns whether anything fired.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        let Some(timer) = self.timer else {
            return false;
        };
        if now < timer.next_due {
            return false;
        }

        // Reschedule from now so late ticks are superseded rather than queued
        if let Some(t) = self.timer.as_mut() {
            t.next_due = now + t.period;
        }

        match timer.kind {
            TimerKind::Playback => self.tick(now),
            TimerKind::Countdown => self.countdown_tick(now),
        }
        true
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Start from `ready` (begins the start countdown) or resume from `paused`
    pub fn start(&mut self, now: Instant) -> Result<()> {
        if self.state == PlaybackState::Paused {
            return self.resume(now);
        }

        self.apply(PlaybackEvent::Start, now)?;
        self.reset_progress();
        self.started_at = Some(Utc::now());
        tracing::info!(
            "Starting plan {} ({} steps)",
            self.plan_id,
            self.timeline.len()
        );
        self.begin_countdown(self.config.start_countdown_secs, now)
    }

    pub fn pause(&mut self, now: Instant) -> Result<()> {
        self.apply(PlaybackEvent::Pause, now)?;
        let elapsed = self.total_elapsed(now);
        self.elapsed_at_pause = Some(elapsed);
        tracing::info!("Paused at {:.1}s", elapsed.as_secs_f64());
        Ok(())
    }

    pub fn resume(&mut self, now: Instant) -> Result<()> {
        self.apply(PlaybackEvent::Resume, now)?;
        tracing::info!("Resumed at {:.1}s", self.total_elapsed(now).as_secs_f64());
        Ok(())
    }

    /// Skip the current step
    ///
    /// Returns `Ok(false)` without changing anything on the final step.
    pub fn skip(&mut self, now: Instant) -> Result<bool> {
        if self.state == PlaybackState::Running && !self.has_next() {
            tracing::debug!("Skip ignored on final step");
            return Ok(false);
        }

        self.apply(PlaybackEvent::Skip, now)?;

        let elapsed = match self.current_step() {
            Some(step) => self.step_accumulated.min(step_duration(step)),
            None => Duration::ZERO,
        };
        self.statuses[self.index] = StepStatus::Skipped;
        self.step_records[self.index] = elapsed;
        self.elapsed_before_step += elapsed;
        tracing::info!(
            "Skipped step {} after {:.1}s",
            self.index,
            elapsed.as_secs_f64()
        );

        self.advance(now)?;
        Ok(true)
    }

    /// Return to `ready`, discarding all progress
    ///
    /// Callers should confirm first when
    /// [`requires_stop_confirmation`](Self::requires_stop_confirmation) holds.
    pub fn stop(&mut self, now: Instant) -> Result<()> {
        self.apply(PlaybackEvent::Stop, now)?;
        self.reset_progress();
        self.started_at = None;
        self.finished_at = None;
        tracing::info!("Stopped plan {}", self.plan_id);
        Ok(())
    }

    /// Playback tick: update remaining time, fire warnings, finish steps
    pub fn tick(&mut self, now: Instant) {
        if self.state != PlaybackState::Running {
            tracing::debug!("Dropping tick while {}", self.state);
            return;
        }

        let remaining = self.remaining(now);
        if self.current_step().is_some() && !remaining.is_zero() {
            let duration = self.current_step().map(|s| s.duration).unwrap_or(0);
            let crossed: Vec<u32> = self
                .config
                .warning_thresholds_secs
                .iter()
                .copied()
                .filter(|&t| {
                    t < duration
                        && remaining <= Duration::from_secs(u64::from(t))
                        && !self.warned.contains(&t)
                })
                .collect();
            for threshold in crossed {
                tracing::debug!("{}s warning on step {}", threshold, self.index);
                self.warned.push(threshold);
                self.cues.play(Cue::Warning);
            }
            return;
        }

        if let Err(e) = self.finish_step(now) {
            tracing::warn!("Failed to finish step {}: {}", self.index, e);
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Apply an event through the transition table
    ///
    /// Leaving a state always releases its timer; entering `running` or a
    /// countdown acquires the timer that state needs.
    fn apply(&mut self, event: PlaybackEvent, now: Instant) -> Result<()> {
        let next = transition(self.state, event, self.has_next()).ok_or_else(|| {
            Error::InvalidTransition {
                state: self.state.to_string(),
                event: event.to_string(),
            }
        })?;

        self.timer = None;
        if let Some(start) = self.segment_started_at.take() {
            self.step_accumulated += now.saturating_duration_since(start);
        }

        tracing::debug!("{} --{}--> {}", self.state, event, next);
        self.state = next;

        match next {
            PlaybackState::Running => {
                self.segment_started_at = Some(now);
                self.timer = Some(ActiveTimer::new(
                    TimerKind::Playback,
                    self.config.tick_interval(),
                    now,
                ));
            }
            PlaybackState::CountdownStart | PlaybackState::CountdownTransition => {
                self.timer = Some(ActiveTimer::new(TimerKind::Countdown, COUNTDOWN_PERIOD, now));
            }
            PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Completed => {}
        }
        Ok(())
    }

    fn begin_countdown(&mut self, seconds: u32, now: Instant) -> Result<()> {
        if seconds == 0 {
            self.countdown_remaining = 0;
            self.cues.play(Cue::Go);
            return self.apply(PlaybackEvent::CountdownFinished, now);
        }
        self.countdown_remaining = seconds;
        self.cues.play(Cue::CountdownTick);
        Ok(())
    }

    fn countdown_tick(&mut self, now: Instant) {
        self.countdown_remaining = self.countdown_remaining.saturating_sub(1);
        if self.countdown_remaining > 0 {
            self.cues.play(Cue::CountdownTick);
            return;
        }

        self.cues.play(Cue::Go);
        if let Err(e) = self.apply(PlaybackEvent::CountdownFinished, now) {
            tracing::warn!("Countdown finished in unexpected state: {}", e);
        }
    }

    fn finish_step(&mut self, now: Instant) -> Result<()> {
        let credited = self.current_step().map(step_duration);

        self.apply(PlaybackEvent::StepFinished, now)?;

        if let Some(credited) = credited {
            self.statuses[self.index] = StepStatus::Completed;
            self.step_records[self.index] = credited;
            self.elapsed_before_step += credited;
        }

        if self.state == PlaybackState::Completed {
            self.finished_at = Some(Utc::now());
            tracing::info!(
                "Completed plan {} in {:.1}s",
                self.plan_id,
                self.elapsed_before_step.as_secs_f64()
            );
            return Ok(());
        }

        self.advance(now)
    }

    /// Move to the next step and start the transition countdown
    fn advance(&mut self, now: Instant) -> Result<()> {
        self.index += 1;
        self.statuses[self.index] = StepStatus::Running;
        self.step_accumulated = Duration::ZERO;
        self.segment_started_at = None;
        self.warned.clear();
        self.begin_countdown(self.config.transition_countdown_secs, now)
    }

    fn reset_progress(&mut self) {
        self.index = 0;
        self.statuses = vec![StepStatus::Pending; self.timeline.len()];
        if let Some(first) = self.statuses.first_mut() {
            *first = StepStatus::Running;
        }
        self.step_records = vec![Duration::ZERO; self.timeline.len()];
        self.elapsed_before_step = Duration::ZERO;
        self.step_accumulated = Duration::ZERO;
        self.segment_started_at = None;
        self.elapsed_at_pause = None;
        self.countdown_remaining = 0;
        self.warned.clear();
    }

    /// Summary of the session so far, once it has been started
    pub fn summary(&self, now: Instant) -> Option<SessionSummary> {
        let started_at = self.started_at?;
        let completed = self.state == PlaybackState::Completed;

        let steps = self
            .timeline
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let elapsed = if i == self.index && !completed {
                    self.step_elapsed(now).min(step_duration(step))
                } else {
                    self.step_records[i]
                };
                StepRecord {
                    id: step.id.clone(),
                    name: step.display_name().to_string(),
                    status: self.statuses[i],
                    planned_secs: step.duration,
                    elapsed_ms: duration_ms(elapsed),
                }
            })
            .collect();

        Some(SessionSummary {
            id: uuid::Uuid::new_v4(),
            plan_id: self.plan_id.clone(),
            plan_name: self.plan_name.clone(),
            started_at,
            finished_at: self.finished_at.unwrap_or_else(Utc::now),
            completed,
            planned_secs: self
                .timeline
                .iter()
                .fold(0, |total: u32, s| total.saturating_add(s.duration)),
            total_elapsed_ms: duration_ms(self.total_elapsed(now)),
            steps,
        })
    }
}

fn step_duration(step: &TimelineStep) -> Duration {
    Duration::from_secs(u64::from(step.duration))
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
