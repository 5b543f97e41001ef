//! Terminal playback driver.
//!
//! Runs a [`PlaybackSession`] on the calling thread. A reader thread turns
//! stdin lines into commands and forwards them over a channel; the driver
//! waits on that channel until the session's next timer deadline.

use interval_core::history::{JsonlSink, SummarySink};
use interval_core::{
    Config, CuePlayer, PlaybackSession, PlaybackSnapshot, PlaybackState, Result, SessionSummary,
    SilentSink, StepStatus, TerminalBell, ToneSink, WorkoutPlan,
};
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Wait used while no timer is live (paused)
const IDLE_WAIT: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Pause,
    Resume,
    Skip,
    Quit,
    Yes,
    No,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "p" | "pause" => Some(Command::Pause),
            "r" | "resume" => Some(Command::Resume),
            "s" | "skip" => Some(Command::Skip),
            "q" | "quit" | "stop" => Some(Command::Quit),
            "y" | "yes" => Some(Command::Yes),
            "n" | "no" | "" => Some(Command::No),
            _ => None,
        }
    }
}

fn spawn_input_reader() -> Receiver<Command> {
    let (tx, rx) = channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match Command::parse(&line) {
                Some(cmd) => {
                    if tx.send(cmd).is_err() {
                        break;
                    }
                }
                None => eprintln!("Unknown command: {}", line.trim()),
            }
        }
    });
    rx
}

/// Play a plan to completion or until the user stops it
pub fn play(plan: &WorkoutPlan, config: &Config, silent: bool, history_path: &Path) -> Result<()> {
    let sink: Box<dyn ToneSink> = if silent {
        Box::new(SilentSink)
    } else {
        Box::new(TerminalBell::new(io::stderr()))
    };
    let cues = CuePlayer::new(sink, config.audio.clone());
    let mut session = PlaybackSession::new(plan, config.playback.clone(), cues);

    println!("\n▶ {}", plan.name);
    println!("  p = pause, r = resume, s = skip, q = stop\n");

    let commands = spawn_input_reader();
    let mut input_open = true;
    let mut confirming_stop = false;
    let mut paused_for_confirm = false;
    let mut last_line = String::new();

    session.start(Instant::now())?;

    loop {
        let now = Instant::now();
        session.fire_due(now);
        render(&session.snapshot(now), &mut last_line);

        if session.state() == PlaybackState::Completed {
            break;
        }

        let wait = session
            .next_deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_WAIT);

        let received = if input_open {
            match commands.recv_timeout(wait) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => {
                    input_open = false;
                    None
                }
            }
        } else {
            thread::sleep(wait);
            None
        };

        // Nobody can answer a prompt or resume once stdin is gone
        if !input_open && (confirming_stop || session.state() == PlaybackState::Paused) {
            confirming_stop = false;
            paused_for_confirm = false;
            if session.state() == PlaybackState::Paused {
                session.resume(Instant::now())?;
            }
        }

        let Some(cmd) = received else { continue };
        let now = Instant::now();

        if confirming_stop {
            confirming_stop = false;
            if cmd == Command::Yes {
                let summary = session.summary(now);
                session.stop(now)?;
                println!("■ Stopped.");
                if let Some(summary) = summary {
                    record(&summary, history_path);
                }
                return Ok(());
            }
            if paused_for_confirm {
                paused_for_confirm = false;
                session.resume(now)?;
            }
            println!("Continuing.");
            continue;
        }

        let outcome = match cmd {
            Command::Pause => session.pause(now).map(|_| println!("⏸ Paused")),
            Command::Resume => session.resume(now).map(|_| println!("▶ Resumed")),
            Command::Skip => session.skip(now).map(|skipped| {
                if !skipped {
                    println!("Last interval, nothing to skip to.");
                }
            }),
            Command::Quit => {
                if session.requires_stop_confirmation() {
                    if session.state() == PlaybackState::Running {
                        session.pause(now)?;
                        paused_for_confirm = true;
                    }
                    confirming_stop = true;
                    println!("Stop workout? [y/N]");
                    Ok(())
                } else {
                    session.stop(now)?;
                    return Ok(());
                }
            }
            Command::Yes | Command::No => Ok(()),
        };

        if let Err(e) = outcome {
            tracing::debug!("Ignored command {:?}: {}", cmd, e);
            println!("Can't do that right now ({}).", session.state());
        }
    }

    let Some(summary) = session.summary(Instant::now()) else {
        return Ok(());
    };
    print_summary(&summary);
    record(&summary, history_path);
    Ok(())
}

/// Print a status line whenever the displayed text changes
fn render(snapshot: &PlaybackSnapshot, last_line: &mut String) {
    let total = snapshot.statuses.len();
    let name = snapshot
        .step
        .as_ref()
        .map(|s| s.display_name().to_string())
        .unwrap_or_default();

    let line = match snapshot.state {
        PlaybackState::CountdownStart => {
            format!("Starting in {}…", snapshot.countdown.unwrap_or(0))
        }
        PlaybackState::CountdownTransition => format!(
            "Next: {} in {}…",
            name,
            snapshot.countdown.unwrap_or(0)
        ),
        PlaybackState::Running => format!(
            "[{}/{}] {:<12} {} left   total {}",
            snapshot.index + 1,
            total,
            name,
            clock(ceil_secs(snapshot.remaining)),
            clock(snapshot.total_elapsed.as_secs())
        ),
        PlaybackState::Paused => format!(
            "[{}/{}] {:<12} paused with {} left",
            snapshot.index + 1,
            total,
            name,
            clock(ceil_secs(snapshot.remaining))
        ),
        PlaybackState::Completed | PlaybackState::Ready => return,
    };

    if line != *last_line {
        println!("{}", line);
        *last_line = line;
    }
}

fn print_summary(summary: &SessionSummary) {
    println!("\n✓ Workout complete!");
    println!(
        "  Time: {} of {} planned",
        clock(summary.total_elapsed_ms / 1000),
        clock(u64::from(summary.planned_secs))
    );
    println!(
        "  Intervals: {} completed, {} skipped",
        summary.count(StepStatus::Completed),
        summary.count(StepStatus::Skipped)
    );
    for step in &summary.steps {
        println!(
            "    {:<12} {:>6}  {:?}",
            step.name,
            clock(step.elapsed_ms / 1000),
            step.status
        );
    }
}

/// Append to history; a failed write only costs the record
fn record(summary: &SessionSummary, history_path: &Path) {
    let mut sink = JsonlSink::new(history_path);
    if let Err(e) = sink.append(summary) {
        tracing::warn!("Failed to record session: {}", e);
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

/// Format seconds as m:ss (or h:mm:ss)
pub fn clock(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}
