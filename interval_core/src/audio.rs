//! Audible cues.
//!
//! Playback only ever asks for "a tone at this frequency for this long".
//! Tone failures are logged where they happen and never reach the
//! playback state machine.

use crate::config::AudioConfig;
use crate::{Error, Result};
use std::io::Write;

/// Anything that can emit a tone
pub trait ToneSink {
    fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<()>;
}

/// Sink that drops every tone
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSink;

impl ToneSink for SilentSink {
    fn play_tone(&mut self, _frequency_hz: u32, _duration_ms: u32) -> Result<()> {
        Ok(())
    }
}

/// Sink that rings the terminal bell
///
/// Terminals have no pitch control, so the frequency is only logged.
pub struct TerminalBell<W: Write> {
    out: W,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ToneSink for TerminalBell<W> {
    fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<()> {
        tracing::debug!("Bell for {} Hz / {} ms tone", frequency_hz, duration_ms);
        self.out
            .write_all(b"\x07")
            .and_then(|_| self.out.flush())
            .map_err(|e| Error::Audio(e.to_string()))
    }
}

/// Cue vocabulary used by playback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// One tone per second of a countdown
    CountdownTick,
    /// Final countdown tone, step begins
    Go,
    /// Step is about to end
    Warning,
}

/// Maps cues to tones and swallows tone failures
pub struct CuePlayer {
    sink: Box<dyn ToneSink>,
    config: AudioConfig,
}

impl CuePlayer {
    pub fn new(sink: Box<dyn ToneSink>, config: AudioConfig) -> Self {
        Self { sink, config }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(SilentSink), AudioConfig::default())
    }

    pub fn play(&mut self, cue: Cue) {
        if !self.config.enabled {
            return;
        }

        let (frequency_hz, duration_ms) = match cue {
            Cue::CountdownTick => (self.config.countdown_hz, self.config.tone_ms),
            Cue::Go => (self.config.go_hz, self.config.go_tone_ms),
            Cue::Warning => (self.config.warning_hz, self.config.tone_ms),
        };

        if let Err(e) = self.sink.play_tone(frequency_hz, duration_ms) {
            tracing::warn!("Failed to play {:?} cue: {}", cue, e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every tone it is asked to play
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) tones: Rc<RefCell<Vec<(u32, u32)>>>,
    }

    impl ToneSink for RecordingSink {
        fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<()> {
            self.tones.borrow_mut().push((frequency_hz, duration_ms));
            Ok(())
        }
    }

    struct BrokenSink;

    impl ToneSink for BrokenSink {
        fn play_tone(&mut self, _frequency_hz: u32, _duration_ms: u32) -> Result<()> {
            Err(Error::Audio("no output device".into()))
        }
    }

    #[test]
    fn test_cues_map_to_configured_tones() {
        let sink = RecordingSink::default();
        let mut player = CuePlayer::new(Box::new(sink.clone()), AudioConfig::default());

        player.play(Cue::CountdownTick);
        player.play(Cue::Go);
        player.play(Cue::Warning);

        assert_eq!(*sink.tones.borrow(), vec![(660, 150), (880, 400), (520, 150)]);
    }

    #[test]
    fn test_disabled_audio_plays_nothing() {
        let sink = RecordingSink::default();
        let config = AudioConfig {
            enabled: false,
            ..AudioConfig::default()
        };
        let mut player = CuePlayer::new(Box::new(sink.clone()), config);
        player.play(Cue::Go);
        assert!(sink.tones.borrow().is_empty());
    }

    #[test]
    fn test_tone_failure_is_swallowed() {
        crate::logging::init_test();
        let mut player = CuePlayer::new(Box::new(BrokenSink), AudioConfig::default());
        player.play(Cue::Warning);
    }

    #[test]
    fn test_terminal_bell_writes_bel() {
        let mut buf = Vec::new();
        TerminalBell::new(&mut buf).play_tone(440, 100).unwrap();
        assert_eq!(buf, b"\x07");
    }
}
