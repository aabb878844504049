//! Single-track playback transport.
//!
//! # Invariants
//! - The output is re-bound only when the requested audio reference changes.
//! - A failed start never leaves the player in `Playing`.

use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl Display for PlaybackState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Stopped => f.write_str("stopped"),
            PlaybackState::Playing => f.write_str("playing"),
            PlaybackState::Paused => f.write_str("paused"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The platform refused to start audio (autoplay policy, no device).
    Denied(String),
    /// The audio reference could not be opened.
    Unavailable(String),
    /// The item has no audio reference.
    NoAudio,
}

impl Display for PlaybackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied(reason) => write!(f, "playback was blocked: {reason}"),
            Self::Unavailable(reference) => write!(f, "audio `{reference}` is unavailable"),
            Self::NoAudio => f.write_str("this hymn has no audio"),
        }
    }
}

impl Error for PlaybackError {}

/// Audio element the player drives.
pub trait AudioOutput {
    fn bind(&mut self, audio_ref: &str) -> Result<(), PlaybackError>;
    fn start(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn seek(&mut self, position_ms: u64);
}

/// Output that accepts every command and produces no sound.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn bind(&mut self, _audio_ref: &str) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn start(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn seek(&mut self, _position_ms: u64) {}
}

/// Transport over one [`AudioOutput`].
#[derive(Debug)]
pub struct Player<O: AudioOutput> {
    output: O,
    bound_ref: Option<String>,
    state: PlaybackState,
    position_ms: u64,
}

impl<O: AudioOutput> Player<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            bound_ref: None,
            state: PlaybackState::Stopped,
            position_ms: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn bound_ref(&self) -> Option<&str> {
        self.bound_ref.as_deref()
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Starts (or resumes) `audio_ref`, binding it first if it changed.
    pub fn play(&mut self, audio_ref: &str) -> Result<(), PlaybackError> {
        let audio_ref = audio_ref.trim();
        if audio_ref.is_empty() {
            return Err(PlaybackError::NoAudio);
        }
        if self.bound_ref.as_deref() != Some(audio_ref) {
            self.state = PlaybackState::Stopped;
            self.bound_ref = None;
            self.output.bind(audio_ref)?;
            self.bound_ref = Some(audio_ref.to_string());
            self.position_ms = 0;
        }

        if let Err(err) = self.output.start() {
            warn!("event=playback_start module=playback status=error error={err}");
            if self.state == PlaybackState::Playing {
                self.state = PlaybackState::Paused;
            }
            return Err(err);
        }
        self.state = PlaybackState::Playing;
        info!("event=playback_start module=playback status=ok");
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.output.pause();
            self.state = PlaybackState::Paused;
        }
    }

    /// Plays when not playing, pauses otherwise. Returns the new state.
    pub fn toggle(&mut self, audio_ref: &str) -> Result<PlaybackState, PlaybackError> {
        let same_track = self.bound_ref.as_deref() == Some(audio_ref.trim());
        if self.state == PlaybackState::Playing && same_track {
            self.pause();
        } else {
            self.play(audio_ref)?;
        }
        Ok(self.state)
    }

    /// Moves the playhead; negative positions clamp to zero.
    pub fn seek(&mut self, position_ms: i64) {
        if self.bound_ref.is_none() {
            return;
        }
        let clamped = u64::try_from(position_ms).unwrap_or(0);
        self.output.seek(clamped);
        self.position_ms = clamped;
    }

    /// Unbinds the current track.
    pub fn stop(&mut self) {
        self.output.pause();
        self.state = PlaybackState::Stopped;
        self.bound_ref = None;
        self.position_ms = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::{AudioOutput, PlaybackError, PlaybackState, Player};

    #[derive(Default)]
    struct ScriptedOutput {
        binds: Vec<String>,
        deny_start: bool,
        seeks: Vec<u64>,
    }

    impl AudioOutput for ScriptedOutput {
        fn bind(&mut self, audio_ref: &str) -> Result<(), PlaybackError> {
            self.binds.push(audio_ref.to_string());
            Ok(())
        }

        fn start(&mut self) -> Result<(), PlaybackError> {
            if self.deny_start {
                Err(PlaybackError::Denied("autoplay".to_string()))
            } else {
                Ok(())
            }
        }

        fn pause(&mut self) {}

        fn seek(&mut self, position_ms: u64) {
            self.seeks.push(position_ms);
        }
    }

    #[test]
    fn rebinds_only_when_reference_changes() {
        let mut player = Player::new(ScriptedOutput::default());
        player.play("audio/001.mp3").unwrap();
        player.pause();
        player.play("audio/001.mp3").unwrap();
        player.play("audio/002.mp3").unwrap();
        assert_eq!(player.output().binds, vec!["audio/001.mp3", "audio/002.mp3"]);
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn denied_start_is_not_playing() {
        let mut player = Player::new(ScriptedOutput {
            deny_start: true,
            ..ScriptedOutput::default()
        });
        let err = player.play("audio/001.mp3").unwrap_err();
        assert!(matches!(err, PlaybackError::Denied(_)));
        assert_ne!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn toggle_and_seek_clamp() {
        let mut player = Player::new(ScriptedOutput::default());
        assert_eq!(player.toggle("a.mp3").unwrap(), PlaybackState::Playing);
        assert_eq!(player.toggle("a.mp3").unwrap(), PlaybackState::Paused);
        player.seek(-50);
        player.seek(1_500);
        assert_eq!(player.output().seeks, vec![0, 1_500]);
        assert_eq!(player.position_ms(), 1_500);
        assert!(player.play("  ").is_err());
    }
}
