//! Player state as reported by the embedded content

use serde::{Deserialize, Serialize};

/// Playback state of the embedded player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PlayerState {
    /// Nothing reported yet
    #[default]
    Unstarted = 0,
    /// The player signalled ready
    Ready = 1,
    /// Playing
    Playing = 2,
    /// Paused
    Paused = 3,
    /// Reached the end of the video
    Ended = 4,
    /// Waiting for data
    Buffering = 5,
}

impl PlayerState {
    /// Create a PlayerState from a u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PlayerState::Unstarted),
            1 => Some(PlayerState::Ready),
            2 => Some(PlayerState::Playing),
            3 => Some(PlayerState::Paused),
            4 => Some(PlayerState::Ended),
            5 => Some(PlayerState::Buffering),
            _ => None,
        }
    }

    /// Raw value for FFI return
    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

/// A text track (captions or subtitles) known to the player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextTrack {
    /// `captions` or `subtitles`
    pub kind: Option<String>,
    /// Display label
    pub label: Option<String>,
    /// BCP 47 language tag
    pub language: Option<String>,
}

/// What the player reports once it has loaded the video
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadyInfo {
    /// Video title, when the player exposes it
    pub title: Option<String>,
    /// Duration in seconds
    pub duration: Option<f32>,
    /// Text tracks available for the video
    pub text_tracks: Vec<TextTrack>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip_covers_every_state() {
        for raw in 0..=5 {
            let state = PlayerState::from_u8(raw).unwrap();
            assert_eq!(state.as_raw(), raw);
        }
        assert_eq!(PlayerState::from_u8(6), None);
    }

    #[test]
    fn default_is_unstarted() {
        assert_eq!(PlayerState::default(), PlayerState::Unstarted);
    }
}
