//! Player commands forwarded to the embedded content as script snippets

use crate::options::Color;

/// Lowest playback rate the player accepts
pub const MIN_PLAYBACK_RATE: f32 = 0.5;
/// Highest playback rate the player accepts
pub const MAX_PLAYBACK_RATE: f32 = 2.0;
/// Volume ceiling
pub const MAX_VOLUME: f32 = 1.0;

/// A command for the embedded player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    /// Start or resume playback
    Play,
    /// Pause playback
    Pause,
    /// Seek to a position in seconds
    SeekTo(f32),
    /// Set volume, `0.0..=1.0`
    SetVolume(f32),
    /// Set playback rate, `0.5..=2.0`
    SetPlaybackRate(f32),
    /// Change the accent color of the controls
    SetColor(Color),
    /// Toggle looping
    SetLoop(bool),
    /// Switch to another video in the same player
    LoadVideo(u64),
    /// Stop playback and drop the loaded video
    Unload,
}

impl PlayerCommand {
    /// Volume command, clamped to the ceiling. Finite negative values pass
    /// through; NaN and negative infinity are rejected.
    pub fn volume(level: f32) -> Option<Self> {
        if level.is_nan() || level == f32::NEG_INFINITY {
            return None;
        }
        Some(PlayerCommand::SetVolume(level.min(MAX_VOLUME)))
    }

    /// Playback rate command, clamped on both ends
    pub fn playback_rate(rate: f32) -> Option<Self> {
        if rate.is_nan() {
            return None;
        }
        Some(PlayerCommand::SetPlaybackRate(
            rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE),
        ))
    }

    /// Seek command; non-finite positions are rejected
    pub fn seek(seconds: f32) -> Option<Self> {
        seconds.is_finite().then_some(PlayerCommand::SeekTo(seconds))
    }

    /// Script evaluated in the host page, where `player` is the Vimeo player
    pub fn to_script(&self) -> String {
        match self {
            PlayerCommand::Play => "player.play();".to_string(),
            PlayerCommand::Pause => "player.pause();".to_string(),
            PlayerCommand::SeekTo(seconds) => format!("player.setCurrentTime({seconds});"),
            PlayerCommand::SetVolume(level) => format!("player.setVolume({level});"),
            PlayerCommand::SetPlaybackRate(rate) => format!("player.setPlaybackRate({rate});"),
            PlayerCommand::SetColor(color) => format!("player.setColor('#{}');", color.to_hex()),
            PlayerCommand::SetLoop(enabled) => format!("player.setLoop({enabled});"),
            PlayerCommand::LoadVideo(id) => format!("player.loadVideo({id});"),
            PlayerCommand::Unload => "player.unload();".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_only_caps_the_upper_bound() {
        assert_eq!(PlayerCommand::volume(1.7), Some(PlayerCommand::SetVolume(1.0)));
        assert_eq!(PlayerCommand::volume(0.25), Some(PlayerCommand::SetVolume(0.25)));
        assert_eq!(PlayerCommand::volume(-0.5), Some(PlayerCommand::SetVolume(-0.5)));
        assert_eq!(PlayerCommand::volume(f32::NAN), None);
        assert_eq!(PlayerCommand::volume(f32::INFINITY), Some(PlayerCommand::SetVolume(1.0)));
        assert_eq!(PlayerCommand::volume(f32::NEG_INFINITY), None);
    }

    #[test]
    fn scripts_never_carry_non_finite_numbers() {
        let inputs = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, -0.5, 0.0, 3.0];
        let commands = inputs.iter().flat_map(|&value| {
            [
                PlayerCommand::volume(value),
                PlayerCommand::playback_rate(value),
                PlayerCommand::seek(value),
            ]
        });
        for command in commands.flatten() {
            let script = command.to_script();
            assert!(!script.contains("inf") && !script.contains("NaN"), "{script}");
        }
    }

    #[test]
    fn rate_clamps_both_ends() {
        for (input, expected) in [(0.1, 0.5), (0.5, 0.5), (1.25, 1.25), (2.0, 2.0), (9.0, 2.0)] {
            assert_eq!(
                PlayerCommand::playback_rate(input),
                Some(PlayerCommand::SetPlaybackRate(expected))
            );
        }
        assert_eq!(
            PlayerCommand::playback_rate(f32::NEG_INFINITY),
            Some(PlayerCommand::SetPlaybackRate(0.5))
        );
    }

    #[test]
    fn scripts() {
        assert_eq!(PlayerCommand::Play.to_script(), "player.play();");
        assert_eq!(PlayerCommand::SeekTo(12.5).to_script(), "player.setCurrentTime(12.5);");
        assert_eq!(PlayerCommand::SetVolume(1.0).to_script(), "player.setVolume(1);");
        assert_eq!(PlayerCommand::SetLoop(true).to_script(), "player.setLoop(true);");
        assert_eq!(
            PlayerCommand::SetColor(Color::VIMEO_BLUE).to_script(),
            "player.setColor('#00acf0');"
        );
        assert_eq!(PlayerCommand::LoadVideo(77).to_script(), "player.loadVideo(77);");
        assert_eq!(PlayerCommand::Unload.to_script(), "player.unload();");
    }

    #[test]
    fn seek_rejects_non_finite() {
        assert_eq!(PlayerCommand::seek(f32::INFINITY), None);
        assert_eq!(PlayerCommand::seek(f32::NEG_INFINITY), None);
        assert_eq!(PlayerCommand::seek(f32::NAN), None);
        assert_eq!(PlayerCommand::seek(3.0), Some(PlayerCommand::SeekTo(3.0)));
    }
}
