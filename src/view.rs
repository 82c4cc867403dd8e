//! The player container: embedded surface, loading indicator and script bridge

use log::{debug, info, warn};
use url::Url;

use crate::{
    bridge::ScriptBridge,
    channel::{BridgeChannel, BridgeSender},
    command::PlayerCommand,
    embed::EmbedPage,
    error::PlayerError,
    layout::{RequestedHeight, Size, measure},
    listener::{
        ErrorListener, ReadyListener, StateListener, TextTrackListener, TimeListener,
        VolumeListener,
    },
    options::{AttributeSource, Color, PlaybackOptions},
    state::PlayerState,
    surface::{LoadingIndicator, PlayerSurface},
};

/// Embeddable Vimeo player.
///
/// Owns the web surface and the loading indicator handed over by the host
/// toolkit. Everything runs on the UI thread: commands are forwarded as
/// scripts, and bridge messages queued through [`BridgeSender`] are applied
/// by [`VimeoPlayerView::process_messages`].
///
/// # Lifecycle
///
/// ```text
/// new / from_attributes   → indicator hidden, nothing loaded
/// initialize              → page loaded, indicator shown
/// ready | initFailed      → indicator hidden (once per initialize)
/// on_stop                 → pause
/// on_destroy / drop       → surface released; later calls are no-ops
/// ```
pub struct VimeoPlayerView {
    surface: Option<Box<dyn PlayerSurface>>,
    indicator: Box<dyn LoadingIndicator>,
    bridge: ScriptBridge,
    channel: BridgeChannel,
    options: PlaybackOptions,
    requested_height: RequestedHeight,
    page: Option<EmbedPage>,
    loading: bool,
}

impl VimeoPlayerView {
    /// Creates a container around a surface and indicator
    pub fn new(
        surface: impl PlayerSurface + 'static,
        indicator: impl LoadingIndicator + 'static,
        options: PlaybackOptions,
    ) -> Self {
        Self {
            surface: Some(Box::new(surface)),
            indicator: Box::new(indicator),
            bridge: ScriptBridge::new(),
            channel: BridgeChannel::default(),
            options,
            requested_height: RequestedHeight::default(),
            page: None,
            loading: false,
        }
    }

    /// Creates a container with options resolved from host attributes
    pub fn from_attributes(
        surface: impl PlayerSurface + 'static,
        indicator: impl LoadingIndicator + 'static,
        attrs: &dyn AttributeSource,
        design_time: bool,
    ) -> Self {
        Self::new(
            surface,
            indicator,
            PlaybackOptions::resolve(attrs, design_time),
        )
    }

    /// Options applied on the next `initialize`
    pub fn options(&self) -> &PlaybackOptions {
        &self.options
    }

    /// Sender to hand to the web view's script interface
    pub fn bridge_sender(&self) -> BridgeSender {
        self.channel.sender()
    }

    /// Loads a video.
    ///
    /// `hash_key` is required for private videos; `base_url` replaces the
    /// default embed host (and becomes the page origin, for domain-restricted
    /// embeds). Anything loaded before is discarded, including bridge messages
    /// still queued from it.
    pub fn initialize(
        &mut self,
        video_id: u64,
        hash_key: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<(), PlayerError> {
        let page = EmbedPage::new(video_id, hash_key, base_url, &self.options)?;

        let Some(surface) = self.surface.as_mut() else {
            warn!("initialize({}) after destroy ignored", video_id);
            return Ok(());
        };

        info!("Loading Vimeo player: {}", page.url);

        let stale = self.channel.clear();
        if stale > 0 {
            debug!("Discarded {} queued bridge messages", stale);
        }
        self.bridge.reset();

        self.loading = true;
        self.indicator.set_visible(true);
        surface.load_page(&page);
        self.page = Some(page);
        Ok(())
    }

    /// Embed URL of the loaded page
    pub fn embed_url(&self) -> Option<&Url> {
        self.page.as_ref().map(|page| &page.url)
    }

    /// Whether the loading indicator is showing
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the surface has been released
    pub fn is_destroyed(&self) -> bool {
        self.surface.is_none()
    }

    /// Switches to another video inside the loaded player
    pub fn load_video(&mut self, video_id: u64) {
        self.send(Some(PlayerCommand::LoadVideo(video_id)));
    }

    /// Starts or resumes playback
    pub fn play(&mut self) {
        self.send(Some(PlayerCommand::Play));
    }

    /// Pauses playback
    pub fn pause(&mut self) {
        self.send(Some(PlayerCommand::Pause));
    }

    /// Seeks to a position in seconds
    pub fn seek_to(&mut self, seconds: f32) {
        self.send(PlayerCommand::seek(seconds));
    }

    /// Sets the volume; values above 1.0 are sent as 1.0
    pub fn set_volume(&mut self, volume: f32) {
        self.send(PlayerCommand::volume(volume));
    }

    /// Sets the playback rate, clamped to `0.5..=2.0`
    pub fn set_playback_rate(&mut self, rate: f32) {
        self.send(PlayerCommand::playback_rate(rate));
    }

    /// Changes the accent color of the player controls
    pub fn set_topic_color(&mut self, color: Color) {
        self.send(Some(PlayerCommand::SetColor(color)));
    }

    /// Enables or disables looping
    pub fn set_loop(&mut self, enabled: bool) {
        self.send(Some(PlayerCommand::SetLoop(enabled)));
    }

    // Commands are forwarded whether or not the player reported ready; the
    // page ignores what it cannot apply yet.
    fn send(&mut self, command: Option<PlayerCommand>) {
        let Some(command) = command else {
            debug!("Dropping command with non-numeric argument");
            return;
        };
        match self.surface.as_mut() {
            Some(surface) => surface.evaluate_script(&command.to_script()),
            None => debug!("{:?} after destroy ignored", command),
        }
    }

    /// Registers a listener for the player becoming ready
    pub fn add_ready_listener(&mut self, listener: impl ReadyListener + 'static) {
        self.bridge.add_ready_listener(listener);
    }

    /// Registers a listener for playback state changes
    pub fn add_state_listener(&mut self, listener: impl StateListener + 'static) {
        self.bridge.add_state_listener(listener);
    }

    /// Registers a listener for position updates
    pub fn add_time_listener(&mut self, listener: impl TimeListener + 'static) {
        self.bridge.add_time_listener(listener);
    }

    /// Registers a listener for volume changes
    pub fn add_volume_listener(&mut self, listener: impl VolumeListener + 'static) {
        self.bridge.add_volume_listener(listener);
    }

    /// Registers a listener for text track changes
    pub fn add_text_track_listener(&mut self, listener: impl TextTrackListener + 'static) {
        self.bridge.add_text_track_listener(listener);
    }

    /// Registers a listener for initialization failures and playback errors
    pub fn add_error_listener(&mut self, listener: impl ErrorListener + 'static) {
        self.bridge.add_error_listener(listener);
    }

    /// Last known playback position in seconds
    pub fn current_time_seconds(&self) -> f32 {
        self.bridge.current_time_seconds()
    }

    /// Last known playback state
    pub fn player_state(&self) -> PlayerState {
        self.bridge.player_state()
    }

    /// Video duration in seconds, once reported
    pub fn duration(&self) -> Option<f32> {
        self.bridge.duration()
    }

    /// Applies every queued bridge message; returns how many were received
    pub fn process_messages(&mut self) -> usize {
        if self.is_destroyed() {
            return self.channel.clear();
        }
        let mut count = 0;
        while let Some(raw) = self.channel.receive() {
            self.handle_message(&raw);
            count += 1;
        }
        count
    }

    /// Applies one raw bridge message immediately
    pub fn handle_message(&mut self, raw: &str) {
        if self.is_destroyed() {
            return;
        }
        let Some(event) = self.bridge.receive(raw) else {
            return;
        };
        if event.ends_loading() && self.loading {
            self.loading = false;
            self.indicator.set_visible(false);
        }
    }

    /// Sets how the host wants the height sized
    pub fn set_requested_height(&mut self, requested: RequestedHeight) {
        self.requested_height = requested;
    }

    /// Measure hook: 16:9 when the requested height is auto
    pub fn on_measure(&self, width: u32, height: u32) -> Size {
        measure(width, height, self.requested_height)
    }

    /// Host screen stopped
    pub fn on_stop(&mut self) {
        self.pause();
    }

    /// Host screen destroyed. Safe to call repeatedly and before `initialize`.
    pub fn on_destroy(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            debug!("Releasing Vimeo player surface");
            if self.page.is_some() {
                surface.evaluate_script(&PlayerCommand::Unload.to_script());
            }
            surface.release();
            self.channel.clear();
        }
    }
}

impl Drop for VimeoPlayerView {
    fn drop(&mut self) {
        self.on_destroy();
    }
}
