//! Decoding and dispatch of events posted by the embedded content
//!
//! Each bridge message is one JSON object tagged by `event`:
//!
//! ```text
//! {"event":"ready","title":"..","duration":31.5,"textTracks":[..]}
//! {"event":"initFailed"}
//! {"event":"playing","duration":31.5}
//! {"event":"paused","seconds":4.2}
//! {"event":"ended","duration":31.5}
//! {"event":"bufferStart"} / {"event":"bufferEnd"}
//! {"event":"timeUpdate","seconds":4.2}
//! {"event":"volumeChange","volume":0.8}
//! {"event":"textTrackChange","kind":"captions","label":"English","language":"en"}
//! {"event":"error","name":"PasswordError","message":"..","method":"play"}
//! ```
//!
//! Anything else is malformed and dropped without notifying listeners.

use log::{debug, warn};
use serde::Deserialize;

use crate::{
    error::PlayerError,
    listener::{
        ErrorListener, ListenerRegistry, ReadyListener, StateListener, TextTrackListener,
        TimeListener, VolumeListener,
    },
    state::{PlayerState, ReadyInfo, TextTrack},
};

/// A decoded bridge message
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BridgeEvent {
    /// The player loaded the video
    Ready {
        /// Video title
        #[serde(default)]
        title: Option<String>,
        /// Length in seconds
        #[serde(default)]
        duration: Option<f32>,
        /// Text tracks the video offers
        #[serde(default, rename = "textTracks")]
        text_tracks: Vec<TextTrack>,
    },
    /// The player could not start
    InitFailed,
    /// Playback started or resumed
    Playing {
        /// Length in seconds
        #[serde(default)]
        duration: Option<f32>,
    },
    /// Playback paused
    Paused {
        /// Position in seconds
        #[serde(default)]
        seconds: Option<f32>,
    },
    /// Playback reached the end
    Ended {
        /// Length in seconds
        #[serde(default)]
        duration: Option<f32>,
    },
    /// The player started waiting for data
    BufferStart,
    /// The player has enough data again
    BufferEnd,
    /// Periodic position update
    TimeUpdate {
        /// Position in seconds
        seconds: f32,
    },
    /// Volume changed
    VolumeChange {
        /// New volume, `0.0..=1.0`
        volume: f32,
    },
    /// Active text track changed
    TextTrackChange {
        /// Track kind, `captions` or `subtitles`
        #[serde(default)]
        kind: Option<String>,
        /// Display label
        #[serde(default)]
        label: Option<String>,
        /// Language code; absent when text tracks were turned off
        #[serde(default)]
        language: Option<String>,
    },
    /// Playback error
    Error {
        /// Error name reported by the player
        #[serde(default)]
        name: Option<String>,
        /// Human readable description
        #[serde(default)]
        message: Option<String>,
        /// Player method that failed, if any
        #[serde(default)]
        method: Option<String>,
    },
}

impl BridgeEvent {
    /// Decodes one raw bridge message
    pub fn decode(raw: &str) -> Result<Self, PlayerError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Whether this event ends the loading phase
    pub fn ends_loading(&self) -> bool {
        matches!(self, BridgeEvent::Ready { .. } | BridgeEvent::InitFailed)
    }
}

/// Native side of the script bridge: tracks the last reported player state
/// and dispatches decoded events to the registered listeners.
#[derive(Default)]
pub struct ScriptBridge {
    listeners: ListenerRegistry,
    state: PlayerState,
    resume_state: Option<PlayerState>,
    current_time: f32,
    duration: Option<f32>,
}

impl ScriptBridge {
    /// Creates a bridge with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported playback state
    pub fn player_state(&self) -> PlayerState {
        self.state
    }

    /// Last reported position in seconds
    pub fn current_time_seconds(&self) -> f32 {
        self.current_time
    }

    /// Duration in seconds, once the player reported it
    pub fn duration(&self) -> Option<f32> {
        self.duration
    }

    /// Forgets what the previous video reported; listeners are kept
    pub fn reset(&mut self) {
        self.state = PlayerState::Unstarted;
        self.resume_state = None;
        self.current_time = 0.0;
        self.duration = None;
    }

    /// Registers a ready listener
    pub fn add_ready_listener(&mut self, listener: impl ReadyListener + 'static) {
        self.listeners.ready.push(Box::new(listener));
    }

    /// Registers a state listener
    pub fn add_state_listener(&mut self, listener: impl StateListener + 'static) {
        self.listeners.state.push(Box::new(listener));
    }

    /// Registers a time listener
    pub fn add_time_listener(&mut self, listener: impl TimeListener + 'static) {
        self.listeners.time.push(Box::new(listener));
    }

    /// Registers a volume listener
    pub fn add_volume_listener(&mut self, listener: impl VolumeListener + 'static) {
        self.listeners.volume.push(Box::new(listener));
    }

    /// Registers a text track listener
    pub fn add_text_track_listener(&mut self, listener: impl TextTrackListener + 'static) {
        self.listeners.text_track.push(Box::new(listener));
    }

    /// Registers an error listener
    pub fn add_error_listener(&mut self, listener: impl ErrorListener + 'static) {
        self.listeners.error.push(Box::new(listener));
    }

    /// Decodes and dispatches a raw message.
    ///
    /// Malformed messages are logged and dropped; the decoded event is returned
    /// otherwise so the container can react to it.
    pub fn receive(&mut self, raw: &str) -> Option<BridgeEvent> {
        match BridgeEvent::decode(raw) {
            Ok(event) => {
                self.dispatch(&event);
                Some(event)
            }
            Err(err) => {
                warn!("Dropping bridge message: {}", err);
                None
            }
        }
    }

    /// Applies an event to the tracked state and notifies listeners
    pub fn dispatch(&mut self, event: &BridgeEvent) {
        debug!("Bridge event: {:?}", event);

        match event {
            BridgeEvent::Ready {
                title,
                duration,
                text_tracks,
            } => {
                if duration.is_some() {
                    self.duration = *duration;
                }
                let info = ReadyInfo {
                    title: title.clone(),
                    duration: *duration,
                    text_tracks: text_tracks.clone(),
                };
                self.listeners.ready.notify(|l| l.on_ready(&info));
                self.set_state(PlayerState::Ready);
            }
            BridgeEvent::InitFailed => {
                let error = PlayerError::InitFailed;
                self.listeners.error.notify(|l| l.on_error(&error));
            }
            BridgeEvent::Playing { duration } | BridgeEvent::Ended { duration } => {
                if duration.is_some() {
                    self.duration = *duration;
                }
                let state = if matches!(event, BridgeEvent::Playing { .. }) {
                    PlayerState::Playing
                } else {
                    PlayerState::Ended
                };
                self.set_state(state);
            }
            BridgeEvent::Paused { seconds } => {
                if let Some(seconds) = seconds {
                    self.current_time = *seconds;
                }
                self.set_state(PlayerState::Paused);
            }
            BridgeEvent::BufferStart => {
                if self.state != PlayerState::Buffering {
                    self.resume_state = Some(self.state);
                    self.set_state(PlayerState::Buffering);
                }
            }
            BridgeEvent::BufferEnd => {
                if self.state == PlayerState::Buffering {
                    let resume = self.resume_state.take().unwrap_or(PlayerState::Playing);
                    self.set_state(resume);
                }
            }
            BridgeEvent::TimeUpdate { seconds } => {
                self.current_time = *seconds;
                self.listeners.time.notify(|l| l.on_time_update(*seconds));
            }
            BridgeEvent::VolumeChange { volume } => {
                self.listeners.volume.notify(|l| l.on_volume_changed(*volume));
            }
            BridgeEvent::TextTrackChange {
                kind,
                label,
                language,
            } => {
                let track = TextTrack {
                    kind: kind.clone(),
                    label: label.clone(),
                    language: language.clone(),
                };
                self.listeners
                    .text_track
                    .notify(|l| l.on_text_track_changed(&track));
            }
            BridgeEvent::Error {
                name,
                message,
                method,
            } => {
                let error = PlayerError::Playback {
                    kind: name.clone().unwrap_or_else(|| "Error".to_string()),
                    message: message.clone().unwrap_or_default(),
                    method: method.clone(),
                };
                self.listeners.error.notify(|l| l.on_error(&error));
            }
        }
    }

    fn set_state(&mut self, state: PlayerState) {
        if state != PlayerState::Buffering {
            self.resume_state = None;
        }
        self.state = state;
        self.listeners.state.notify(|l| l.on_state_changed(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn recording_bridge() -> (ScriptBridge, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bridge = ScriptBridge::new();

        let sink = log.clone();
        bridge.add_state_listener(move |s: PlayerState| sink.borrow_mut().push(format!("state:{s:?}")));
        let sink = log.clone();
        bridge.add_time_listener(move |t: f32| sink.borrow_mut().push(format!("time:{t}")));
        let sink = log.clone();
        bridge.add_error_listener(move |e: &PlayerError| {
            sink.borrow_mut().push(format!("error:{}", e.kind()))
        });
        (bridge, log)
    }

    #[test]
    fn decodes_every_event() {
        let cases = [
            r#"{"event":"ready","title":"Clip","duration":10.5,"textTracks":[{"kind":"captions","label":"English","language":"en","mode":"disabled"}]}"#,
            r#"{"event":"initFailed"}"#,
            r#"{"event":"playing","duration":10.5}"#,
            r#"{"event":"paused","seconds":2.0}"#,
            r#"{"event":"ended","duration":10.5}"#,
            r#"{"event":"bufferStart"}"#,
            r#"{"event":"bufferEnd"}"#,
            r#"{"event":"timeUpdate","seconds":1.25}"#,
            r#"{"event":"volumeChange","volume":0.5}"#,
            r#"{"event":"textTrackChange","kind":null,"label":null,"language":null}"#,
            r#"{"event":"error","name":"PasswordError","message":"locked","method":"play"}"#,
        ];
        for raw in cases {
            assert!(BridgeEvent::decode(raw).is_ok(), "{raw}");
        }

        let ready = BridgeEvent::decode(cases[0]).unwrap();
        let BridgeEvent::Ready { text_tracks, .. } = ready else {
            panic!("expected ready");
        };
        assert_eq!(text_tracks[0].language.as_deref(), Some("en"));
    }

    #[test]
    fn malformed_messages_are_dropped_silently() {
        let (mut bridge, log) = recording_bridge();
        for raw in [
            "",
            "not json",
            r#"{"event":"teleport"}"#,
            r#"{"seconds":3}"#,
            r#"{"event":"timeUpdate","seconds":"soon"}"#,
            r#"{"event":"timeUpdate"}"#,
        ] {
            assert_eq!(bridge.receive(raw), None, "{raw}");
        }
        assert!(log.borrow().is_empty());
        assert_eq!(bridge.player_state(), PlayerState::Unstarted);
    }

    #[test]
    fn state_and_time_are_tracked() {
        let (mut bridge, log) = recording_bridge();
        bridge.receive(r#"{"event":"playing","duration":30}"#);
        bridge.receive(r#"{"event":"timeUpdate","seconds":4.5}"#);
        bridge.receive(r#"{"event":"paused","seconds":5}"#);

        assert_eq!(bridge.player_state(), PlayerState::Paused);
        assert_eq!(bridge.current_time_seconds(), 5.0);
        assert_eq!(bridge.duration(), Some(30.0));
        assert_eq!(
            *log.borrow(),
            vec!["state:Playing", "time:4.5", "state:Paused"]
        );
    }

    #[test]
    fn buffering_restores_previous_state() {
        let (mut bridge, _log) = recording_bridge();
        bridge.receive(r#"{"event":"paused","seconds":1}"#);
        bridge.receive(r#"{"event":"bufferStart"}"#);
        bridge.receive(r#"{"event":"bufferStart"}"#);
        assert_eq!(bridge.player_state(), PlayerState::Buffering);
        bridge.receive(r#"{"event":"bufferEnd"}"#);
        assert_eq!(bridge.player_state(), PlayerState::Paused);
    }

    #[test]
    fn init_failed_reports_error_without_touching_state() {
        let (mut bridge, log) = recording_bridge();
        let event = bridge.receive(r#"{"event":"initFailed"}"#).unwrap();
        assert!(event.ends_loading());
        assert_eq!(bridge.player_state(), PlayerState::Unstarted);
        assert_eq!(*log.borrow(), vec!["error:InitFailed"]);
    }

    #[test]
    fn playback_errors_carry_kind_and_message() {
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let mut bridge = ScriptBridge::new();
        bridge.add_error_listener(move |e: &PlayerError| {
            *sink.borrow_mut() = Some((e.kind().to_string(), e.message()))
        });
        bridge.receive(r#"{"event":"error","name":"RangeError","message":"out of range"}"#);
        assert_eq!(
            *seen.borrow(),
            Some(("RangeError".to_string(), "out of range".to_string()))
        );
    }

    #[test]
    fn ready_and_text_track_listeners() {
        let titles = Rc::new(RefCell::new(Vec::new()));
        let tracks = Rc::new(RefCell::new(Vec::new()));
        let mut bridge = ScriptBridge::new();
        let sink = titles.clone();
        bridge.add_ready_listener(move |info: &ReadyInfo| sink.borrow_mut().push(info.title.clone()));
        let sink = tracks.clone();
        bridge.add_text_track_listener(move |t: &TextTrack| sink.borrow_mut().push(t.clone()));
        let sink_volume = Rc::new(RefCell::new(Vec::new()));
        let sink = sink_volume.clone();
        bridge.add_volume_listener(move |v: f32| sink.borrow_mut().push(v));

        bridge.receive(r#"{"event":"ready","title":"Clip"}"#);
        bridge.receive(r#"{"event":"textTrackChange","kind":"captions","label":"Deutsch","language":"de"}"#);
        bridge.receive(r#"{"event":"volumeChange","volume":0.4}"#);

        assert_eq!(*titles.borrow(), vec![Some("Clip".to_string())]);
        assert_eq!(tracks.borrow()[0].language.as_deref(), Some("de"));
        assert_eq!(*sink_volume.borrow(), vec![0.4]);
        assert_eq!(bridge.player_state(), PlayerState::Ready);
    }

    #[test]
    fn reset_clears_tracked_values() {
        let (mut bridge, _log) = recording_bridge();
        bridge.receive(r#"{"event":"playing","duration":8}"#);
        bridge.receive(r#"{"event":"timeUpdate","seconds":3}"#);
        bridge.reset();
        assert_eq!(bridge.player_state(), PlayerState::Unstarted);
        assert_eq!(bridge.current_time_seconds(), 0.0);
        assert_eq!(bridge.duration(), None);
    }
}
