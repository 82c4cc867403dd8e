//! Listener traits and ordered listener lists
//!
//! Every trait has a blanket implementation for matching closures, so hosts
//! can register either a closure or their own type.

use crate::{
    error::PlayerError,
    state::{PlayerState, ReadyInfo, TextTrack},
};

/// Notified when the player has loaded the video
pub trait ReadyListener {
    /// Called with what the player reported on ready
    fn on_ready(&mut self, info: &ReadyInfo);
}

/// Notified on playback state transitions
pub trait StateListener {
    /// Called with the new state
    fn on_state_changed(&mut self, state: PlayerState);
}

/// Notified on periodic playback position updates
pub trait TimeListener {
    /// Called with the current position in seconds
    fn on_time_update(&mut self, seconds: f32);
}

/// Notified when the player volume changes
pub trait VolumeListener {
    /// Called with the new volume, `0.0..=1.0`
    fn on_volume_changed(&mut self, volume: f32);
}

/// Notified when the active text track changes
pub trait TextTrackListener {
    /// Called with the newly active track
    fn on_text_track_changed(&mut self, track: &TextTrack);
}

/// Notified on initialization failure and playback errors
pub trait ErrorListener {
    /// Called with the error
    fn on_error(&mut self, error: &PlayerError);
}

impl<F: FnMut(&ReadyInfo)> ReadyListener for F {
    fn on_ready(&mut self, info: &ReadyInfo) {
        self(info)
    }
}

impl<F: FnMut(PlayerState)> StateListener for F {
    fn on_state_changed(&mut self, state: PlayerState) {
        self(state)
    }
}

impl<F: FnMut(f32)> TimeListener for F {
    fn on_time_update(&mut self, seconds: f32) {
        self(seconds)
    }
}

impl<F: FnMut(f32)> VolumeListener for F {
    fn on_volume_changed(&mut self, volume: f32) {
        self(volume)
    }
}

impl<F: FnMut(&TextTrack)> TextTrackListener for F {
    fn on_text_track_changed(&mut self, track: &TextTrack) {
        self(track)
    }
}

impl<F: FnMut(&PlayerError)> ErrorListener for F {
    fn on_error(&mut self, error: &PlayerError) {
        self(error)
    }
}

/// Listeners of one category, notified in registration order
pub struct Listeners<L: ?Sized> {
    entries: Vec<Box<L>>,
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<L: ?Sized> Listeners<L> {
    /// Appends a listener
    pub fn push(&mut self, listener: Box<L>) {
        self.entries.push(listener);
    }

    /// Calls `f` on every listener in registration order
    pub fn notify(&mut self, mut f: impl FnMut(&mut L)) {
        for listener in &mut self.entries {
            f(listener.as_mut());
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every listener list the bridge dispatches to
#[derive(Default)]
pub struct ListenerRegistry {
    pub(crate) ready: Listeners<dyn ReadyListener>,
    pub(crate) state: Listeners<dyn StateListener>,
    pub(crate) time: Listeners<dyn TimeListener>,
    pub(crate) volume: Listeners<dyn VolumeListener>,
    pub(crate) text_track: Listeners<dyn TextTrackListener>,
    pub(crate) error: Listeners<dyn ErrorListener>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn notifies_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut list: Listeners<dyn StateListener> = Listeners::default();
        for tag in 0..3 {
            let order = order.clone();
            list.push(Box::new(move |_state: PlayerState| order.borrow_mut().push(tag)));
        }
        list.notify(|l| l.on_state_changed(PlayerState::Playing));
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn empty_list_notifies_nobody() {
        let mut list: Listeners<dyn TimeListener> = Listeners::default();
        let mut calls = 0;
        list.notify(|_| calls += 1);
        assert!(list.is_empty());
        assert_eq!(calls, 0);
    }
}
