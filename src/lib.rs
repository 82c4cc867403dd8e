//! Embeddable Vimeo player widget
//!
//! This crate wraps the Vimeo web player in a native container that host
//! applications embed on iOS and Android. The host provides a web view and a
//! loading indicator; the container loads the player page into the web view,
//! forwards playback commands as script snippets and turns the events the page
//! posts back into typed listener callbacks.
//!
//! # Architecture
//!
//! - **VimeoPlayerView**: container composing the surface, the indicator and
//!   the script bridge; sizing and host lifecycle hooks
//! - **ScriptBridge**: decodes bridge messages and dispatches them to listeners
//! - **BridgeChannel**: carries raw messages from the script interface to the
//!   UI thread
//! - **PlayerSurface** / **LoadingIndicator**: the seams to the host toolkit,
//!   implemented for Android (`jni`) and iOS (`objc2`)

#![warn(missing_docs)]

mod bridge;
mod channel;
mod command;
mod embed;
mod error;
mod layout;
mod listener;
mod options;
mod state;
mod surface;
mod view;

#[cfg(feature = "bevy")]
mod plugin;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(target_os = "android")]
pub mod android;

pub use bridge::*;
pub use channel::*;
pub use command::*;
pub use embed::*;
pub use error::*;
pub use layout::*;
pub use listener::*;
pub use options::*;
pub use state::*;
pub use surface::*;
pub use view::*;

#[cfg(feature = "bevy")]
pub use plugin::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        error::PlayerError,
        layout::{RequestedHeight, Size},
        listener::*,
        options::{AttributeSource, Attributes, Color, PlaybackOptions},
        state::{PlayerState, ReadyInfo, TextTrack},
        surface::{LoadingIndicator, NoIndicator, PlayerSurface},
        view::VimeoPlayerView,
    };

    #[cfg(feature = "bevy")]
    pub use crate::plugin::VimeoPlayerPlugin;
}
