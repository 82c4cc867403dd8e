//! iOS-specific embedded integration
//!
//! The Swift side owns a `WKWebView` and a loading indicator view and passes
//! both to [`vimeo_player_ios_create`]. The web view's
//! `WKScriptMessageHandler` (registered under [`BRIDGE_HANDLER`]) runs on the
//! main thread and forwards message bodies to
//! [`vimeo_player_ios_post_message`]. All functions must be called on the
//! main thread.
//!
//! [`BRIDGE_HANDLER`]: crate::BRIDGE_HANDLER

#![allow(unsafe_op_in_unsafe_fn)]
#![allow(unsafe_code)]

use std::ffi::{CStr, CString, c_char, c_void};

use block2::Block;
use objc2::{msg_send, rc::Retained, runtime::AnyObject};
use objc2_foundation::{NSString, NSURL};
use objc2_ui_kit::UIView;

use crate::{
    Color, EmbedPage, LoadingIndicator, PlaybackOptions, PlayerSurface, RequestedHeight,
    VimeoPlayerView, store_error, take_last_error,
};

/// `WKWebView` driven through the Objective-C runtime
pub struct WebKitSurface {
    web_view: Retained<AnyObject>,
}

impl WebKitSurface {
    /// Retains a `WKWebView`
    ///
    /// # Safety
    /// `web_view` must point to a live `WKWebView`.
    pub unsafe fn new(web_view: *mut c_void) -> Option<Self> {
        Retained::retain(web_view as *mut AnyObject).map(|web_view| Self { web_view })
    }
}

impl PlayerSurface for WebKitSurface {
    fn load_page(&mut self, page: &EmbedPage) {
        let html = NSString::from_str(&page.html);
        let base_url = NSString::from_str(&page.base_url());
        unsafe {
            let base = NSURL::URLWithString(&base_url);
            let _: Option<Retained<AnyObject>> = msg_send![
                &*self.web_view,
                loadHTMLString: &*html,
                baseURL: base.as_deref()
            ];
        }
    }

    fn evaluate_script(&mut self, script: &str) {
        let script = NSString::from_str(script);
        let completion: Option<&Block<dyn Fn(*mut AnyObject, *mut AnyObject)>> = None;
        unsafe {
            let _: () = msg_send![
                &*self.web_view,
                evaluateJavaScript: &*script,
                completionHandler: completion
            ];
        }
    }

    fn release(&mut self) {
        // Replace the page so no media keeps playing while Swift holds the view
        let blank = NSString::from_str("");
        let no_base: Option<&NSURL> = None;
        unsafe {
            let _: () = msg_send![&*self.web_view, stopLoading];
            let _: Option<Retained<AnyObject>> = msg_send![
                &*self.web_view,
                loadHTMLString: &*blank,
                baseURL: no_base
            ];
        }
    }
}

/// Any `UIView` used as loading indicator
pub struct UiKitIndicator {
    view: Retained<UIView>,
}

impl UiKitIndicator {
    /// Retains the indicator view
    ///
    /// # Safety
    /// `view` must point to a live `UIView`.
    pub unsafe fn new(view: *mut c_void) -> Option<Self> {
        Retained::retain(view as *mut UIView).map(|view| Self { view })
    }
}

impl LoadingIndicator for UiKitIndicator {
    fn set_visible(&mut self, visible: bool) {
        unsafe {
            let _: () = msg_send![&*self.view, setHidden: !visible];
        }
    }
}

unsafe fn optional_str<'a>(value: *const c_char) -> Option<&'a str> {
    if value.is_null() {
        return None;
    }
    match CStr::from_ptr(value).to_str() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring non UTF-8 string from host");
            None
        }
    }
}

unsafe fn player<'a>(player: *mut c_void) -> Option<&'a mut VimeoPlayerView> {
    (player as *mut VimeoPlayerView).as_mut()
}

/// Create a player around a `WKWebView` and an indicator view
///
/// Returns null on failure; see [`vimeo_player_ios_get_last_error`].
///
/// # Safety
///
/// - `web_view` must be a live `WKWebView`, `indicator` a live `UIView`
/// - `options_json` must be null or a NUL-terminated string
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_create(
    web_view: *mut c_void,
    indicator: *mut c_void,
    options_json: *const c_char,
) -> *mut c_void {
    let (Some(surface), Some(indicator)) =
        (WebKitSurface::new(web_view), UiKitIndicator::new(indicator))
    else {
        store_error("vimeo_player_ios_create requires a web view and an indicator".to_string());
        return std::ptr::null_mut();
    };

    let options = match optional_str(options_json) {
        Some(json) => serde_json::from_str::<PlaybackOptions>(json).unwrap_or_else(|e| {
            log::warn!("Invalid player options, using defaults: {}", e);
            PlaybackOptions::default()
        }),
        None => PlaybackOptions::default(),
    };

    let player = Box::new(VimeoPlayerView::new(surface, indicator, options));
    log::debug!("Vimeo player created: {:p}", player);
    Box::into_raw(player) as *mut c_void
}

/// Load a video; returns 0 on success, 1 on failure
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`]
/// - `hash_key` and `base_url` must be null or NUL-terminated strings
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_initialize(
    player_ptr: *mut c_void,
    video_id: u64,
    hash_key: *const c_char,
    base_url: *const c_char,
) -> u8 {
    let Some(player) = player(player_ptr) else {
        store_error("Null player pointer".to_string());
        return 1;
    };
    match player.initialize(video_id, optional_str(hash_key), optional_str(base_url)) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{}", e);
            store_error(e.to_string());
            1
        }
    }
}

/// Deliver a bridge message body from the script message handler
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`]
/// - `message` must be a NUL-terminated string
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_post_message(
    player_ptr: *mut c_void,
    message: *const c_char,
) {
    let (Some(player), Some(message)) = (player(player_ptr), optional_str(message)) else {
        return;
    };
    player.handle_message(message);
}

/// Apply bridge messages queued through other senders
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_process_messages(player_ptr: *mut c_void) -> usize {
    player(player_ptr).map_or(0, |player| player.process_messages())
}

/// Player command issued from Swift
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IosCommand {
    /// Start playback
    Play = 0,
    /// Pause playback
    Pause = 1,
    /// Seek to `value` seconds
    SeekTo = 2,
    /// Set volume to `value`
    SetVolume = 3,
    /// Set playback rate to `value`
    SetPlaybackRate = 4,
    /// Loop when `value` is non-zero
    SetLoop = 5,
}

impl IosCommand {
    /// Create an IosCommand from a u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(IosCommand::Play),
            1 => Some(IosCommand::Pause),
            2 => Some(IosCommand::SeekTo),
            3 => Some(IosCommand::SetVolume),
            4 => Some(IosCommand::SetPlaybackRate),
            5 => Some(IosCommand::SetLoop),
            _ => None,
        }
    }
}

/// Send a command to the player
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_command(player_ptr: *mut c_void, command: u8, value: f32) {
    let Some(player) = player(player_ptr) else {
        return;
    };
    match IosCommand::from_u8(command) {
        Some(IosCommand::Play) => player.play(),
        Some(IosCommand::Pause) => player.pause(),
        Some(IosCommand::SeekTo) => player.seek_to(value),
        Some(IosCommand::SetVolume) => player.set_volume(value),
        Some(IosCommand::SetPlaybackRate) => player.set_playback_rate(value),
        Some(IosCommand::SetLoop) => player.set_loop(value != 0.0),
        None => log::warn!("Unknown player command {}", command),
    }
}

/// Switch to another video
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_load_video(player_ptr: *mut c_void, video_id: u64) {
    if let Some(player) = player(player_ptr) {
        player.load_video(video_id);
    }
}

/// Set the accent color from 8-bit RGB channels
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_set_topic_color(
    player_ptr: *mut c_void,
    red: u8,
    green: u8,
    blue: u8,
) {
    if let Some(player) = player(player_ptr) {
        player.set_topic_color(Color::rgb(red, green, blue));
    }
}

/// Last known position in seconds
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_current_time(player_ptr: *mut c_void) -> f32 {
    player(player_ptr).map_or(0.0, |player| player.current_time_seconds())
}

/// Last known state as a raw `PlayerState`
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_state(player_ptr: *mut c_void) -> u8 {
    player(player_ptr).map_or(0, |player| player.player_state().as_raw())
}

/// Height for a layout pass; `auto_height` requests 16:9
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_measure(
    player_ptr: *mut c_void,
    width: u32,
    height: u32,
    auto_height: bool,
) -> u32 {
    let Some(player) = player(player_ptr) else {
        return height;
    };
    player.set_requested_height(if auto_height {
        RequestedHeight::Auto
    } else {
        RequestedHeight::Exact
    });
    player.on_measure(width, height).height
}

/// The host view disappeared
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_on_stop(player_ptr: *mut c_void) {
    if let Some(player) = player(player_ptr) {
        player.on_stop();
    }
}

/// The host view is being torn down; safe to call more than once
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_on_destroy(player_ptr: *mut c_void) {
    if let Some(player) = player(player_ptr) {
        player.on_destroy();
    }
}

/// Free the player
///
/// # Safety
///
/// - `player` must come from [`vimeo_player_ios_create`] and not be used afterwards
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_free(player_ptr: *mut c_void) {
    if !player_ptr.is_null() {
        let _ = Box::from_raw(player_ptr as *mut VimeoPlayerView);
    }
}

/// Get the last error message (if any) and clear it
/// The caller is responsible for freeing the returned string with vimeo_player_ios_free_error
#[unsafe(no_mangle)]
pub extern "C" fn vimeo_player_ios_get_last_error() -> *mut c_char {
    if let Some(error) = take_last_error() {
        if let Ok(c_string) = CString::new(error) {
            return c_string.into_raw();
        }
    }
    std::ptr::null_mut()
}

/// Free an error string returned by vimeo_player_ios_get_last_error
///
/// # Safety
///
/// - `error` must come from [`vimeo_player_ios_get_last_error`]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn vimeo_player_ios_free_error(error: *mut c_char) {
    if !error.is_null() {
        let _ = CString::from_raw(error);
    }
}
