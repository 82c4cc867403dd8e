//! Android-specific integration with JNI functions
//!
//! The Java side owns an `android.webkit.WebView` and a `ProgressBar`; both
//! are handed to `nativeCreate`, which returns an opaque player pointer. The
//! WebView's `@JavascriptInterface` (registered under [`BRIDGE_HANDLER`])
//! forwards each message to `nativePostMessage` using the pointer from
//! `nativeCreateSender`; that call is safe from any thread. Every other entry
//! point must be called on the UI thread.
//!
//! [`BRIDGE_HANDLER`]: crate::BRIDGE_HANDLER

use std::sync::Arc;

use jni::{
    JNIEnv, JavaVM,
    objects::{GlobalRef, JClass, JObject, JString, JValue},
    sys::{JNI_FALSE, JNI_TRUE, jboolean, jfloat, jint, jlong},
};
use log::{debug, error, warn};

use crate::{
    BridgeSender, Color, EmbedPage, ErrorListener, LoadingIndicator, PlaybackOptions,
    PlayerError, PlayerState, PlayerSurface, RequestedHeight, StateListener, TextTrack,
    TextTrackListener, TimeListener, VimeoPlayerView, VolumeListener, store_error,
    take_last_error,
};

const VIEW_VISIBLE: jint = 0;
const VIEW_GONE: jint = 8;

/// Runs `f` with an env attached to the current thread
fn with_env<R>(
    vm: &JavaVM,
    f: impl FnOnce(&mut JNIEnv) -> jni::errors::Result<R>,
) -> jni::errors::Result<R> {
    let mut env = vm.attach_current_thread()?;
    f(&mut env)
}

/// `android.webkit.WebView` driven through JNI
pub struct AndroidWebView {
    vm: Arc<JavaVM>,
    web_view: GlobalRef,
}

impl AndroidWebView {
    /// Wraps a WebView reference
    pub fn new(env: &mut JNIEnv, vm: Arc<JavaVM>, web_view: &JObject) -> jni::errors::Result<Self> {
        Ok(Self {
            vm,
            web_view: env.new_global_ref(web_view)?,
        })
    }
}

impl PlayerSurface for AndroidWebView {
    fn load_page(&mut self, page: &EmbedPage) {
        let web_view = self.web_view.as_obj();
        let result = with_env(&self.vm, |env| {
            let base = env.new_string(page.base_url())?;
            let html = env.new_string(&page.html)?;
            let mime = env.new_string("text/html")?;
            let encoding = env.new_string("utf-8")?;
            env.call_method(
                web_view,
                "loadDataWithBaseURL",
                "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V",
                &[
                    (&base).into(),
                    (&html).into(),
                    (&mime).into(),
                    (&encoding).into(),
                    JValue::Object(&JObject::null()),
                ],
            )?;
            Ok(())
        });
        if let Err(e) = result {
            error!("Failed to load player page: {:?}", e);
        }
    }

    fn evaluate_script(&mut self, script: &str) {
        let web_view = self.web_view.as_obj();
        let result = with_env(&self.vm, |env| {
            let script = env.new_string(script)?;
            env.call_method(
                web_view,
                "evaluateJavascript",
                "(Ljava/lang/String;Landroid/webkit/ValueCallback;)V",
                &[(&script).into(), JValue::Object(&JObject::null())],
            )?;
            Ok(())
        });
        if let Err(e) = result {
            error!("Failed to evaluate player script: {:?}", e);
        }
    }

    fn release(&mut self) {
        let web_view = self.web_view.as_obj();
        let result = with_env(&self.vm, |env| {
            env.call_method(web_view, "stopLoading", "()V", &[])?;
            env.call_method(web_view, "destroy", "()V", &[])?;
            Ok(())
        });
        if let Err(e) = result {
            error!("Failed to destroy WebView: {:?}", e);
        }
    }
}

/// `android.widget.ProgressBar` (or any `View`) toggled through JNI
pub struct AndroidProgressBar {
    vm: Arc<JavaVM>,
    view: GlobalRef,
}

impl AndroidProgressBar {
    /// Wraps a view reference
    pub fn new(env: &mut JNIEnv, vm: Arc<JavaVM>, view: &JObject) -> jni::errors::Result<Self> {
        Ok(Self {
            vm,
            view: env.new_global_ref(view)?,
        })
    }
}

impl LoadingIndicator for AndroidProgressBar {
    fn set_visible(&mut self, visible: bool) {
        let view = self.view.as_obj();
        let visibility = if visible { VIEW_VISIBLE } else { VIEW_GONE };
        let result = with_env(&self.vm, |env| {
            env.call_method(view, "setVisibility", "(I)V", &[JValue::Int(visibility)])?;
            Ok(())
        });
        if let Err(e) = result {
            error!("Failed to set indicator visibility: {:?}", e);
        }
    }
}

/// Java object receiving player callbacks.
///
/// Expects `onStateChanged(I)V`, `onTimeUpdate(F)V`, `onVolumeChanged(F)V`,
/// `onTextTrackChanged(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V`
/// and `onError(Ljava/lang/String;Ljava/lang/String;)V`.
#[derive(Clone)]
struct JavaListener {
    vm: Arc<JavaVM>,
    listener: GlobalRef,
}

impl JavaListener {
    fn report(&self, method: &str, result: jni::errors::Result<()>) {
        if let Err(e) = result {
            error!("Listener callback {} failed: {:?}", method, e);
        }
    }
}

fn optional_jstring<'local>(
    env: &mut JNIEnv<'local>,
    value: Option<&str>,
) -> jni::errors::Result<JObject<'local>> {
    match value {
        Some(value) => Ok(env.new_string(value)?.into()),
        None => Ok(JObject::null()),
    }
}

impl StateListener for JavaListener {
    fn on_state_changed(&mut self, state: PlayerState) {
        let listener = self.listener.as_obj();
        let result = with_env(&self.vm, |env| {
            env.call_method(
                listener,
                "onStateChanged",
                "(I)V",
                &[JValue::Int(state.as_raw() as jint)],
            )?;
            Ok(())
        });
        self.report("onStateChanged", result);
    }
}

impl TimeListener for JavaListener {
    fn on_time_update(&mut self, seconds: f32) {
        let listener = self.listener.as_obj();
        let result = with_env(&self.vm, |env| {
            env.call_method(listener, "onTimeUpdate", "(F)V", &[JValue::Float(seconds)])?;
            Ok(())
        });
        self.report("onTimeUpdate", result);
    }
}

impl VolumeListener for JavaListener {
    fn on_volume_changed(&mut self, volume: f32) {
        let listener = self.listener.as_obj();
        let result = with_env(&self.vm, |env| {
            env.call_method(listener, "onVolumeChanged", "(F)V", &[JValue::Float(volume)])?;
            Ok(())
        });
        self.report("onVolumeChanged", result);
    }
}

impl TextTrackListener for JavaListener {
    fn on_text_track_changed(&mut self, track: &TextTrack) {
        let listener = self.listener.as_obj();
        let result = with_env(&self.vm, |env| {
            let kind = optional_jstring(env, track.kind.as_deref())?;
            let label = optional_jstring(env, track.label.as_deref())?;
            let language = optional_jstring(env, track.language.as_deref())?;
            env.call_method(
                listener,
                "onTextTrackChanged",
                "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V",
                &[
                    JValue::Object(&kind),
                    JValue::Object(&label),
                    JValue::Object(&language),
                ],
            )?;
            Ok(())
        });
        self.report("onTextTrackChanged", result);
    }
}

impl ErrorListener for JavaListener {
    fn on_error(&mut self, player_error: &PlayerError) {
        let listener = self.listener.as_obj();
        let result = with_env(&self.vm, |env| {
            let kind = env.new_string(player_error.kind())?;
            let message = env.new_string(player_error.message())?;
            env.call_method(
                listener,
                "onError",
                "(Ljava/lang/String;Ljava/lang/String;)V",
                &[(&kind).into(), (&message).into()],
            )?;
            Ok(())
        });
        self.report("onError", result);
    }
}

fn optional_string(env: &mut JNIEnv, value: &JString) -> Option<String> {
    if value.is_null() {
        return None;
    }
    match env.get_string(value) {
        Ok(value) => Some(value.into()),
        Err(e) => {
            warn!("Failed to read Java string: {:?}", e);
            None
        }
    }
}

/// Borrow the player behind an FFI pointer
///
/// # Safety
/// `ptr` must be 0 or a pointer returned by `nativeCreate` and not yet freed.
unsafe fn player<'a>(ptr: jlong) -> Option<&'a mut VimeoPlayerView> {
    unsafe { (ptr as *mut VimeoPlayerView).as_mut() }
}

fn fail(message: String) {
    error!("{}", message);
    store_error(message);
}

// ============================================================================
// JNI Entry Points
// ============================================================================

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeCreate(
    mut env: JNIEnv,
    _class: JClass,
    web_view: JObject,
    progress_bar: JObject,
    options_json: JString,
) -> jlong {
    if web_view.is_null() || progress_bar.is_null() {
        fail("nativeCreate requires a WebView and a progress view".to_string());
        return 0;
    }

    let options = match optional_string(&mut env, &options_json) {
        Some(json) => serde_json::from_str::<PlaybackOptions>(&json).unwrap_or_else(|e| {
            warn!("Invalid player options, using defaults: {}", e);
            PlaybackOptions::default()
        }),
        None => PlaybackOptions::default(),
    };

    let vm = match env.get_java_vm() {
        Ok(vm) => Arc::new(vm),
        Err(e) => {
            fail(format!("Failed to get JavaVM: {:?}", e));
            return 0;
        }
    };

    let surface = match AndroidWebView::new(&mut env, vm.clone(), &web_view) {
        Ok(surface) => surface,
        Err(e) => {
            fail(format!("Failed to retain WebView: {:?}", e));
            return 0;
        }
    };
    let indicator = match AndroidProgressBar::new(&mut env, vm, &progress_bar) {
        Ok(indicator) => indicator,
        Err(e) => {
            fail(format!("Failed to retain progress view: {:?}", e));
            return 0;
        }
    };

    let player = Box::new(VimeoPlayerView::new(surface, indicator, options));
    debug!("Vimeo player created: {:p}", player);
    Box::into_raw(player) as jlong
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeCreateSender(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
) -> jlong {
    let Some(player) = (unsafe { player(player_ptr) }) else {
        return 0;
    };
    Box::into_raw(Box::new(player.bridge_sender())) as jlong
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeReleaseSender(
    _env: JNIEnv,
    _class: JClass,
    sender_ptr: jlong,
) {
    if sender_ptr == 0 {
        return;
    }
    unsafe {
        let _ = Box::from_raw(sender_ptr as *mut BridgeSender);
    }
}

/// Queue a bridge message; callable from the WebView's script interface thread
#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativePostMessage(
    mut env: JNIEnv,
    _class: JClass,
    sender_ptr: jlong,
    message: JString,
) -> jboolean {
    let sender = sender_ptr as *const BridgeSender;
    if sender.is_null() {
        return JNI_FALSE;
    }
    let Some(message) = optional_string(&mut env, &message) else {
        return JNI_FALSE;
    };
    let sender = unsafe { &*sender };
    if sender.post(message) { JNI_TRUE } else { JNI_FALSE }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeProcessMessages(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
) -> jint {
    match unsafe { player(player_ptr) } {
        Some(player) => player.process_messages() as jint,
        None => 0,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeInitialize(
    mut env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
    video_id: jlong,
    hash_key: JString,
    base_url: JString,
) -> jboolean {
    let Some(player) = (unsafe { player(player_ptr) }) else {
        store_error("Null player pointer".to_string());
        return JNI_FALSE;
    };
    let hash_key = optional_string(&mut env, &hash_key);
    let base_url = optional_string(&mut env, &base_url);

    match player.initialize(video_id as u64, hash_key.as_deref(), base_url.as_deref()) {
        Ok(()) => JNI_TRUE,
        Err(e) => {
            fail(e.to_string());
            JNI_FALSE
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeLoadVideo(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
    video_id: jlong,
) {
    if let Some(player) = unsafe { player(player_ptr) } {
        player.load_video(video_id as u64);
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativePlay(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
) {
    if let Some(player) = unsafe { player(player_ptr) } {
        player.play();
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativePause(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
) {
    if let Some(player) = unsafe { player(player_ptr) } {
        player.pause();
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeSeekTo(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
    seconds: jfloat,
) {
    if let Some(player) = unsafe { player(player_ptr) } {
        player.seek_to(seconds);
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeSetVolume(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
    volume: jfloat,
) {
    if let Some(player) = unsafe { player(player_ptr) } {
        player.set_volume(volume);
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeSetPlaybackRate(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
    rate: jfloat,
) {
    if let Some(player) = unsafe { player(player_ptr) } {
        player.set_playback_rate(rate);
    }
}

/// `color` is a packed ARGB `int`, as `android.graphics.Color` produces
#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeSetTopicColor(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
    color: jint,
) {
    if let Some(player) = unsafe { player(player_ptr) } {
        player.set_topic_color(Color(color as u32));
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeSetLoop(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
    enabled: jboolean,
) {
    if let Some(player) = unsafe { player(player_ptr) } {
        player.set_loop(enabled != JNI_FALSE);
    }
}

/// Registers one Java object for state, time, volume, text track and error callbacks
#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeAddListener(
    env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
    listener: JObject,
) {
    let Some(player) = (unsafe { player(player_ptr) }) else {
        return;
    };
    if listener.is_null() {
        return;
    }

    let listener = match (env.get_java_vm(), env.new_global_ref(&listener)) {
        (Ok(vm), Ok(listener)) => JavaListener {
            vm: Arc::new(vm),
            listener,
        },
        (Err(e), _) | (_, Err(e)) => {
            fail(format!("Failed to register listener: {:?}", e));
            return;
        }
    };

    player.add_state_listener(listener.clone());
    player.add_time_listener(listener.clone());
    player.add_volume_listener(listener.clone());
    player.add_text_track_listener(listener.clone());
    player.add_error_listener(listener);
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeCurrentTimeSeconds(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
) -> jfloat {
    match unsafe { player(player_ptr) } {
        Some(player) => player.current_time_seconds(),
        None => 0.0,
    }
}

/// Raw [`PlayerState`] value
#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativePlayerState(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
) -> jint {
    match unsafe { player(player_ptr) } {
        Some(player) => player.player_state().as_raw() as jint,
        None => PlayerState::Unstarted.as_raw() as jint,
    }
}

/// Called from `onMeasure`; returns the height to measure with.
/// `wrap_content` mirrors `LayoutParams.height == WRAP_CONTENT`.
#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeMeasure(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
    width: jint,
    height: jint,
    wrap_content: jboolean,
) -> jint {
    let Some(player) = (unsafe { player(player_ptr) }) else {
        return height;
    };
    let requested = if wrap_content != JNI_FALSE {
        RequestedHeight::Auto
    } else {
        RequestedHeight::Exact
    };
    player.set_requested_height(requested);
    let size = player.on_measure(width.max(0) as u32, height.max(0) as u32);
    size.height.min(jint::MAX as u32) as jint
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeOnStop(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
) {
    if let Some(player) = unsafe { player(player_ptr) } {
        player.on_stop();
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeOnDestroy(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
) {
    if let Some(player) = unsafe { player(player_ptr) } {
        player.on_destroy();
    }
}

/// Frees the player; the pointer must not be used afterwards
#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeFree(
    _env: JNIEnv,
    _class: JClass,
    player_ptr: jlong,
) {
    if player_ptr == 0 {
        return;
    }

    debug!("Freeing Vimeo player");

    unsafe {
        let _ = Box::from_raw(player_ptr as *mut VimeoPlayerView);
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn Java_com_example_vimeoembedded_VimeoNative_nativeGetLastError<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass,
) -> JObject<'local> {
    let Some(error) = take_last_error() else {
        return JObject::null();
    };
    match env.new_string(error) {
        Ok(jstring) => jstring.into(),
        Err(_) => JObject::null(),
    }
}
