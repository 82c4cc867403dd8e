//! Playback options and their resolution from host attributes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Attribute names read from the host's widget declaration
#[allow(missing_docs)]
pub mod attr {
    pub const AUTO_PLAY: &str = "autoPlay";
    pub const SHOW_BYLINE: &str = "showByline";
    pub const LOOP: &str = "loop";
    pub const MUTED: &str = "muted";
    pub const PLAYS_INLINE: &str = "playSinline";
    pub const SHOW_PORTRAIT: &str = "showPortrait";
    pub const SHOW_SPEED: &str = "showSpeed";
    pub const SHOW_TITLE: &str = "showTitle";
    pub const TRANSPARENT: &str = "transparent";
    pub const TOPIC_COLOR: &str = "topicColor";
}

/// A packed ARGB color, as hosts hand them over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    /// Vimeo's brand blue, used when no topic color is configured
    pub const VIMEO_BLUE: Color = Color::rgb(0, 172, 240);

    /// Opaque color from 8-bit channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(0xff00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Red channel
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Parses `#RRGGBB` or `#AARRGGBB` (leading `#` optional)
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let raw = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Color(0xff00_0000 | raw)),
            8 => Some(Color(raw)),
            _ => None,
        }
    }

    /// Lowercase `rrggbb`, alpha dropped; the form the player expects
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.red(), self.green(), self.blue())
    }
}

/// Snapshot of the player chrome and behavior applied at load time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybackOptions {
    /// Start playing as soon as the player is ready
    pub auto_play: bool,
    /// Restart from the beginning when the video ends
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Start muted
    pub muted: bool,
    /// Show the owner's byline
    pub show_byline: bool,
    /// Show the video title
    pub show_title: bool,
    /// Show the owner's portrait
    pub show_portrait: bool,
    /// Show the playback speed control
    pub show_speed: bool,
    /// Play inline instead of going fullscreen on start
    #[serde(rename = "playSinline", alias = "playsInline")]
    pub plays_inline: bool,
    /// Transparent background around letterboxed video
    pub transparent: bool,
    /// Accent color of the player controls
    #[serde(rename = "topicColor")]
    pub accent_color: Color,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            auto_play: false,
            looping: false,
            muted: false,
            show_byline: true,
            show_title: true,
            show_portrait: true,
            show_speed: false,
            plays_inline: true,
            transparent: true,
            accent_color: Color::VIMEO_BLUE,
        }
    }
}

impl PlaybackOptions {
    /// Resolves options from host attributes.
    ///
    /// In design-time mode (layout previews, no running host) the attributes
    /// are ignored and the defaults are returned.
    pub fn resolve(attrs: &dyn AttributeSource, design_time: bool) -> Self {
        let defaults = Self::default();
        if design_time {
            return defaults;
        }

        let flag = |name: &str, default: bool| attrs.boolean(name).unwrap_or(default);

        Self {
            auto_play: flag(attr::AUTO_PLAY, defaults.auto_play),
            looping: flag(attr::LOOP, defaults.looping),
            muted: flag(attr::MUTED, defaults.muted),
            show_byline: flag(attr::SHOW_BYLINE, defaults.show_byline),
            show_title: flag(attr::SHOW_TITLE, defaults.show_title),
            show_portrait: flag(attr::SHOW_PORTRAIT, defaults.show_portrait),
            show_speed: flag(attr::SHOW_SPEED, defaults.show_speed),
            plays_inline: flag(attr::PLAYS_INLINE, defaults.plays_inline),
            transparent: flag(attr::TRANSPARENT, defaults.transparent),
            accent_color: attrs
                .color(attr::TOPIC_COLOR)
                .unwrap_or(defaults.accent_color),
        }
    }
}

/// Typed lookup into the host's widget attributes
pub trait AttributeSource {
    /// Boolean attribute, `None` when absent or not coercible
    fn boolean(&self, name: &str) -> Option<bool>;

    /// Color attribute, `None` when absent or not coercible
    fn color(&self, name: &str) -> Option<Color>;
}

/// A single attribute value as declared by the host
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum AttributeValue {
    Bool(bool),
    Color(Color),
    Text(String),
}

/// Map-backed attribute set, e.g. parsed from a layout declaration
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    values: HashMap<String, AttributeValue>,
}

impl Attributes {
    /// Empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an attribute
    pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Adds a raw textual attribute, coerced on lookup
    pub fn with_text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, AttributeValue::Text(value.into()))
    }
}

impl AttributeSource for Attributes {
    fn boolean(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            AttributeValue::Bool(value) => Some(*value),
            AttributeValue::Text(text) => match text.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            AttributeValue::Color(_) => None,
        }
    }

    fn color(&self, name: &str) -> Option<Color> {
        match self.values.get(name)? {
            AttributeValue::Color(color) => Some(*color),
            AttributeValue::Text(text) => Color::from_hex(text.trim()),
            AttributeValue::Bool(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_declared_attribute_defaults() {
        let options = PlaybackOptions::resolve(&Attributes::new(), false);
        assert_eq!(options, PlaybackOptions::default());
        assert!(!options.auto_play);
        assert!(options.show_byline);
        assert!(options.plays_inline);
        assert!(options.transparent);
        assert_eq!(options.accent_color, Color::rgb(0, 172, 240));
    }

    #[test]
    fn attributes_override_defaults() {
        let attrs = Attributes::new()
            .with(attr::AUTO_PLAY, AttributeValue::Bool(true))
            .with_text(attr::SHOW_TITLE, "false")
            .with_text(attr::TOPIC_COLOR, "#ff0000");
        let options = PlaybackOptions::resolve(&attrs, false);
        assert!(options.auto_play);
        assert!(!options.show_title);
        assert_eq!(options.accent_color, Color::rgb(255, 0, 0));
    }

    #[test]
    fn design_time_ignores_attributes() {
        let attrs = Attributes::new().with(attr::MUTED, AttributeValue::Bool(true));
        assert!(!PlaybackOptions::resolve(&attrs, true).muted);
    }

    #[test]
    fn uncoercible_values_fall_back() {
        let attrs = Attributes::new()
            .with_text(attr::LOOP, "yes")
            .with(attr::TOPIC_COLOR, AttributeValue::Bool(true));
        let options = PlaybackOptions::resolve(&attrs, false);
        assert!(!options.looping);
        assert_eq!(options.accent_color, Color::VIMEO_BLUE);
    }

    #[test]
    fn color_hex_forms() {
        assert_eq!(Color::VIMEO_BLUE.to_hex(), "00acf0");
        assert_eq!(Color::from_hex("80102030"), Some(Color(0x8010_2030)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("+12345"), None);
    }

    #[test]
    fn options_from_partial_json() {
        let options: PlaybackOptions =
            serde_json::from_str(r#"{"autoPlay":true,"loop":true}"#).unwrap();
        assert!(options.auto_play);
        assert!(options.looping);
        assert!(options.show_portrait);
    }

    #[test]
    fn options_json_uses_attribute_names() {
        let json = serde_json::json!({
            (attr::AUTO_PLAY): true,
            (attr::SHOW_BYLINE): false,
            (attr::LOOP): true,
            (attr::MUTED): true,
            (attr::PLAYS_INLINE): false,
            (attr::SHOW_PORTRAIT): false,
            (attr::SHOW_SPEED): true,
            (attr::SHOW_TITLE): false,
            (attr::TRANSPARENT): false,
            (attr::TOPIC_COLOR): 0xff11_2233u32,
        });
        let options: PlaybackOptions = serde_json::from_value(json).unwrap();
        assert_eq!(
            options,
            PlaybackOptions {
                auto_play: true,
                looping: true,
                muted: true,
                show_byline: false,
                show_title: false,
                show_portrait: false,
                show_speed: true,
                plays_inline: false,
                transparent: false,
                accent_color: Color::rgb(0x11, 0x22, 0x33),
            }
        );

        let written = serde_json::to_value(&options).unwrap();
        assert_eq!(written[attr::PLAYS_INLINE], false);
        assert_eq!(serde_json::from_value::<PlaybackOptions>(written).unwrap(), options);
    }

    #[test]
    fn plays_inline_accepts_field_spelling() {
        let options: PlaybackOptions = serde_json::from_str(r#"{"playsInline":false}"#).unwrap();
        assert!(!options.plays_inline);
    }
}
