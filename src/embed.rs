//! Embed URL and host page construction
//!
//! The embedded surface loads a small HTML document rooted at the base URL.
//! It pulls in the Vimeo player API, places the embed URL in an iframe and
//! posts every player event to the native bridge as a JSON string.

use url::Url;

use crate::{error::PlayerError, options::PlaybackOptions};

/// Embed host used when the caller does not supply a base URL
pub const DEFAULT_EMBED_HOST: &str = "https://player.vimeo.com";

/// Name of the native handler the host page posts bridge messages to
pub const BRIDGE_HANDLER: &str = "VimeoBridge";

const PLAYER_API_SCRIPT: &str = "https://player.vimeo.com/api/player.js";

/// Builds the embed URL for a video.
///
/// `{base}/video/{id}?h={hash}&autoplay=..&...`; `h` is omitted when there is
/// no hash key. Any path already present on the base URL is kept.
pub fn embed_url(
    video_id: u64,
    hash_key: Option<&str>,
    base_url: Option<&str>,
    options: &PlaybackOptions,
) -> Result<Url, PlayerError> {
    let base = base_url.unwrap_or(DEFAULT_EMBED_HOST);
    let mut url = Url::parse(base).map_err(|source| PlayerError::InvalidBaseUrl {
        url: base.to_string(),
        source,
    })?;

    url.path_segments_mut()
        .map_err(|_| PlayerError::UnsupportedBaseUrl(base.to_string()))?
        .pop_if_empty()
        .push("video")
        .push(&video_id.to_string());

    url.set_query(None);
    url.set_fragment(None);

    {
        let flag = |value: bool| if value { "1" } else { "0" };
        let mut query = url.query_pairs_mut();
        if let Some(hash) = hash_key.filter(|h| !h.is_empty()) {
            query.append_pair("h", hash);
        }
        query
            .append_pair("autoplay", flag(options.auto_play))
            .append_pair("loop", flag(options.looping))
            .append_pair("muted", flag(options.muted))
            .append_pair("byline", flag(options.show_byline))
            .append_pair("title", flag(options.show_title))
            .append_pair("portrait", flag(options.show_portrait))
            .append_pair("speed", flag(options.show_speed))
            .append_pair("playsinline", flag(options.plays_inline))
            .append_pair("transparent", flag(options.transparent))
            .append_pair("color", &options.accent_color.to_hex());
    }

    Ok(url)
}

/// A document ready to be loaded into the embedded surface
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedPage {
    /// The player embed URL placed in the iframe
    pub url: Url,
    /// Full HTML of the host page
    pub html: String,
}

impl EmbedPage {
    /// Builds the host page for a video
    pub fn new(
        video_id: u64,
        hash_key: Option<&str>,
        base_url: Option<&str>,
        options: &PlaybackOptions,
    ) -> Result<Self, PlayerError> {
        let url = embed_url(video_id, hash_key, base_url, options)?;
        let html = host_page(&url);
        Ok(Self { url, html })
    }

    /// Origin the document is loaded under; domain-restricted embeds check it
    pub fn base_url(&self) -> String {
        self.url.origin().ascii_serialization()
    }
}

fn host_page(url: &Url) -> String {
    // The URL is serialized by `url`, so it never contains a raw `"`.
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta name="viewport" content="width=device-width, initial-scale=1">
<style>html,body{{margin:0;padding:0;height:100%;background:transparent;overflow:hidden}}iframe{{position:absolute;top:0;left:0;width:100%;height:100%;border:0}}</style>
<script src="{api}"></script>
</head>
<body>
<iframe id="vimeo" src="{src}" allow="autoplay; fullscreen; picture-in-picture" allowfullscreen></iframe>
<script>
var bridge = function (message) {{
  var raw = JSON.stringify(message);
  if (window.webkit && window.webkit.messageHandlers && window.webkit.messageHandlers.{handler}) {{
    window.webkit.messageHandlers.{handler}.postMessage(raw);
  }} else if (window.{handler}) {{
    window.{handler}.postMessage(raw);
  }}
}};
var player = new Vimeo.Player(document.getElementById('vimeo'));
player.ready().then(function () {{
  Promise.all([player.getVideoTitle(), player.getDuration(), player.getTextTracks()]).then(function (r) {{
    bridge({{event: 'ready', title: r[0], duration: r[1], textTracks: r[2]}});
  }}, function () {{
    bridge({{event: 'ready'}});
  }});
}}, function () {{
  bridge({{event: 'initFailed'}});
}});
player.on('play', function (d) {{ bridge({{event: 'playing', duration: d.duration}}); }});
player.on('pause', function (d) {{ bridge({{event: 'paused', seconds: d.seconds}}); }});
player.on('ended', function (d) {{ bridge({{event: 'ended', duration: d.duration}}); }});
player.on('bufferstart', function () {{ bridge({{event: 'bufferStart'}}); }});
player.on('bufferend', function () {{ bridge({{event: 'bufferEnd'}}); }});
player.on('timeupdate', function (d) {{ bridge({{event: 'timeUpdate', seconds: d.seconds}}); }});
player.on('volumechange', function (d) {{ bridge({{event: 'volumeChange', volume: d.volume}}); }});
player.on('texttrackchange', function (d) {{ bridge({{event: 'textTrackChange', kind: d.kind, label: d.label, language: d.language}}); }});
player.on('error', function (d) {{ bridge({{event: 'error', name: d.name, message: d.message, method: d.method}}); }});
</script>
</body>
</html>
"#,
        api = PLAYER_API_SCRIPT,
        src = url.as_str(),
        handler = BRIDGE_HANDLER,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_rooted_at_base_and_carries_hash() {
        let url = embed_url(123, Some("abc"), Some("https://x"), &PlaybackOptions::default())
            .unwrap();
        let s = url.as_str();
        assert!(s.starts_with("https://x/"), "{s}");
        assert!(s.contains("/video/123"), "{s}");
        assert!(s.contains("h=abc"), "{s}");
    }

    #[test]
    fn hash_param_omitted_without_key() {
        let url = embed_url(42, None, None, &PlaybackOptions::default()).unwrap();
        assert_eq!(url.path(), "/video/42");
        assert!(url.as_str().starts_with(DEFAULT_EMBED_HOST));
        assert!(url.query_pairs().all(|(k, _)| k != "h"));
    }

    #[test]
    fn options_map_to_query_params() {
        let options = PlaybackOptions {
            auto_play: true,
            show_title: false,
            ..PlaybackOptions::default()
        };
        let url = embed_url(1, None, None, &options).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("autoplay"), Some("1"));
        assert_eq!(get("title"), Some("0"));
        assert_eq!(get("byline"), Some("1"));
        assert_eq!(get("playsinline"), Some("1"));
        assert_eq!(get("color"), Some("00acf0"));
    }

    #[test]
    fn base_path_is_preserved() {
        let url = embed_url(7, None, Some("https://host/embed/"), &PlaybackOptions::default())
            .unwrap();
        assert_eq!(url.path(), "/embed/video/7");
    }

    #[test]
    fn bad_base_urls_are_rejected() {
        let options = PlaybackOptions::default();
        assert!(matches!(
            embed_url(1, None, Some("not a url"), &options),
            Err(PlayerError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            embed_url(1, None, Some("mailto:someone@example.com"), &options),
            Err(PlayerError::UnsupportedBaseUrl(_))
        ));
    }

    #[test]
    fn page_embeds_url_and_bridge_handler() {
        let page = EmbedPage::new(9, Some("k"), Some("https://x"), &PlaybackOptions::default())
            .unwrap();
        assert!(page.html.contains(page.url.as_str()));
        assert!(page.html.contains(BRIDGE_HANDLER));
        assert_eq!(page.base_url(), "https://x");
    }
}
