//! Seams to the host toolkit: the embedded web surface and the loading indicator

use crate::embed::EmbedPage;

/// An in-app web content host running the player page.
///
/// All calls happen on the UI thread and are fire-and-forget.
pub trait PlayerSurface {
    /// Loads the host page, discarding anything loaded before
    fn load_page(&mut self, page: &EmbedPage);

    /// Evaluates a script snippet in the loaded page
    fn evaluate_script(&mut self, script: &str);

    /// Releases the web content and any native resources behind it
    fn release(&mut self);
}

/// Spinner shown while the player page loads
pub trait LoadingIndicator {
    /// Shows or hides the indicator
    fn set_visible(&mut self, visible: bool);
}

/// Indicator for hosts that draw their own loading state
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndicator;

impl LoadingIndicator for NoIndicator {
    fn set_visible(&mut self, _visible: bool) {}
}
