//! Bevy integration: drives a player living inside a Bevy app

use bevy::{
    app::{App, AppExit, Last, Plugin, PreUpdate},
    ecs::{message::MessageReader, system::NonSendMut},
    window::AppLifecycle,
};

use crate::view::VimeoPlayerView;

/// Plugin that pumps the player's bridge and forwards app lifecycle
///
/// The player is a non-send resource: it lives on the main thread together
/// with the web view it drives.
///
/// # Example
///
/// ```no_run
/// use bevy::prelude::*;
/// use vimeo_embedded::prelude::*;
///
/// fn attach(app: &mut App, player: VimeoPlayerView) {
///     app.add_plugins(VimeoPlayerPlugin)
///         .insert_non_send_resource(player);
/// }
/// ```
#[derive(Default)]
pub struct VimeoPlayerPlugin;

impl Plugin for VimeoPlayerPlugin {
    fn name(&self) -> &str {
        "vimeo_embedded::VimeoPlayerPlugin"
    }

    fn build(&self, app: &mut App) {
        app.add_message::<AppLifecycle>()
            .add_systems(PreUpdate, pump_bridge_messages)
            .add_systems(Last, forward_host_lifecycle);
    }
}

/// Applies bridge messages queued since the last frame
fn pump_bridge_messages(player: Option<NonSendMut<VimeoPlayerView>>) {
    if let Some(mut player) = player {
        player.process_messages();
    }
}

/// Suspend pauses playback, exit releases the surface
fn forward_host_lifecycle(
    mut lifecycle: MessageReader<AppLifecycle>,
    mut exits: MessageReader<AppExit>,
    player: Option<NonSendMut<VimeoPlayerView>>,
) {
    // Drain both readers fully so nothing is replayed next frame
    let suspended = lifecycle
        .read()
        .filter(|event| matches!(event, AppLifecycle::WillSuspend | AppLifecycle::Suspended))
        .count()
        > 0;
    let exiting = exits.read().count() > 0;

    let Some(mut player) = player else {
        return;
    };

    if suspended {
        player.on_stop();
    }
    if exiting {
        player.on_destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        embed::EmbedPage, options::PlaybackOptions, state::PlayerState,
        surface::{NoIndicator, PlayerSurface},
    };
    use std::{cell::RefCell, rc::Rc};

    #[derive(Clone, Default)]
    struct Scripts(Rc<RefCell<Vec<String>>>);

    impl PlayerSurface for Scripts {
        fn load_page(&mut self, _page: &EmbedPage) {}

        fn evaluate_script(&mut self, script: &str) {
            self.0.borrow_mut().push(script.to_string());
        }

        fn release(&mut self) {
            self.0.borrow_mut().push("released".to_string());
        }
    }

    fn app_with_player() -> (App, Scripts) {
        let scripts = Scripts::default();
        let mut player =
            VimeoPlayerView::new(scripts.clone(), NoIndicator, PlaybackOptions::default());
        player.initialize(1, None, None).unwrap();

        let mut app = App::new();
        app.add_plugins(VimeoPlayerPlugin)
            .insert_non_send_resource(player);
        (app, scripts)
    }

    #[test]
    fn bridge_messages_are_applied_each_frame() {
        let (mut app, _scripts) = app_with_player();
        let sender = app
            .world()
            .non_send_resource::<VimeoPlayerView>()
            .bridge_sender();
        sender.post(r#"{"event":"playing","duration":12}"#);

        app.update();

        let player = app.world().non_send_resource::<VimeoPlayerView>();
        assert_eq!(player.player_state(), PlayerState::Playing);
    }

    #[test]
    fn suspend_pauses_and_exit_releases() {
        let (mut app, scripts) = app_with_player();

        app.world_mut().write_message(AppLifecycle::Suspended);
        app.update();
        assert_eq!(scripts.0.borrow().last().map(String::as_str), Some("player.pause();"));

        app.world_mut().write_message(AppExit::Success);
        app.update();
        assert_eq!(scripts.0.borrow().last().map(String::as_str), Some("released"));
        assert!(app.world().non_send_resource::<VimeoPlayerView>().is_destroyed());
    }
}
