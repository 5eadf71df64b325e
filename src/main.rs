use bevy::prelude::*;

use tree_choreography::camera::{orbit_camera_control, update_fps_display, update_mode_text};
use tree_choreography::plugin::create_engine;
use tree_choreography::setup::{setup_scene, spawn_tree};
use tree_choreography::{ChoreographyEngine, TreeChoreographyPlugin, TreeModeRequest};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(bevy::diagnostic::FrameTimeDiagnosticsPlugin::default())
        .add_plugins(TreeChoreographyPlugin::default())
        .insert_resource(ClearColor(Color::srgb(0.0, 0.01, 0.02)))
        .add_systems(Startup, (setup_scene, spawn_tree.after(create_engine)))
        .add_systems(Update, (
            toggle_mode_on_space,
            orbit_camera_control,
            update_fps_display,
            update_mode_text,
        ))
        .run();
}

fn toggle_mode_on_space(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    engine: Option<Res<ChoreographyEngine>>,
    mut requests: EventWriter<TreeModeRequest>,
) {
    let Some(engine) = engine else {
        return;
    };
    if keyboard_input.just_pressed(KeyCode::Space) {
        requests.write(TreeModeRequest(engine.mode().toggled()));
    }
}
