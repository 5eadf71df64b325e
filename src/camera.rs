// Orbit camera and on-screen readouts for the host scene
use bevy::prelude::*;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel, MouseMotion};

use crate::engine::ChoreographyEngine;
use crate::types::TreeMode;

// Orbit camera settings
const CAMERA_ZOOM_SPEED: f32 = 4.0;
const CAMERA_MIN_DISTANCE: f32 = 15.0;
const CAMERA_MAX_DISTANCE: f32 = 120.0;
const CAMERA_ROTATION_SPEED: f32 = 0.005;
const CAMERA_IDLE_SPIN: f32 = 0.05; // rad/s while the mouse is not dragging

#[derive(Component)]
pub struct OrbitCamera {
    pub focus_point: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl OrbitCamera {
    pub fn transform(&self) -> Transform {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);
        let offset = rotation * Vec3::new(0.0, 0.0, self.distance);
        Transform {
            translation: self.focus_point + offset,
            rotation,
            ..default()
        }
    }
}

#[derive(Component)]
pub struct FpsText;

#[derive(Component)]
pub struct ModeText;

pub fn orbit_camera_control(
    time: Res<Time>,
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    mut scroll_events: EventReader<MouseWheel>,
    mut mouse_motion_events: EventReader<MouseMotion>,
    mut camera_query: Query<(&mut Transform, &mut OrbitCamera)>,
) {
    let Ok((mut transform, mut camera)) = camera_query.single_mut() else {
        return;
    };

    // Left or middle drag orbits the tree
    if mouse_button_input.pressed(MouseButton::Left) || mouse_button_input.pressed(MouseButton::Middle) {
        for motion in mouse_motion_events.read() {
            camera.yaw -= motion.delta.x * CAMERA_ROTATION_SPEED;
            camera.pitch = (camera.pitch - motion.delta.y * CAMERA_ROTATION_SPEED).clamp(-1.2, 0.3);
        }
    } else {
        // Clear mouse motion events if not dragging to prevent accumulation
        mouse_motion_events.clear();
        camera.yaw += CAMERA_IDLE_SPIN * time.delta_secs();
    }

    for scroll in scroll_events.read() {
        let zoom_delta = match scroll.unit {
            MouseScrollUnit::Line => scroll.y * CAMERA_ZOOM_SPEED,
            MouseScrollUnit::Pixel => scroll.y * CAMERA_ZOOM_SPEED * 0.1,
        };
        camera.distance = (camera.distance - zoom_delta).clamp(CAMERA_MIN_DISTANCE, CAMERA_MAX_DISTANCE);
    }

    *transform = camera.transform();
}

pub fn update_fps_display(
    mut query: Query<&mut Text, With<FpsText>>,
    diagnostics: Res<bevy::diagnostic::DiagnosticsStore>,
) {
    if let Ok(mut text) = query.single_mut() {
        let fps = diagnostics
            .get(&bevy::diagnostic::FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|fps| fps.smoothed())
            .unwrap_or(0.0);

        **text = format!("FPS: {:.0}", fps);
    }
}

pub fn update_mode_text(
    engine: Option<Res<ChoreographyEngine>>,
    mut query: Query<&mut Text, With<ModeText>>,
) {
    let Some(engine) = engine else {
        return;
    };
    if let Ok(mut text) = query.single_mut() {
        let label = match engine.mode() {
            TreeMode::Assembled => "Assembled",
            TreeMode::Dispersed => "Dispersed",
        };
        **text = format!("{}  (Space: toggle | Drag: orbit | Scroll: zoom)", label);
    }
}
