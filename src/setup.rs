// Scene setup and particle spawning for the host binary
use bevy::prelude::*;
use bevy::core_pipeline::bloom::Bloom;
use bevy::core_pipeline::tonemapping::Tonemapping;
use std::collections::HashMap;

use crate::camera::{FpsText, ModeText, OrbitCamera};
use crate::choreography::Choreography;
use crate::constants::{EMBLEM_LIGHT_INTENSITY, EMBLEM_LIGHT_RANGE, LIGHT_LUMENS_PER_UNIT};
use crate::engine::ChoreographyEngine;
use crate::particle_set::ParticleBatch;
use crate::plugin::{DynamicColor, GarlandLightEmitter, ParticleInstance, SetRoot};
use crate::procedural_meshes::{create_ribbon_segment_mesh, create_star_mesh};
use crate::types::{scale_rgb, PaletteColor, SetKind};

pub fn setup_scene(mut commands: Commands) {
    // Dim moonlight from above
    commands.spawn((
        DirectionalLight {
            illuminance: 1_500.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(10.0, 40.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.2, 0.25, 0.35),
        brightness: 120.0,
        affects_lightmapped_meshes: false,
    });

    let camera = OrbitCamera {
        focus_point: Vec3::new(0.0, 1.0, 0.0),
        yaw: 0.0,
        pitch: -0.15,
        distance: 45.0,
    };
    commands.spawn((
        Camera3d::default(),
        Camera {
            hdr: true,
            ..default()
        },
        Tonemapping::TonyMcMapface,
        Bloom::NATURAL,
        camera.transform(),
        camera,
    ));

    commands.spawn((
        Text::new("Assembled  (Space: toggle | Drag: orbit | Scroll: zoom)"),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        ModeText,
    ));

    // Dedicated FPS display in green (top-right corner)
    commands.spawn((
        Text::new("FPS: --"),
        TextFont {
            font_size: 24.0,
            ..default()
        },
        TextColor(Color::srgb(0.3, 0.95, 0.4)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            right: Val::Px(10.0),
            ..default()
        },
        FpsText,
    ));
}

/// Glowing material for one palette entry. Emissive carries the HDR intensity.
fn palette_material(palette: PaletteColor) -> StandardMaterial {
    let [r, g, b] = palette.srgb_u8();
    StandardMaterial {
        base_color: Color::srgb_u8(r, g, b),
        emissive: scale_rgb(palette.linear(), 0.5),
        metallic: 0.6,
        perceptual_roughness: 0.35,
        ..default()
    }
}

/// Warm gold light carried inside the star topper
pub fn emblem_light() -> PointLight {
    let [r, g, b] = PaletteColor::GoldBright.srgb_u8();
    PointLight {
        color: Color::srgb_u8(r, g, b),
        intensity: EMBLEM_LIGHT_INTENSITY * LIGHT_LUMENS_PER_UNIT,
        range: EMBLEM_LIGHT_RANGE,
        shadows_enabled: false,
        ..default()
    }
}

/// Shared meshes and palette materials, created once per scene
struct SceneAssets {
    cube: Handle<Mesh>,
    sphere: Handle<Mesh>,
    ribbon: Handle<Mesh>,
    star: Handle<Mesh>,
    palette: HashMap<PaletteColor, Handle<StandardMaterial>>,
}

impl SceneAssets {
    fn material(&mut self, palette: PaletteColor, materials: &mut Assets<StandardMaterial>) -> Handle<StandardMaterial> {
        self.palette
            .entry(palette)
            .or_insert_with(|| materials.add(palette_material(palette)))
            .clone()
    }

    fn mesh_for(&self, profile: Choreography) -> Handle<Mesh> {
        match profile {
            Choreography::Foliage { .. } | Choreography::Ember { .. } => self.cube.clone(),
            Choreography::Bauble { .. } | Choreography::Garland | Choreography::Snowfall { .. } => {
                self.sphere.clone()
            }
            Choreography::Ribbon { .. } => self.ribbon.clone(),
            Choreography::Emblem { .. } => self.star.clone(),
        }
    }
}

/// One entity per particle, grouped under a root entity per set
pub fn spawn_tree(
    mut commands: Commands,
    engine: Option<Res<ChoreographyEngine>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(engine) = engine else {
        warn!("Choreography engine missing, nothing to spawn");
        return;
    };

    let mut assets = SceneAssets {
        cube: meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
        sphere: meshes.add(Sphere::new(0.5)),
        ribbon: create_ribbon_segment_mesh(&mut meshes),
        star: create_star_mesh(&mut meshes),
        palette: HashMap::new(),
    };

    // Snow shares one translucent material whose alpha tracks the set's opacity
    let snow_material = materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, 0.0),
        emissive: scale_rgb(PaletteColor::SnowWhite.linear(), 0.2),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    let mut spawned = 0;
    for set in engine.sets() {
        let kind = set.kind();
        let root_material = (kind == SetKind::Snow).then(|| snow_material.clone());

        // Materials are resolved before `commands` is borrowed for the hierarchy
        let mut children = Vec::with_capacity(set.len());
        for (batch_index, batch) in set.batches().iter().enumerate() {
            children.extend(batch_entities(
                kind,
                batch_index,
                batch,
                &mut assets,
                &mut materials,
                &snow_material,
            ));
        }
        spawned += children.len();

        commands
            .spawn((
                Name::new(format!("{} set", kind.name())),
                SetRoot {
                    kind,
                    material: root_material,
                },
                Transform::default(),
                if set.is_visible() { Visibility::Inherited } else { Visibility::Hidden },
            ))
            .with_children(|parent| {
                for (bundle, dynamic_color) in children {
                    let mut child = parent.spawn(bundle);
                    if dynamic_color {
                        child.insert(DynamicColor);
                    }
                    if kind == SetKind::Emblem {
                        child.with_children(|star| {
                            star.spawn((Name::new("Emblem light"), emblem_light(), Transform::default()));
                        });
                    }
                }
            });
    }

    for (index, light) in engine.lights().iter().enumerate() {
        let [r, g, b] = light.palette.srgb_u8();
        commands.spawn((
            Name::new(format!("Garland light {}", index)),
            PointLight {
                color: Color::srgb_u8(r, g, b),
                intensity: 0.0,
                range: 20.0,
                shadows_enabled: false,
                ..default()
            },
            Transform::default(),
            GarlandLightEmitter { index },
        ));
    }

    info!("Spawned {} particle entities and {} garland lights", spawned, engine.lights().len());
}

type ParticleBundle = (
    (ParticleInstance, Mesh3d, MeshMaterial3d<StandardMaterial>, Transform),
    bool,
);

fn batch_entities(
    kind: SetKind,
    batch_index: usize,
    batch: &ParticleBatch,
    assets: &mut SceneAssets,
    materials: &mut Assets<StandardMaterial>,
    snow_material: &Handle<StandardMaterial>,
) -> Vec<ParticleBundle> {
    let profile = batch.profile();
    let mesh = assets.mesh_for(profile);

    batch
        .particles()
        .iter()
        .zip(batch.samples())
        .map(|(particle, sample)| {
            let material = if profile.has_dynamic_color() {
                // Per-bead material, rewritten every frame
                materials.add(palette_material(particle.palette))
            } else if kind == SetKind::Snow {
                snow_material.clone()
            } else {
                assets.material(particle.palette, materials)
            };

            (
                (
                    ParticleInstance {
                        set: kind,
                        batch: batch_index,
                        index: particle.id,
                    },
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(material),
                    sample.transform(),
                ),
                profile.has_dynamic_color(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChoreographyConfig;
    use crate::constants::GARLAND_LIGHT_OFFSETS;
    use crate::plugin::{create_engine, TreeChoreographyPlugin};

    fn tree_app() -> App {
        let mut config = ChoreographyConfig {
            foliage_count: 32,
            ember_count: 8,
            snow_count: 16,
            ..Default::default()
        };
        config.ornaments.baubles = 2;
        config.ornaments.garland_segments = 4;
        config.ornaments.ribbon_count = 1;
        config.ornaments.ribbon_segments = 2;

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .add_plugins(TreeChoreographyPlugin { config })
            .add_systems(Startup, spawn_tree.after(create_engine));
        app.update();
        app
    }

    #[test]
    fn emblem_light_is_a_steady_gold_glow() {
        let light = emblem_light();
        assert_eq!(light.color, Color::srgb_u8(0xfc, 0xd3, 0x4d));
        assert_eq!(light.intensity, EMBLEM_LIGHT_INTENSITY * LIGHT_LUMENS_PER_UNIT);
        assert_eq!(light.range, EMBLEM_LIGHT_RANGE);
        assert!(!light.shadows_enabled);
    }

    #[test]
    fn star_particle_carries_its_own_light() {
        let mut app = tree_app();
        let world = app.world_mut();

        let mut lit = world.query_filtered::<&ChildOf, With<PointLight>>();
        let parents: Vec<Entity> = lit.iter(world).map(|child_of| child_of.parent()).collect();
        assert_eq!(parents.len(), 1);

        let instance = world.get::<ParticleInstance>(parents[0]).copied();
        assert_eq!(instance.map(|instance| instance.set), Some(SetKind::Emblem));

        // Garland lights stay free-floating
        let mut emitters = world.query_filtered::<Entity, (With<GarlandLightEmitter>, Without<ChildOf>)>();
        assert_eq!(emitters.iter(world).count(), GARLAND_LIGHT_OFFSETS.len());
    }
}
