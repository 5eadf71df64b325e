//! Bevy integration: the engine as a resource, a mode-request event and the
//! systems that copy the engine's buffers onto entities every frame

use bevy::prelude::*;
use rand::thread_rng;

use crate::config::ChoreographyConfig;
use crate::constants::LIGHT_LUMENS_PER_UNIT;
use crate::engine::ChoreographyEngine;
use crate::types::{SetKind, TreeMode};

/// Ask the engine to switch to a mode. Repeating the current mode is ignored.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeModeRequest(pub TreeMode);

/// One rendered particle: indexes into `engine.set(set).batch(batch).samples()[index]`
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticleInstance {
    pub set: SetKind,
    pub batch: usize,
    pub index: usize,
}

/// Marks particles whose material colour is rewritten every frame (garland beads)
#[derive(Component)]
pub struct DynamicColor;

/// Parent of every particle entity of one set. Its `Visibility` hides the
/// whole set at once; `material`, when present, carries the set's opacity.
#[derive(Component)]
pub struct SetRoot {
    pub kind: SetKind,
    pub material: Option<Handle<StandardMaterial>>,
}

/// A point light following the garland spiral
#[derive(Component, Clone, Copy, Debug)]
pub struct GarlandLightEmitter {
    pub index: usize,
}

#[derive(Default)]
pub struct TreeChoreographyPlugin {
    pub config: ChoreographyConfig,
}

impl Plugin for TreeChoreographyPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .add_event::<TreeModeRequest>()
            .add_systems(Startup, create_engine)
            .add_systems(
                Update,
                (
                    apply_mode_requests,
                    advance_engine,
                    (
                        sync_particle_transforms,
                        sync_dynamic_colors,
                        sync_set_visibility,
                        sync_garland_lights,
                    ),
                )
                    .chain()
                    .run_if(resource_exists::<ChoreographyEngine>),
            );
    }
}

/// Generate every particle set once. An invalid configuration stops the app.
pub fn create_engine(
    mut commands: Commands,
    config: Res<ChoreographyConfig>,
    mut exit: EventWriter<AppExit>,
) {
    match ChoreographyEngine::new(config.clone(), &mut thread_rng()) {
        Ok(engine) => commands.insert_resource(engine),
        Err(err) => {
            error!("Invalid choreography configuration: {}", err);
            exit.write(AppExit::error());
        }
    }
}

pub fn apply_mode_requests(
    mut requests: EventReader<TreeModeRequest>,
    mut engine: ResMut<ChoreographyEngine>,
) {
    for TreeModeRequest(mode) in requests.read() {
        engine.set_mode(*mode);
    }
}

pub fn advance_engine(time: Res<Time>, mut engine: ResMut<ChoreographyEngine>) {
    engine.update(time.elapsed_secs(), time.delta_secs());
}

pub fn sync_particle_transforms(
    engine: Res<ChoreographyEngine>,
    mut particles: Query<(&ParticleInstance, &mut Transform)>,
) {
    particles.par_iter_mut().for_each(|(instance, mut transform)| {
        let set = engine.set(instance.set);
        if !set.is_visible() {
            return;
        }
        if let Some(sample) = set
            .batch(instance.batch)
            .and_then(|batch| batch.samples().get(instance.index))
        {
            *transform = sample.transform();
        }
    });
}

pub fn sync_dynamic_colors(
    engine: Res<ChoreographyEngine>,
    particles: Query<(&ParticleInstance, &MeshMaterial3d<StandardMaterial>), With<DynamicColor>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (instance, material) in particles.iter() {
        let Some(sample) = engine
            .set(instance.set)
            .batch(instance.batch)
            .and_then(|batch| batch.samples().get(instance.index))
        else {
            continue;
        };
        if let Some(material) = materials.get_mut(&material.0) {
            material.emissive = sample.color;
        }
    }
}

pub fn sync_set_visibility(
    engine: Res<ChoreographyEngine>,
    mut roots: Query<(&SetRoot, &mut Visibility)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (root, mut visibility) in roots.iter_mut() {
        let set = engine.set(root.kind);
        let wanted = if set.is_visible() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if *visibility != wanted {
            *visibility = wanted;
        }

        if let Some(material) = root.material.as_ref().and_then(|handle| materials.get_mut(handle)) {
            material.base_color.set_alpha(set.opacity());
        }
    }
}

pub fn sync_garland_lights(
    engine: Res<ChoreographyEngine>,
    mut lights: Query<(&GarlandLightEmitter, &mut Transform, &mut PointLight)>,
) {
    let samples = engine.light_samples();
    for (emitter, mut transform, mut light) in lights.iter_mut() {
        let Some(sample) = samples.get(emitter.index) else {
            continue;
        };
        transform.translation = sample.position;
        light.intensity = sample.intensity * LIGHT_LUMENS_PER_UNIT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EMBLEM_LIFT;

    fn small_config() -> ChoreographyConfig {
        let mut config = ChoreographyConfig {
            foliage_count: 64,
            ember_count: 16,
            snow_count: 32,
            ..Default::default()
        };
        config.ornaments.baubles = 4;
        config.ornaments.garland_segments = 8;
        config.ornaments.ribbon_count = 2;
        config.ornaments.ribbon_segments = 4;
        config
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<StandardMaterial>>()
            .add_plugins(TreeChoreographyPlugin {
                config: small_config(),
            });
        app.update();
        app
    }

    #[test]
    fn plugin_creates_the_engine_on_startup() {
        let app = app();
        let engine = app.world().resource::<ChoreographyEngine>();
        assert_eq!(engine.foliage().len(), 64);
        assert_eq!(engine.mode(), TreeMode::Assembled);
    }

    #[test]
    fn mode_requests_reach_the_engine() {
        let mut app = app();
        app.world_mut().send_event(TreeModeRequest(TreeMode::Dispersed));
        app.update();
        let engine = app.world().resource::<ChoreographyEngine>();
        assert_eq!(engine.mode(), TreeMode::Dispersed);
        assert_eq!(engine.foliage().frame().impulse, 1.0);
    }

    #[test]
    fn particle_entities_follow_their_samples() {
        let mut app = app();
        let star = app
            .world_mut()
            .spawn((
                ParticleInstance {
                    set: SetKind::Emblem,
                    batch: 0,
                    index: 0,
                },
                Transform::default(),
            ))
            .id();
        app.update();

        let transform = app.world().get::<Transform>(star).copied().unwrap_or_default();
        let expected = app.world().resource::<ChoreographyEngine>().emblem().batches()[0].samples()[0];
        assert_eq!(transform.translation, expected.position);
        assert!(transform.translation.y > EMBLEM_LIFT);
    }

    #[test]
    fn invalid_config_exits_instead_of_panicking() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<StandardMaterial>>()
            .add_plugins(TreeChoreographyPlugin {
                config: ChoreographyConfig {
                    snow_count: 0,
                    ..small_config()
                },
            });
        app.update();
        assert!(app.world().get_resource::<ChoreographyEngine>().is_none());
        assert!(app.should_exit().is_some());
    }
}
