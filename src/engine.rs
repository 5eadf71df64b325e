//! The choreography engine: every particle set plus the garland lights,
//! driven by one mode signal and one per-frame time pair

use bevy::prelude::*;
use rand::Rng;

use crate::config::ChoreographyConfig;
use crate::damping::sanitize_delta;
use crate::error::Result;
use crate::garland_lights::{default_garland_lights, GarlandLight, LightSample};
use crate::particle_set::ParticleSet;
use crate::types::{SetKind, TreeMode};

#[derive(Resource, Debug)]
pub struct ChoreographyEngine {
    config: ChoreographyConfig,
    mode: TreeMode,
    /// One entry per `SetKind::ALL`, same order
    sets: Vec<ParticleSet>,
    lights: Vec<GarlandLight>,
    elapsed: f32,
}

impl ChoreographyEngine {
    /// Validate the configuration and generate every set once
    pub fn new<R: Rng + ?Sized>(config: ChoreographyConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let sets = SetKind::ALL
            .iter()
            .map(|&kind| ParticleSet::generate(kind, &config, rng))
            .collect::<Result<Vec<_>>>()?;
        let lights = default_garland_lights(config.initial_mode)?;

        let total: usize = sets.iter().map(ParticleSet::len).sum();
        info!(
            "Choreography engine ready: {} particles in {} sets, {} garland lights, starting {:?}",
            total,
            sets.len(),
            lights.len(),
            config.initial_mode
        );

        let mut engine = Self {
            mode: config.initial_mode,
            config,
            sets,
            lights,
            elapsed: 0.0,
        };
        // Fill the buffers so the first rendered frame is already laid out
        engine.evaluate(0.0);
        Ok(engine)
    }

    pub fn config(&self) -> &ChoreographyConfig {
        &self.config
    }

    pub fn mode(&self) -> TreeMode {
        self.mode
    }

    /// Elapsed time passed to the last update
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Forward the external mode to every set and light. Repeating the current
    /// mode is a no-op; a change arms one impulse per set.
    pub fn set_mode(&mut self, mode: TreeMode) -> bool {
        if mode == self.mode {
            return false;
        }
        info!("Tree mode: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;

        for set in self.sets.iter_mut() {
            set.set_mode(mode);
        }
        for light in self.lights.iter_mut() {
            light.set_mode(mode);
        }
        true
    }

    pub fn toggle_mode(&mut self) -> TreeMode {
        let next = self.mode.toggled();
        self.set_mode(next);
        next
    }

    /// One frame: advance every damped scalar by `delta`, then evaluate every
    /// set at `elapsed`
    pub fn update(&mut self, elapsed: f32, delta: f32) {
        let dt = sanitize_delta(delta);
        if dt != delta {
            warn!("Frame delta {} clamped to {}", delta, dt);
        }
        if elapsed.is_finite() {
            self.elapsed = elapsed;
        } else {
            warn!("Ignoring non-finite elapsed time {}", elapsed);
        }

        for set in self.sets.iter_mut() {
            set.update(self.elapsed, dt);
        }
        for light in self.lights.iter_mut() {
            light.advance(dt);
        }
    }

    fn evaluate(&mut self, elapsed: f32) {
        for set in self.sets.iter_mut() {
            set.update(elapsed, 0.0);
        }
    }

    pub fn sets(&self) -> &[ParticleSet] {
        &self.sets
    }

    pub fn set(&self, kind: SetKind) -> &ParticleSet {
        // `sets` is built from SetKind::ALL, so every kind is present at its index
        &self.sets[kind as usize]
    }

    pub fn foliage(&self) -> &ParticleSet {
        self.set(SetKind::Foliage)
    }

    pub fn ornaments(&self) -> &ParticleSet {
        self.set(SetKind::Ornaments)
    }

    pub fn embers(&self) -> &ParticleSet {
        self.set(SetKind::Embers)
    }

    pub fn snow(&self) -> &ParticleSet {
        self.set(SetKind::Snow)
    }

    pub fn emblem(&self) -> &ParticleSet {
        self.set(SetKind::Emblem)
    }

    pub fn lights(&self) -> &[GarlandLight] {
        &self.lights
    }

    /// Position, intensity and colour of every garland light at the current time
    pub fn light_samples(&self) -> Vec<LightSample> {
        self.lights
            .iter()
            .map(|light| light.sample(self.elapsed, self.config.shape, self.config.ornaments.garland_loops))
            .collect()
    }

    /// Instance bytes for each batch of a set, in batch order
    pub fn instance_bytes(&self, kind: SetKind) -> Vec<&[u8]> {
        self.set(kind)
            .batches()
            .iter()
            .map(|batch| batch.instance_bytes())
            .collect()
    }
}
