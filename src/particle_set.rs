//! Particle sets: fixed-size particle arrays, their choreography and their
//! per-frame instance buffers
//!
//! A set owns one `AnimationState` and one or more batches. Ornaments carry
//! three batches (baubles, garland, ribbons) that share the set's state but
//! each use their own motion profile. Buffers are indexed by particle id and
//! fully rewritten every frame; they are never resized.

use bevy::prelude::*;
use rand::Rng;
use rayon::prelude::*;

use crate::choreography::Choreography;
use crate::config::ChoreographyConfig;
use crate::constants::{PARALLEL_EVALUATION_THRESHOLD, SNOW_VISIBILITY_CUTOFF};
use crate::damping::{AnimationState, FrameState, ModeFade};
use crate::error::{ensure_count, Result};
use crate::layout;
use crate::types::{InstanceRaw, InstanceSample, ParticleData, SetKind, TreeMode};

// ============================================================================
// BATCH
// ============================================================================

/// Particles sharing one motion profile, with their output buffers
#[derive(Clone, Debug)]
pub struct ParticleBatch {
    profile: Choreography,
    particles: Vec<ParticleData>,
    samples: Vec<InstanceSample>,
    raw: Vec<InstanceRaw>,
}

impl ParticleBatch {
    pub fn new(profile: Choreography, particles: Vec<ParticleData>) -> Result<Self> {
        ensure_count(profile.name(), particles.len())?;
        let count = particles.len();
        Ok(Self {
            profile,
            particles,
            samples: vec![InstanceSample::default(); count],
            raw: vec![InstanceSample::default().to_raw(); count],
        })
    }

    pub fn name(&self) -> &'static str {
        self.profile.name()
    }

    pub fn profile(&self) -> Choreography {
        self.profile
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[ParticleData] {
        &self.particles
    }

    /// Per-particle transforms and colours from the last evaluation, indexed by id
    pub fn samples(&self) -> &[InstanceSample] {
        &self.samples
    }

    pub fn raw_instances(&self) -> &[InstanceRaw] {
        &self.raw
    }

    /// GPU-ready bytes: one `InstanceRaw` per particle
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.raw)
    }

    /// Rewrite every output slot. Large batches are split across the rayon pool.
    pub fn evaluate(&mut self, state: FrameState, time: f32) {
        let profile = self.profile;
        let particles = &self.particles;

        if particles.len() >= PARALLEL_EVALUATION_THRESHOLD {
            self.samples
                .par_iter_mut()
                .zip(self.raw.par_iter_mut())
                .zip(particles.par_iter())
                .for_each(|((sample, raw), particle)| {
                    *sample = profile.evaluate(particle, state, time);
                    *raw = sample.to_raw();
                });
        } else {
            for ((sample, raw), particle) in self
                .samples
                .iter_mut()
                .zip(self.raw.iter_mut())
                .zip(particles.iter())
            {
                *sample = profile.evaluate(particle, state, time);
                *raw = sample.to_raw();
            }
        }
    }
}

// ============================================================================
// SET
// ============================================================================

#[derive(Clone, Debug)]
pub struct ParticleSet {
    kind: SetKind,
    state: AnimationState,
    /// Opacity that follows the mode instead of a blend (snow only)
    fade: Option<ModeFade>,
    batches: Vec<ParticleBatch>,
    visible: bool,
}

impl ParticleSet {
    pub fn new(
        kind: SetKind,
        state: AnimationState,
        fade: Option<ModeFade>,
        batches: Vec<ParticleBatch>,
    ) -> Result<Self> {
        ensure_count(kind.name(), batches.len())?;
        let visible = fade.is_none();
        Ok(Self {
            kind,
            state,
            fade,
            batches,
            visible,
        })
    }

    /// Run the layout generator for `kind` and wrap the result with its choreography
    pub fn generate<R: Rng + ?Sized>(kind: SetKind, config: &ChoreographyConfig, rng: &mut R) -> Result<Self> {
        let mode = config.initial_mode;
        let shape = config.shape;
        let blend_rate = config.blend_rate(kind);

        let (impulse_decay, burst_gain) = match config.tuning(kind) {
            Some(tuning) => (tuning.impulse_decay, tuning.burst_gain),
            // Snow never reads its impulse; any valid rate will do
            None => (config.foliage.impulse_decay, 0.0),
        };
        let state = AnimationState::new(mode, blend_rate, impulse_decay)?;

        let mut fade = None;
        let batches = match kind {
            SetKind::Foliage => vec![ParticleBatch::new(
                Choreography::Foliage { burst_gain },
                layout::generate_foliage(rng, config.foliage_count, shape)?,
            )?],
            SetKind::Ornaments => {
                let ornaments = layout::generate_ornaments(rng, config.ornaments, shape)?;
                vec![
                    ParticleBatch::new(Choreography::Bauble { burst_gain }, ornaments.baubles)?,
                    ParticleBatch::new(Choreography::Garland, ornaments.garland)?,
                    ParticleBatch::new(Choreography::Ribbon { burst_gain }, ornaments.ribbons)?,
                ]
            }
            SetKind::Embers => vec![ParticleBatch::new(
                Choreography::Ember { burst_gain },
                layout::generate_embers(rng, config.ember_count, shape)?,
            )?],
            SetKind::Snow => {
                fade = Some(ModeFade::new(mode, config.snow_fade_rate)?);
                vec![ParticleBatch::new(
                    Choreography::Snowfall { band: config.snow_band },
                    layout::generate_snow(rng, config.snow_count, shape, config.snow_band)?,
                )?]
            }
            SetKind::Emblem => vec![ParticleBatch::new(
                Choreography::Emblem { burst_gain },
                vec![layout::generate_emblem(rng, shape)?],
            )?],
        };

        Self::new(kind, state, fade, batches)
    }

    pub fn kind(&self) -> SetKind {
        self.kind
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn frame(&self) -> FrameState {
        self.state.frame()
    }

    pub fn batches(&self) -> &[ParticleBatch] {
        &self.batches
    }

    pub fn batch(&self, index: usize) -> Option<&ParticleBatch> {
        self.batches.get(index)
    }

    /// Total particles across all batches
    pub fn len(&self) -> usize {
        self.batches.iter().map(ParticleBatch::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opacity for renderers; 1.0 for sets without a fade
    pub fn opacity(&self) -> f32 {
        self.fade.map_or(1.0, |fade| fade.level())
    }

    /// Explicit visibility flag. Renderers skip the set's draw calls when false.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Forward the external mode. Returns whether the set observed a transition.
    pub fn set_mode(&mut self, mode: TreeMode) -> bool {
        if let Some(fade) = self.fade.as_mut() {
            fade.set_mode(mode);
        }
        self.state.set_mode(mode)
    }

    /// Advance the set's scalars, then rewrite every batch buffer.
    /// `dt` must already be sanitized.
    pub fn update(&mut self, time: f32, dt: f32) -> FrameState {
        let frame = self.state.advance(dt);

        if let Some(fade) = self.fade.as_mut() {
            let opacity = fade.advance(dt);
            let visible = opacity > SNOW_VISIBILITY_CUTOFF;
            if visible != self.visible {
                debug!(
                    "{} set is now {} (opacity {:.3})",
                    self.kind.name(),
                    if visible { "visible" } else { "hidden" },
                    opacity
                );
                self.visible = visible;
            }
        }

        // Hidden sets keep their last buffers; the visibility flag takes precedence
        if self.visible {
            for batch in self.batches.iter_mut() {
                batch.evaluate(frame, time);
            }
        }
        frame
    }
}
