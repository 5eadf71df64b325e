//! Per-set motion profiles layered on top of the shared blend/impulse mechanics
//!
//! Every profile follows the same outline: interpolate between the two layout
//! endpoints by `blend`, add a set-specific secondary offset built from
//! sinusoids of time, phase and speed, spin the static rotation, and scale by
//! `base * blend-or-one * pulse * (1 + impulse * gain)`. Evaluation is a pure
//! function of the particle, the frame's scalars and elapsed time.

use bevy::prelude::*;

use crate::constants::*;
use crate::damping::FrameState;
use crate::math_utils::lerp;
use crate::snowfall::{self, SnowBand};
use crate::types::{euler_to_quat, scale_rgb, InstanceSample, ParticleData};

// Garland twinkle tuning
const GARLAND_FLICKER_FREQUENCY: f32 = 8.0;
const GARLAND_FLICKER_PHASE_FACTOR: f32 = 5.0;
const GARLAND_FLICKER_THRESHOLD: f32 = 0.85;
const GARLAND_FLICKER_BRIGHT: f32 = 1.0;
const GARLAND_FLICKER_DIM: f32 = 0.5;
const GARLAND_IMPULSE_BRIGHTNESS: f32 = 1.5;
const GARLAND_IMPULSE_SCALE: f32 = 0.4;

// Ember loop: rise through a band this tall, centred on the anchor
const EMBER_RISE_BAND: f32 = 6.0;

/// Closed set of motion profiles, chosen once when a batch is created
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Choreography {
    /// Heavy floating gift boxes: large loose bob when dispersed, nearly still when assembled
    Foliage { burst_gain: f32 },
    /// Large ornaments: only visible when assembled
    Bauble { burst_gain: f32 },
    /// Twinkling beads with dynamic colour
    Garland,
    /// Fluttering ribbon segments, scaled directly by blend
    Ribbon { burst_gain: f32 },
    /// Rising, swirling sparks whose swirl explodes outward on an impulse
    Ember { burst_gain: f32 },
    /// Wrap-around fall that ignores the blend entirely
    Snowfall { band: SnowBand },
    /// The star topper: grows in as the tree assembles, spins slowly
    Emblem { burst_gain: f32 },
}

impl Choreography {
    pub fn name(&self) -> &'static str {
        match self {
            Choreography::Foliage { .. } => "foliage",
            Choreography::Bauble { .. } => "baubles",
            Choreography::Garland => "garland",
            Choreography::Ribbon { .. } => "ribbons",
            Choreography::Ember { .. } => "embers",
            Choreography::Snowfall { .. } => "snow",
            Choreography::Emblem { .. } => "emblem",
        }
    }

    /// Whether the colour output changes from frame to frame
    pub fn has_dynamic_color(&self) -> bool {
        matches!(self, Choreography::Garland)
    }

    pub fn evaluate(&self, particle: &ParticleData, state: FrameState, time: f32) -> InstanceSample {
        match *self {
            Choreography::Foliage { burst_gain } => foliage(particle, state, time, burst_gain),
            Choreography::Bauble { burst_gain } => bauble(particle, state, time, burst_gain),
            Choreography::Garland => garland(particle, state, time),
            Choreography::Ribbon { burst_gain } => ribbon(particle, state, time, burst_gain),
            Choreography::Ember { burst_gain } => ember(particle, state, time, burst_gain),
            Choreography::Snowfall { band } => snowfall::evaluate(particle, band, time),
            Choreography::Emblem { burst_gain } => emblem(particle, state, time, burst_gain),
        }
    }
}

/// Linear interpolation between the two layout endpoints
#[inline]
pub fn base_position(particle: &ParticleData, blend: f32) -> Vec3 {
    particle
        .dispersed_position
        .lerp(particle.assembled_position, blend)
}

#[inline]
fn burst_factor(impulse: f32, gain: f32) -> f32 {
    1.0 + impulse * gain
}

/// Static rotation plus spin about X and Y at `rate` rad/s
#[inline]
fn spun(particle: &ParticleData, time: f32, rate: f32) -> Quat {
    let r = particle.static_rotation;
    euler_to_quat(Vec3::new(r.x + time * rate, r.y + time * rate, r.z))
}

fn foliage(particle: &ParticleData, state: FrameState, time: f32, burst_gain: f32) -> InstanceSample {
    let b = state.blend;
    let float_intensity = lerp(2.0, 0.02, b);
    let float_speed = lerp(0.2, 0.5, b);

    let float_y = (time * float_speed + particle.phase).sin() * float_intensity;
    // Less horizontal movement keeps the cone solid
    let float_x = (time * float_speed * 0.5 + particle.phase).cos() * float_intensity * 0.2;

    let pulse = 1.0 + (time * 1.5 + particle.phase).sin() * 0.05;
    let rotate_speed = lerp(0.2, 0.05, b);

    InstanceSample {
        position: base_position(particle, b) + Vec3::new(float_x, float_y, 0.0),
        rotation: spun(particle, time, rotate_speed),
        scale: particle.base_scale * pulse * burst_factor(state.impulse, burst_gain),
        color: particle.color,
    }
}

fn bauble(particle: &ParticleData, state: FrameState, time: f32, burst_gain: f32) -> InstanceSample {
    let float_y = (time + particle.phase).sin() * 0.2;

    InstanceSample {
        position: base_position(particle, state.blend) + Vec3::Y * float_y,
        rotation: spun(particle, time, 0.2),
        scale: particle.base_scale * state.blend * burst_factor(state.impulse, burst_gain),
        color: particle.color,
    }
}

/// Garland brightness: a thresholded fast sinusoid (bright or dim) times a
/// slow breathing term, plus the impulse
pub fn garland_brightness(phase: f32, impulse: f32, time: f32) -> f32 {
    let flicker_arg = time * GARLAND_FLICKER_FREQUENCY + phase * GARLAND_FLICKER_PHASE_FACTOR;
    let sharp = if flicker_arg.sin() > GARLAND_FLICKER_THRESHOLD {
        GARLAND_FLICKER_BRIGHT
    } else {
        GARLAND_FLICKER_DIM
    };
    let breathe = (time * 2.0 + phase).sin() * 0.3 + 0.7;
    sharp * breathe + impulse * GARLAND_IMPULSE_BRIGHTNESS
}

fn garland(particle: &ParticleData, state: FrameState, time: f32) -> InstanceSample {
    let brightness = garland_brightness(particle.phase, state.impulse, time);
    let scale = particle.base_scale
        * (0.8 + brightness * 0.2 + state.impulse * GARLAND_IMPULSE_SCALE);

    InstanceSample {
        position: base_position(particle, state.blend),
        rotation: Quat::IDENTITY,
        scale,
        color: scale_rgb(particle.color, brightness),
    }
}

fn ribbon(particle: &ParticleData, state: FrameState, time: f32, burst_gain: f32) -> InstanceSample {
    let flutter = (time * 2.0 + particle.phase).sin() * 0.2;
    let twist = (time * 1.5 + particle.phase).cos() * 0.1;
    let r = particle.static_rotation;

    InstanceSample {
        position: base_position(particle, state.blend),
        rotation: euler_to_quat(Vec3::new(r.x + twist, r.y + flutter, r.z)),
        // Ribbons only exist on the assembled tree: zero width at blend 0
        scale: particle.base_scale * state.blend * burst_factor(state.impulse, burst_gain),
        color: particle.color,
    }
}

fn ember(particle: &ParticleData, state: FrameState, time: f32, burst_gain: f32) -> InstanceSample {
    let b = state.blend;

    // Always rising, looped so embers never fly away
    let rise_speed = 0.5 * particle.speed;
    let vertical_offset = (time * rise_speed + particle.phase).rem_euclid(EMBER_RISE_BAND);

    // Chaotic swirl when dispersed, gentle spiral when assembled; impulse blows it outward
    let swirl_radius = lerp(3.0, 0.5, b) + state.impulse * 5.0;
    let swirl_speed = lerp(0.5, 0.2, b) + state.impulse * 2.0;
    let swirl_angle = time * swirl_speed + particle.phase;

    let offset = Vec3::new(
        swirl_angle.cos() * swirl_radius,
        vertical_offset - EMBER_RISE_BAND / 2.0,
        swirl_angle.sin() * swirl_radius,
    );

    let flicker = 0.8 + (time * 5.0 + particle.phase).sin() * 0.4;

    InstanceSample {
        position: base_position(particle, b) + offset,
        rotation: spun(particle, time, 1.0),
        scale: particle.base_scale * flicker * burst_factor(state.impulse, burst_gain),
        color: particle.color,
    }
}

fn emblem(particle: &ParticleData, state: FrameState, time: f32, burst_gain: f32) -> InstanceSample {
    let pulse = 1.0 + (time * 1.5).sin() * 0.05;
    let r = particle.static_rotation;

    InstanceSample {
        position: base_position(particle, state.blend),
        rotation: euler_to_quat(Vec3::new(r.x, r.y + time * 0.5, r.z)),
        scale: lerp(0.0, particle.base_scale, state.blend) * pulse * burst_factor(state.impulse, burst_gain),
        color: particle.color,
    }
}
