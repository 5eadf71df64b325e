// Snow: an endless wrap-around fall with a gentle two-frequency drift.
// Snow ignores the blend and impulse entirely; only its opacity follows the mode.

use bevy::prelude::*;

use crate::constants::{SNOW_FALL_SPEED_FACTOR, SNOW_HEIGHT_RANGE, SNOW_LOWER_BOUND};
use crate::math_utils::wrap_into_band;
use crate::types::{euler_to_quat, InstanceSample, ParticleData};

/// Vertical band the flakes fall through before wrapping back to the top
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnowBand {
    pub lower: f32,
    pub range: f32,
    pub fall_speed_factor: f32,
}

impl Default for SnowBand {
    fn default() -> Self {
        Self {
            lower: SNOW_LOWER_BOUND,
            range: SNOW_HEIGHT_RANGE,
            fall_speed_factor: SNOW_FALL_SPEED_FACTOR,
        }
    }
}

impl SnowBand {
    pub fn upper(&self) -> f32 {
        self.lower + self.range
    }

    pub fn contains(&self, y: f32) -> bool {
        y >= self.lower && y < self.upper()
    }
}

/// Height after falling for `time` seconds from `y0`, wrapped into the band
#[inline]
pub fn fall_height(y0: f32, speed: f32, time: f32, band: SnowBand) -> f32 {
    let fallen = y0 - time * speed * band.fall_speed_factor;
    wrap_into_band(fallen, band.lower, band.range)
}

/// Horizontal drift: a slow sway plus a faster flutter shared by both axes
#[inline]
pub fn drift(phase: f32, time: f32) -> (f32, f32) {
    let flutter = (time * 3.0 + phase * 2.0).sin() * 0.5;
    let x = ((time * 0.8 + phase).sin() + flutter) * 1.5;
    let z = ((time * 0.5 + phase).cos() + flutter) * 0.8;
    (x, z)
}

pub fn evaluate(particle: &ParticleData, band: SnowBand, time: f32) -> InstanceSample {
    // Snow lives in the dispersed layout only
    let origin = particle.dispersed_position;
    let y = fall_height(origin.y, particle.speed, time, band);
    let (dx, dz) = drift(particle.phase, time);

    let r = particle.static_rotation;
    InstanceSample {
        position: Vec3::new(origin.x + dx, y, origin.z + dz),
        rotation: euler_to_quat(Vec3::new(r.x + time * 0.5, r.y + time * 0.3, r.z)),
        scale: particle.base_scale,
        color: particle.color,
    }
}
