use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Uniform-by-volume sample inside a ball of the given radius
/// Azimuth 2*pi*u, polar angle acos(2v - 1), radius scaled by the cube root of a third variate
pub fn random_point_in_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    let u: f32 = rng.gen();
    let v: f32 = rng.gen();
    let theta = TAU * u;
    let phi = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();
    let r = rng.gen::<f32>().cbrt() * radius;

    let sin_phi = phi.sin();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * phi.cos(),
    )
}

/// Area-uniform radius inside a disk: sqrt of a uniform variate
#[inline]
pub fn area_uniform_radius<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> f32 {
    rng.gen::<f32>().sqrt() * radius
}

/// Point on a horizontal circle of radius `r` at height `y`
#[inline]
pub fn ring_point(angle: f32, r: f32, y: f32) -> Vec3 {
    Vec3::new(angle.cos() * r, y, angle.sin() * r)
}

/// Vertical coordinate for height fraction `h` on a cone centred on the origin
#[inline]
pub fn cone_height(h: f32, height: f32) -> f32 {
    h * height - height / 2.0
}

/// Radius of the cone surface at height fraction `h`
#[inline]
pub fn cone_radius(h: f32, base_radius: f32) -> f32 {
    base_radius * (1.0 - h)
}

/// Point on the garland spiral for path parameter `t` in [0, 1)
pub fn garland_spiral_point(t: f32, height: f32, base_radius: f32, loops: f32, offset: f32) -> Vec3 {
    let y = cone_height(t, height);
    let r = cone_radius(t, base_radius) + offset;
    let angle = t * TAU * loops;
    ring_point(angle, r, y)
}

/// Wrap `value` into [lower, lower + range) using the double-mod form,
/// which stays correct for negative intermediates
#[inline]
pub fn wrap_into_band(value: f32, lower: f32, range: f32) -> f32 {
    let wrapped = ((value - lower) % range + range) % range;
    // Float rounding can land exactly on `range` for tiny negative inputs
    if wrapped >= range {
        lower
    } else {
        wrapped + lower
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Random Euler angles with each axis in [0, pi); axes past `axes` stay zero
pub fn random_euler<R: Rng + ?Sized>(rng: &mut R, axes: usize) -> Vec3 {
    let mut angles = [0.0_f32; 3];
    for angle in angles.iter_mut().take(axes.min(3)) {
        *angle = rng.gen::<f32>() * PI;
    }
    Vec3::from_array(angles)
}
