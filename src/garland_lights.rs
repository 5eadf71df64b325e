// Point lights that travel along the garland spiral.
// Each light loops from the base of the cone to the tip; its intensity fades
// in with the assembled tree and out when the tree disperses.

use bevy::prelude::*;

use crate::constants::*;
use crate::damping::ModeFade;
use crate::error::{ensure_rate, Result};
use crate::layout::TreeShape;
use crate::math_utils::garland_spiral_point;
use crate::types::{PaletteColor, TreeMode};

/// One moving emitter
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GarlandLight {
    /// Fraction of the spiral covered per second
    pub speed: f32,
    /// Starting fraction along the spiral, in [0, 1)
    pub offset: f32,
    pub palette: PaletteColor,
    fade: ModeFade,
}

/// Evaluated state of one light for the current frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSample {
    pub position: Vec3,
    pub intensity: f32,
}

impl GarlandLight {
    pub fn new(speed: f32, offset: f32, palette: PaletteColor, mode: TreeMode) -> Result<Self> {
        ensure_rate("garland light speed", speed)?;
        Ok(Self {
            speed,
            offset: offset.rem_euclid(1.0),
            palette,
            fade: ModeFade::new(mode, GARLAND_LIGHT_FADE_RATE)?,
        })
    }

    pub fn set_mode(&mut self, mode: TreeMode) {
        self.fade.set_mode(mode);
    }

    pub fn advance(&mut self, dt: f32) -> f32 {
        self.fade.advance(dt)
    }

    /// Path parameter in [0, 1) at `time`
    pub fn path_parameter(&self, time: f32) -> f32 {
        let t = (time * self.speed + self.offset).rem_euclid(1.0);
        // rem_euclid can return exactly 1.0 for tiny negative inputs
        if t >= 1.0 {
            0.0
        } else {
            t
        }
    }

    pub fn sample(&self, time: f32, shape: TreeShape, loops: f32) -> LightSample {
        let t = self.path_parameter(time);
        LightSample {
            position: garland_spiral_point(
                t,
                shape.height,
                shape.base_radius,
                loops,
                GARLAND_LIGHT_SURFACE_OFFSET,
            ),
            intensity: self.fade.level() * GARLAND_LIGHT_MAX_INTENSITY,
        }
    }
}

const GARLAND_LIGHT_PALETTE: [PaletteColor; 2] = [PaletteColor::GoldBright, PaletteColor::GoldMetallic];

/// The default pair of lights, half a spiral apart
pub fn default_garland_lights(mode: TreeMode) -> Result<Vec<GarlandLight>> {
    GARLAND_LIGHT_OFFSETS
        .iter()
        .zip(GARLAND_LIGHT_PALETTE)
        .map(|(&offset, palette)| GarlandLight::new(GARLAND_LIGHT_SPEED, offset, palette, mode))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lights_start_dark_and_fade_in() {
        let mut lights = default_garland_lights(TreeMode::Assembled).unwrap();
        assert_eq!(lights.len(), 2);
        assert_eq!(lights[1].palette, PaletteColor::GoldMetallic);
        let shape = TreeShape::default();
        assert_eq!(lights[0].sample(0.0, shape, GARLAND_LOOPS).intensity, 0.0);

        for _ in 0..600 {
            for light in lights.iter_mut() {
                light.advance(1.0 / 60.0);
            }
        }
        let lit = lights[0].sample(0.0, shape, GARLAND_LOOPS).intensity;
        assert!(lit > GARLAND_LIGHT_MAX_INTENSITY * 0.99 && lit <= GARLAND_LIGHT_MAX_INTENSITY);

        lights[0].set_mode(TreeMode::Dispersed);
        for _ in 0..600 {
            lights[0].advance(1.0 / 60.0);
        }
        assert!(lights[0].sample(0.0, shape, GARLAND_LOOPS).intensity < 0.05);
    }

    #[test]
    fn lights_travel_the_spiral_and_loop() {
        let light = GarlandLight::new(0.15, 0.5, PaletteColor::GoldBright, TreeMode::Assembled).unwrap();
        assert!((light.path_parameter(0.0) - 0.5).abs() < 1e-6);
        // One full period later the light is back where it started
        assert!((light.path_parameter(1.0 / 0.15) - 0.5).abs() < 1e-4);

        let shape = TreeShape::default();
        let base = GarlandLight::new(0.15, 0.0, PaletteColor::GoldBright, TreeMode::Assembled)
            .unwrap()
            .sample(0.0, shape, GARLAND_LOOPS);
        let expected_radius = shape.base_radius + GARLAND_LIGHT_SURFACE_OFFSET;
        assert!((base.position.x - expected_radius).abs() < 1e-4);
        assert!((base.position.y + shape.height / 2.0).abs() < 1e-4);
    }

    #[test]
    fn lights_sit_outside_the_garland() {
        let light = GarlandLight::new(0.15, 0.0, PaletteColor::GoldBright, TreeMode::Assembled).unwrap();
        let shape = TreeShape::default();
        for step in 0..100 {
            let time = step as f32 * 0.11;
            let t = light.path_parameter(time);
            let p = light.sample(time, shape, GARLAND_LOOPS).position;
            let surface = shape.base_radius * (1.0 - t);
            let radial = Vec2::new(p.x, p.z).length();
            assert!((radial - surface - GARLAND_LIGHT_SURFACE_OFFSET).abs() < 1e-3);
        }
    }

    #[test]
    fn zero_speed_is_rejected() {
        assert!(GarlandLight::new(0.0, 0.0, PaletteColor::GoldBright, TreeMode::Assembled).is_err());
    }
}
