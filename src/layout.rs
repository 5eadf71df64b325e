//! Procedural layouts for every particle set
//!
//! Each generator runs once and computes two endpoints per particle: a
//! dispersed position (a volume-uniform cloud) and an assembled position on or
//! around the tree cone. Static rotation, scale, palette colour and the two
//! animation seeds (phase, speed) are drawn at the same time and never change.
//!
//! The random stream is not part of the contract; the shape laws are.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{PI, TAU};

use crate::constants::*;
use crate::error::{ensure_count, ensure_dimension, Result};
use crate::math_utils::*;
use crate::snowfall::SnowBand;
use crate::types::{ParticleData, PaletteColor};

// ============================================================================
// SHAPE PARAMETERS
// ============================================================================

/// Cone and scatter dimensions shared by all generators
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeShape {
    pub height: f32,
    pub base_radius: f32,
    pub scatter_radius: f32,
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            height: TREE_HEIGHT,
            base_radius: TREE_RADIUS_BASE,
            scatter_radius: SCATTER_RADIUS,
        }
    }
}

impl TreeShape {
    pub fn validated(self) -> Result<Self> {
        ensure_dimension("tree_height", self.height)?;
        ensure_dimension("tree_radius_base", self.base_radius)?;
        ensure_dimension("scatter_radius", self.scatter_radius)?;
        Ok(self)
    }
}

/// Sizes of the three ornament sub-populations
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrnamentCounts {
    pub baubles: usize,
    pub garland_segments: usize,
    pub garland_loops: f32,
    pub ribbon_count: usize,
    pub ribbon_segments: usize,
}

impl Default for OrnamentCounts {
    fn default() -> Self {
        Self {
            baubles: BAUBLE_COUNT,
            garland_segments: GARLAND_SEGMENTS,
            garland_loops: GARLAND_LOOPS,
            ribbon_count: RIBBON_COUNT,
            ribbon_segments: RIBBON_SEGMENTS,
        }
    }
}

impl OrnamentCounts {
    pub fn validated(self) -> Result<Self> {
        ensure_count("baubles", self.baubles)?;
        ensure_count("garland", self.garland_segments)?;
        ensure_dimension("garland_loops", self.garland_loops)?;
        ensure_count("ribbon strands", self.ribbon_count)?;
        ensure_count("ribbon segments", self.ribbon_segments)?;
        Ok(self)
    }
}

/// The ornament set's three co-generated sub-populations
#[derive(Clone, Debug)]
pub struct OrnamentLayout {
    pub baubles: Vec<ParticleData>,
    pub garland: Vec<ParticleData>,
    pub ribbons: Vec<ParticleData>,
}

// ============================================================================
// HELPERS
// ============================================================================

#[inline]
fn random_phase<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>() * TAU
}

/// Per-particle frequency multiplier in [0.5, 1.0)
#[inline]
fn random_speed<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>() * 0.5 + 0.5
}

/// Foliage colour buckets by cumulative probability:
/// 5% white, 15% gold, 10% crimson, 30% bright emerald, 40% deep emerald
pub fn foliage_palette(roll: f32) -> PaletteColor {
    if roll > 0.95 {
        PaletteColor::WhiteGlow
    } else if roll > 0.80 {
        PaletteColor::GoldMetallic
    } else if roll > 0.70 {
        PaletteColor::CrimsonAccent
    } else if roll > 0.40 {
        PaletteColor::EmeraldBright
    } else {
        PaletteColor::EmeraldDeep
    }
}

/// Baubles are 60% gold, 40% crimson
pub fn bauble_palette(roll: f32) -> PaletteColor {
    if roll > 0.4 {
        PaletteColor::GoldMetallic
    } else {
        PaletteColor::CrimsonAccent
    }
}

// ============================================================================
// FOLIAGE
// ============================================================================

/// Cube-like particles filling a cone. Azimuth follows the golden-angle
/// sequence over the particle index so the cone fills without clustering.
pub fn generate_foliage<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    shape: TreeShape,
) -> Result<Vec<ParticleData>> {
    ensure_count("foliage", count)?;
    let shape = shape.validated()?;

    let mut particles = Vec::with_capacity(count);
    for i in 0..count {
        let h: f32 = rng.gen();
        let y = cone_height(h, shape.height);
        let current_radius = cone_radius(h, shape.base_radius);
        let angle = i as f32 * GOLDEN_ANGLE;
        let r = area_uniform_radius(rng, current_radius) + rng.gen::<f32>() * FOLIAGE_RADIAL_JITTER;
        let assembled_position = ring_point(angle, r, y);

        let dispersed_position = random_point_in_sphere(rng, shape.scatter_radius);

        let palette = foliage_palette(rng.gen());
        let static_rotation = random_euler(rng, 3);

        let mut base_scale = FOLIAGE_SCALE_MIN + rng.gen::<f32>() * FOLIAGE_SCALE_RANGE;
        if rng.gen::<f32>() < FOLIAGE_FEATURE_CHANCE {
            base_scale = FOLIAGE_FEATURE_SCALE;
        }

        particles.push(ParticleData {
            id: i,
            dispersed_position,
            assembled_position,
            static_rotation,
            base_scale,
            palette,
            color: palette.linear(),
            speed: random_speed(rng),
            phase: random_phase(rng),
        });
    }

    info!("Generated {} foliage particles", particles.len());
    Ok(particles)
}

// ============================================================================
// ORNAMENTS
// ============================================================================

pub fn generate_ornaments<R: Rng + ?Sized>(
    rng: &mut R,
    counts: OrnamentCounts,
    shape: TreeShape,
) -> Result<OrnamentLayout> {
    let counts = counts.validated()?;
    let shape = shape.validated()?;

    let layout = OrnamentLayout {
        baubles: generate_baubles(rng, counts.baubles, shape),
        garland: generate_garland(rng, counts.garland_segments, counts.garland_loops, shape),
        ribbons: generate_ribbons(rng, counts.ribbon_count, counts.ribbon_segments, shape),
    };

    info!(
        "Generated ornaments: {} baubles, {} garland beads, {} ribbon segments",
        layout.baubles.len(),
        layout.garland.len(),
        layout.ribbons.len()
    );
    Ok(layout)
}

/// Large ornaments sitting flush on the cone surface plus a fixed offset
fn generate_baubles<R: Rng + ?Sized>(rng: &mut R, count: usize, shape: TreeShape) -> Vec<ParticleData> {
    (0..count)
        .map(|i| {
            let h: f32 = rng.gen();
            let y = cone_height(h, shape.height);
            let r = cone_radius(h, shape.base_radius) + BAUBLE_SURFACE_OFFSET;
            let angle = rng.gen::<f32>() * TAU;

            let dispersed_position = random_point_in_sphere(rng, shape.scatter_radius);
            let palette = bauble_palette(rng.gen());

            ParticleData {
                id: i,
                dispersed_position,
                assembled_position: ring_point(angle, r, y),
                static_rotation: random_euler(rng, 2),
                base_scale: 0.6 + rng.gen::<f32>() * 0.4,
                palette,
                color: palette.linear(),
                speed: random_speed(rng),
                phase: random_phase(rng),
            }
        })
        .collect()
}

/// A single string of beads wound `loops` times around the cone.
/// Phase grows with the bead index so the twinkle travels along the string.
fn generate_garland<R: Rng + ?Sized>(
    rng: &mut R,
    segments: usize,
    loops: f32,
    shape: TreeShape,
) -> Vec<ParticleData> {
    let palette = PaletteColor::GoldBright;
    let color = palette.linear();

    (0..segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            ParticleData {
                id: i,
                dispersed_position: random_point_in_sphere(rng, shape.scatter_radius * GARLAND_SCATTER_FACTOR),
                assembled_position: garland_spiral_point(
                    t,
                    shape.height,
                    shape.base_radius,
                    loops,
                    GARLAND_SURFACE_OFFSET,
                ),
                static_rotation: Vec3::ZERO,
                base_scale: GARLAND_BEAD_SCALE,
                palette,
                color,
                speed: 1.0,
                phase: i as f32 * GARLAND_PHASE_STEP,
            }
        })
        .collect()
}

/// Ribbon strands draped outside everything, each starting at its own azimuth
/// and spiralling gently upward. Beads face outward along the spiral and are
/// tilted 45 degrees.
fn generate_ribbons<R: Rng + ?Sized>(
    rng: &mut R,
    strands: usize,
    segments: usize,
    shape: TreeShape,
) -> Vec<ParticleData> {
    let palette = PaletteColor::GoldMetallic;
    let color = palette.linear();
    let mut ribbons = Vec::with_capacity(strands * segments);

    for strand in 0..strands {
        let start_angle = strand as f32 / strands as f32 * TAU;

        for segment in 0..segments {
            let t = segment as f32 / segments as f32;
            let y = cone_height(t, shape.height);
            let radius = cone_radius(t, shape.base_radius) + RIBBON_SURFACE_OFFSET;
            let angle = start_angle + t * PI * RIBBON_SPIRAL_HALF_TURNS;

            ribbons.push(ParticleData {
                id: ribbons.len(),
                dispersed_position: random_point_in_sphere(rng, shape.scatter_radius * RIBBON_SCATTER_FACTOR),
                assembled_position: ring_point(angle, radius, y),
                static_rotation: Vec3::new(0.0, -angle, PI / 4.0),
                base_scale: 1.0,
                palette,
                color,
                speed: RIBBON_SPEED,
                phase: strand as f32 + segment as f32 * RIBBON_PHASE_STEP,
            });
        }
    }

    ribbons
}

// ============================================================================
// EMBERS
// ============================================================================

/// A loose halo: the cone widened and heightened, tapering only slightly
pub fn generate_embers<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    shape: TreeShape,
) -> Result<Vec<ParticleData>> {
    ensure_count("embers", count)?;
    let shape = shape.validated()?;

    let palette = PaletteColor::EmberGlow;
    let color = palette.linear();
    let radius_base = shape.base_radius * EMBER_RADIUS_FACTOR;

    let particles: Vec<ParticleData> = (0..count)
        .map(|i| {
            let h: f32 = rng.gen();
            let y = h * shape.height * EMBER_HEIGHT_FACTOR - shape.height / 2.0;
            let r = radius_base * (1.0 - h * EMBER_TAPER) + rng.gen::<f32>() * EMBER_RADIAL_SPREAD;
            let angle = rng.gen::<f32>() * TAU;

            ParticleData {
                id: i,
                dispersed_position: random_point_in_sphere(rng, shape.scatter_radius * EMBER_SCATTER_FACTOR),
                assembled_position: ring_point(angle, r, y),
                static_rotation: random_euler(rng, 2),
                base_scale: rng.gen::<f32>() * 0.15 + 0.05,
                palette,
                color,
                speed: random_speed(rng),
                phase: random_phase(rng),
            }
        })
        .collect();

    info!("Generated {} embers", particles.len());
    Ok(particles)
}

// ============================================================================
// SNOW
// ============================================================================

/// Snow does not take part in the blend: both endpoints are the same point,
/// spread area-uniformly over a wide disk and over the band the flakes wrap in.
pub fn generate_snow<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    shape: TreeShape,
    band: SnowBand,
) -> Result<Vec<ParticleData>> {
    ensure_count("snow", count)?;
    let shape = shape.validated()?;
    ensure_dimension("snow band range", band.range)?;

    let palette = PaletteColor::SnowWhite;
    let color = palette.linear();
    let disk_radius = shape.base_radius * SNOW_RADIUS_FACTOR;

    let particles: Vec<ParticleData> = (0..count)
        .map(|i| {
            let r = area_uniform_radius(rng, disk_radius);
            let theta = rng.gen::<f32>() * TAU;
            let y = rng.gen::<f32>() * band.range + band.lower;
            let position = ring_point(theta, r, y);

            ParticleData {
                id: i,
                dispersed_position: position,
                assembled_position: position,
                static_rotation: random_euler(rng, 2),
                base_scale: rng.gen::<f32>() * 0.3 + 0.15,
                palette,
                color,
                speed: rng.gen::<f32>() + 0.5,
                phase: random_phase(rng),
            }
        })
        .collect();

    info!("Generated {} snowflakes", particles.len());
    Ok(particles)
}

// ============================================================================
// EMBLEM
// ============================================================================

/// The star topper, a one-particle set: just above the cone tip when
/// assembled, somewhere high above the tree when dispersed
pub fn generate_emblem<R: Rng + ?Sized>(rng: &mut R, shape: TreeShape) -> Result<ParticleData> {
    let shape = shape.validated()?;
    let palette = PaletteColor::GoldBright;

    let dispersed_position = Vec3::new(
        (rng.gen::<f32>() - 0.5) * EMBLEM_SCATTER_SPREAD,
        shape.height + EMBLEM_SCATTER_LIFT,
        (rng.gen::<f32>() - 0.5) * EMBLEM_SCATTER_SPREAD,
    );

    Ok(ParticleData {
        id: 0,
        dispersed_position,
        assembled_position: Vec3::new(0.0, shape.height / 2.0 + EMBLEM_LIFT, 0.0),
        static_rotation: Vec3::ZERO,
        base_scale: EMBLEM_ASSEMBLED_SCALE,
        palette,
        color: palette.linear(),
        speed: 1.0,
        phase: 0.0,
    })
}

/// Outline of a five-pointed star in the XY plane, point 0 facing +Y.
/// Vertices alternate between the outer and inner radius.
pub fn star_outline(points: usize, outer_radius: f32, inner_radius: f32) -> Vec<Vec2> {
    (0..points * 2)
        .map(|i| {
            let angle = i as f32 * PI / points as f32;
            let r = if i % 2 == 0 { outer_radius } else { inner_radius };
            Vec2::new(angle.sin() * r, angle.cos() * r)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChoreographyError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x7EE5)
    }

    #[test]
    fn foliage_fits_inside_the_cone() {
        let shape = TreeShape::default();
        let particles = generate_foliage(&mut rng(), 5_000, shape).unwrap();
        assert_eq!(particles.len(), 5_000);

        for p in &particles {
            let pos = p.assembled_position;
            assert!(pos.y >= -shape.height / 2.0 && pos.y <= shape.height / 2.0);
            let h = (pos.y + shape.height / 2.0) / shape.height;
            let xz = Vec2::new(pos.x, pos.z).length();
            assert!(
                xz <= shape.base_radius * (1.0 - h) + FOLIAGE_RADIAL_JITTER + 1e-3,
                "particle {} at radius {xz} exceeds cone at h = {h}",
                p.id
            );
        }
    }

    #[test]
    fn foliage_azimuth_follows_golden_angle() {
        let particles = generate_foliage(&mut rng(), 64, TreeShape::default()).unwrap();
        for p in particles.iter().filter(|p| Vec2::new(p.assembled_position.x, p.assembled_position.z).length() > 0.1) {
            let expected = (p.id as f32 * GOLDEN_ANGLE).rem_euclid(TAU);
            let actual = p.assembled_position.z.atan2(p.assembled_position.x).rem_euclid(TAU);
            let diff = (expected - actual).abs();
            assert!(diff < 1e-2 || (TAU - diff) < 1e-2, "particle {}: {expected} vs {actual}", p.id);
        }
    }

    #[test]
    fn foliage_dispersed_cloud_is_volume_uniform() {
        let shape = TreeShape::default();
        let particles = generate_foliage(&mut rng(), 30_000, shape).unwrap();
        let half = particles
            .iter()
            .filter(|p| p.dispersed_position.length() <= shape.scatter_radius * 0.5)
            .count() as f32
            / particles.len() as f32;
        // Volume-uniform gives 1/8; a naive radius-uniform sampler would give 1/2
        assert!((half - 0.125).abs() < 0.01, "fraction within half radius: {half}");
    }

    #[test]
    fn foliage_scales_and_seeds_in_range() {
        let particles = generate_foliage(&mut rng(), 2_000, TreeShape::default()).unwrap();
        for p in &particles {
            assert!(
                p.base_scale == FOLIAGE_FEATURE_SCALE
                    || (FOLIAGE_SCALE_MIN..=FOLIAGE_SCALE_MIN + FOLIAGE_SCALE_RANGE).contains(&p.base_scale)
            );
            assert!((0.0..TAU).contains(&p.phase));
            assert!((0.5..1.0).contains(&p.speed));
        }
    }

    #[test]
    fn palette_thresholds() {
        assert_eq!(foliage_palette(0.99), PaletteColor::WhiteGlow);
        assert_eq!(foliage_palette(0.9), PaletteColor::GoldMetallic);
        assert_eq!(foliage_palette(0.75), PaletteColor::CrimsonAccent);
        assert_eq!(foliage_palette(0.5), PaletteColor::EmeraldBright);
        assert_eq!(foliage_palette(0.1), PaletteColor::EmeraldDeep);
        assert_eq!(bauble_palette(0.41), PaletteColor::GoldMetallic);
        assert_eq!(bauble_palette(0.4), PaletteColor::CrimsonAccent);
    }

    #[test]
    fn garland_beads_follow_the_spiral() {
        let shape = TreeShape::default();
        let counts = OrnamentCounts::default();
        let layout = generate_ornaments(&mut rng(), counts, shape).unwrap();
        assert_eq!(layout.garland.len(), counts.garland_segments);

        for bead in &layout.garland {
            let t = bead.id as f32 / counts.garland_segments as f32;
            let pos = bead.assembled_position;
            let expected_r = shape.base_radius * (1.0 - t) + GARLAND_SURFACE_OFFSET;
            assert!((Vec2::new(pos.x, pos.z).length() - expected_r).abs() < 1e-3);
            assert!((pos.y - (t * shape.height - shape.height / 2.0)).abs() < 1e-3);
            let angle = t * TAU * counts.garland_loops;
            assert!((pos.x - angle.cos() * expected_r).abs() < 1e-3);
            assert!((bead.phase - bead.id as f32 * GARLAND_PHASE_STEP).abs() < 1e-4);
        }
    }

    #[test]
    fn ribbons_face_outward_along_their_spiral() {
        let shape = TreeShape::default();
        let counts = OrnamentCounts::default();
        let layout = generate_ornaments(&mut rng(), counts, shape).unwrap();
        assert_eq!(layout.ribbons.len(), counts.ribbon_count * counts.ribbon_segments);

        for (index, bead) in layout.ribbons.iter().enumerate() {
            assert_eq!(bead.id, index);
            let strand = index / counts.ribbon_segments;
            let segment = index % counts.ribbon_segments;
            let t = segment as f32 / counts.ribbon_segments as f32;
            let angle = strand as f32 / counts.ribbon_count as f32 * TAU + t * PI * RIBBON_SPIRAL_HALF_TURNS;
            assert!((bead.static_rotation.y + angle).abs() < 1e-4);
            assert!((bead.static_rotation.z - PI / 4.0).abs() < 1e-6);
            let r = Vec2::new(bead.assembled_position.x, bead.assembled_position.z).length();
            assert!((r - (shape.base_radius * (1.0 - t) + RIBBON_SURFACE_OFFSET)).abs() < 1e-3);
        }
    }

    #[test]
    fn baubles_sit_just_outside_the_surface() {
        let shape = TreeShape::default();
        let layout = generate_ornaments(&mut rng(), OrnamentCounts::default(), shape).unwrap();
        for bauble in &layout.baubles {
            let pos = bauble.assembled_position;
            let h = (pos.y + shape.height / 2.0) / shape.height;
            let r = Vec2::new(pos.x, pos.z).length();
            assert!((r - (shape.base_radius * (1.0 - h) + BAUBLE_SURFACE_OFFSET)).abs() < 1e-3);
            assert!(matches!(bauble.palette, PaletteColor::GoldMetallic | PaletteColor::CrimsonAccent));
        }
    }

    #[test]
    fn embers_form_a_wider_taller_halo() {
        let shape = TreeShape::default();
        let embers = generate_embers(&mut rng(), 3_000, shape).unwrap();
        let top = embers.iter().map(|e| e.assembled_position.y).fold(f32::MIN, f32::max);
        assert!(top > shape.height / 2.0, "embers rise above the cone tip");
        for e in &embers {
            assert!(e.dispersed_position.length() <= shape.scatter_radius * EMBER_SCATTER_FACTOR + 1e-3);
            let r = Vec2::new(e.assembled_position.x, e.assembled_position.z).length();
            assert!(r >= shape.base_radius * EMBER_RADIUS_FACTOR * (1.0 - EMBER_TAPER) - 1e-3);
        }
    }

    #[test]
    fn snow_endpoints_coincide_inside_the_band() {
        let shape = TreeShape::default();
        let band = SnowBand::default();
        let snow = generate_snow(&mut rng(), 4_000, shape, band).unwrap();
        for flake in &snow {
            assert_eq!(flake.assembled_position, flake.dispersed_position);
            let y = flake.assembled_position.y;
            assert!(band.contains(y));
            let r = Vec2::new(flake.assembled_position.x, flake.assembled_position.z).length();
            assert!(r <= shape.base_radius * SNOW_RADIUS_FACTOR + 1e-3);
        }
    }

    #[test]
    fn snow_fills_a_custom_band() {
        let band = SnowBand {
            lower: -80.0,
            range: 160.0,
            ..SnowBand::default()
        };
        let snow = generate_snow(&mut rng(), 4_000, TreeShape::default(), band).unwrap();
        let heights: Vec<f32> = snow.iter().map(|flake| flake.dispersed_position.y).collect();
        assert!(heights.iter().all(|&y| band.contains(y)));

        // Both outer quarters of the band are populated, not just the default slab
        let below = heights.iter().filter(|&&y| y < -40.0).count() as f32 / heights.len() as f32;
        let above = heights.iter().filter(|&&y| y >= 40.0).count() as f32 / heights.len() as f32;
        assert!((below - 0.25).abs() < 0.03, "fraction below -40: {below}");
        assert!((above - 0.25).abs() < 0.03, "fraction above 40: {above}");
    }

    #[test]
    fn snow_rejects_an_empty_band() {
        let band = SnowBand {
            range: 0.0,
            ..SnowBand::default()
        };
        assert!(generate_snow(&mut rng(), 10, TreeShape::default(), band).is_err());
    }

    #[test]
    fn emblem_tops_the_tree() {
        let shape = TreeShape::default();
        let emblem = generate_emblem(&mut rng(), shape).unwrap();
        assert_eq!(emblem.assembled_position, Vec3::new(0.0, shape.height / 2.0 + EMBLEM_LIFT, 0.0));
        assert_eq!(emblem.dispersed_position.y, shape.height + EMBLEM_SCATTER_LIFT);
        assert!(emblem.dispersed_position.x.abs() <= EMBLEM_SCATTER_SPREAD / 2.0);
    }

    #[test]
    fn star_outline_alternates_radii() {
        let outline = star_outline(STAR_POINTS, STAR_OUTER_RADIUS, STAR_INNER_RADIUS);
        assert_eq!(outline.len(), 10);
        assert!((outline[0] - Vec2::new(0.0, STAR_OUTER_RADIUS)).length() < 1e-6);
        assert!((outline[1].length() - STAR_INNER_RADIUS).abs() < 1e-6);
    }

    #[test]
    fn invalid_configuration_fails_fast() {
        assert_eq!(
            generate_foliage(&mut rng(), 0, TreeShape::default()).unwrap_err(),
            ChoreographyError::EmptySet { set: "foliage" }
        );
        let flat = TreeShape { height: 0.0, ..TreeShape::default() };
        assert!(generate_embers(&mut rng(), 10, flat).is_err());
        let counts = OrnamentCounts { ribbon_segments: 0, ..OrnamentCounts::default() };
        assert!(generate_ornaments(&mut rng(), counts, TreeShape::default()).is_err());
    }
}
