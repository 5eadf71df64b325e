// Static configuration for the particle sets and their choreography.
// Every value here is a default; `ChoreographyConfig` copies them and the host may override.

// ===== PARTICLE COUNTS =====

pub const FOLIAGE_COUNT: usize = 3_500;      // Gift-box cubes forming the cone
pub const BAUBLE_COUNT: usize = 120;         // Large ornaments sitting on the surface
pub const GARLAND_SEGMENTS: usize = 400;     // Beads in the spiral garland
pub const GARLAND_LOOPS: f32 = 6.0;          // Full turns the garland makes around the cone
pub const RIBBON_COUNT: usize = 8;           // Independent ribbon strands
pub const RIBBON_SEGMENTS: usize = 80;       // Beads per ribbon strand
pub const EMBER_COUNT: usize = 2_000;
pub const SNOW_COUNT: usize = 10_000;

// ===== TREE GEOMETRY =====

pub const TREE_HEIGHT: f32 = 18.0;
pub const TREE_RADIUS_BASE: f32 = 8.0;
pub const SCATTER_RADIUS: f32 = 25.0;

/// Golden angle in radians, used as the per-index azimuth increment for foliage
pub const GOLDEN_ANGLE: f32 = 2.39996;

/// Uniform radial noise added on top of the area-uniform foliage radius
pub const FOLIAGE_RADIAL_JITTER: f32 = 0.5;
/// Probability that a foliage cube becomes an oversized "feature" gift
pub const FOLIAGE_FEATURE_CHANCE: f32 = 0.02;
pub const FOLIAGE_FEATURE_SCALE: f32 = 2.0;
pub const FOLIAGE_SCALE_MIN: f32 = 0.8;
pub const FOLIAGE_SCALE_RANGE: f32 = 0.7;

/// Radial offsets that push ornaments outside the foliage surface
pub const BAUBLE_SURFACE_OFFSET: f32 = 0.4;
pub const GARLAND_SURFACE_OFFSET: f32 = 0.6;
pub const RIBBON_SURFACE_OFFSET: f32 = 0.9;
pub const GARLAND_LIGHT_SURFACE_OFFSET: f32 = 1.2;

/// Phase step between consecutive garland beads (traveling twinkle wave)
pub const GARLAND_PHASE_STEP: f32 = 0.1;
pub const GARLAND_BEAD_SCALE: f32 = 0.25;
/// Turns a ribbon strand makes from base to tip, in units of pi
pub const RIBBON_SPIRAL_HALF_TURNS: f32 = 2.5;
pub const RIBBON_PHASE_STEP: f32 = 0.1;
pub const RIBBON_SPEED: f32 = 0.5;

/// Scatter sphere multipliers per sub-population
pub const GARLAND_SCATTER_FACTOR: f32 = 1.2;
pub const RIBBON_SCATTER_FACTOR: f32 = 1.3;
pub const EMBER_SCATTER_FACTOR: f32 = 1.6;

/// Ember halo: taller and wider than the foliage cone
pub const EMBER_HEIGHT_FACTOR: f32 = 1.4;
pub const EMBER_RADIUS_FACTOR: f32 = 1.2;
pub const EMBER_TAPER: f32 = 0.3;
pub const EMBER_RADIAL_SPREAD: f32 = 4.0;

/// Snow occupies a wide disk and a tall vertical band
pub const SNOW_RADIUS_FACTOR: f32 = 6.0;
pub const SNOW_LOWER_BOUND: f32 = -40.0;
pub const SNOW_HEIGHT_RANGE: f32 = 80.0;

/// Emblem (star topper) placement
pub const EMBLEM_LIFT: f32 = 1.2;            // Above the cone tip when assembled
pub const EMBLEM_SCATTER_LIFT: f32 = 5.0;    // Above tree height when dispersed
pub const EMBLEM_SCATTER_SPREAD: f32 = 10.0;
pub const EMBLEM_ASSEMBLED_SCALE: f32 = 1.3;
pub const STAR_POINTS: usize = 5;
pub const STAR_OUTER_RADIUS: f32 = 0.9;
pub const STAR_INNER_RADIUS: f32 = 0.45;
pub const STAR_DEPTH: f32 = 0.3;

// ===== DAMPING RATES (1/s) =====

pub const BASE_BLEND_RATE: f32 = 1.8;
pub const FOLIAGE_RATE_SCALE: f32 = 1.0;
pub const ORNAMENT_RATE_SCALE: f32 = 0.8;    // Ornaments settle after the foliage
pub const EMBER_RATE_SCALE: f32 = 0.6;       // Embers settle last
pub const EMBLEM_RATE_SCALE: f32 = 1.0;

pub const FOLIAGE_IMPULSE_DECAY: f32 = 4.0;  // ~0.25s time constant
pub const ORNAMENT_IMPULSE_DECAY: f32 = 4.0;
pub const EMBER_IMPULSE_DECAY: f32 = 2.5;    // ~0.4s, longer magical tail
pub const EMBLEM_IMPULSE_DECAY: f32 = 4.0;

pub const SNOW_FADE_RATE: f32 = 1.2;
pub const GARLAND_LIGHT_FADE_RATE: f32 = 1.0;

/// Frame deltas are clamped into [0, MAX_FRAME_DELTA] before any damping step
pub const MAX_FRAME_DELTA: f32 = 0.5;

// ===== BURST GAINS =====

pub const FOLIAGE_BURST_GAIN: f32 = 0.6;
pub const ORNAMENT_BURST_GAIN: f32 = 0.5;
pub const EMBER_BURST_GAIN: f32 = 2.0;
pub const EMBLEM_BURST_GAIN: f32 = 0.0;

// ===== SNOW / LIGHTS =====

pub const SNOW_FALL_SPEED_FACTOR: f32 = 3.0;
pub const SNOW_VISIBILITY_CUTOFF: f32 = 0.01;

pub const GARLAND_LIGHT_SPEED: f32 = 0.15;
pub const GARLAND_LIGHT_OFFSETS: [f32; 2] = [0.0, 0.5];
pub const GARLAND_LIGHT_MAX_INTENSITY: f32 = 4.0;

pub const LIGHT_LUMENS_PER_UNIT: f32 = 60_000.0; // Point light lumens per unit of intensity
pub const EMBLEM_LIGHT_INTENSITY: f32 = 2.0; // Steady glow inside the star
pub const EMBLEM_LIGHT_RANGE: f32 = 10.0;

/// Batches at least this large are evaluated with rayon
pub const PARALLEL_EVALUATION_THRESHOLD: usize = 1024;
