use bevy::prelude::*;

use crate::constants::*;
use crate::error::{ensure_count, ensure_dimension, ensure_rate, ChoreographyError, Result};
use crate::layout::{OrnamentCounts, TreeShape};
use crate::snowfall::SnowBand;
use crate::types::{SetKind, TreeMode};

/// Blend rate scale, impulse decay and burst gain for one particle set
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetTuning {
    pub rate_scale: f32,
    pub impulse_decay: f32,
    pub burst_gain: f32,
}

/// Every tunable the engine reads at creation time. Defaults mirror `constants.rs`.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct ChoreographyConfig {
    pub initial_mode: TreeMode,
    pub shape: TreeShape,
    pub foliage_count: usize,
    pub ornaments: OrnamentCounts,
    pub ember_count: usize,
    pub snow_count: usize,
    pub snow_band: SnowBand,
    pub base_blend_rate: f32,
    pub foliage: SetTuning,
    pub ornament: SetTuning,
    pub ember: SetTuning,
    pub emblem: SetTuning,
    pub snow_fade_rate: f32,
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self {
            initial_mode: TreeMode::Assembled,
            shape: TreeShape::default(),
            foliage_count: FOLIAGE_COUNT,
            ornaments: OrnamentCounts::default(),
            ember_count: EMBER_COUNT,
            snow_count: SNOW_COUNT,
            snow_band: SnowBand::default(),
            base_blend_rate: BASE_BLEND_RATE,
            foliage: SetTuning {
                rate_scale: FOLIAGE_RATE_SCALE,
                impulse_decay: FOLIAGE_IMPULSE_DECAY,
                burst_gain: FOLIAGE_BURST_GAIN,
            },
            ornament: SetTuning {
                rate_scale: ORNAMENT_RATE_SCALE,
                impulse_decay: ORNAMENT_IMPULSE_DECAY,
                burst_gain: ORNAMENT_BURST_GAIN,
            },
            ember: SetTuning {
                rate_scale: EMBER_RATE_SCALE,
                impulse_decay: EMBER_IMPULSE_DECAY,
                burst_gain: EMBER_BURST_GAIN,
            },
            emblem: SetTuning {
                rate_scale: EMBLEM_RATE_SCALE,
                impulse_decay: EMBLEM_IMPULSE_DECAY,
                burst_gain: EMBLEM_BURST_GAIN,
            },
            snow_fade_rate: SNOW_FADE_RATE,
        }
    }
}

impl ChoreographyConfig {
    /// Tuning for the sets driven by the blend. Snow has none.
    pub fn tuning(&self, kind: SetKind) -> Option<SetTuning> {
        match kind {
            SetKind::Foliage => Some(self.foliage),
            SetKind::Ornaments => Some(self.ornament),
            SetKind::Embers => Some(self.ember),
            SetKind::Emblem => Some(self.emblem),
            SetKind::Snow => None,
        }
    }

    /// Blend rate of a set after its per-set scale is applied
    pub fn blend_rate(&self, kind: SetKind) -> f32 {
        match self.tuning(kind) {
            Some(tuning) => self.base_blend_rate * tuning.rate_scale,
            None => self.base_blend_rate,
        }
    }

    /// Fail fast on anything that would produce degenerate geometry or state
    pub fn validate(&self) -> Result<()> {
        self.shape.validated()?;
        self.ornaments.validated()?;
        ensure_count("foliage", self.foliage_count)?;
        ensure_count("embers", self.ember_count)?;
        ensure_count("snow", self.snow_count)?;
        ensure_dimension("snow band range", self.snow_band.range)?;
        ensure_dimension("snow fall speed", self.snow_band.fall_speed_factor)?;
        if !self.snow_band.lower.is_finite() {
            return Err(ChoreographyError::InvalidDimension {
                name: "snow band lower bound",
                value: self.snow_band.lower,
            });
        }
        ensure_rate("base blend rate", self.base_blend_rate)?;
        ensure_rate("snow fade rate", self.snow_fade_rate)?;

        for kind in SetKind::ALL {
            if let Some(tuning) = self.tuning(kind) {
                ensure_rate("blend rate scale", tuning.rate_scale)?;
                ensure_rate("impulse decay", tuning.impulse_decay)?;
                if !tuning.burst_gain.is_finite() || tuning.burst_gain < 0.0 {
                    return Err(ChoreographyError::InvalidDimension {
                        name: "burst gain",
                        value: tuning.burst_gain,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ChoreographyConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert!((config.blend_rate(SetKind::Ornaments) - BASE_BLEND_RATE * 0.8).abs() < 1e-6);
        assert!((config.blend_rate(SetKind::Embers) - BASE_BLEND_RATE * 0.6).abs() < 1e-6);
        assert_eq!(config.blend_rate(SetKind::Emblem), BASE_BLEND_RATE);
    }

    #[test]
    fn zero_counts_fail_validation() {
        let config = ChoreographyConfig {
            snow_count: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ChoreographyError::EmptySet { set: "snow" }));

        let mut config = ChoreographyConfig::default();
        config.ornaments.ribbon_segments = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_dimensions_and_rates_fail_validation() {
        let mut config = ChoreographyConfig::default();
        config.shape.height = -18.0;
        assert!(matches!(
            config.validate(),
            Err(ChoreographyError::InvalidDimension { .. })
        ));

        let mut config = ChoreographyConfig::default();
        config.ember.impulse_decay = f32::NAN;
        assert!(matches!(config.validate(), Err(ChoreographyError::InvalidRate { .. })));

        let mut config = ChoreographyConfig::default();
        config.base_blend_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = ChoreographyConfig::default();
        config.foliage.burst_gain = -1.0;
        assert!(config.validate().is_err());
    }
}
