//! Damped scalar state shared by every particle set
//!
//! Each set owns one `AnimationState`: a blend scalar that eases toward the
//! current mode's target and an impulse scalar that is forced to 1.0 on every
//! mode change and then decays to 0. Both use the same exponential smoothing
//! step, which converges without overshoot and is frame-rate independent.

use bevy::prelude::*;

use crate::constants::MAX_FRAME_DELTA;
use crate::error::{ensure_rate, Result};
use crate::types::TreeMode;

/// Clamp a frame delta into [0, MAX_FRAME_DELTA]. NaN and negative deltas become 0.
#[inline]
pub fn sanitize_delta(dt: f32) -> f32 {
    if dt.is_nan() || dt <= 0.0 {
        0.0
    } else {
        dt.min(MAX_FRAME_DELTA)
    }
}

/// One exponential smoothing step: `target - (target - current) * exp(-rate * dt)`
#[inline]
pub fn damp(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    target - (target - current) * (-rate * dt).exp()
}

/// A scalar in [0, 1] eased toward a target at a fixed rate
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DampedScalar {
    value: f32,
    rate: f32,
}

impl DampedScalar {
    pub fn new(value: f32, rate: f32) -> Result<Self> {
        let rate = ensure_rate("damping rate", rate)?;
        let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
        Ok(Self { value, rate })
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Step toward `target`. A non-finite result is discarded and the last
    /// valid value kept, so one bad frame cannot poison the state.
    pub fn advance(&mut self, target: f32, dt: f32) -> f32 {
        let dt = sanitize_delta(dt);
        let next = damp(self.value, target, self.rate, dt);
        if next.is_finite() {
            self.value = next.clamp(0.0, 1.0);
        } else {
            warn!(
                "Rejected non-finite damped value (current {}, target {}, dt {})",
                self.value, target, dt
            );
        }
        self.value
    }

    /// Force the value, used by edge-triggered impulses
    pub fn set(&mut self, value: f32) {
        if value.is_finite() {
            self.value = value.clamp(0.0, 1.0);
        }
    }
}

/// Snapshot of a set's scalars, read-only for the rest of the frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameState {
    pub blend: f32,
    pub impulse: f32,
}

/// Edge detector over the external mode signal. Fires once per actual change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeEdge {
    last: TreeMode,
}

impl ModeEdge {
    pub fn new(initial: TreeMode) -> Self {
        Self { last: initial }
    }

    pub fn current(&self) -> TreeMode {
        self.last
    }

    /// Returns true only when `mode` differs from the previously observed mode
    pub fn observe(&mut self, mode: TreeMode) -> bool {
        if mode == self.last {
            return false;
        }
        self.last = mode;
        true
    }
}

/// Blend + impulse controller owned by one particle set
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    blend: DampedScalar,
    impulse: DampedScalar,
    edge: ModeEdge,
    /// Set by a mode change so the next advance reports exactly 1.0 before decaying
    impulse_armed: bool,
}

impl AnimationState {
    /// Starts settled at the initial mode's target: no entrance animation, no impulse
    pub fn new(mode: TreeMode, blend_rate: f32, impulse_rate: f32) -> Result<Self> {
        Ok(Self {
            blend: DampedScalar::new(mode.target(), blend_rate)?,
            impulse: DampedScalar::new(0.0, impulse_rate)?,
            edge: ModeEdge::new(mode),
            impulse_armed: false,
        })
    }

    pub fn mode(&self) -> TreeMode {
        self.edge.current()
    }

    pub fn blend(&self) -> f32 {
        self.blend.value()
    }

    pub fn impulse(&self) -> f32 {
        self.impulse.value()
    }

    pub fn blend_rate(&self) -> f32 {
        self.blend.rate()
    }

    /// Record the external mode. On an actual change the impulse jumps to 1.0.
    /// Returns whether a transition was observed.
    pub fn set_mode(&mut self, mode: TreeMode) -> bool {
        if !self.edge.observe(mode) {
            return false;
        }
        self.impulse.set(1.0);
        self.impulse_armed = true;
        true
    }

    /// Advance both scalars by one frame
    pub fn advance(&mut self, dt: f32) -> FrameState {
        self.blend.advance(self.edge.current().target(), dt);
        if self.impulse_armed {
            // The first frame after a transition sees the full spike
            self.impulse_armed = false;
            self.impulse.set(1.0);
        } else {
            self.impulse.advance(0.0, dt);
        }
        self.frame()
    }

    pub fn frame(&self) -> FrameState {
        FrameState {
            blend: self.blend.value(),
            impulse: self.impulse.value(),
        }
    }
}

/// A [0, 1] level that follows the mode without an impulse: snow opacity,
/// garland light intensity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeFade {
    level: DampedScalar,
    mode: TreeMode,
}

impl ModeFade {
    /// Snow and lights start dark and fade in, unlike the blend which starts settled
    pub fn new(mode: TreeMode, rate: f32) -> Result<Self> {
        Ok(Self {
            level: DampedScalar::new(0.0, rate)?,
            mode,
        })
    }

    pub fn set_mode(&mut self, mode: TreeMode) {
        self.mode = mode;
    }

    pub fn advance(&mut self, dt: f32) -> f32 {
        self.level.advance(self.mode.target(), dt)
    }

    pub fn level(&self) -> f32 {
        self.level.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_sanitized() {
        assert_eq!(sanitize_delta(f32::NAN), 0.0);
        assert_eq!(sanitize_delta(-0.1), 0.0);
        assert_eq!(sanitize_delta(f32::INFINITY), MAX_FRAME_DELTA);
        assert_eq!(sanitize_delta(120.0), MAX_FRAME_DELTA);
        assert_eq!(sanitize_delta(1.0 / 60.0), 1.0 / 60.0);
    }

    #[test]
    fn blend_starts_settled_without_impulse() {
        let state = AnimationState::new(TreeMode::Assembled, 1.8, 4.0).unwrap();
        assert_eq!(state.blend(), 1.0);
        assert_eq!(state.impulse(), 0.0);

        let state = AnimationState::new(TreeMode::Dispersed, 1.8, 4.0).unwrap();
        assert_eq!(state.blend(), 0.0);
    }

    #[test]
    fn blend_converges_monotonically_within_exponential_bound() {
        let rate = 1.8;
        let mut state = AnimationState::new(TreeMode::Dispersed, rate, 4.0).unwrap();
        state.set_mode(TreeMode::Assembled);

        let dt = 1.0 / 60.0;
        let mut previous = state.blend();
        let mut t = 0.0;
        for _ in 0..300 {
            let frame = state.advance(dt);
            t += dt;
            assert!(frame.blend >= previous, "blend must not move backwards");
            assert!(frame.blend <= 1.0);
            let bound = (-rate * t).exp();
            assert!((frame.blend - 1.0).abs() <= bound + 1e-5);
            previous = frame.blend;
        }
    }

    #[test]
    fn blend_is_frame_rate_independent() {
        let mut fine = DampedScalar::new(0.0, 1.8).unwrap();
        for _ in 0..10 {
            fine.advance(1.0, 1.0 / 30.0);
        }
        let mut coarse = DampedScalar::new(0.0, 1.8).unwrap();
        coarse.advance(1.0, 1.0 / 3.0);
        assert!((fine.value() - coarse.value()).abs() < 1e-5);
    }

    #[test]
    fn impulse_spikes_once_per_transition_then_decays() {
        let mut state = AnimationState::new(TreeMode::Assembled, 1.8, 4.0).unwrap();
        state.impulse.set(0.3);

        assert!(state.set_mode(TreeMode::Dispersed));
        let first = state.advance(1.0 / 60.0);
        assert_eq!(first.impulse, 1.0);

        let mut previous = first.impulse;
        for _ in 0..120 {
            // Holding the same mode must not re-arm the impulse
            assert!(!state.set_mode(TreeMode::Dispersed));
            let frame = state.advance(1.0 / 60.0);
            assert!(frame.impulse < previous || frame.impulse == 0.0);
            assert!(frame.impulse <= 1.0);
            previous = frame.impulse;
        }
        assert!(previous < 0.01);

        assert!(state.set_mode(TreeMode::Assembled));
        assert_eq!(state.advance(1.0 / 60.0).impulse, 1.0);
    }

    #[test]
    fn huge_pause_does_not_snap_state() {
        let mut state = AnimationState::new(TreeMode::Dispersed, 1.8, 4.0).unwrap();
        state.set_mode(TreeMode::Assembled);
        let frame = state.advance(3_600.0);
        let expected = 1.0 - (-1.8 * MAX_FRAME_DELTA).exp();
        assert!((frame.blend - expected).abs() < 1e-5);
    }

    #[test]
    fn non_finite_delta_leaves_state_untouched() {
        let mut state = AnimationState::new(TreeMode::Dispersed, 1.8, 4.0).unwrap();
        state.set_mode(TreeMode::Assembled);
        state.advance(0.1);
        let before = state.frame();
        state.advance(f32::NAN);
        state.advance(f32::NEG_INFINITY);
        assert_eq!(state.frame().blend, before.blend);
        assert!(state.frame().impulse.is_finite());
    }

    #[test]
    fn fade_follows_mode() {
        let mut fade = ModeFade::new(TreeMode::Assembled, 1.2).unwrap();
        assert_eq!(fade.level(), 0.0);
        for _ in 0..600 {
            fade.advance(1.0 / 60.0);
        }
        assert!(fade.level() > 0.99);
        fade.set_mode(TreeMode::Dispersed);
        for _ in 0..600 {
            fade.advance(1.0 / 60.0);
        }
        assert!(fade.level() < 0.01);
    }

    #[test]
    fn invalid_rate_is_rejected() {
        assert!(DampedScalar::new(0.0, 0.0).is_err());
        assert!(AnimationState::new(TreeMode::Assembled, f32::NAN, 4.0).is_err());
    }
}
