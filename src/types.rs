use bevy::prelude::*;
use bytemuck::{Pod, Zeroable};

/// The single external signal every particle set reacts to
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum TreeMode {
    Dispersed,
    #[default]
    Assembled,
}

impl TreeMode {
    /// Blend target: 0 when dispersed, 1 when assembled
    pub fn target(self) -> f32 {
        match self {
            TreeMode::Dispersed => 0.0,
            TreeMode::Assembled => 1.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TreeMode::Dispersed => TreeMode::Assembled,
            TreeMode::Assembled => TreeMode::Dispersed,
        }
    }
}

/// The five particle sets driven by the engine
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum SetKind {
    Foliage,
    Ornaments,
    Embers,
    Snow,
    Emblem,
}

impl SetKind {
    pub const ALL: [SetKind; 5] = [
        SetKind::Foliage,
        SetKind::Ornaments,
        SetKind::Embers,
        SetKind::Snow,
        SetKind::Emblem,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SetKind::Foliage => "foliage",
            SetKind::Ornaments => "ornaments",
            SetKind::Embers => "embers",
            SetKind::Snow => "snow",
            SetKind::Emblem => "emblem",
        }
    }
}

/// Named palette entries: an sRGB hex colour and an HDR intensity multiplier
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PaletteColor {
    EmeraldDeep,    // #011a0d x1.0, very dark forest green
    EmeraldBright,  // #059669 x1.2
    GoldMetallic,   // #d4af37 x1.5
    GoldBright,     // #fcd34d x2.0
    CrimsonAccent,  // #7f1d1d x1.2
    WhiteGlow,      // #e5e7eb x1.2
    EmberGlow,      // #ffaa00 x3.0
    SnowWhite,      // #ffffff x5.0
}

impl PaletteColor {
    pub fn srgb_u8(self) -> [u8; 3] {
        match self {
            PaletteColor::EmeraldDeep => [0x01, 0x1a, 0x0d],
            PaletteColor::EmeraldBright => [0x05, 0x96, 0x69],
            PaletteColor::GoldMetallic => [0xd4, 0xaf, 0x37],
            PaletteColor::GoldBright => [0xfc, 0xd3, 0x4d],
            PaletteColor::CrimsonAccent => [0x7f, 0x1d, 0x1d],
            PaletteColor::WhiteGlow => [0xe5, 0xe7, 0xeb],
            PaletteColor::EmberGlow => [0xff, 0xaa, 0x00],
            PaletteColor::SnowWhite => [0xff, 0xff, 0xff],
        }
    }

    pub fn intensity(self) -> f32 {
        match self {
            PaletteColor::EmeraldDeep => 1.0,
            PaletteColor::EmeraldBright => 1.2,
            PaletteColor::GoldMetallic => 1.5,
            PaletteColor::GoldBright => 2.0,
            PaletteColor::CrimsonAccent => 1.2,
            PaletteColor::WhiteGlow => 1.2,
            PaletteColor::EmberGlow => 3.0,
            PaletteColor::SnowWhite => 5.0,
        }
    }

    /// Linear-space colour with the intensity already applied (may exceed 1.0 for bloom)
    pub fn linear(self) -> LinearRgba {
        let [r, g, b] = self.srgb_u8();
        let base = LinearRgba::from(Srgba::rgb_u8(r, g, b));
        scale_rgb(base, self.intensity())
    }
}

/// Multiply the RGB channels, leave alpha untouched
pub fn scale_rgb(color: LinearRgba, factor: f32) -> LinearRgba {
    LinearRgba::new(
        color.red * factor,
        color.green * factor,
        color.blue * factor,
        color.alpha,
    )
}

/// One particle's fixed attributes. Never mutated after generation.
#[derive(Clone, Debug)]
pub struct ParticleData {
    pub id: usize,
    pub dispersed_position: Vec3,
    pub assembled_position: Vec3,
    /// XYZ Euler angles in radians
    pub static_rotation: Vec3,
    pub base_scale: f32,
    pub palette: PaletteColor,
    pub color: LinearRgba,
    pub phase: f32,
    pub speed: f32,
}

/// Evaluated per-frame output for one particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstanceSample {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub color: LinearRgba,
}

impl Default for InstanceSample {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 0.0,
            color: LinearRgba::BLACK,
        }
    }
}

impl InstanceSample {
    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: self.rotation,
            scale: Vec3::splat(self.scale),
        }
    }

    pub fn to_raw(&self) -> InstanceRaw {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.position,
        );
        InstanceRaw {
            model: model.to_cols_array_2d(),
            color: [self.color.red, self.color.green, self.color.blue, self.color.alpha],
        }
    }
}

/// GPU-layout instance record: column-major model matrix followed by linear RGBA
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Convert stored XYZ Euler angles into a quaternion
#[inline]
pub fn euler_to_quat(angles: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z)
}
