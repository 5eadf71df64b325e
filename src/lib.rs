//! Dual-state particle choreography for a procedural holiday tree
//!
//! Several particle sets (foliage, ornaments, embers, snow and a star emblem)
//! each interpolate between a dispersed cloud and an assembled tree, with
//! per-set secondary motion layered on top. The engine core is plain data
//! plus pure evaluation; `plugin` wires it into a Bevy app.

pub mod camera;
pub mod choreography;
pub mod config;
pub mod constants;
pub mod damping;
pub mod engine;
pub mod error;
pub mod garland_lights;
pub mod layout;
pub mod math_utils;
pub mod particle_set;
pub mod plugin;
pub mod procedural_meshes;
pub mod setup;
pub mod snowfall;
pub mod types;

pub use config::ChoreographyConfig;
pub use engine::ChoreographyEngine;
pub use error::{ChoreographyError, Result};
pub use plugin::{TreeChoreographyPlugin, TreeModeRequest};
pub use types::{SetKind, TreeMode};
