//! Shared types for the towerscape workspace.
//!
//! # Invariants
//! - Game space: origin top-left, x right, y down.
//! - World space: ground-centered, x right, y up, z down-screen.

pub mod config;
pub mod types;

pub use config::{ConfigError, Elevations, HudFilter, SceneConfig};
pub use types::{GamePoint, LogicalSize, ParseRgbError, Rgb, ScreenRect, Transform};

pub fn crate_info() -> &'static str {
    "towerscape-common v0.1.0"
}
