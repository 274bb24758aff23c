//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene; the only mutation they perform is draining
//!   released resource ids so GPU copies can be freed.
//! - The camera is orthographic; every ray it casts shares one direction.
//!
//! The trait is stable; the debug text renderer stands in for the wgpu
//! backend in headless runs and tests.

mod camera;
mod controls;
mod renderer;

pub use camera::{IsometricCamera, Ray};
pub use controls::OrbitControls;
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "towerscape-render v0.1.0"
}
