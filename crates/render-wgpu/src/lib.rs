//! wgpu render backend for the scene graph.
//!
//! Draws visible nodes with per-node instance data over cached per-geometry
//! buffers. Lit triangles are shaded by the scene's lighting rig; lines and
//! flat materials output their base color.
//!
//! # Invariants
//! - The renderer never mutates nodes, only drains released resources.
//! - GPU buffers for a geometry live exactly as long as the geometry does.

mod cache;
mod gpu;
mod shaders;

pub use cache::{MeshCache, MeshKey};
pub use gpu::{FrameStats, WgpuFrame, WgpuRenderer};
