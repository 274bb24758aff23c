//! Scene graph: retained nodes backed by geometry and material resources.
//!
//! # Invariants
//! - A node owns exactly one geometry and one material; disposing the node
//!   releases both.
//! - Released resource ids are queued until a renderer drains them, so GPU
//!   buffers can be freed in step with the scene. An undrained queue is
//!   bounded; on overflow renderers sweep against the live arenas.
//! - Ids are monotonic and never reused.

mod geometry;
mod graph;
mod light;

pub use geometry::{Geometry, Material, MeshData, Topology};
pub use graph::{
    GeometryId, MAX_PENDING_RELEASED, MaterialId, Node, NodeId, Released, ResourceStats, Scene,
};
pub use light::{DirectionalLight, HemisphereLight, LightingRig, ShadowSettings};

pub fn crate_info() -> &'static str {
    "towerscape-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
