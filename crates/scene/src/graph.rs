use crate::geometry::{Geometry, Material};
use crate::light::LightingRig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use towerscape_common::{Rgb, Transform};

/// Handle to a node in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Handle to a geometry resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeometryId(pub u64);

/// Handle to a material resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u64);

/// A resource released by the scene that a renderer may still hold on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    Geometry(GeometryId),
    Material(MaterialId),
}

/// Released ids held for renderers before the queue collapses.
pub const MAX_PENDING_RELEASED: usize = 8192;

/// A drawable placed in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub transform: Transform,
    pub visible: bool,
    /// Shadow hints for backends with a shadow pass. The wgpu backend has
    /// none and ignores them; the debug renderer prints them.
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    /// Optional debug name shown by inspectors.
    pub label: Option<String>,
}

/// Live and cumulative resource counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub nodes: usize,
    pub geometries: usize,
    pub materials: usize,
    /// Geometries + materials ever allocated.
    pub allocated_total: u64,
    /// Geometries + materials ever released.
    pub released_total: u64,
}

impl ResourceStats {
    /// Geometries + materials currently alive.
    pub fn live_resources(&self) -> usize {
        self.geometries + self.materials
    }
}

/// Retained-mode scene graph.
///
/// Resources live in id-keyed arenas (BTreeMap for deterministic iteration).
/// Nothing is freed implicitly: callers remove nodes through
/// [`Scene::remove_and_dispose`], which releases the node's geometry and
/// material and queues their ids for the renderer.
#[derive(Debug)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    geometries: BTreeMap<GeometryId, Geometry>,
    materials: BTreeMap<MaterialId, Material>,
    next_id: u64,
    released: Vec<Released>,
    released_overflow: bool,
    allocated_total: u64,
    released_total: u64,
    pub background: Rgb,
    pub lighting: LightingRig,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Rgb::BLACK)
    }
}

impl Scene {
    pub fn new(background: Rgb) -> Self {
        Self {
            nodes: BTreeMap::new(),
            geometries: BTreeMap::new(),
            materials: BTreeMap::new(),
            next_id: 1,
            released: Vec::new(),
            released_overflow: false,
            allocated_total: 0,
            released_total: 0,
            background,
            lighting: LightingRig::default(),
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Allocate a geometry and material and place a visible node using them.
    pub fn add(&mut self, geometry: Geometry, material: Material, transform: Transform) -> NodeId {
        let geometry_id = GeometryId(self.next_id());
        let material_id = MaterialId(self.next_id());
        self.geometries.insert(geometry_id, geometry);
        self.materials.insert(material_id, material);
        self.allocated_total += 2;

        let id = NodeId(self.next_id());
        self.nodes.insert(
            id,
            Node {
                geometry: geometry_id,
                material: material_id,
                transform,
                visible: true,
                cast_shadow: false,
                receive_shadow: false,
                label: None,
            },
        );
        id
    }

    /// Remove a node and release its resources. Returns false for unknown ids.
    ///
    /// Released ids queue up until a renderer calls [`Scene::drain_released`].
    /// A host that disposes without rendering overflows the queue after
    /// [`MAX_PENDING_RELEASED`] entries; the ids are then dropped and
    /// [`Scene::take_released_overflow`] tells renderers to sweep their
    /// caches against the live arenas instead.
    pub fn remove_and_dispose(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.remove(&id) else {
            tracing::trace!("dispose of unknown node {}", id.0);
            return false;
        };
        if self.geometries.remove(&node.geometry).is_some() {
            self.queue_released(Released::Geometry(node.geometry));
        }
        if self.materials.remove(&node.material).is_some() {
            self.queue_released(Released::Material(node.material));
        }
        true
    }

    fn queue_released(&mut self, entry: Released) {
        if self.released.len() >= MAX_PENDING_RELEASED {
            if !self.released_overflow {
                tracing::warn!(
                    "{} released ids not drained by a renderer; collapsing queue",
                    self.released.len()
                );
            }
            self.released.clear();
            self.released_overflow = true;
        }
        self.released.push(entry);
        self.released_total += 1;
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Visible nodes in id order.
    pub fn visible_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes().filter(|(_, node)| node.visible)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(&id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(&id)
    }

    /// Material of a node, if both exist.
    pub fn node_material_mut(&mut self, id: NodeId) -> Option<&mut Material> {
        let material = self.nodes.get(&id)?.material;
        self.materials.get_mut(&material)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            nodes: self.nodes.len(),
            geometries: self.geometries.len(),
            materials: self.materials.len(),
            allocated_total: self.allocated_total,
            released_total: self.released_total,
        }
    }

    /// Drain the queue of released resource ids.
    pub fn drain_released(&mut self) -> Vec<Released> {
        std::mem::take(&mut self.released)
    }

    /// Whether released ids were dropped since the last call. Resets the flag.
    pub fn take_released_overflow(&mut self) -> bool {
        std::mem::take(&mut self.released_overflow)
    }

    /// Read-only access to released ids not yet drained.
    pub fn pending_released(&self) -> &[Released] {
        &self.released
    }
}
