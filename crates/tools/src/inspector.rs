use glam::Vec3;
use towerscape_common::Rgb;
use towerscape_scene::{Geometry, NodeId, Scene};

/// Scene inspector for developer tooling.
///
/// Read-only queries over a scene for debugging, leak hunting and the
/// desktop inspector panel.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene's nodes and resources.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let stats = scene.stats();
        SceneSummary {
            nodes: stats.nodes,
            visible: scene.visible_nodes().count(),
            geometries: stats.geometries,
            materials: stats.materials,
            allocated_total: stats.allocated_total,
            released_total: stats.released_total,
            pending_released: scene.pending_released().len(),
        }
    }

    /// Describe a single node.
    pub fn inspect_node(scene: &Scene, id: NodeId) -> Option<NodeInfo> {
        let node = scene.node(id)?;
        let material = scene.material(node.material);
        Some(NodeInfo {
            id,
            kind: scene.geometry(node.geometry).map_or("missing", Geometry::kind),
            position: node.transform.position,
            scale: node.transform.scale,
            color: material.map(|m| m.color),
            opacity: material.map_or(1.0, |m| m.opacity),
            visible: node.visible,
            label: node.label.clone(),
        })
    }

    /// All node ids in creation order.
    pub fn list_nodes(scene: &Scene) -> Vec<NodeId> {
        scene.nodes().map(|(id, _)| id).collect()
    }

    /// Nodes carrying a label, such as the ground and preview nodes.
    pub fn labeled_nodes(scene: &Scene) -> Vec<(NodeId, String)> {
        scene
            .nodes()
            .filter_map(|(id, node)| node.label.clone().map(|label| (id, label)))
            .collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneSummary {
    pub nodes: usize,
    pub visible: usize,
    pub geometries: usize,
    pub materials: usize,
    pub allocated_total: u64,
    pub released_total: u64,
    /// Released resources a renderer has not drained yet.
    pub pending_released: usize,
}

impl SceneSummary {
    /// Geometries and materials still alive.
    pub fn live_resources(&self) -> usize {
        self.geometries + self.materials
    }
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} visible={} geometries={} materials={} allocated={} released={} pending={}",
            self.nodes,
            self.visible,
            self.geometries,
            self.materials,
            self.allocated_total,
            self.released_total,
            self.pending_released
        )
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub kind: &'static str,
    pub position: Vec3,
    pub scale: Vec3,
    pub color: Option<Rgb>,
    pub opacity: f32,
    pub visible: bool,
    pub label: Option<String>,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Node [{}] {} pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
            self.id.0,
            self.kind,
            self.position.x,
            self.position.y,
            self.position.z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
        )?;
        if let Some(color) = self.color {
            write!(f, " color={color}")?;
        }
        if !self.visible {
            write!(f, " hidden")?;
        }
        if let Some(label) = &self.label {
            write!(f, " ({label})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use towerscape_common::Transform;
    use towerscape_scene::Material;

    #[test]
    fn summary_empty_scene() {
        let scene = Scene::default();
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.nodes, 0);
        assert_eq!(summary.live_resources(), 0);
    }

    #[test]
    fn summary_counts_visible_and_released() {
        let mut scene = Scene::default();
        let a = scene.add(Geometry::cube(1.0), Material::lit(Rgb::WHITE), Transform::default());
        let b = scene.add(Geometry::sphere(1.0), Material::lit(Rgb::WHITE), Transform::default());
        scene.add(Geometry::cube(2.0), Material::lit(Rgb::WHITE), Transform::default());
        scene.set_visible(b, false);
        scene.remove_and_dispose(a);

        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.visible, 1);
        assert_eq!(summary.geometries, 2);
        assert_eq!(summary.materials, 2);
        assert_eq!(summary.allocated_total, 6);
        assert_eq!(summary.released_total, 2);
        assert_eq!(summary.pending_released, 2);

        scene.drain_released();
        assert_eq!(SceneInspector::summary(&scene).pending_released, 0);
    }

    #[test]
    fn inspect_node_found() {
        let mut scene = Scene::default();
        let id = scene.add(
            Geometry::cube(4.0),
            Material::lit(Rgb::new(255, 0, 0)),
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
        );
        if let Some(node) = scene.node_mut(id) {
            node.label = Some("tower".into());
        }

        let info = SceneInspector::inspect_node(&scene, id).unwrap();
        assert_eq!(info.kind, "box");
        assert_eq!(info.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(info.color, Some(Rgb::new(255, 0, 0)));

        let text = format!("{info}");
        assert!(text.contains("box"));
        assert!(text.contains("#ff0000"));
        assert!(text.contains("(tower)"));
    }

    #[test]
    fn inspect_node_not_found() {
        let scene = Scene::default();
        assert!(SceneInspector::inspect_node(&scene, NodeId(42)).is_none());
    }

    #[test]
    fn list_and_labeled_nodes() {
        let mut scene = Scene::default();
        let a = scene.add(Geometry::cube(1.0), Material::lit(Rgb::WHITE), Transform::default());
        let b = scene.add(Geometry::cube(1.0), Material::lit(Rgb::WHITE), Transform::default());
        if let Some(node) = scene.node_mut(b) {
            node.label = Some("ground".into());
        }

        assert_eq!(SceneInspector::list_nodes(&scene), vec![a, b]);
        assert_eq!(
            SceneInspector::labeled_nodes(&scene),
            vec![(b, "ground".to_string())]
        );
    }

    #[test]
    fn summary_display() {
        let scene = Scene::default();
        let s = format!("{}", SceneInspector::summary(&scene));
        assert!(s.contains("nodes=0"));
    }
}
