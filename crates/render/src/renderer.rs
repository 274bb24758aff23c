use crate::camera::IsometricCamera;
use std::fmt::Write;
use towerscape_scene::{Geometry, Scene};

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer draws the visible nodes of a scene from a camera. Before
/// drawing it drains the scene's released resources so that anything it
/// uploaded for them can be freed.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&mut self, scene: &mut Scene, camera: &IsometricCamera) -> Self::Output;
}

/// Headless renderer that describes a frame as text.
///
/// Used by the CLI and by tests that exercise the render path without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
    released_seen: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Released resource ids drained from scenes so far.
    pub fn released_seen(&self) -> u64 {
        self.released_seen
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &mut Scene, camera: &IsometricCamera) -> String {
        let released = scene.drain_released().len() as u64;
        self.released_seen += released;
        self.frames += 1;
        if scene.take_released_overflow() {
            tracing::debug!("debug frame {}: release queue had overflowed", self.frames);
        }
        tracing::trace!("debug frame {}: drained {released} released ids", self.frames);

        let stats = scene.stats();
        let eye = camera.position();
        let half = camera.half_extents();
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "=== Frame {} (nodes={}, geometries={}, materials={}) ===",
            self.frames, stats.nodes, stats.geometries, stats.materials
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) zoom={:.2} view={:.0}x{:.0}",
            eye.x,
            eye.y,
            eye.z,
            camera.zoom,
            half.x * 2.0,
            half.y * 2.0
        );
        if let Some(shadow) = scene.lighting.sun.shadow {
            let _ = writeln!(
                out,
                "Sun shadow: map={} bounds={:.0}x{:.0}",
                shadow.map_size,
                shadow.half_extents[0] * 2.0,
                shadow.half_extents[1] * 2.0
            );
        }

        for (id, node) in scene.visible_nodes() {
            let p = node.transform.position;
            let color = scene
                .material(node.material)
                .map(|m| m.color.to_hex())
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  [{:>5}] {:<8} pos=({:.1}, {:.1}, {:.1}) color={}{}{}{}",
                id.0,
                scene.geometry(node.geometry).map_or("missing", Geometry::kind),
                p.x,
                p.y,
                p.z,
                color,
                if node.cast_shadow { " casts" } else { "" },
                if node.receive_shadow { " receives" } else { "" },
                node.label
                    .as_deref()
                    .map(|l| format!(" ({l})"))
                    .unwrap_or_default()
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use towerscape_common::{Rgb, Transform};
    use towerscape_scene::Material;

    #[test]
    fn debug_renderer_empty_scene() {
        let mut scene = Scene::default();
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&mut scene, &IsometricCamera::default());

        assert!(output.contains("Frame 1"));
        assert!(output.contains("nodes=0"));
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn debug_renderer_lists_visible_nodes() {
        let mut scene = Scene::default();
        scene.add(
            Geometry::cube(10.0),
            Material::lit(Rgb::new(255, 0, 0)),
            Transform::from_position(Vec3::new(1.0, 5.0, 3.0)),
        );
        let hidden = scene.add(
            Geometry::sphere(2.0),
            Material::lit(Rgb::WHITE),
            Transform::default(),
        );
        scene.set_visible(hidden, false);

        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&mut scene, &IsometricCamera::default());

        assert!(output.contains("nodes=2"));
        assert!(output.contains("box"));
        assert!(output.contains("#ff0000"));
        assert!(!output.contains("sphere"));
    }

    #[test]
    fn debug_renderer_prints_shadow_hints() {
        let mut scene = Scene::default();
        scene.lighting.fit_shadow_to_ground(800.0, 600.0, 40.0);
        let tower = scene.add(
            Geometry::cube(40.0),
            Material::lit(Rgb::WHITE),
            Transform::default(),
        );
        let ground = scene.add(
            Geometry::Plane {
                width: 800.0,
                depth: 600.0,
            },
            Material::lit(Rgb::WHITE),
            Transform::default(),
        );
        scene.node_mut(tower).unwrap().cast_shadow = true;
        scene.node_mut(ground).unwrap().receive_shadow = true;

        let output = DebugTextRenderer::new().render(&mut scene, &IsometricCamera::default());
        assert!(output.contains("Sun shadow: map=2048 bounds=880x680"));
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines.iter().any(|l| l.contains("box") && l.ends_with(" casts")));
        assert!(lines.iter().any(|l| l.contains("plane") && l.ends_with(" receives")));
    }

    #[test]
    fn debug_renderer_drains_released() {
        let mut scene = Scene::default();
        let id = scene.add(
            Geometry::cube(1.0),
            Material::lit(Rgb::WHITE),
            Transform::default(),
        );
        scene.remove_and_dispose(id);

        let mut renderer = DebugTextRenderer::new();
        renderer.render(&mut scene, &IsometricCamera::default());
        assert_eq!(renderer.released_seen(), 2);
        assert!(scene.pending_released().is_empty());
    }
}
