//! Canvas-shaped draw calls.
//!
//! Each call takes game coordinates and 0-255 RGB and adds fresh nodes that
//! live until the next `clear`. Calls that would produce nothing visible
//! return `None` and leave the scene untouched.

use crate::adapter::SceneAdapter;
use crate::overlay::TextLabel;
use glam::Vec3;
use towerscape_common::{GamePoint, Rgb, Transform};
use towerscape_scene::{Geometry, Material, NodeId};

/// Fraction of a tower's color fed back as emissive glow.
const TOWER_GLOW: f32 = 0.25;

impl SceneAdapter {
    /// A cube of side `max(width, height)` standing on the ground at the
    /// rectangle's center.
    pub fn draw_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    ) -> Option<NodeId> {
        let size = width.max(height);
        if !(size > 0.0) {
            tracing::trace!("skipping empty rect at ({x}, {y})");
            return None;
        }
        let center = GamePoint::new(x + width / 2.0, y + height / 2.0);
        let position = self.grid.game_to_world(center, size / 2.0);
        let id = self.scene.add(
            Geometry::cube(size),
            Material::lit(color).with_emissive(color.to_vec3() * TOWER_GLOW),
            Transform::from_position(position),
        );
        if let Some(node) = self.scene.node_mut(id) {
            node.cast_shadow = true;
            node.receive_shadow = true;
        }
        Some(self.track(id))
    }

    /// A sphere floating just above the ground; wireframe when unfilled.
    ///
    /// Circles that look like HUD leftovers from the 2D canvas (small
    /// outlines, icons along the top edge, specks) are skipped.
    pub fn draw_circle(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        color: Rgb,
        fill: bool,
    ) -> Option<NodeId> {
        if self.config.hud_filter.rejects(y, radius, fill) {
            tracing::trace!("skipping HUD circle at ({x}, {y}) r={radius} fill={fill}");
            return None;
        }
        let lift = radius + self.config.elevations.circle_lift;
        let position = self.grid.game_to_world(GamePoint::new(x, y), lift);
        let id = self.scene.add(
            Geometry::sphere(radius),
            Material::lit(color).with_wireframe(!fill),
            Transform::from_position(position),
        );
        if let Some(node) = self.scene.node_mut(id) {
            node.cast_shadow = fill;
        }
        Some(self.track(id))
    }

    /// A line segment slightly above the ground.
    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb) -> Option<NodeId> {
        let elevation = self.config.elevations.line;
        let a = self.grid.game_to_world(GamePoint::new(x1, y1), elevation);
        let b = self.grid.game_to_world(GamePoint::new(x2, y2), elevation);
        let id = self.scene.add(
            Geometry::Segment { a, b },
            Material::unlit(color),
            Transform::default(),
        );
        Some(self.track(id))
    }

    /// A filled triangle, or its closed outline when `fill` is false.
    pub fn draw_triangle(
        &mut self,
        p1: GamePoint,
        p2: GamePoint,
        p3: GamePoint,
        color: Rgb,
        fill: bool,
    ) -> Option<NodeId> {
        let elevation = self.config.elevations.triangle;
        let points = [p1, p2, p3].map(|p| self.grid.game_to_world(p, elevation));
        let (geometry, material) = if fill {
            (Geometry::Triangle { points }, Material::lit(color))
        } else {
            (
                Geometry::Polyline {
                    points: points.to_vec(),
                    closed: true,
                },
                Material::unlit(color),
            )
        };
        let id = self.scene.add(geometry, material, Transform::default());
        Some(self.track(id))
    }

    /// Text on the 2D overlay, anchored above a game point.
    ///
    /// Returns false when there is no overlay or the anchor does not project
    /// into the view.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Rgb, size: f32) -> bool {
        let elevation = self.config.elevations.text;
        let Some(position) = self.game_to_screen(GamePoint::new(x, y), elevation) else {
            tracing::trace!("text anchor ({x}, {y}) outside view");
            return false;
        };
        let local = position - glam::Vec2::new(self.viewport.left, self.viewport.top);
        let Some(overlay) = &mut self.overlay else {
            return false;
        };
        overlay.push(TextLabel {
            text: text.to_owned(),
            position: local,
            color,
            size,
        });
        true
    }

    /// Update the placement preview for a candidate cell.
    ///
    /// A negative coordinate hides all three indicators.
    pub fn draw_tower_preview(&mut self, x: f32, y: f32, valid: bool, range: f32) {
        if GamePoint::new(x, y).is_none() {
            self.preview.hide(&mut self.scene);
            return;
        }
        let center = self.grid.game_to_world(GamePoint::new(x, y), 0.0);
        let accent = self.config.accent_for(self.selected_tower.as_deref());
        self.preview.update(
            &mut self.scene,
            Vec3::new(center.x, 0.0, center.z),
            valid,
            range,
            accent,
            self.config.invalid_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{adapter, config, host};
    use crate::SceneAdapter;
    use glam::Vec3;
    use towerscape_common::{GamePoint, Rgb};
    use towerscape_scene::{Geometry, Topology};

    const RED: Rgb = Rgb::new(255, 0, 0);

    #[test]
    fn rect_becomes_grounded_cube() {
        let mut adapter = adapter();
        let id = adapter.draw_rect(100.0, 60.0, 40.0, 20.0, RED).unwrap();
        let node = adapter.scene().node(id).unwrap();
        // center (120, 70) -> world (-280, 20, -230)
        assert_eq!(node.transform.position, Vec3::new(-280.0, 20.0, -230.0));
        assert_eq!(
            adapter.scene().geometry(node.geometry),
            Some(&Geometry::cube(40.0))
        );
        let material = adapter.scene().material(node.material).unwrap();
        assert_eq!(material.emissive, Vec3::new(0.25, 0.0, 0.0));
        assert!(node.cast_shadow);
    }

    #[test]
    fn empty_rect_is_skipped() {
        let mut adapter = adapter();
        assert!(adapter.draw_rect(10.0, 10.0, 0.0, 0.0, RED).is_none());
        assert_eq!(adapter.tracked_count(), 0);
    }

    #[test]
    fn hud_circle_is_filtered() {
        let mut adapter = adapter();
        let before = adapter.scene().node_count();
        assert!(adapter.draw_circle(200.0, 18.0, 8.0, RED, false).is_none());
        assert_eq!(adapter.scene().node_count(), before);
        assert_eq!(adapter.tracked_count(), 0);
    }

    #[test]
    fn body_circle_adds_one_node() {
        let mut adapter = adapter();
        let before = adapter.scene().node_count();
        let id = adapter.draw_circle(200.0, 100.0, 20.0, RED, true).unwrap();
        assert_eq!(adapter.scene().node_count(), before + 1);
        assert_eq!(adapter.tracked_count(), 1);

        let node = adapter.scene().node(id).unwrap();
        assert_eq!(node.transform.position, Vec3::new(-200.0, 22.0, -200.0));
        assert!(!adapter.scene().material(node.material).unwrap().wireframe);
    }

    #[test]
    fn large_unfilled_circle_is_wireframe() {
        let mut adapter = adapter();
        let id = adapter.draw_circle(300.0, 300.0, 30.0, RED, false).unwrap();
        let node = adapter.scene().node(id).unwrap();
        assert!(adapter.scene().material(node.material).unwrap().wireframe);
        assert!(!node.cast_shadow);
    }

    #[test]
    fn line_is_lifted_segment() {
        let mut adapter = adapter();
        let id = adapter.draw_line(0.0, 0.0, 800.0, 600.0, RED).unwrap();
        let node = adapter.scene().node(id).unwrap();
        assert_eq!(
            adapter.scene().geometry(node.geometry),
            Some(&Geometry::Segment {
                a: Vec3::new(-400.0, 2.0, -300.0),
                b: Vec3::new(400.0, 2.0, 300.0),
            })
        );
    }

    #[test]
    fn triangle_fill_and_outline() {
        let mut adapter = adapter();
        let (a, b, c) = (
            GamePoint::new(0.0, 0.0),
            GamePoint::new(40.0, 0.0),
            GamePoint::new(0.0, 40.0),
        );
        let filled = adapter.draw_triangle(a, b, c, RED, true).unwrap();
        let outline = adapter.draw_triangle(a, b, c, RED, false).unwrap();

        let scene = adapter.scene();
        let filled_geo = scene.geometry(scene.node(filled).unwrap().geometry).unwrap();
        let outline_geo = scene.geometry(scene.node(outline).unwrap().geometry).unwrap();
        assert_eq!(filled_geo.tessellate(false).topology(), Topology::Triangles);
        assert_eq!(outline_geo.tessellate(false).topology(), Topology::Lines);
        match filled_geo {
            Geometry::Triangle { points } => assert!(points.iter().all(|p| p.y == 1.0)),
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn text_lands_on_overlay_not_scene() {
        let mut adapter = adapter();
        let before = adapter.scene().stats();
        assert!(adapter.draw_text("Gold: 120", 400.0, 300.0, Rgb::WHITE, 14.0));
        assert_eq!(adapter.scene().stats(), before);

        let overlay = adapter.overlay().unwrap();
        assert_eq!(overlay.len(), 1);
        let label = &overlay.labels()[0];
        assert_eq!(label.text, "Gold: 120");
        // board center projects to the middle column; the lift moves it up
        assert!((label.position.x - 400.0).abs() < 0.5);
        assert!(label.position.y < 300.0);

        adapter.clear();
        assert!(adapter.overlay().unwrap().is_empty());
    }

    #[test]
    fn text_without_overlay_is_noop() {
        let host = host().without_overlay();
        let mut adapter = SceneAdapter::initialize(&host, config()).unwrap();
        assert!(!adapter.draw_text("Lives: 3", 100.0, 100.0, Rgb::WHITE, 14.0));
        assert!(adapter.overlay().is_none());
    }

    #[test]
    fn preview_sentinel_hides_everything() {
        let mut adapter = adapter();
        adapter.draw_tower_preview(140.0, 100.0, false, 100.0);
        assert_eq!(
            adapter.preview().visibility(adapter.scene()),
            (true, false, true)
        );
        adapter.draw_tower_preview(-1.0, -1.0, true, 100.0);
        assert_eq!(
            adapter.preview().visibility(adapter.scene()),
            (false, false, false)
        );

        adapter.draw_tower_preview(140.0, 100.0, true, 100.0);
        assert_eq!(
            adapter.preview().visibility(adapter.scene()),
            (true, true, false)
        );
        adapter.draw_tower_preview(-1.0, -1.0, false, 0.0);
        assert_eq!(
            adapter.preview().visibility(adapter.scene()),
            (false, false, false)
        );
    }

    #[test]
    fn preview_uses_selected_tower_accent() {
        let mut config = config();
        let cannon = Rgb::new(0xff, 0xb7, 0x4d);
        config.tower_accents.insert("cannon".into(), cannon);
        let mut adapter = SceneAdapter::initialize(&host(), config).unwrap();
        adapter.set_selected_tower_type(Some("cannon"));
        adapter.draw_tower_preview(140.0, 100.0, true, 100.0);

        let scene = adapter.scene();
        let cube = scene.node(adapter.preview().cube).unwrap();
        assert_eq!(scene.material(cube.material).unwrap().color, cannon);
        assert_eq!(cube.transform.position.x, -260.0);
        assert_eq!(cube.transform.position.z, -200.0);
    }

    #[test]
    fn preview_survives_clear() {
        let mut adapter = adapter();
        adapter.draw_tower_preview(140.0, 100.0, true, 100.0);
        adapter.clear();
        for id in adapter.preview().ids() {
            assert!(adapter.scene().contains(id));
        }
        assert_eq!(
            adapter.preview().visibility(adapter.scene()),
            (true, true, false)
        );
    }
}
