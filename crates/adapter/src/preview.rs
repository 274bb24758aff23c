use glam::Vec3;
use towerscape_common::{Rgb, SceneConfig, Transform};
use towerscape_scene::{Geometry, Material, NodeId, Scene};

/// The three reusable tower-placement indicators.
///
/// Created once at initialization, hidden until the first preview update, and
/// never disposed by `clear`. Updates only touch visibility, transform and
/// material color.
#[derive(Debug, Clone, Copy)]
pub struct PlacementPreview {
    pub cube: NodeId,
    pub range_disc: NodeId,
    pub invalid_marker: NodeId,
    cube_size: f32,
    disc_elevation: f32,
    marker_elevation: f32,
}

impl PlacementPreview {
    pub fn new(scene: &mut Scene, config: &SceneConfig) -> Self {
        let cell = config.cell_size;
        let cube_size = cell * 0.8;

        let cube = scene.add(
            Geometry::cube(cube_size),
            Material::lit(config.accent).with_opacity(0.6),
            Transform::default(),
        );
        let range_disc = scene.add(
            Geometry::Disc {
                radius: 1.0,
                segments: 48,
            },
            Material::unlit(config.accent).with_opacity(0.2),
            Transform::default(),
        );
        let invalid_marker = scene.add(
            Geometry::Cross {
                size: cell * 0.7,
                thickness: cell * 0.15,
            },
            Material::unlit(config.invalid_color),
            Transform::default(),
        );

        for (id, label) in [
            (cube, "preview-cube"),
            (range_disc, "preview-range"),
            (invalid_marker, "preview-invalid"),
        ] {
            if let Some(node) = scene.node_mut(id) {
                node.visible = false;
                node.label = Some(label.into());
            }
        }

        Self {
            cube,
            range_disc,
            invalid_marker,
            cube_size,
            disc_elevation: config.elevations.range_disc,
            marker_elevation: config.elevations.invalid_marker,
        }
    }

    pub fn ids(&self) -> [NodeId; 3] {
        [self.cube, self.range_disc, self.invalid_marker]
    }

    /// Hide all three indicators.
    pub fn hide(&self, scene: &mut Scene) {
        for id in self.ids() {
            scene.set_visible(id, false);
        }
    }

    /// Show the preview over a cell centered at `center` (world, ground level).
    pub fn update(
        &self,
        scene: &mut Scene,
        center: Vec3,
        valid: bool,
        range: f32,
        accent: Rgb,
        invalid: Rgb,
    ) {
        let cube_color = if valid { accent } else { invalid };
        if let Some(node) = scene.node_mut(self.cube) {
            node.visible = true;
            node.transform.position = Vec3::new(center.x, self.cube_size / 2.0, center.z);
        }
        if let Some(material) = scene.node_material_mut(self.cube) {
            material.color = cube_color;
            material.emissive = cube_color.to_vec3() * 0.3;
        }

        let show_range = valid && range > 0.0;
        if let Some(node) = scene.node_mut(self.range_disc) {
            node.visible = show_range;
            if show_range {
                node.transform.position = Vec3::new(center.x, self.disc_elevation, center.z);
                node.transform.scale = Vec3::new(range, 1.0, range);
            }
        }
        if let Some(material) = scene.node_material_mut(self.range_disc) {
            material.color = accent;
        }

        if let Some(node) = scene.node_mut(self.invalid_marker) {
            node.visible = !valid;
            node.transform.position = Vec3::new(center.x, self.marker_elevation, center.z);
        }
    }

    /// Visibility of (cube, range disc, invalid marker).
    pub fn visibility(&self, scene: &Scene) -> (bool, bool, bool) {
        let visible = |id| scene.node(id).is_some_and(|n| n.visible);
        (
            visible(self.cube),
            visible(self.range_disc),
            visible(self.invalid_marker),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Scene, PlacementPreview, SceneConfig) {
        let config = SceneConfig::default();
        let mut scene = Scene::default();
        let preview = PlacementPreview::new(&mut scene, &config);
        (scene, preview, config)
    }

    #[test]
    fn starts_hidden() {
        let (scene, preview, _) = setup();
        assert_eq!(preview.visibility(&scene), (false, false, false));
        assert_eq!(scene.node_count(), 3);
    }

    #[test]
    fn valid_cell_shows_cube_and_range() {
        let (mut scene, preview, config) = setup();
        preview.update(
            &mut scene,
            Vec3::new(20.0, 0.0, -60.0),
            true,
            120.0,
            config.accent,
            config.invalid_color,
        );
        assert_eq!(preview.visibility(&scene), (true, true, false));

        let disc = scene.node(preview.range_disc).unwrap();
        assert_eq!(disc.transform.scale, Vec3::new(120.0, 1.0, 120.0));
        assert_eq!(disc.transform.position.x, 20.0);

        let cube = scene.node(preview.cube).unwrap();
        assert_eq!(cube.transform.position, Vec3::new(20.0, 16.0, -60.0));
        assert_eq!(scene.material(cube.material).unwrap().color, config.accent);
    }

    #[test]
    fn invalid_cell_shows_red_cube_and_marker() {
        let (mut scene, preview, config) = setup();
        preview.update(
            &mut scene,
            Vec3::ZERO,
            false,
            120.0,
            config.accent,
            config.invalid_color,
        );
        assert_eq!(preview.visibility(&scene), (true, false, true));
        let cube = scene.node(preview.cube).unwrap();
        assert_eq!(
            scene.material(cube.material).unwrap().color,
            config.invalid_color
        );
    }

    #[test]
    fn updates_never_allocate() {
        let (mut scene, preview, config) = setup();
        let before = scene.stats();
        for i in 0..100 {
            preview.update(
                &mut scene,
                Vec3::new(i as f32, 0.0, 0.0),
                i % 2 == 0,
                80.0,
                config.accent,
                config.invalid_color,
            );
            preview.hide(&mut scene);
        }
        assert_eq!(scene.stats(), before);
    }
}
