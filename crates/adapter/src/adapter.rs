use crate::coords::{GridMapping, ndc_to_screen, screen_to_ndc};
use crate::error::AdapterError;
use crate::host::Host;
use crate::overlay::TextOverlay;
use crate::preview::PlacementPreview;
use glam::{Vec2, Vec3};
use towerscape_common::{GamePoint, LogicalSize, SceneConfig, ScreenRect, Transform};
use towerscape_render::{IsometricCamera, OrbitControls, Renderer};
use towerscape_scene::{Geometry, Material, NodeId, Scene};

/// Height of the grid lines above the ground, to keep them out of the plane.
const GRID_LIFT: f32 = 0.1;

/// Presentation adapter between a 2D tower-defense game and a 3D scene.
///
/// Owns the scene, camera, orbit controls and text overlay. One instance per
/// host; all methods take `&mut self` and run on the host's UI thread.
pub struct SceneAdapter {
    pub(crate) config: SceneConfig,
    pub(crate) grid: GridMapping,
    pub(crate) scene: Scene,
    pub(crate) camera: IsometricCamera,
    pub(crate) controls: OrbitControls,
    pub(crate) viewport: ScreenRect,
    pub(crate) pixel_ratio: f32,
    pub(crate) surface_size: (u32, u32),
    pub(crate) ground: NodeId,
    pub(crate) grid_lines: NodeId,
    pub(crate) preview: PlacementPreview,
    /// Nodes created by draw calls since the last `clear`.
    pub(crate) tracked: Vec<NodeId>,
    pub(crate) overlay: Option<TextOverlay>,
    pub(crate) hover: Option<GamePoint>,
    pub(crate) selected_tower: Option<String>,
}

impl SceneAdapter {
    /// Attach to the host's container and build the static scene.
    ///
    /// Fails if the container is missing or the config is invalid; both are
    /// configuration errors the host cannot recover from.
    pub fn initialize(host: &dyn Host, config: SceneConfig) -> Result<Self, AdapterError> {
        config.validate()?;
        let rect = host
            .container_rect(&config.container_id)
            .ok_or_else(|| AdapterError::ContainerMissing(config.container_id.clone()))?;

        let grid = GridMapping::new(&config);
        let (ground_width, ground_depth) = grid.ground_size();
        let ground_center = grid.ground_center();

        let mut scene = Scene::new(config.background);
        scene
            .lighting
            .fit_shadow_to_ground(ground_width, ground_depth, config.cell_size);

        let ground = scene.add(
            Geometry::Plane {
                width: ground_width,
                depth: ground_depth,
            },
            Material::lit(config.ground_color),
            Transform::from_position(ground_center),
        );
        let grid_lines = scene.add(
            Geometry::GridLines {
                width: ground_width,
                depth: ground_depth,
                cell: config.cell_size,
            },
            Material::unlit(config.grid_color).with_opacity(0.5),
            Transform::from_position(ground_center + Vec3::new(0.0, GRID_LIFT, 0.0)),
        );
        if let Some(node) = scene.node_mut(ground) {
            node.receive_shadow = true;
            node.label = Some("ground".into());
        }
        if let Some(node) = scene.node_mut(grid_lines) {
            node.label = Some("grid".into());
        }

        let preview = PlacementPreview::new(&mut scene, &config);
        let camera = IsometricCamera::new(config.view_extent);
        let controls = OrbitControls::new(&camera);
        let overlay = host.has_overlay().then(TextOverlay::new);

        let mut adapter = Self {
            grid,
            scene,
            camera,
            controls,
            viewport: rect,
            pixel_ratio: 1.0,
            surface_size: (1, 1),
            ground,
            grid_lines,
            preview,
            tracked: Vec::new(),
            overlay,
            hover: None,
            selected_tower: None,
            config,
        };
        adapter.on_resize(rect, host.device_pixel_ratio());

        tracing::info!(
            "scene adapter initialized: logical {}x{}, ground {}x{}, surface {}x{}",
            adapter.config.logical_size.width,
            adapter.config.logical_size.height,
            ground_width,
            ground_depth,
            adapter.surface_size.0,
            adapter.surface_size.1
        );
        Ok(adapter)
    }

    /// The game's logical width and height.
    pub fn logical_size(&self) -> LogicalSize {
        self.config.logical_size
    }

    /// Dispose every node drawn since the last clear and wipe the overlay.
    pub fn clear(&mut self) {
        let _span = tracing::debug_span!("scene_clear").entered();
        let count = self.tracked.len();
        for id in self.tracked.drain(..) {
            self.scene.remove_and_dispose(id);
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.clear();
        }
        tracing::trace!("cleared {count} tracked nodes");
    }

    /// Advance the orbit controls and draw the scene.
    pub fn render<R: Renderer>(&mut self, renderer: &mut R) -> R::Output {
        let _span = tracing::debug_span!("scene_render").entered();
        self.controls.update(&mut self.camera);
        renderer.render(&mut self.scene, &self.camera)
    }

    /// Select the tower type whose accent colors the placement preview.
    pub fn set_selected_tower_type(&mut self, tower_type: Option<&str>) {
        self.selected_tower = tower_type.map(str::to_owned);
    }

    pub fn selected_tower_type(&self) -> Option<&str> {
        self.selected_tower.as_deref()
    }

    /// Hovered cell, or [`GamePoint::NONE`].
    pub fn hover_position(&self) -> GamePoint {
        self.hover.unwrap_or(GamePoint::NONE)
    }

    pub fn hover(&self) -> Option<GamePoint> {
        self.hover
    }

    /// Cast a ray through a screen position and return the center of the
    /// grid cell it hits, in world space on the ground. `None` if the ray
    /// misses the ground or lands off the board.
    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> Option<Vec3> {
        self.screen_to_game(screen_x, screen_y)
            .map(|cell| self.grid.game_to_world(cell, 0.0))
    }

    /// Snapped game cell center under a screen position.
    pub fn screen_to_game(&self, screen_x: f32, screen_y: f32) -> Option<GamePoint> {
        let ndc = screen_to_ndc(&self.viewport, Vec2::new(screen_x, screen_y))?;
        let hit = self.camera.ray_from_ndc(ndc).intersect_plane_y(0.0)?;
        let point = self.grid.world_to_game(hit);
        self.grid.on_board(point).then(|| self.grid.snap(point))
    }

    pub fn world_to_game_coords(&self, world: Vec3) -> GamePoint {
        self.grid.world_to_game(world)
    }

    pub fn game_to_world_coords(&self, point: GamePoint, elevation: f32) -> Vec3 {
        self.grid.game_to_world(point, elevation)
    }

    /// Project a game point at a height to screen CSS pixels.
    pub fn game_to_screen(&self, point: GamePoint, elevation: f32) -> Option<Vec2> {
        let world = self.grid.game_to_world(point, elevation);
        let ndc = self.camera.project(world)?;
        Some(ndc_to_screen(&self.viewport, ndc.truncate()))
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &IsometricCamera {
        &self.camera
    }

    /// Camera and controls, for hosts that route drag and wheel input.
    pub fn camera_controls(&mut self) -> (&mut IsometricCamera, &mut OrbitControls) {
        (&mut self.camera, &mut self.controls)
    }

    pub fn viewport(&self) -> ScreenRect {
        self.viewport
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Render surface size in physical pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    pub fn overlay(&self) -> Option<&TextOverlay> {
        self.overlay.as_ref()
    }

    pub fn preview(&self) -> &PlacementPreview {
        &self.preview
    }

    /// Nodes drawn since the last clear.
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    pub fn ground_node(&self) -> NodeId {
        self.ground
    }

    pub fn grid_node(&self) -> NodeId {
        self.grid_lines
    }

    pub(crate) fn track(&mut self, id: NodeId) -> NodeId {
        self.tracked.push(id);
        id
    }
}
