use glam::{Vec2, Vec3};
use towerscape_common::{GamePoint, ScreenRect, SceneConfig};

/// Snap a game coordinate to the center of its containing cell. Cells start
/// at zero, matching the grid drawn from the board's top-left corner.
///
/// Idempotent: a snapped value maps to itself.
pub fn snap_to_grid(value: f32, cell: f32) -> f32 {
    (value / cell).floor() * cell + cell / 2.0
}

/// Screen position (CSS pixels) to normalized device coordinates within a
/// viewport. `None` for a viewport without area.
pub fn screen_to_ndc(viewport: &ScreenRect, screen: Vec2) -> Option<Vec2> {
    if viewport.is_degenerate() {
        return None;
    }
    Some(Vec2::new(
        (screen.x - viewport.left) / viewport.width * 2.0 - 1.0,
        -((screen.y - viewport.top) / viewport.height) * 2.0 + 1.0,
    ))
}

/// NDC back to screen position (CSS pixels) within a viewport.
pub fn ndc_to_screen(viewport: &ScreenRect, ndc: Vec2) -> Vec2 {
    Vec2::new(
        viewport.left + (ndc.x + 1.0) / 2.0 * viewport.width,
        viewport.top + (1.0 - ndc.y) / 2.0 * viewport.height,
    )
}

/// Mapping between 2D game space and the 3D world around the ground plane.
///
/// Game (x, y) maps to world (x, z) shifted by half the logical extents; the
/// world y axis is height above the ground. The ground plane and its grid
/// start at game (0, 0) and cover whole cells, so they may extend past the
/// board's right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapping {
    half_width: f32,
    half_height: f32,
    cell: f32,
    ground_width: f32,
    ground_depth: f32,
}

impl GridMapping {
    pub fn new(config: &SceneConfig) -> Self {
        let (half_width, half_height) = config.logical_size.half_extents();
        let (ground_width, ground_depth) = config.ground_size();
        Self {
            half_width,
            half_height,
            cell: config.cell_size,
            ground_width,
            ground_depth,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    pub fn ground_size(&self) -> (f32, f32) {
        (self.ground_width, self.ground_depth)
    }

    /// Game point to world position at the given height.
    pub fn game_to_world(&self, point: GamePoint, elevation: f32) -> Vec3 {
        Vec3::new(
            point.x - self.half_width,
            elevation,
            point.y - self.half_height,
        )
    }

    /// World position to game point; height is dropped.
    pub fn world_to_game(&self, world: Vec3) -> GamePoint {
        GamePoint::new(world.x + self.half_width, world.z + self.half_height)
    }

    /// World position of the ground plane's center.
    pub fn ground_center(&self) -> Vec3 {
        let corner = GamePoint::new(self.ground_width / 2.0, self.ground_depth / 2.0);
        self.game_to_world(corner, 0.0)
    }

    /// Whether a game point lies on the logical board, half-open.
    pub fn on_board(&self, point: GamePoint) -> bool {
        (0.0..self.half_width * 2.0).contains(&point.x)
            && (0.0..self.half_height * 2.0).contains(&point.y)
    }

    /// Snap a game point to the center of its grid cell.
    pub fn snap(&self, point: GamePoint) -> GamePoint {
        GamePoint::new(
            snap_to_grid(point.x, self.cell),
            snap_to_grid(point.y, self.cell),
        )
    }
}
