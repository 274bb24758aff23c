//! Pointer, touch and resize handling.

use crate::adapter::SceneAdapter;
use crate::host::GameHandler;
use glam::Vec2;
use towerscape_common::{GamePoint, ScreenRect};
use towerscape_input::{InputEvent, TouchPoint};

impl SceneAdapter {
    /// Dispatch one host event. Returns the game cell forwarded to `game`,
    /// if the event completed a gesture over the ground.
    pub fn handle(&mut self, event: &InputEvent, game: &mut dyn GameHandler) -> Option<GamePoint> {
        match event {
            InputEvent::PointerMove(p) => {
                self.on_pointer_move(p.x, p.y);
                None
            }
            InputEvent::PointerLeave => {
                self.on_pointer_leave();
                None
            }
            InputEvent::Click(p) => self.on_click(p.x, p.y, game),
            InputEvent::TouchMove(touches) => {
                self.on_touch_move(touches);
                None
            }
            InputEvent::TouchEnd => self.on_touch_end(game),
            InputEvent::Resize { rect, pixel_ratio } => {
                self.on_resize(*rect, *pixel_ratio);
                None
            }
        }
    }

    pub fn on_pointer_move(&mut self, screen_x: f32, screen_y: f32) {
        self.hover = self.screen_to_game(screen_x, screen_y);
    }

    /// Forget the hovered cell and hide the preview right away, so nothing
    /// stale stays on screen after the cursor exits.
    pub fn on_pointer_leave(&mut self) {
        self.hover = None;
        self.preview.hide(&mut self.scene);
    }

    /// Forward the cell under a click to the game, once.
    pub fn on_click(
        &mut self,
        screen_x: f32,
        screen_y: f32,
        game: &mut dyn GameHandler,
    ) -> Option<GamePoint> {
        self.on_pointer_move(screen_x, screen_y);
        self.forward_hover(game)
    }

    /// Hover follows the first contact. An empty touch list changes nothing.
    pub fn on_touch_move(&mut self, touches: &[TouchPoint]) {
        if let Some(first) = touches.first() {
            self.on_pointer_move(first.position.x, first.position.y);
        }
    }

    /// A lifted touch is a tap on the last hovered cell. Hover resets after.
    pub fn on_touch_end(&mut self, game: &mut dyn GameHandler) -> Option<GamePoint> {
        let forwarded = self.forward_hover(game);
        self.hover = None;
        forwarded
    }

    /// Follow the container's new on-screen rect.
    ///
    /// The vertical view extent stays fixed; only the aspect changes. Both the
    /// render surface and the text overlay are resized to the physical size.
    pub fn on_resize(&mut self, rect: ScreenRect, pixel_ratio: f32) {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio.min(self.config.max_pixel_ratio)
        } else {
            1.0
        };
        if rect.is_degenerate() {
            tracing::warn!("container has no area ({}x{}); picking disabled", rect.width, rect.height);
        }
        self.viewport = rect;
        self.pixel_ratio = pixel_ratio;
        self.camera.set_viewport(&rect);

        let css = Vec2::new(rect.width.max(0.0), rect.height.max(0.0));
        let physical = (css * pixel_ratio).round().max(Vec2::ONE);
        self.surface_size = (physical.x as u32, physical.y as u32);
        if let Some(overlay) = &mut self.overlay {
            overlay.resize(css, pixel_ratio);
        }
        tracing::debug!(
            "resized to {}x{} css px at ratio {pixel_ratio}, surface {}x{}",
            rect.width,
            rect.height,
            self.surface_size.0,
            self.surface_size.1
        );
    }

    fn forward_hover(&mut self, game: &mut dyn GameHandler) -> Option<GamePoint> {
        let cell = self.hover.filter(|p| !p.is_none())?;
        tracing::debug!("forwarding click at ({}, {})", cell.x, cell.y);
        game.handle_click(cell.x, cell.y);
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use crate::SceneAdapter;
    use crate::testing::{adapter, config, host};
    use glam::{Vec2, Vec3};
    use towerscape_common::{GamePoint, LogicalSize, SceneConfig, ScreenRect};
    use towerscape_input::{InputEvent, TouchPoint};
    use towerscape_scene::Geometry;

    fn recorder(log: &mut Vec<GamePoint>) -> impl FnMut(f32, f32) + '_ {
        move |x, y| log.push(GamePoint::new(x, y))
    }

    #[test]
    fn click_on_cell_forwards_it_once() {
        let mut adapter = adapter();
        let cell = GamePoint::new(140.0, 100.0);
        let screen = adapter.game_to_screen(cell, 0.0).unwrap();

        let mut log = Vec::new();
        let forwarded = adapter.on_click(screen.x, screen.y, &mut recorder(&mut log));
        assert_eq!(forwarded, Some(cell));
        assert_eq!(log, vec![cell]);
        assert_eq!(adapter.hover_position(), cell);
    }

    fn hover_over(adapter: &mut SceneAdapter, point: GamePoint) -> GamePoint {
        let screen = adapter.game_to_screen(point, 0.0).unwrap();
        adapter.on_pointer_move(screen.x, screen.y);
        adapter.hover_position()
    }

    fn rounded_up_board() -> SceneConfig {
        SceneConfig {
            logical_size: LogicalSize::new(810.0, 590.0),
            ..config()
        }
    }

    #[test]
    fn default_board_snaps_to_cell_under_pointer() {
        let mut adapter = adapter();
        assert_eq!(
            hover_over(&mut adapter, GamePoint::new(20.0, 25.0)),
            GamePoint::new(20.0, 20.0)
        );
        assert_eq!(
            hover_over(&mut adapter, GamePoint::new(100.0, 300.0)),
            GamePoint::new(100.0, 300.0)
        );

        let screen = adapter.game_to_screen(GamePoint::new(10.0, 30.0), 0.0).unwrap();
        let mut log = Vec::new();
        adapter.on_click(screen.x, screen.y, &mut recorder(&mut log));
        assert_eq!(log, vec![GamePoint::new(20.0, 20.0)]);
    }

    #[test]
    fn hover_centers_sit_inside_drawn_grid_cells() {
        for config in [config(), rounded_up_board()] {
            let mut adapter = SceneAdapter::initialize(&host(), config).unwrap();
            let grid = adapter.scene().node(adapter.grid_node()).unwrap().clone();
            let Some(&Geometry::GridLines { width, depth, cell }) =
                adapter.scene().geometry(grid.geometry)
            else {
                panic!("grid node has no grid geometry");
            };
            let corner = grid.transform.position - Vec3::new(width / 2.0, 0.0, depth / 2.0);

            for (x, y) in [(6.0, 7.0), (20.0, 25.0), (100.0, 300.0), (405.0, 295.0), (785.0, 575.0)] {
                let hover = hover_over(&mut adapter, GamePoint::new(x, y));
                let world = adapter.game_to_world_coords(hover, 0.0);
                let offset = (world - corner) / cell;
                assert_eq!((offset.x.fract(), offset.z.fract()), (0.5, 0.5), "at ({x}, {y})");
                let screen = adapter.game_to_screen(GamePoint::new(x, y), 0.0).unwrap();
                assert_eq!(adapter.screen_to_world(screen.x, screen.y), Some(world));
            }
        }
    }

    #[test]
    fn rounded_up_board_edges() {
        let mut adapter = SceneAdapter::initialize(&host(), rounded_up_board()).unwrap();
        assert_eq!(
            hover_over(&mut adapter, GamePoint::new(805.0, 585.0)),
            GamePoint::new(820.0, 580.0)
        );
        assert_eq!(
            hover_over(&mut adapter, GamePoint::new(6.0, 7.0)),
            GamePoint::new(20.0, 20.0)
        );
        // the ground strip past the board's right edge is not pickable
        assert_eq!(
            hover_over(&mut adapter, GamePoint::new(815.0, 100.0)),
            GamePoint::NONE
        );
    }

    #[test]
    fn click_off_ground_forwards_nothing() {
        let mut adapter = adapter();
        let mut log = Vec::new();
        assert_eq!(adapter.on_click(0.0, 0.0, &mut recorder(&mut log)), None);
        assert!(log.is_empty());
        assert_eq!(adapter.hover_position(), GamePoint::NONE);
    }

    #[test]
    fn pointer_move_snaps_to_cell_center() {
        let mut adapter = adapter();
        let cell = GamePoint::new(420.0, 300.0);
        let screen = adapter.game_to_screen(cell, 0.0).unwrap();
        adapter.on_pointer_move(screen.x + 3.0, screen.y + 2.0);
        assert_eq!(adapter.hover_position(), cell);
    }

    #[test]
    fn pointer_leave_resets_hover_and_hides_preview() {
        let mut adapter = adapter();
        let screen = adapter
            .game_to_screen(GamePoint::new(420.0, 300.0), 0.0)
            .unwrap();
        adapter.on_pointer_move(screen.x, screen.y);
        adapter.draw_tower_preview(420.0, 300.0, true, 80.0);

        adapter.on_pointer_leave();
        assert_eq!(adapter.hover_position(), GamePoint::NONE);
        assert_eq!(
            adapter.preview().visibility(adapter.scene()),
            (false, false, false)
        );
    }

    #[test]
    fn touch_end_taps_then_resets_hover() {
        let mut adapter = adapter();
        let cell = GamePoint::new(140.0, 100.0);
        let screen = adapter.game_to_screen(cell, 0.0).unwrap();
        adapter.on_touch_move(&[TouchPoint {
            id: 1,
            position: screen,
        }]);
        assert_eq!(adapter.hover_position(), cell);

        let mut log = Vec::new();
        assert_eq!(adapter.on_touch_end(&mut recorder(&mut log)), Some(cell));
        assert_eq!(adapter.hover_position(), GamePoint::NONE);

        // a second lift with no hover forwards nothing
        assert_eq!(adapter.on_touch_end(&mut recorder(&mut log)), None);
        assert_eq!(log, vec![cell]);
    }

    #[test]
    fn empty_touch_list_keeps_hover() {
        let mut adapter = adapter();
        let cell = GamePoint::new(140.0, 100.0);
        let screen = adapter.game_to_screen(cell, 0.0).unwrap();
        adapter.on_pointer_move(screen.x, screen.y);
        adapter.on_touch_move(&[]);
        assert_eq!(adapter.hover_position(), cell);
    }

    #[test]
    fn resize_keeps_vertical_extent() {
        let mut adapter = adapter();
        let before = adapter.camera().half_extents();
        adapter.on_resize(ScreenRect::new(0.0, 0.0, 1200.0, 600.0), 1.0);
        let after = adapter.camera().half_extents();
        assert_eq!(after.y, before.y);
        assert_eq!(after.x, after.y * 2.0);
        assert_eq!(adapter.surface_size(), (1200, 600));
        assert_eq!(adapter.overlay().unwrap().css_size(), Vec2::new(1200.0, 600.0));
    }

    #[test]
    fn resize_caps_pixel_ratio() {
        let mut adapter = adapter();
        adapter.on_resize(ScreenRect::new(0.0, 0.0, 400.0, 300.0), 3.0);
        assert_eq!(adapter.pixel_ratio(), 2.0);
        assert_eq!(adapter.surface_size(), (800, 600));

        adapter.on_resize(ScreenRect::new(0.0, 0.0, 400.0, 300.0), f32::NAN);
        assert_eq!(adapter.pixel_ratio(), 1.0);
        assert_eq!(adapter.overlay().unwrap().physical_size(), (400, 300));
    }

    #[test]
    fn handle_dispatches_events() {
        let mut adapter = adapter();
        let cell = GamePoint::new(140.0, 100.0);
        let screen = adapter.game_to_screen(cell, 0.0).unwrap();
        let mut log = Vec::new();
        let mut game = recorder(&mut log);

        assert_eq!(adapter.handle(&InputEvent::PointerMove(screen), &mut game), None);
        assert_eq!(adapter.hover_position(), cell);
        assert_eq!(adapter.handle(&InputEvent::TouchEnd, &mut game), Some(cell));
        assert_eq!(adapter.handle(&InputEvent::PointerLeave, &mut game), None);
        assert_eq!(adapter.handle(&InputEvent::Click(screen), &mut game), Some(cell));
        drop(game);
        assert_eq!(log, vec![cell, cell]);
    }
}
