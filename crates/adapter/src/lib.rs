//! Scene Adapter: draws a 2D tower-defense game as an isometric 3D scene.
//!
//! A host frame driver calls [`SceneAdapter::clear`], issues `draw_*` calls
//! in 2D game coordinates, then [`SceneAdapter::render`]. Input travels the
//! other way: screen position, ray against the ground plane, snapped game
//! cell, forwarded to the [`GameHandler`].
//!
//! # Invariants
//! - Every node created by a draw call is disposed by the next `clear`.
//! - The three preview nodes are created once and only ever mutated.
//! - `game_to_world` and `world_to_game` are exact inverses.
//! - Grid cells start at game (0, 0), where the drawn ground and grid start,
//!   so a snapped hover is the center of the drawn cell under the pointer.
//! - A completed click or tap forwards at most one game coordinate.

mod adapter;
mod coords;
mod draw;
mod error;
mod host;
mod input;
mod overlay;
mod preview;

#[cfg(test)]
mod testing;

pub use adapter::SceneAdapter;
pub use coords::{GridMapping, ndc_to_screen, screen_to_ndc, snap_to_grid};
pub use error::AdapterError;
pub use host::{GameHandler, HeadlessHost, Host};
pub use overlay::{TextLabel, TextOverlay};
pub use preview::PlacementPreview;

pub fn crate_info() -> &'static str {
    "towerscape-adapter v0.1.0"
}
