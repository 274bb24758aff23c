//! Input events: pointer, touch and resize, independent of the host toolkit.
//!
//! # Invariants
//! - Coordinates are in CSS pixels relative to the host page, the same space
//!   as the container's bounding rect.
//! - Hosts translate their native events into [`InputEvent`]; consumers never
//!   see toolkit types.

pub mod event;

pub use event::{InputEvent, TouchPoint};

pub fn crate_info() -> &'static str {
    "towerscape-input v0.1.0"
}
