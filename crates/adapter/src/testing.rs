//! Shared fixtures for adapter tests.
//!
//! The default 800x600 board has cell centers at 20 + 40k in game space on
//! both axes; its half depth (300) is not a whole number of cells.

use crate::adapter::SceneAdapter;
use crate::host::HeadlessHost;
use towerscape_common::SceneConfig;

pub(crate) fn config() -> SceneConfig {
    SceneConfig::default()
}

pub(crate) fn host() -> HeadlessHost {
    HeadlessHost::new("game-container", 800.0, 600.0)
}

pub(crate) fn adapter() -> SceneAdapter {
    SceneAdapter::initialize(&host(), config()).unwrap()
}
