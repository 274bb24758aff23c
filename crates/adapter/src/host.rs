use towerscape_common::ScreenRect;

/// The environment the adapter is embedded in.
pub trait Host {
    /// Bounding rect of the container with the given identifier, if present.
    fn container_rect(&self, id: &str) -> Option<ScreenRect>;

    /// Physical pixels per CSS pixel.
    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }

    /// Whether a 2D overlay surface is available for text.
    fn has_overlay(&self) -> bool {
        true
    }
}

/// The game-logic side's click entry point.
pub trait GameHandler {
    fn handle_click(&mut self, x: f32, y: f32);
}

impl<F: FnMut(f32, f32)> GameHandler for F {
    fn handle_click(&mut self, x: f32, y: f32) {
        self(x, y)
    }
}

/// A host with one fixed container, for headless runs and tests.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    pub container_id: String,
    pub rect: ScreenRect,
    pub pixel_ratio: f32,
    pub overlay: bool,
}

impl HeadlessHost {
    pub fn new(container_id: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            container_id: container_id.into(),
            rect: ScreenRect::new(0.0, 0.0, width, height),
            pixel_ratio: 1.0,
            overlay: true,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn without_overlay(mut self) -> Self {
        self.overlay = false;
        self
    }
}

impl Host for HeadlessHost {
    fn container_rect(&self, id: &str) -> Option<ScreenRect> {
        (id == self.container_id).then_some(self.rect)
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn has_overlay(&self) -> bool {
        self.overlay
    }
}
