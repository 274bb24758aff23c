use glam::Vec2;
use towerscape_common::Rgb;

/// A text label placed on the 2D overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    /// Anchor in CSS pixels relative to the container's top-left corner.
    pub position: Vec2,
    pub color: Rgb,
    /// Font size in CSS pixels.
    pub size: f32,
}

/// Transparent 2D surface composited over the 3D canvas.
///
/// Labels are not scene nodes; the overlay is cleared as a whole each frame.
#[derive(Debug, Clone, Default)]
pub struct TextOverlay {
    labels: Vec<TextLabel>,
    css_size: Vec2,
    pixel_ratio: f32,
}

impl TextOverlay {
    pub fn new() -> Self {
        Self {
            pixel_ratio: 1.0,
            ..Self::default()
        }
    }

    pub fn resize(&mut self, css_size: Vec2, pixel_ratio: f32) {
        self.css_size = css_size;
        self.pixel_ratio = pixel_ratio;
    }

    pub fn push(&mut self, label: TextLabel) {
        self.labels.push(label);
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn css_size(&self) -> Vec2 {
        self.css_size
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Backing store size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let size = (self.css_size * self.pixel_ratio).round();
        (size.x.max(1.0) as u32, size.y.max(1.0) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_drops_all_labels() {
        let mut overlay = TextOverlay::new();
        for i in 0..3 {
            overlay.push(TextLabel {
                text: format!("wave {i}"),
                position: Vec2::new(10.0, 10.0),
                color: Rgb::WHITE,
                size: 14.0,
            });
        }
        assert_eq!(overlay.len(), 3);
        overlay.clear();
        assert!(overlay.is_empty());
    }

    #[test]
    fn physical_size_follows_pixel_ratio() {
        let mut overlay = TextOverlay::new();
        assert_eq!(overlay.physical_size(), (1, 1));
        overlay.resize(Vec2::new(800.0, 600.0), 2.0);
        assert_eq!(overlay.physical_size(), (1600, 1200));
        assert_eq!(overlay.css_size(), Vec2::new(800.0, 600.0));
    }
}
