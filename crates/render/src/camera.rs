use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use towerscape_common::ScreenRect;

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersection with the horizontal plane `y = height`, if it lies ahead.
    pub fn intersect_plane_y(&self, height: f32) -> Option<Vec3> {
        let denom = self.direction.y;
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (height - self.origin.y) / denom;
        if t < 0.0 || !t.is_finite() {
            return None;
        }
        let mut hit = self.at(t);
        hit.y = height;
        Some(hit)
    }
}

/// Orthographic camera looking down the isometric diagonal.
///
/// The vertical extent of the view is fixed in world units; resizing only
/// changes the horizontal extent through the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsometricCamera {
    pub target: Vec3,
    /// Camera position relative to the target.
    pub offset: Vec3,
    /// Vertical extent of the view at zoom 1, in world units.
    pub view_extent: f32,
    pub aspect: f32,
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for IsometricCamera {
    fn default() -> Self {
        Self::new(700.0)
    }
}

impl IsometricCamera {
    pub const DISTANCE: f32 = 1000.0;

    pub fn new(view_extent: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            offset: Vec3::ONE.normalize() * Self::DISTANCE,
            view_extent,
            aspect: 1.0,
            zoom: 1.0,
            near: 0.1,
            far: 5000.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.target + self.offset
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vec3 {
        (-self.offset).normalize_or(Vec3::NEG_Y)
    }

    /// Match the projection to a viewport's aspect ratio.
    pub fn set_viewport(&mut self, viewport: &ScreenRect) {
        self.aspect = viewport.aspect();
    }

    /// Half width and half height of the view volume.
    pub fn half_extents(&self) -> Vec2 {
        let half_height = self.view_extent / 2.0 / self.zoom;
        Vec2::new(half_height * self.aspect, half_height)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let half = self.half_extents();
        Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the near plane through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray {
            origin: near,
            direction: (far - near).normalize_or(self.forward()),
        }
    }

    /// Project a world point to NDC. `None` if it falls outside the depth range.
    pub fn project(&self, point: Vec3) -> Option<Vec3> {
        let clip = self.view_projection() * point.extend(1.0);
        if clip.w.abs() < f32::EPSILON {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        (0.0..=1.0).contains(&ndc.z).then_some(ndc)
    }
}
