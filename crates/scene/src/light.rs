use glam::Vec3;
use serde::{Deserialize, Serialize};
use towerscape_common::Rgb;

/// Shadow map parameters for a directional light.
///
/// A description for backends that render shadow maps. The wgpu backend
/// has no shadow pass and only the debug renderer reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowSettings {
    pub map_size: u32,
    /// Half extents of the orthographic shadow frustum (x, z).
    pub half_extents: [f32; 2],
    pub near: f32,
    pub far: f32,
    pub bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 2048,
            half_extents: [500.0, 500.0],
            near: 1.0,
            far: 2000.0,
            bias: -0.0005,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Rgb,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub shadow: Option<ShadowSettings>,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface toward the light.
    pub fn direction_to_light(&self) -> Vec3 {
        (self.position - self.target).normalize_or(Vec3::Y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HemisphereLight {
    pub sky: Rgb,
    pub ground: Rgb,
    pub intensity: f32,
}

/// Ambient, hemisphere fill and one shadow-casting sun.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightingRig {
    pub ambient: Rgb,
    pub ambient_intensity: f32,
    pub hemisphere: HemisphereLight,
    pub sun: DirectionalLight,
}

impl Default for LightingRig {
    fn default() -> Self {
        Self {
            ambient: Rgb::WHITE,
            ambient_intensity: 0.55,
            hemisphere: HemisphereLight {
                sky: Rgb::new(0x87, 0xce, 0xeb),
                ground: Rgb::new(0x2d, 0x4a, 0x3e),
                intensity: 0.35,
            },
            sun: DirectionalLight {
                color: Rgb::WHITE,
                intensity: 0.9,
                position: Vec3::new(300.0, 600.0, 200.0),
                target: Vec3::ZERO,
                shadow: Some(ShadowSettings::default()),
            },
        }
    }
}

impl LightingRig {
    /// Size the sun's shadow frustum to cover a ground plane plus `margin`.
    pub fn fit_shadow_to_ground(&mut self, width: f32, depth: f32, margin: f32) {
        if let Some(shadow) = &mut self.sun.shadow {
            shadow.half_extents = [width / 2.0 + margin, depth / 2.0 + margin];
        }
    }

    /// Ambient term premultiplied by intensity.
    pub fn ambient_term(&self) -> Vec3 {
        self.ambient.to_vec3() * self.ambient_intensity
    }

    /// Sun color premultiplied by intensity.
    pub fn sun_term(&self) -> Vec3 {
        self.sun.color.to_vec3() * self.sun.intensity
    }
}
