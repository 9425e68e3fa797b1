// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::sampler::{SampleBundle, SampleConfig};
use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Pinhole camera. Pixel `(0, 0)` is the top-left corner of the image.
pub struct PerspectiveCamera {
    id: String,
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    tan_half_fov_y: Float,
    aspect: Float,
    near_clip: Float,
    far_clip: Float,
    width: usize,
    height: usize,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               width: usize,
               height: usize,
               near_clip: Float,
               far_clip: Float,
               id: Option<String>) -> Self {
        let forward = (target - origin).normalize();
        let right = forward.cross(&up).normalize();
        let up = right.cross(&forward).normalize();

        Self {
            id: id.unwrap_or_else(|| generate_node_id("PerspectiveCamera")),
            origin,
            forward,
            right,
            up,
            tan_half_fov_y: (0.5 * fov_y_radians).tan(),
            aspect: width as Float / height.max(1) as Float,
            near_clip,
            far_clip,
            width,
            height,
        }
    }
}

impl ComputationNode for PerspectiveCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("PerspectiveCamera [id={}, origin={:?}, forward={:?}, {}x{}]",
                self.id, self.origin, self.forward, self.width, self.height)
    }
}

impl Sensor for PerspectiveCamera {
    fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    // One 2D value for the position inside the pixel.
    fn sample_config(&self) -> SampleConfig {
        let mut config = SampleConfig::new();
        config.add_2d(1);
        config
    }

    fn is_specular(&self) -> bool {
        true
    }

    fn sample_ray(&self, x: usize, y: usize, bundle: &SampleBundle) -> Option<(Ray3f, RGBSpectrum)> {
        let jitter = bundle.get_2d(0, 0);
        let u = (x as Float + jitter.x) / self.width as Float;
        let v = (y as Float + jitter.y) / self.height as Float;
        let px = (2.0 * u - 1.0) * self.aspect * self.tan_half_fov_y;
        let py = (1.0 - 2.0 * v) * self.tan_half_fov_y;

        let d_camera = Vector3f::new(px, py, 1.0).normalize();
        let dir = (self.right * d_camera.x + self.up * d_camera.y + self.forward * d_camera.z).normalize();

        let inv_z = 1.0 / d_camera.z;
        let near_t = self.near_clip * inv_z;
        let far_t = self.far_clip * inv_z;
        Some((Ray3f::new(self.origin, dir, Some(near_t), Some(far_t)), RGBSpectrum::from_value(1.0)))
    }
}
