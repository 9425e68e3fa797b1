// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::sampler::{SampleBundle, SampleConfig};
use crate::core::sensor::Sensor;
use crate::math::constants::{PI, Vector3f};
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::sample_cosine_hemisphere;

/// Measures irradiance at a point on a surface of normal `normal`. Rays are
/// cosine-distributed, so every sample weighs `cos / pdf = pi`.
pub struct IrradianceMeter {
    id: String,
    origin: Vector3f,
    frame: Frame,
}

impl IrradianceMeter {
    pub fn new(origin: Vector3f, normal: Vector3f, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("IrradianceMeter")),
            origin,
            frame: Frame::from_normal(&normal.normalize()),
        }
    }
}

impl ComputationNode for IrradianceMeter {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("IrradianceMeter [id={}, origin={:?}, normal={:?}]", self.id, self.origin, self.frame.z)
    }
}

impl Sensor for IrradianceMeter {
    fn resolution(&self) -> (usize, usize) {
        (1, 1)
    }

    fn sample_config(&self) -> SampleConfig {
        let mut config = SampleConfig::new();
        config.add_2d(1);
        config
    }

    fn is_specular(&self) -> bool {
        false
    }

    fn sample_ray(&self, _x: usize, _y: usize, bundle: &SampleBundle) -> Option<(Ray3f, RGBSpectrum)> {
        let local = sample_cosine_hemisphere(&bundle.get_2d(0, 0));
        if local.z <= 0.0 {
            return None;
        }
        let dir = self.frame.to_world(&local);
        Some((Ray3f::new(self.origin, dir, None, None), RGBSpectrum::from_value(PI)))
    }
}
