// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::sampler::{SampleBundle, SampleConfig};
use crate::core::sensor::Sensor;
use crate::math::constants::Vector3f;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Measures radiance arriving at one point from one direction.
pub struct RadianceMeter {
    id: String,
    origin: Vector3f,
    direction: Vector3f,
}

impl RadianceMeter {
    pub fn new(origin: Vector3f, target: Vector3f, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("RadianceMeter")),
            origin,
            direction: (target - origin).normalize(),
        }
    }
}

impl ComputationNode for RadianceMeter {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("RadianceMeter [id={}, origin={:?}, direction={:?}]", self.id, self.origin, self.direction)
    }
}

impl Sensor for RadianceMeter {
    fn resolution(&self) -> (usize, usize) {
        (1, 1)
    }

    fn sample_config(&self) -> SampleConfig {
        SampleConfig::new()
    }

    fn is_specular(&self) -> bool {
        true
    }

    fn sample_ray(&self, _x: usize, _y: usize, _bundle: &SampleBundle) -> Option<(Ray3f, RGBSpectrum)> {
        Some((Ray3f::new(self.origin, self.direction, None, None), RGBSpectrum::from_value(1.0)))
    }
}
