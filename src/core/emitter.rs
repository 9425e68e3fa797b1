// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::sampler::SampleConfig;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// A light sample seen from a receiving point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    /// Emitted radiance divided by `pdf`.
    pub le_over_pdf: RGBSpectrum,
    /// Unit direction from the receiver towards the light.
    pub wi: Vector3f,
    /// Solid-angle density at the receiver.
    pub pdf: Float,
    /// Ray from the receiver to just before the light point.
    pub shadow_ray: Ray3f,
}

pub trait Emitter: ComputationNode + Send + Sync {
    /// Random streams consumed by `sample_le_from_point`: one 1D value and
    /// one 2D value unless overridden.
    fn sample_config(&self) -> SampleConfig {
        let mut config = SampleConfig::new();
        config.add_1d(1);
        config.add_2d(1);
        config
    }

    /// Samples a point on the light as seen from `p`. `epsilon` offsets the
    /// shadow ray origin.
    fn sample_le_from_point(&self,
                            p: &Vector3f,
                            epsilon: Float,
                            u1: Float,
                            u2: &Vector2f) -> Option<LightSample>;

    /// Solid-angle density with which `sample_le_from_point` at `p` picks
    /// the light point `p_light` of normal `n_light`.
    fn compute_le_pdf_from_point(&self, p: &Vector3f, p_light: &Vector3f, n_light: &Vector3f) -> Float;

    /// Radiance leaving the light point `p` of normal `n` towards `wo`.
    fn compute_le(&self, p: &Vector3f, n: &Vector3f, wo: &Vector3f) -> RGBSpectrum;

    /// Total emitted power, used as the light selection weight.
    fn power(&self) -> Float;
}
