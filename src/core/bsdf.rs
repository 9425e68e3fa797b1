// Copyright @yucwang 2023

use crate::core::computation_node::ComputationNode;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

// Definitions of types used in BSDF sampling and eval
// processes
pub type BSDFValue = RGBSpectrum;

/// Which quantity flows along the path: radiance from lights, or importance
/// from sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Radiance,
    Importance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFSample {
    pub wi: Vector3f,
    /// `f * |cos(wi, n)| / pdf`.
    pub weight: BSDFValue,
    /// Solid-angle density of `wi`.
    pub pdf: Float,
}

/// All directions point away from the surface; `n` is the shading normal.
pub trait BSDF: ComputationNode + Send + Sync {
    fn sample_wi(&self,
                 mode: TransportMode,
                 u: &Vector2f,
                 wo: &Vector3f,
                 n: &Vector3f) -> Option<BSDFSample>;

    /// BSDF value without the cosine term.
    fn compute_f(&self,
                 mode: TransportMode,
                 wo: &Vector3f,
                 wi: &Vector3f,
                 n: &Vector3f) -> BSDFValue;

    fn compute_pdf(&self,
                   mode: TransportMode,
                   wo: &Vector3f,
                   wi: &Vector3f,
                   n: &Vector3f) -> Float;
}
