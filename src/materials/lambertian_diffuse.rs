// Copyright @yucwang 2023

use crate::core::bsdf::{ BSDF, BSDFSample, BSDFValue, TransportMode };
use crate::core::computation_node::{ ComputationNode, generate_node_id };
use crate::math::constants::{ Float, INV_PI, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

/// Two-sided diffuse reflector: scatters into the hemisphere on the side
/// of `wo`.
pub struct LambertianDiffuseBSDF {
    id: String,
    albedo: RGBSpectrum
}

impl ComputationNode for LambertianDiffuseBSDF {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("LambertianDiffuseBSDF [id={}, albedo={:?}]", self.id, self.albedo.as_vector())
    }
}

impl BSDF for LambertianDiffuseBSDF {
    fn sample_wi(&self,
                 _mode: TransportMode,
                 u: &Vector2f,
                 wo: &Vector3f,
                 n: &Vector3f) -> Option<BSDFSample> {
        let n_s = if wo.dot(n) < 0.0 { -*n } else { *n };
        let local = sample_cosine_hemisphere(u);
        let pdf = sample_cosine_hemisphere_pdf(local.z);
        if pdf <= 0.0 {
            return None;
        }

        let wi = Frame::from_normal(&n_s).to_world(&local);
        // f * cos / pdf cancels down to the albedo.
        Some(BSDFSample { wi, weight: self.albedo, pdf })
    }

    fn compute_f(&self,
                 _mode: TransportMode,
                 wo: &Vector3f,
                 wi: &Vector3f,
                 n: &Vector3f) -> BSDFValue {
        if same_hemisphere(wo, wi, n) {
            self.albedo * INV_PI
        } else {
            RGBSpectrum::black()
        }
    }

    fn compute_pdf(&self,
                   _mode: TransportMode,
                   wo: &Vector3f,
                   wi: &Vector3f,
                   n: &Vector3f) -> Float {
        if same_hemisphere(wo, wi, n) {
            sample_cosine_hemisphere_pdf(wi.dot(n).abs())
        } else {
            0.0
        }
    }
}

fn same_hemisphere(wo: &Vector3f, wi: &Vector3f, n: &Vector3f) -> bool {
    let cos_o = wo.dot(n);
    let cos_i = wi.dot(n);
    (cos_o >= 0.0 && cos_i > 0.0) || (cos_o < 0.0 && cos_i < 0.0)
}

impl LambertianDiffuseBSDF {
    pub fn new(albedo: RGBSpectrum, id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("LambertianDiffuseBSDF")),
            albedo,
        }
    }

    pub fn albedo(&self) -> RGBSpectrum {
        self.albedo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_stays_on_wo_side() {
        let bsdf = LambertianDiffuseBSDF::new(RGBSpectrum::from_value(0.5), None);
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.3, 0.0, -0.9).normalize();

        for i in 0..8 {
            let u = Vector2f::new((i as Float + 0.5) / 8.0, 0.3);
            let s = bsdf.sample_wi(TransportMode::Radiance, &u, &wo, &n).unwrap();
            assert!(s.wi.z < 0.0);
            assert_eq!(s.weight, RGBSpectrum::from_value(0.5));

            let pdf = bsdf.compute_pdf(TransportMode::Radiance, &wo, &s.wi, &n);
            assert!((pdf - s.pdf).abs() < 1e-4);

            let f = bsdf.compute_f(TransportMode::Radiance, &wo, &s.wi, &n);
            let expected = f * (s.wi.dot(&n).abs() / s.pdf);
            assert!((expected[0] - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_transmission_is_black() {
        let bsdf = LambertianDiffuseBSDF::new(RGBSpectrum::from_value(0.8), None);
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.0, 0.6, -0.8);
        assert!(bsdf.compute_f(TransportMode::Radiance, &wo, &wi, &n).is_black());
        assert_eq!(bsdf.compute_pdf(TransportMode::Importance, &wo, &wi, &n), 0.0);
    }
}
