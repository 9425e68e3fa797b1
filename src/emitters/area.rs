// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::emitter::{Emitter, LightSample};
use crate::core::shape::Shape;
use crate::math::constants::{EPSILON, Float, PI, Vector2f, Vector3f};
use crate::math::distribution::Distribution1D;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

/// Uniform radiance leaving the front side of one or more shapes. A point
/// is sampled uniformly by area over all of them.
pub struct AreaEmitter {
    id: String,
    shapes: Vec<Arc<dyn Shape>>,
    shape_distribution: Distribution1D,
    total_area: Float,
    radiance: RGBSpectrum,
}

impl AreaEmitter {
    pub fn new(shapes: Vec<Arc<dyn Shape>>, radiance: RGBSpectrum, id: Option<String>) -> Self {
        let areas: Vec<Float> = shapes.iter().map(|s| s.surface_area()).collect();
        let total_area = areas.iter().sum();
        Self {
            id: id.unwrap_or_else(|| generate_node_id("AreaEmitter")),
            shape_distribution: Distribution1D::new(&areas),
            shapes,
            total_area,
            radiance,
        }
    }

    pub fn from_shape(shape: Arc<dyn Shape>, radiance: RGBSpectrum) -> Self {
        Self::new(vec![shape], radiance, None)
    }

    pub fn radiance(&self) -> RGBSpectrum {
        self.radiance
    }

    // Area density converted to solid angle at the receiver.
    fn solid_angle_pdf(&self, dist2: Float, cos_light: Float) -> Float {
        if cos_light <= 0.0 || self.total_area <= 0.0 {
            return 0.0;
        }
        dist2 / (cos_light * self.total_area)
    }
}

impl ComputationNode for AreaEmitter {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("AreaEmitter [id={}, shapes={}, area={}]", self.id, self.shapes.len(), self.total_area)
    }
}

impl Emitter for AreaEmitter {
    fn sample_le_from_point(&self,
                            p: &Vector3f,
                            epsilon: Float,
                            u1: Float,
                            u2: &Vector2f) -> Option<LightSample> {
        let (index, _) = self.shape_distribution.sample(u1)?;
        let rec = self.shapes[index].sample(u2);

        let to_light = rec.p - p;
        let dist2 = to_light.norm_squared();
        if dist2 <= 0.0 {
            return None;
        }
        let dist = dist2.sqrt();
        let wi = to_light / dist;

        let pdf = self.solid_angle_pdf(dist2, rec.n.dot(&-wi));
        if pdf <= 0.0 || !pdf.is_finite() {
            return None;
        }

        let shadow_ray = Ray3f::new(*p, wi, Some(epsilon), Some(dist - EPSILON * dist.max(1.0)));
        Some(LightSample { le_over_pdf: self.radiance / pdf, wi, pdf, shadow_ray })
    }

    fn compute_le_pdf_from_point(&self, p: &Vector3f, p_light: &Vector3f, n_light: &Vector3f) -> Float {
        let to_light = p_light - p;
        let dist2 = to_light.norm_squared();
        if dist2 <= 0.0 {
            return 0.0;
        }
        let wi = to_light / dist2.sqrt();
        self.solid_angle_pdf(dist2, n_light.dot(&-wi))
    }

    fn compute_le(&self, _p: &Vector3f, n: &Vector3f, wo: &Vector3f) -> RGBSpectrum {
        if n.dot(wo) > 0.0 {
            self.radiance
        } else {
            RGBSpectrum::black()
        }
    }

    fn power(&self) -> Float {
        PI * self.total_area * self.radiance.luminance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::sphere::Sphere;
    use crate::shapes::triangle::Triangle;

    #[test]
    fn test_sample_pdf_matches_query() {
        let sphere: Arc<dyn Shape> = Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, 4.0), 1.0));
        let light = AreaEmitter::from_shape(sphere, RGBSpectrum::from_value(2.0));
        let p = Vector3f::zeros();

        let mut found = 0;
        for i in 0..16 {
            let u = Vector2f::new((i as Float + 0.5) / 16.0, 0.37);
            if let Some(s) = light.sample_le_from_point(&p, 1e-3, 0.5, &u) {
                found += 1;
                let p_light = p + s.wi * (s.shadow_ray.max_t / (1.0 - EPSILON));
                let n_light = (p_light - Vector3f::new(0.0, 0.0, 4.0)).normalize();
                let pdf = light.compute_le_pdf_from_point(&p, &p_light, &n_light);
                assert!((pdf - s.pdf).abs() / s.pdf < 1e-2);
                assert!((s.le_over_pdf[0] * s.pdf - 2.0).abs() < 1e-3);
                assert!(s.wi.z > 0.0);
            }
        }
        assert!(found > 0);
    }

    #[test]
    fn test_emission_is_one_sided() {
        let tri: Arc<dyn Shape> = Arc::new(Triangle::new(Vector3f::new(0.0, 0.0, 0.0),
                                                         Vector3f::new(1.0, 0.0, 0.0),
                                                         Vector3f::new(0.0, 1.0, 0.0)));
        let light = AreaEmitter::from_shape(tri, RGBSpectrum::from_value(1.0));
        let n = Vector3f::new(0.0, 0.0, 1.0);
        assert!(!light.compute_le(&Vector3f::zeros(), &n, &Vector3f::new(0.0, 0.0, 1.0)).is_black());
        assert!(light.compute_le(&Vector3f::zeros(), &n, &Vector3f::new(0.0, 0.0, -1.0)).is_black());
        assert!((light.power() - PI * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_shapes_picked_by_area() {
        let small: Arc<dyn Shape> = Arc::new(Triangle::new(Vector3f::new(0.0, 0.0, 1.0),
                                                           Vector3f::new(1.0, 0.0, 1.0),
                                                           Vector3f::new(0.0, 1.0, 1.0)));
        let large: Arc<dyn Shape> = Arc::new(Triangle::new(Vector3f::new(0.0, 0.0, 1.0),
                                                           Vector3f::new(3.0, 0.0, 1.0),
                                                           Vector3f::new(0.0, 3.0, 1.0)));
        let light = AreaEmitter::new(vec![small, large], RGBSpectrum::from_value(1.0), None);
        let p = Vector3f::new(0.2, 0.2, 3.0);
        // The normals face +z, so the receiver sits in front of both.
        let s = light.sample_le_from_point(&p, 1e-3, 0.05, &Vector2f::new(0.5, 0.5)).unwrap();
        let t = light.sample_le_from_point(&p, 1e-3, 0.95, &Vector2f::new(0.5, 0.5)).unwrap();
        assert!(s.wi != t.wi);
        assert!((light.power() - PI * 5.0).abs() < 1e-4);
    }
}
