// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::interaction::{ShapeHit, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, INV_4PI, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_sphere;

pub struct Sphere {
    id: String,
    center: Vector3f,
    radius: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { id: generate_node_id("Sphere"), center, radius: radius.abs() }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    pub fn center(&self) -> Vector3f {
        self.center
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    fn hit_distance(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let b = oc.dot(&ray.dir());
        let c = oc.dot(&oc) - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }

        let sq = disc.sqrt();
        let t0 = -b - sq;
        if ray.test_segment(t0) {
            return Some(t0);
        }
        let t1 = -b + sq;
        if ray.test_segment(t1) {
            return Some(t1);
        }
        None
    }
}

impl ComputationNode for Sphere {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("Sphere [id={}, center={:?}, radius={}]", self.id, self.center, self.radius)
    }
}

impl Shape for Sphere {
    fn bounding_box(&self) -> AABB {
        AABB::new(self.center.add_scalar(-self.radius), self.center.add_scalar(self.radius))
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let t = self.hit_distance(ray)?;
        let p = ray.at(t);
        let n = (p - self.center) / self.radius;
        Some(ShapeHit { t, p, n })
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.hit_distance(ray).is_some()
    }

    // Squared distance from the center to the closest point of the box.
    fn overlaps_box(&self, bbox: &AABB) -> bool {
        let mut dist2 = 0.0;
        for axis in 0..3 {
            let c = self.center[axis];
            if c < bbox.p_min[axis] {
                dist2 += (bbox.p_min[axis] - c).powi(2);
            } else if c > bbox.p_max[axis] {
                dist2 += (c - bbox.p_max[axis]).powi(2);
            }
        }
        dist2 <= self.radius * self.radius
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let n = sample_uniform_sphere(u);
        SurfaceSampleRecord {
            p: self.center + self.radius * n,
            n,
            pdf: 1.0 / self.surface_area(),
        }
    }

    fn surface_area(&self) -> Float {
        self.radius * self.radius / INV_4PI
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::PI;

    #[test]
    fn test_hit_from_outside_and_inside() {
        let sphere = Sphere::new(Vector3f::new(0.0, 0.0, 5.0), 1.0);

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit = sphere.ray_intersection(&ray).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-5);
        assert!((hit.n - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-5);

        let inside = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = sphere.ray_intersection(&inside).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-5);

        let short = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, Some(3.0));
        assert!(!sphere.ray_intersection_t(&short));
    }

    #[test]
    fn test_box_overlap_skips_far_corner() {
        let sphere = Sphere::new(Vector3f::zeros(), 1.0);
        let corner = AABB::new(Vector3f::new(0.8, 0.8, 0.8), Vector3f::new(1.0, 1.0, 1.0));
        assert!(sphere.bounding_box().overlaps(&corner));
        assert!(!sphere.overlaps_box(&corner));

        let face = AABB::new(Vector3f::new(0.9, -0.1, -0.1), Vector3f::new(1.1, 0.1, 0.1));
        assert!(sphere.overlaps_box(&face));
    }

    #[test]
    fn test_sample_lies_on_surface() {
        let sphere = Sphere::new(Vector3f::new(1.0, 2.0, 3.0), 2.0);
        let rec = sphere.sample(&Vector2f::new(0.3, 0.6));
        assert!(((rec.p - sphere.center()).norm() - 2.0).abs() < 1e-5);
        assert!((rec.pdf - 1.0 / (16.0 * PI)).abs() < 1e-6);
    }
}
