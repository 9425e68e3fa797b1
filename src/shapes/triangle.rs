// Copyright @yucwang 2023

use crate::core::computation_node::{ ComputationNode, generate_node_id };
use crate::core::shape::Shape;
use crate::core::interaction::{ ShapeHit, SurfaceSampleRecord };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;
use crate::math::warp::square_to_triangle;
use crate::shapes::plane_overlaps_box;

pub struct Triangle {
    id: String,
    p0: Vector3f,
    p1: Vector3f,
    p2: Vector3f
}

impl ComputationNode for Triangle {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("Triangle [id={}]", self.id)
    }
}

impl Shape for Triangle {
    fn bounding_box(&self) -> AABB {
        let mut bound = AABB::new(self.p0, self.p1);
        bound.expand_by_point(&self.p2);

        bound
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let t = self.hit_distance(ray)?;
        Some(ShapeHit { t, p: ray.at(t), n: self.geometric_normal() })
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.hit_distance(ray).is_some()
    }

    fn overlaps_box(&self, bbox: &AABB) -> bool {
        if !self.bounding_box().overlaps(bbox) {
            return false;
        }
        let n = self.geometric_normal();
        plane_overlaps_box(&n, n.dot(&self.p0), bbox)
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let bary = square_to_triangle(u);
        let p = self.p0 * bary.x + self.p1 * bary.y + self.p2 * bary.z;

        SurfaceSampleRecord { p, n: self.geometric_normal(), pdf: 1.0 / self.surface_area() }
    }

    fn surface_area(&self) -> Float {
        0.5 * ((self.p1 - self.p0).cross(&(self.p2 - self.p0))).norm()
    }
}

impl Triangle {
    pub fn new(new_p0: Vector3f, new_p1: Vector3f, new_p2: Vector3f) -> Self {
        Triangle {
            id: generate_node_id("Triangle"),
            p0: new_p0,
            p1: new_p1,
            p2: new_p2,
        }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    // Moller-Trumbore, two-sided.
    fn hit_distance(&self, ray: &Ray3f) -> Option<Float> {
        let edge0 = self.p1 - self.p0;
        let edge1 = self.p2 - self.p0;
        let pvec = ray.dir().cross(&edge1);
        let det = edge0.dot(&pvec);
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = ray.origin() - self.p0;
        let u = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(&edge0);
        let v = ray.dir().dot(&qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge1.dot(&qvec) * inv_det;
        if ray.test_segment(t) {
            Some(t)
        } else {
            None
        }
    }

    pub fn geometric_normal(&self) -> Vector3f {
        let edge0 = self.p1 - self.p0;
        let edge1 = self.p2 - self.p0;
        edge0.cross(&edge1).normalize()
    }

    pub fn vertices(&self) -> (Vector3f, Vector3f, Vector3f) {
        (self.p0, self.p1, self.p2)
    }

    pub fn apply_transform(&mut self, transform: &Transform) {
        self.p0 = transform.apply_point(self.p0);
        self.p1 = transform.apply_point(self.p1);
        self.p2 = transform.apply_point(self.p2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box1() {
        let p0 = Vector3f::new(1.0, 1.0, 1.0);
        let p1 = Vector3f::new(1.5, 4.0, -1.0);
        let p2 = Vector3f::new(-1.0, 2.0, 2.5);

        let triangle = Triangle::new(p0, p1, p2);
        let bounding_box = triangle.bounding_box();

        assert_eq!(bounding_box.p_min, Vector3f::new(-1.0, 1.0, -1.0));
        assert_eq!(bounding_box.p_max, Vector3f::new(1.5, 4.0, 2.5));
    }

    #[test]
    fn test_ray_intersection_t() {
        let triangle = Triangle::new(Vector3f::new(1.0, 1.0, 0.0),
                                     Vector3f::new(2.0, 2.0, 0.0),
                                     Vector3f::new(2.0, 1.0, 0.0));

        let ray1 = Ray3f::new(Vector3f::new(1.5, 1.1, 3.0),
            Vector3f::new(0.0, 0.0, -1.0),
            None,
            None);
        let ray2 = Ray3f::new(Vector3f::new(1.5, 1.1, 3.0),
            Vector3f::new(0.0, 0.0, 1.0),
            None,
            None);
        let ray3 = Ray3f::new(Vector3f::new(1.5, 2.0, 3.0),
            Vector3f::new(0.0, 0.0, -1.0),
            None,
            None);

        assert!(triangle.ray_intersection_t(&ray1));
        assert!(!triangle.ray_intersection_t(&ray2));
        assert!(!triangle.ray_intersection_t(&ray3));

        let hit = triangle.ray_intersection(&ray1).unwrap();
        assert!((hit.t - 3.0).abs() < 1e-5);
        assert!((hit.p - Vector3f::new(1.5, 1.1, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_overlaps_box_uses_plane() {
        let triangle = Triangle::new(Vector3f::new(0.0, 0.0, 0.0),
                                     Vector3f::new(1.0, 0.0, 1.0),
                                     Vector3f::new(0.0, 1.0, 1.0));
        let above = AABB::new(Vector3f::new(0.0, 0.0, 0.8), Vector3f::new(0.1, 0.1, 0.9));
        let on = AABB::new(Vector3f::new(0.4, 0.4, 0.7), Vector3f::new(0.5, 0.5, 0.9));
        assert!(triangle.bounding_box().overlaps(&above));
        assert!(!triangle.overlaps_box(&above));
        assert!(triangle.overlaps_box(&on));
    }

    #[test]
    fn test_sample_area_pdf() {
        let triangle = Triangle::new(Vector3f::new(0.0, 0.0, 0.0),
                                     Vector3f::new(2.0, 0.0, 0.0),
                                     Vector3f::new(0.0, 2.0, 0.0));
        let rec = triangle.sample(&Vector2f::new(0.25, 0.75));
        assert!((rec.pdf - 0.5).abs() < 1e-6);
        assert!(rec.p.z.abs() < 1e-6 && rec.p.x + rec.p.y <= 2.0 + 1e-5);
    }
}
