// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::interaction::{ShapeHit, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;
use crate::shapes::plane_overlaps_box;

/// The square `[-1, 1]^2` of the local `z = 0` plane, placed by `to_world`.
pub struct Rectangle {
    id: String,
    to_world: Transform,
    normal: Vector3f,
    area: Float,
    inv_area: Float,
}

impl Rectangle {
    pub fn new(to_world: Transform) -> Self {
        let dp_du = to_world.apply_vector(Vector3f::new(2.0, 0.0, 0.0));
        let dp_dv = to_world.apply_vector(Vector3f::new(0.0, 2.0, 0.0));
        let area = dp_du.cross(&dp_dv).norm();
        let inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
        let mut normal = to_world.apply_normal(Vector3f::new(0.0, 0.0, 1.0));
        if normal.norm() > 0.0 {
            normal = normal.normalize();
        }

        Self { id: generate_node_id("Rectangle"), to_world, normal, area, inv_area }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    fn hit_distance(&self, ray: &Ray3f) -> Option<Float> {
        let o = self.to_world.inv_apply_point(ray.origin());
        let d = self.to_world.inv_apply_vector(ray.dir());
        if d.z == 0.0 {
            return None;
        }

        // The local direction is not normalized, so the local parameter is
        // already the world distance.
        let t = -o.z / d.z;
        let p = o + t * d;
        if p.x.abs() > 1.0 || p.y.abs() > 1.0 || !ray.test_segment(t) {
            return None;
        }
        Some(t)
    }
}

impl ComputationNode for Rectangle {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("Rectangle [id={}, area={}]", self.id, self.area)
    }
}

impl Shape for Rectangle {
    fn bounding_box(&self) -> AABB {
        let mut bbox = AABB::default();
        let corners = [
            Vector3f::new(-1.0, -1.0, 0.0),
            Vector3f::new(-1.0,  1.0, 0.0),
            Vector3f::new( 1.0, -1.0, 0.0),
            Vector3f::new( 1.0,  1.0, 0.0),
        ];
        for corner in &corners {
            let p = self.to_world.apply_point(*corner);
            bbox.expand_by_point(&p);
        }
        bbox
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let t = self.hit_distance(ray)?;
        Some(ShapeHit { t, p: ray.at(t), n: self.normal })
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.hit_distance(ray).is_some()
    }

    fn overlaps_box(&self, bbox: &AABB) -> bool {
        if !self.bounding_box().overlaps(bbox) {
            return false;
        }
        let origin = self.to_world.apply_point(Vector3f::zeros());
        plane_overlaps_box(&self.normal, self.normal.dot(&origin), bbox)
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let p_local = Vector3f::new(2.0 * u.x - 1.0, 2.0 * u.y - 1.0, 0.0);
        SurfaceSampleRecord {
            p: self.to_world.apply_point(p_local),
            n: self.normal,
            pdf: self.inv_area,
        }
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}
