// Copyright @yucwang 2023

use crate::core::computation_node::ComputationNode;
use crate::core::interaction::{ ShapeHit, SurfaceSampleRecord };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f };
use crate::math::ray::Ray3f;

pub trait Shape: ComputationNode + Send + Sync {
    fn bounding_box(&self) -> AABB;

    /// Closest hit inside `[ray.min_t, ray.max_t)`.
    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit>;

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.ray_intersection(ray).is_some()
    }

    /// Broad-phase test used when binning into grid voxels. May return
    /// false positives, never false negatives.
    fn overlaps_box(&self, bbox: &AABB) -> bool {
        self.bounding_box().overlaps(bbox)
    }

    /// Uniform point on the surface; the record's pdf is per unit area.
    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord;

    fn surface_area(&self) -> Float;
}
