// Copyright @yucwang 2021

pub mod rectangle;
pub mod sphere;
pub mod triangle;

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};

/// Whether the plane `n . x = d` crosses `bbox`.
pub(crate) fn plane_overlaps_box(n: &Vector3f, d: Float, bbox: &AABB) -> bool {
    let center = bbox.center();
    let half = 0.5 * bbox.diagonal();
    let radius = half.x * n.x.abs() + half.y * n.y.abs() + half.z * n.z.abs();
    (n.dot(&center) - d).abs() <= radius
}
