// Copyright @yucwang 2023

use crate::core::bsdf::BSDF;
use crate::core::primitive::Primitive;
use crate::math::constants::{ EPSILON, Float, Vector3f };

/// Raw geometric hit reported by a shape.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShapeHit {
    pub t: Float,
    pub p: Vector3f,
    pub n: Vector3f,
}

/// A point sampled on a surface, with its area-measure density.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceSampleRecord {
    pub p: Vector3f,
    pub n: Vector3f,
    pub pdf: Float,
}

/// Closest hit of a scene query. Borrows the hit primitive, so it lives no
/// longer than the aggregate that produced it.
#[derive(Clone, Copy)]
pub struct SurfaceIntersection<'a> {
    t: Float,
    p: Vector3f,
    epsilon: Float,
    normal: Vector3f,
    primitive: &'a Primitive,
}

impl<'a> SurfaceIntersection<'a> {
    pub fn new(hit: ShapeHit, primitive: &'a Primitive) -> Self {
        Self {
            t: hit.t,
            p: hit.p,
            epsilon: hit_epsilon(hit.t, &hit.p),
            normal: hit.n,
            primitive,
        }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    /// Offset for rays leaving this point.
    pub fn epsilon(&self) -> Float {
        self.epsilon
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn material(&self) -> &'a dyn BSDF {
        self.primitive.material()
    }

    pub fn emitter_index(&self) -> Option<usize> {
        self.primitive.emitter_index()
    }

    pub fn primitive(&self) -> &'a Primitive {
        self.primitive
    }
}

/// Self-intersection offset, growing with the hit distance and with the
/// magnitude of the hit point.
pub fn hit_epsilon(t: Float, p: &Vector3f) -> Float {
    EPSILON * t.max(p.amax()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsilon_scales_with_distance() {
        let near = hit_epsilon(0.5, &Vector3f::new(0.1, 0.2, 0.3));
        let far = hit_epsilon(100.0, &Vector3f::new(0.1, 0.2, 0.3));
        assert_eq!(near, EPSILON);
        assert!((far - 100.0 * EPSILON).abs() < 1e-6);
    }
}
