// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Matrix4f, Vector3f };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Self {
        Self { matrix,
               inv_matrix: matrix.try_inverse().unwrap_or_else(Matrix4f::identity) }
    }

    pub fn translate(t: &Vector3f) -> Self {
        Self::new(Matrix4f::new_translation(t))
    }

    pub fn scale(s: &Vector3f) -> Self {
        Self::new(Matrix4f::new_nonuniform_scaling(s))
    }

    /// `self` applied after `other`.
    pub fn compose(&self, other: &Transform) -> Self {
        Self { matrix: self.matrix * other.matrix,
               inv_matrix: other.inv_matrix * self.inv_matrix }
    }

    pub fn matrix(&self) -> &Matrix4f {
        &self.matrix
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        let h = self.matrix * p.push(1.0);
        let w: Float = if h.w != 0.0 { h.w } else { 1.0 };
        h.xyz() / w
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        (self.matrix * v.push(0.0)).xyz()
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        let h = self.inv_matrix * p.push(1.0);
        let w: Float = if h.w != 0.0 { h.w } else { 1.0 };
        h.xyz() / w
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        (self.inv_matrix * v.push(0.0)).xyz()
    }

    // Normals transform with the inverse transpose: (M^{-1})^T n.
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        (self.inv_matrix.transpose() * n.push(0.0)).xyz()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_then_translate() {
        let t = Transform::translate(&Vector3f::new(1.0, 2.0, 3.0))
            .compose(&Transform::scale(&Vector3f::new(2.0, 2.0, 2.0)));
        let p = t.apply_point(Vector3f::new(1.0, 1.0, 1.0));
        assert!((p - Vector3f::new(3.0, 4.0, 5.0)).norm() < 1e-6);

        let v = t.apply_vector(Vector3f::new(1.0, 0.0, 0.0));
        assert!((v - Vector3f::new(2.0, 0.0, 0.0)).norm() < 1e-6);

        let back = t.inv_apply_point(p);
        assert!((back - Vector3f::new(1.0, 1.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_normal_stays_perpendicular() {
        let t = Transform::scale(&Vector3f::new(1.0, 4.0, 1.0));
        let tangent = t.apply_vector(Vector3f::new(1.0, 1.0, 0.0));
        let n = t.apply_normal(Vector3f::new(1.0, -1.0, 0.0));
        assert!(tangent.dot(&n).abs() < 1e-5);
    }
}
