// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

/// A ray with the half-open parametric interval `[min_t, max_t)`.
///
/// Rays are plain values: aggregates take a copy of the caller's ray and
/// narrow `max_t` on that copy as closer hits turn up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(Float::INFINITY)}
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    /// Narrows `max_t` to `t` when `t` lies inside the current interval.
    pub fn update(&mut self, t: Float) -> bool {
        if self.test_segment(t) {
            self.max_t = t;
            true
        } else {
            false
        }
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t < self.max_t
    }
}

/* Tests for Ray */

#[cfg(test)]
mod tests {
    use super::Vector3f;
    use super::{Ray3f};

    #[test]
    fn test_ray3f() {
        let o = Vector3f::new(0.0, 0.0, 0.0);
        let d = Vector3f::new(1.0, 0.0, 1.0);
        let mut ray = Ray3f::new(o, d, None, None);
        assert_eq!(o, ray.origin());

        let v1 = ray.at(2.0);
        assert!((v1[0] - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!(v1[1].abs() < 1e-6);
        assert!((v1[2] - std::f32::consts::SQRT_2).abs() < 1e-5);

        let status1 = ray.update(100.0);
        let status2 = ray.update(105.0);
        let status3 = ray.update(100.0);
        assert!(status1);
        assert!(!status2);
        assert!(!status3, "max_t is exclusive");
        assert_eq!(ray.max_t, 100.0);
    }

    #[test]
    fn test_ray_is_copied_not_aliased() {
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, Some(10.0));
        let mut narrowed = ray;
        assert!(narrowed.update(3.0));
        assert_eq!(ray.max_t, 10.0);
        assert_eq!(narrowed.max_t, 3.0);
    }
}
