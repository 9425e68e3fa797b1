// Copyright @yucwang 2023

use crate::math::constants::{ Vector3f };

/// Orthonormal shading frame, `z` being the surface normal.
#[derive(Debug, Copy, Clone)]
pub struct Frame {
    pub x: Vector3f,
    pub y: Vector3f,
    pub z: Vector3f
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            x: Vector3f::new(1.0, 0.0, 0.0),
            y: Vector3f::new(0.0, 1.0, 0.0),
            z: Vector3f::new(0.0, 0.0, 1.0)
        }
    }
}

impl Frame {
    pub fn from_normal(n: &Vector3f) -> Frame {
        let up = if n.z.abs() < 0.999 {
            Vector3f::new(0.0, 0.0, 1.0)
        } else {
            Vector3f::new(1.0, 0.0, 0.0)
        };
        let x = n.cross(&up).normalize();
        let y = n.cross(&x).normalize();
        Frame { x, y, z: *n }
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.x), v.dot(&self.y), v.dot(&self.z))
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        v.x * self.x + v.y * self.y + v.z * self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_round_trip_and_orthonormal() {
        let n = Vector3f::new(0.3, -0.4, 0.8).normalize();
        let frame = Frame::from_normal(&n);
        assert!(frame.x.dot(&frame.y).abs() < 1e-5);
        assert!(frame.x.dot(&frame.z).abs() < 1e-5);
        assert!((frame.to_world(&Vector3f::new(0.0, 0.0, 1.0)) - n).norm() < 1e-5);

        let v = Vector3f::new(0.1, 0.7, -0.2);
        assert!((frame.to_world(&frame.to_local(&v)) - v).norm() < 1e-5);
    }
}
