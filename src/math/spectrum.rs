// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use std::ops;

/// Three-channel radiometric quantity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::new(0.0f32, 0.0f32, 0.0f32) }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: Vector3f::new(r, g, b) }
    }

    pub fn from_value(v: Float) -> Self {
        Self::new(v, v, v)
    }

    pub fn from_vector(rgb: Vector3f) -> Self {
        Self { rgb }
    }

    pub fn black() -> Self {
        Self::default()
    }

    pub fn as_vector(&self) -> Vector3f {
        self.rgb
    }

    pub fn is_black(&self) -> bool {
        self.rgb.iter().all(|c| *c == 0.0)
    }

    /// Every channel finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.rgb.iter().all(|c| c.is_finite() && *c >= 0.0)
    }

    pub fn luminance(&self) -> Float {
        0.212671 * self.rgb.x + 0.715160 * self.rgb.y + 0.072169 * self.rgb.z
    }

    pub fn max_component(&self) -> Float {
        self.rgb.max()
    }
}

impl ops::Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, idx: usize) -> &Float {
        &self.rgb[idx]
    }
}

impl ops::Add for RGBSpectrum {
    type Output = RGBSpectrum;

    fn add(self, rhs: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb + rhs.rgb }
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: RGBSpectrum) {
        self.rgb += rhs.rgb;
    }
}

impl ops::Mul for RGBSpectrum {
    type Output = RGBSpectrum;

    fn mul(self, rhs: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb.component_mul(&rhs.rgb) }
    }
}

impl ops::MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, rhs: RGBSpectrum) {
        self.rgb.component_mul_assign(&rhs.rgb);
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = RGBSpectrum;

    fn mul(self, rhs: Float) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb * rhs }
    }
}

impl ops::MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Float) {
        self.rgb *= rhs;
    }
}

impl ops::Div<Float> for RGBSpectrum {
    type Output = RGBSpectrum;

    fn div(self, rhs: Float) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb / rhs }
    }
}

impl ops::DivAssign<Float> for RGBSpectrum {
    fn div_assign(&mut self, rhs: Float) {
        self.rgb /= rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::RGBSpectrum;

    #[test]
    fn test_add_is_componentwise() {
        let a = RGBSpectrum::new(0.25, 1.0, 3.5);
        let b = RGBSpectrum::new(0.5, 0.0, 2.0);
        let c = a + b;
        assert_eq!(c, RGBSpectrum::new(0.75, 1.0, 5.5));
        assert!(c.is_valid());

        let mut d = a;
        d += b;
        assert_eq!(d, c);
    }

    #[test]
    fn test_validity() {
        assert!(RGBSpectrum::black().is_valid());
        assert!(RGBSpectrum::new(1.0, 2.0, 3.0).is_valid());
        assert!(!RGBSpectrum::new(-0.1, 2.0, 3.0).is_valid());
        assert!(!RGBSpectrum::new(1.0, f32::NAN, 3.0).is_valid());
        assert!(!RGBSpectrum::new(1.0, 2.0, f32::INFINITY).is_valid());
    }

    #[test]
    fn test_products_and_black() {
        let a = RGBSpectrum::new(0.5, 0.25, 2.0);
        assert_eq!(a * RGBSpectrum::new(2.0, 4.0, 0.0), RGBSpectrum::new(1.0, 1.0, 0.0));
        assert_eq!(a * 2.0, RGBSpectrum::new(1.0, 0.5, 4.0));
        assert_eq!(a / 2.0, RGBSpectrum::new(0.25, 0.125, 1.0));
        assert!(RGBSpectrum::black().is_black());
        assert!(!a.is_black());
        assert!((RGBSpectrum::from_value(1.0).luminance() - 1.0).abs() < 1e-5);
    }
}
