/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;
pub type Int = i32;
pub type UInt = u32;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;
pub type Vector3i = nalgebra::Vector3<Int>;
pub type Matrix4f = nalgebra::Matrix4<Float>;

pub const EPSILON: Float = 1e-4;
pub const PI: Float = std::f32::consts::PI;
pub const INV_PI: Float = std::f32::consts::FRAC_1_PI;
pub const INV_2PI: Float = 0.5 * std::f32::consts::FRAC_1_PI;
pub const INV_4PI: Float = 0.25 * std::f32::consts::FRAC_1_PI;

// Largest float strictly below one, used to keep uniform samples in [0, 1).
pub const ONE_MINUS_EPSILON: Float = 1.0 - f32::EPSILON / 2.0;
