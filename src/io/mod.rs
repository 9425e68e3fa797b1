pub mod exr_utils;
pub mod obj_utils;
