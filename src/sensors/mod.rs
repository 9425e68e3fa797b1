// Copyright @yucwang 2021

pub mod irradiance_meter;
pub mod perspective;
pub mod radiance_meter;
