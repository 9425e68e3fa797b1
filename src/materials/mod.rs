// Copyright @yucwang 2021

pub mod lambertian_diffuse;
