// Copyright @yucwang 2021

pub mod bsdf;
pub mod computation_node;
pub mod emitter;
pub mod error;
pub mod grid;
pub mod integrator;
pub mod interaction;
pub mod primitive;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod scene_loader;
pub mod sensor;
pub mod shape;
