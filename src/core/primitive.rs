// Copyright @yucwang 2026

use std::sync::Arc;

use crate::core::bsdf::BSDF;
use crate::core::interaction::SurfaceIntersection;
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::ray::Ray3f;

/// Spatial query contract shared by single primitives and aggregates.
pub trait Intersect: Send + Sync {
    /// Closest hit inside the ray interval. On a hit `ray.max_t` is
    /// narrowed to the hit distance.
    fn ray_intersection<'a>(&'a self, ray: &mut Ray3f) -> Option<SurfaceIntersection<'a>>;

    /// Whether anything is hit inside the ray interval.
    fn ray_intersection_t(&self, ray: &Ray3f) -> bool;

    fn bounding_box(&self) -> AABB;

    /// Indices of the sensors attached to this geometry, sorted.
    fn sensors(&self) -> Vec<usize>;
}

/// A shape bound to its material, plus the optional emitter and sensor
/// attached to the same surface (indices into the scene's lists).
#[derive(Clone)]
pub struct Primitive {
    shape: Arc<dyn Shape>,
    material: Arc<dyn BSDF>,
    emitter: Option<usize>,
    sensor: Option<usize>,
}

impl Primitive {
    pub fn new(shape: Arc<dyn Shape>, material: Arc<dyn BSDF>) -> Self {
        Self { shape, material, emitter: None, sensor: None }
    }

    pub fn with_emitter(mut self, emitter: usize) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn with_sensor(mut self, sensor: usize) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }

    pub fn material(&self) -> &dyn BSDF {
        self.material.as_ref()
    }

    pub fn emitter_index(&self) -> Option<usize> {
        self.emitter
    }

    pub fn sensor_index(&self) -> Option<usize> {
        self.sensor
    }
}

impl Intersect for Primitive {
    fn ray_intersection<'a>(&'a self, ray: &mut Ray3f) -> Option<SurfaceIntersection<'a>> {
        let hit = self.shape.ray_intersection(ray)?;
        if !ray.update(hit.t) {
            return None;
        }
        Some(SurfaceIntersection::new(hit, self))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.shape.ray_intersection_t(ray)
    }

    fn bounding_box(&self) -> AABB {
        self.shape.bounding_box()
    }

    fn sensors(&self) -> Vec<usize> {
        self.sensor.into_iter().collect()
    }
}

pub(crate) fn collect_sensors(primitives: &[Primitive]) -> Vec<usize> {
    let mut sensors: Vec<usize> = primitives.iter().filter_map(|p| p.sensor).collect();
    sensors.sort_unstable();
    sensors.dedup();
    sensors
}

/// Brute-force aggregate: every query tests every primitive.
pub struct PrimitiveList {
    primitives: Vec<Primitive>,
    bbox: AABB,
    sensors: Vec<usize>,
}

impl PrimitiveList {
    pub fn new(primitives: Vec<Primitive>) -> Self {
        let bbox = primitives
            .iter()
            .fold(AABB::default(), |acc, p| acc.union(&p.bounding_box()));
        let sensors = collect_sensors(&primitives);
        Self { primitives, bbox, sensors }
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl Intersect for PrimitiveList {
    fn ray_intersection<'a>(&'a self, ray: &mut Ray3f) -> Option<SurfaceIntersection<'a>> {
        let mut closest = None;
        for primitive in &self.primitives {
            if let Some(its) = primitive.ray_intersection(ray) {
                closest = Some(its);
            }
        }
        closest
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.primitives.iter().any(|p| p.ray_intersection_t(ray))
    }

    fn bounding_box(&self) -> AABB {
        self.bbox
    }

    fn sensors(&self) -> Vec<usize> {
        self.sensors.clone()
    }
}
