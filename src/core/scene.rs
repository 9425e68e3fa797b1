// Copyright @yucwang 2026

use crate::core::emitter::Emitter;
use crate::core::error::ConfigError;
use crate::core::grid::GridAggregate;
use crate::core::interaction::SurfaceIntersection;
use crate::core::primitive::{Intersect, Primitive, PrimitiveList};
use crate::core::sampler::SampleConfig;
use crate::core::sensor::Sensor;
use crate::math::aabb::AABB;
use crate::math::constants::Float;
use crate::math::distribution::Distribution1D;
use crate::math::ray::Ray3f;
use std::sync::Arc;

/// Spatial index used for scene queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accelerator {
    #[default]
    Grid,
    /// Linear scan, mostly useful as a reference.
    List,
}

impl Accelerator {
    pub fn parse(key: &str, value: &str) -> Result<Self, ConfigError> {
        match value {
            "grid" => Ok(Accelerator::Grid),
            "list" => Ok(Accelerator::List),
            _ => Err(ConfigError::unknown(key, value)),
        }
    }
}

/// Immutable scene content shared by every render worker.
pub struct Scene {
    aggregate: Box<dyn Intersect>,
    emitters: Vec<Arc<dyn Emitter>>,
    sensors: Vec<Box<dyn Sensor>>,
    light_distribution: Distribution1D,
    light_sample_config: SampleConfig,
}

impl Scene {
    /// Builds the acceleration structure. Emitter and sensor indices stored
    /// in the primitives must refer to the given lists.
    pub fn new(primitives: Vec<Primitive>,
               emitters: Vec<Arc<dyn Emitter>>,
               sensors: Vec<Box<dyn Sensor>>,
               accelerator: Accelerator) -> Result<Self, ConfigError> {
        for primitive in &primitives {
            if let Some(index) = primitive.emitter_index() {
                if index >= emitters.len() {
                    return Err(ConfigError::DanglingReference { key: "shape.emitter".to_string(), kind: "emitter", index });
                }
            }
            if let Some(index) = primitive.sensor_index() {
                if index >= sensors.len() {
                    return Err(ConfigError::DanglingReference { key: "shape.sensor".to_string(), kind: "sensor", index });
                }
            }
        }

        let powers: Vec<Float> = emitters.iter().map(|e| e.power()).collect();
        let light_sample_config = emitters
            .iter()
            .fold(SampleConfig::new(), |acc, e| SampleConfig::union_max(&acc, &e.sample_config()));

        log::info!("Building scene: {} primitives, {} emitters, {} sensors, {:?} accelerator.",
                   primitives.len(), emitters.len(), sensors.len(), accelerator);
        let aggregate: Box<dyn Intersect> = match accelerator {
            Accelerator::Grid => Box::new(GridAggregate::new(primitives)),
            Accelerator::List => Box::new(PrimitiveList::new(primitives)),
        };

        Ok(Self {
            aggregate,
            emitters,
            sensors,
            light_distribution: Distribution1D::new(&powers),
            light_sample_config,
        })
    }

    pub fn ray_intersection(&self, ray: &mut Ray3f) -> Option<SurfaceIntersection<'_>> {
        self.aggregate.ray_intersection(ray)
    }

    pub fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.aggregate.ray_intersection_t(ray)
    }

    pub fn bounding_box(&self) -> AABB {
        self.aggregate.bounding_box()
    }

    /// Sensors attached to scene geometry.
    pub fn attached_sensors(&self) -> Vec<usize> {
        self.aggregate.sensors()
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    pub fn emitter(&self, index: usize) -> &dyn Emitter {
        self.emitters[index].as_ref()
    }

    /// Picks a light with probability proportional to its power.
    pub fn choose_light(&self, u: Float) -> Option<(usize, Float)> {
        self.light_distribution.sample(u)
    }

    pub fn light_pdf(&self, index: usize) -> Float {
        self.light_distribution.pmf(index)
    }

    /// Slot-wise maximum of the sample configs of all emitters; enough for
    /// any single light.
    pub fn light_sample_config(&self) -> &SampleConfig {
        &self.light_sample_config
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    pub fn sensor(&self, index: usize) -> Option<&dyn Sensor> {
        self.sensors.get(index).map(|s| s.as_ref())
    }
}
