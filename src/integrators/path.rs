// Copyright @yucwang 2026

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::bsdf::TransportMode;
use crate::core::computation_node::ComputationNode;
use crate::core::error::{ConfigError, RenderError};
use crate::core::integrator::Integrator;
use crate::core::rng::LcgRng;
use crate::core::sampler::{SampleBundle, SampleConfig, SlotBase};
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::integrators::russian_roulette::RussianRouletteState;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Vertices past this many draw their random values from the worker RNG
/// instead of the sample bundle.
const MAX_SAMPLED_VERTICES: usize = 3;

/// Set of path-construction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathType(u8);

impl PathType {
    pub const NONE: Self = Self(0);
    /// Paths that end by hitting an emitter.
    pub const EMITTED: Self = Self(1 << 0);
    /// Next-event estimation towards a sampled light point.
    pub const DIRECT_LIGHTING: Self = Self(1 << 1);
    pub const IMPORTANCE_EMITTED: Self = Self(1 << 2);
    pub const IMPORTANCE_DIRECT: Self = Self(1 << 3);
    pub const IMPORTANCE: Self = Self(Self::IMPORTANCE_EMITTED.0 | Self::IMPORTANCE_DIRECT.0);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0 && other.0 != 0
    }

    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Comma separated list of `emitted`, `direct`, `importance_emitted`,
    /// `importance_direct`.
    pub fn parse(key: &str, value: &str) -> Result<Self, ConfigError> {
        let mut types = PathType::NONE;
        for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            types |= match name {
                "emitted" => PathType::EMITTED,
                "direct" => PathType::DIRECT_LIGHTING,
                "importance_emitted" => PathType::IMPORTANCE_EMITTED,
                "importance_direct" => PathType::IMPORTANCE_DIRECT,
                _ => return Err(ConfigError::unknown(key, name)),
            };
        }
        if types == PathType::NONE {
            return Err(ConfigError::invalid(key, value, "no path type enabled"));
        }
        Ok(types)
    }
}

impl std::ops::BitOr for PathType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for PathType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// How emitted-light and direct-lighting samples of the same vertex are
/// weighted against each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MisMethod {
    Uniform,
    /// Power heuristic with exponent `beta`.
    Power(Float),
}

impl MisMethod {
    pub fn parse(key: &str, name: &str, beta: Float) -> Result<Self, ConfigError> {
        match name {
            "uniform" => Ok(MisMethod::Uniform),
            "power" => {
                if !(beta > 0.0 && beta.is_finite()) {
                    return Err(ConfigError::invalid("integrator.mis_beta", &beta.to_string(), "must be positive"));
                }
                Ok(MisMethod::Power(beta))
            }
            _ => Err(ConfigError::unknown(key, name)),
        }
    }
}

/// Throughput quantity fed to Russian roulette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouletteMetric {
    /// Product of all bounce weights so far.
    Alpha,
    /// Weight of the last bounce only.
    Albedo,
}

impl RouletteMetric {
    pub fn parse(key: &str, name: &str) -> Result<Self, ConfigError> {
        match name {
            "alpha" => Ok(RouletteMetric::Alpha),
            "albedo" => Ok(RouletteMetric::Albedo),
            _ => Err(ConfigError::unknown(key, name)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathTracerConfig {
    pub path_types: PathType,
    pub mis: MisMethod,
    pub roulette_metric: RouletteMetric,
    pub roulette: RussianRouletteState,
    /// Longest path, counted in edges. The sensor ray is edge 0.
    pub max_edges: usize,
    /// 0 counts invalid contributions silently, 1 logs them, 2 also traces
    /// every path estimate.
    pub debug_level: u32,
    /// Cap on the number of logged diagnostics.
    pub debug_max: usize,
}

impl Default for PathTracerConfig {
    fn default() -> Self {
        Self {
            path_types: PathType::EMITTED | PathType::DIRECT_LIGHTING,
            mis: MisMethod::Power(2.0),
            roulette_metric: RouletteMetric::Alpha,
            roulette: RussianRouletteState::default(),
            max_edges: 8,
            debug_level: 1,
            debug_max: 16,
        }
    }
}

/// Bundle slots of the first `MAX_SAMPLED_VERTICES` interior vertices.
#[derive(Debug, Clone, Default)]
struct SlotLayout {
    direction: Vec<usize>,
    choose_light: Vec<usize>,
    light: Vec<SlotBase>,
    light_has_1d: bool,
    light_has_2d: bool,
}

/// Unidirectional path tracer with next-event estimation.
pub struct PathTracer {
    config: PathTracerConfig,
    sample_config: SampleConfig,
    sensor_config: SampleConfig,
    layout: SlotLayout,
    invalid: AtomicUsize,
}

impl PathTracer {
    /// Fails when importance transport is requested for a sensor that paths
    /// could hit.
    pub fn new(config: PathTracerConfig, scene: &Scene, sensor: &dyn Sensor) -> Result<Self, RenderError> {
        if config.path_types.intersects(PathType::IMPORTANCE) {
            if !sensor.is_specular() {
                return Err(RenderError::UnimplementedStrategy(format!(
                    "importance-transport paths towards non-specular sensor '{}'", sensor.id())));
            }
            log::warn!("Importance-transport paths cannot reach specular sensor '{}' and add nothing.", sensor.id());
        }

        let sensor_config = sensor.sample_config();
        let mut sample_config = sensor_config.clone();
        let mut layout = SlotLayout::default();
        let light_config = scene.light_sample_config();
        layout.light_has_1d = !light_config.sizes_1d().is_empty();
        layout.light_has_2d = !light_config.sizes_2d().is_empty();

        let sampled_vertices = config.max_edges.saturating_sub(1).min(MAX_SAMPLED_VERTICES);
        for _ in 0..sampled_vertices {
            layout.direction.push(sample_config.add_2d(1));
            if config.path_types.contains(PathType::DIRECT_LIGHTING) {
                layout.choose_light.push(sample_config.add_1d(1));
                layout.light.push(sample_config.append(light_config));
            }
        }

        log::debug!("Path tracer for '{}': {} 1D and {} 2D sample slots.",
                    sensor.id(), sample_config.sizes_1d().len(), sample_config.sizes_2d().len());

        Ok(Self { config, sample_config, sensor_config, layout, invalid: AtomicUsize::new(0) })
    }

    pub fn config(&self) -> &PathTracerConfig {
        &self.config
    }

    fn direction_sample(&self, bundle: &SampleBundle, vertex: usize, rng: &mut LcgRng) -> Vector2f {
        match self.layout.direction.get(vertex) {
            Some(slot) => bundle.get_2d(*slot, 0),
            None => rng.next_vector2f(),
        }
    }

    fn choose_light_sample(&self, bundle: &SampleBundle, vertex: usize, rng: &mut LcgRng) -> Float {
        match self.layout.choose_light.get(vertex) {
            Some(slot) => bundle.get_1d(*slot, 0),
            None => rng.next_f32(),
        }
    }

    fn light_samples(&self, bundle: &SampleBundle, vertex: usize, rng: &mut LcgRng) -> (Float, Vector2f) {
        match self.layout.light.get(vertex) {
            Some(base) => {
                let u1 = if self.layout.light_has_1d { bundle.get_1d(base.base_1d, 0) } else { rng.next_f32() };
                let u2 = if self.layout.light_has_2d { bundle.get_2d(base.base_2d, 0) } else { rng.next_vector2f() };
                (u1, u2)
            }
            None => (rng.next_f32(), rng.next_vector2f()),
        }
    }

    /// Weight of an emitter hit reached by BSDF sampling, against having
    /// sampled the same point as a direct-lighting sample.
    fn emitted_weight(&self, light_pdf: Float, bsdf_pdf: Float) -> Float {
        match self.config.mis {
            MisMethod::Uniform => 0.5,
            MisMethod::Power(beta) => 1.0 / (1.0 + (light_pdf / bsdf_pdf).powf(beta)),
        }
    }

    /// Weight of a direct-lighting sample against BSDF sampling.
    fn direct_weight(&self, light_pdf: Float, bsdf_pdf: Float) -> Float {
        if !self.config.path_types.contains(PathType::EMITTED) {
            return 1.0;
        }
        match self.config.mis {
            MisMethod::Uniform => 0.5,
            MisMethod::Power(beta) => 1.0 / (1.0 + (bsdf_pdf / light_pdf).powf(beta)),
        }
    }

    /// Adds `value` unless it or its MIS weight is corrupt.
    fn add_contribution(&self,
                        result: &mut RGBSpectrum,
                        value: RGBSpectrum,
                        weight: Float,
                        pixel: (usize, usize),
                        edge_index: usize) {
        if weight.is_finite() && value.is_valid() {
            *result += value;
            return;
        }

        let count = self.invalid.fetch_add(1, Ordering::Relaxed);
        if self.config.debug_level >= 1 && count < self.config.debug_max {
            log::warn!("Dropped invalid contribution {:?} (weight {}) at pixel ({}, {}), edge {}.",
                       value.as_vector(), weight, pixel.0, pixel.1, edge_index);
            if count + 1 == self.config.debug_max {
                log::warn!("Further invalid contributions are not reported.");
            }
        }
    }
}

impl ComputationNode for PathTracer {
    fn id(&self) -> &str {
        "path"
    }

    fn to_string(&self) -> String {
        format!("PathTracer [max_edges={}, mis={:?}, types={:?}]",
                self.config.max_edges, self.config.mis, self.config.path_types)
    }
}

impl Integrator for PathTracer {
    fn sample_config(&self) -> &SampleConfig {
        &self.sample_config
    }

    fn sensor_config(&self) -> &SampleConfig {
        &self.sensor_config
    }

    fn sample_sensor_path(&self,
                          scene: &Scene,
                          sensor: &dyn Sensor,
                          x: usize,
                          y: usize,
                          bundle: &SampleBundle,
                          rng: &mut LcgRng) -> RGBSpectrum {
        let mut result = RGBSpectrum::black();
        let (mut ray, importance) = match sensor.sample_ray(x, y, bundle) {
            Some(sample) => sample,
            None => return result,
        };
        if importance.is_black() {
            return result;
        }

        let emitted = self.config.path_types.contains(PathType::EMITTED);
        let direct = self.config.path_types.contains(PathType::DIRECT_LIGHTING);
        let mut throughput = importance;
        let mut albedo = RGBSpectrum::from_value(1.0);
        let mut prev_p = ray.origin();
        let mut prev_bsdf_pdf: Float = 0.0;
        let mut edge_index = 0;

        while edge_index < self.config.max_edges {
            let metric = match self.config.roulette_metric {
                RouletteMetric::Alpha => throughput,
                RouletteMetric::Albedo => albedo,
            };
            let q = self.config.roulette.continue_probability(edge_index, &metric);
            if q <= 0.0 {
                break;
            }
            if q < 1.0 {
                if rng.next_f32() >= q {
                    break;
                }
                throughput /= q;
            }

            let its = match scene.ray_intersection(&mut ray) {
                Some(its) => its,
                None => break,
            };
            let p = its.p();
            let n = its.normal();
            let wo: Vector3f = -ray.dir();

            if emitted {
                if let Some(light_index) = its.emitter_index() {
                    let light = scene.emitter(light_index);
                    let le = light.compute_le(&p, &n, &wo);
                    if !le.is_black() {
                        let weight = if edge_index == 0 || !direct {
                            1.0
                        } else {
                            let light_pdf = scene.light_pdf(light_index)
                                * light.compute_le_pdf_from_point(&prev_p, &p, &n);
                            self.emitted_weight(light_pdf, prev_bsdf_pdf)
                        };
                        self.add_contribution(&mut result, throughput * le * weight, weight, (x, y), edge_index);
                    }
                }
            }

            // No room left for another edge.
            if edge_index + 1 >= self.config.max_edges {
                break;
            }

            let material = its.material();
            if direct && scene.emitter_count() > 0 {
                let u_choose = self.choose_light_sample(bundle, edge_index, rng);
                let (u1, u2) = self.light_samples(bundle, edge_index, rng);
                if let Some((light_index, p_choose)) = scene.choose_light(u_choose) {
                    let sample = scene.emitter(light_index).sample_le_from_point(&p, its.epsilon(), u1, &u2);
                    if let Some(ls) = sample {
                        let f = material.compute_f(TransportMode::Radiance, &wo, &ls.wi, &n);
                        let cos = ls.wi.dot(&n).abs();
                        if !f.is_black() && cos > 0.0 && !scene.ray_intersection_t(&ls.shadow_ray) {
                            let bsdf_pdf = material.compute_pdf(TransportMode::Radiance, &wo, &ls.wi, &n);
                            let weight = self.direct_weight(p_choose * ls.pdf, bsdf_pdf);
                            let value = throughput * f * ls.le_over_pdf * (cos * weight / p_choose);
                            self.add_contribution(&mut result, value, weight, (x, y), edge_index);
                        }
                    }
                }
            }

            let u = self.direction_sample(bundle, edge_index, rng);
            let bs = match material.sample_wi(TransportMode::Radiance, &u, &wo, &n) {
                Some(bs) if bs.pdf > 0.0 && !bs.weight.is_black() => bs,
                _ => break,
            };

            throughput *= bs.weight;
            albedo = bs.weight;
            prev_p = p;
            prev_bsdf_pdf = bs.pdf;
            ray = Ray3f::new(p, bs.wi, Some(its.epsilon()), None);
            edge_index += 1;
        }

        if self.config.debug_level >= 2 {
            log::trace!("Pixel ({}, {}): {:?} after {} edges.", x, y, result.as_vector(), edge_index);
        }
        result
    }

    fn invalid_contributions(&self) -> usize {
        self.invalid.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bsdf::BSDF;
    use crate::core::emitter::Emitter;
    use crate::core::primitive::Primitive;
    use crate::core::sampler::Sampler;
    use crate::core::scene::Accelerator;
    use crate::core::shape::Shape;
    use crate::emitters::area::AreaEmitter;
    use crate::integrators::russian_roulette::RussianRouletteMethod;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::math::constants::PI;
    use crate::math::transform::Transform;
    use crate::samplers::independent::IndependentSampler;
    use crate::sensors::irradiance_meter::IrradianceMeter;
    use crate::sensors::perspective::PerspectiveCamera;
    use crate::sensors::radiance_meter::RadianceMeter;
    use crate::shapes::rectangle::Rectangle;
    use crate::shapes::sphere::Sphere;
    use std::sync::Arc;

    fn diffuse(albedo: Float) -> Arc<dyn BSDF> {
        Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::from_value(albedo), None))
    }

    fn sphere_light(center: Vector3f, radius: Float, radiance: RGBSpectrum) -> (Primitive, Arc<dyn Emitter>) {
        let shape: Arc<dyn Shape> = Arc::new(Sphere::new(center, radius));
        let emitter: Arc<dyn Emitter> = Arc::new(AreaEmitter::from_shape(shape.clone(), radiance));
        (Primitive::new(shape, diffuse(0.5)).with_emitter(0), emitter)
    }

    /// Mean and standard error of the first channel over `n` samples.
    fn estimate(tracer: &PathTracer, scene: &Scene, n: usize, seed: u64) -> (f64, f64) {
        let sensor = scene.sensor(0).unwrap();
        let sampler = IndependentSampler::new(None);
        let config = tracer.sample_config().clone();
        let mut storage = sampler.allocate_sample_storage(&config, n);
        let mut rng = LcgRng::new(seed);
        sampler.generate_sample_bundles(&config, &mut storage, n, &mut rng);

        let mut sum = 0.0f64;
        let mut sum2 = 0.0f64;
        for i in 0..n {
            let v = tracer.sample_sensor_path(scene, sensor, 0, 0, &storage.bundle(i), &mut rng)[0] as f64;
            sum += v;
            sum2 += v * v;
        }
        let mean = sum / n as f64;
        let var = (sum2 / n as f64 - mean * mean).max(0.0);
        (mean, (var / n as f64).sqrt())
    }

    #[test]
    fn test_irradiance_from_sphere_light_single_edge() {
        // E = pi * Le * (r / d)^2 for a sphere of radius r at distance d.
        let (prim, emitter) = sphere_light(Vector3f::new(0.0, 0.0, 3.0), 1.0, RGBSpectrum::from_value(1.0));
        let meter: Box<dyn Sensor> = Box::new(IrradianceMeter::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None));
        let scene = Scene::new(vec![prim], vec![emitter], vec![meter], Accelerator::Grid).unwrap();

        let config = PathTracerConfig { max_edges: 1, ..PathTracerConfig::default() };
        let tracer = PathTracer::new(config, &scene, scene.sensor(0).unwrap()).unwrap();
        let (mean, stderr) = estimate(&tracer, &scene, 10000, 17);

        let expected = (PI / 9.0) as f64;
        assert!((mean - expected).abs() < 3.0 * stderr + 1e-3,
                "mean {} expected {} stderr {}", mean, expected, stderr);
        assert_eq!(tracer.invalid_contributions(), 0);
    }

    fn lit_floor_scene() -> Scene {
        let floor: Arc<dyn Shape> = Arc::new(Rectangle::new(Transform::scale(&Vector3f::new(10.0, 10.0, 1.0))));
        let (light, emitter) = sphere_light(Vector3f::new(0.0, 0.0, 4.0), 1.0, RGBSpectrum::from_value(5.0));
        let meter: Box<dyn Sensor> = Box::new(RadianceMeter::new(Vector3f::new(2.0, 0.0, 1.0), Vector3f::zeros(), None));
        Scene::new(vec![Primitive::new(floor, diffuse(0.5)), light],
                   vec![emitter],
                   vec![meter],
                   Accelerator::Grid).unwrap()
    }

    #[test]
    fn test_direct_illumination_closed_form() {
        // L = albedo * Le * (r / h)^2 at the foot of a sphere light.
        let scene = lit_floor_scene();
        let expected = 0.5 * 5.0 / 16.0;

        let variants = [
            (PathType::EMITTED | PathType::DIRECT_LIGHTING, MisMethod::Power(2.0)),
            (PathType::EMITTED | PathType::DIRECT_LIGHTING, MisMethod::Power(1.0)),
            (PathType::EMITTED | PathType::DIRECT_LIGHTING, MisMethod::Uniform),
            (PathType::DIRECT_LIGHTING, MisMethod::Power(2.0)),
            (PathType::EMITTED, MisMethod::Power(2.0)),
        ];
        for (seed, (path_types, mis)) in variants.iter().enumerate() {
            let config = PathTracerConfig {
                path_types: *path_types,
                mis: *mis,
                max_edges: 2,
                ..PathTracerConfig::default()
            };
            let tracer = PathTracer::new(config, &scene, scene.sensor(0).unwrap()).unwrap();
            let (mean, stderr) = estimate(&tracer, &scene, 10000, 100 + seed as u64);
            assert!((mean - expected).abs() < 3.0 * stderr + 1e-3,
                    "{:?} {:?}: mean {} expected {} stderr {}", path_types, mis, mean, expected, stderr);
        }
    }

    #[test]
    fn test_roulette_keeps_multi_bounce_estimate_unbiased() {
        // Meter looking down at the lit floor: floor -> sphere -> floor
        // interreflection needs several edges.
        let floor: Arc<dyn Shape> = Arc::new(Rectangle::new(Transform::scale(&Vector3f::new(10.0, 10.0, 1.0))));
        let (light, emitter) = sphere_light(Vector3f::new(0.0, 0.0, 4.0), 1.0, RGBSpectrum::from_value(5.0));
        let meter: Box<dyn Sensor> = Box::new(IrradianceMeter::new(Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), None));
        let scene = Scene::new(vec![Primitive::new(floor, diffuse(0.5)), light],
                               vec![emitter],
                               vec![meter],
                               Accelerator::Grid).unwrap();
        let samples = 60000;

        let reference = PathTracerConfig {
            max_edges: 5,
            roulette: RussianRouletteState::disabled(),
            ..PathTracerConfig::default()
        };
        let tracer = PathTracer::new(reference, &scene, scene.sensor(0).unwrap()).unwrap();
        let (expected, expected_err) = estimate(&tracer, &scene, samples, 41);
        assert!(expected > 0.0);

        let fixed = RussianRouletteState::new(0, RussianRouletteMethod::Fixed(0.7), 1.0).unwrap();
        let proportional = RussianRouletteState::new(0, RussianRouletteMethod::Proportional(1.0), 0.95).unwrap();
        let variants = [
            (fixed, RouletteMetric::Alpha),
            (proportional, RouletteMetric::Alpha),
            (proportional, RouletteMetric::Albedo),
        ];
        for (seed, (roulette, metric)) in variants.iter().enumerate() {
            let config = PathTracerConfig { roulette: *roulette, roulette_metric: *metric, ..reference };
            let tracer = PathTracer::new(config, &scene, scene.sensor(0).unwrap()).unwrap();
            let (mean, stderr) = estimate(&tracer, &scene, samples, 50 + seed as u64);
            let tolerance = 4.0 * (stderr * stderr + expected_err * expected_err).sqrt();
            assert!((mean - expected).abs() < tolerance,
                    "{:?} {:?}: mean {} expected {} tolerance {}", roulette, metric, mean, expected, tolerance);
        }
    }

    #[test]
    fn test_max_edges_zero_contributes_nothing() {
        let scene = lit_floor_scene();
        let config = PathTracerConfig { max_edges: 0, ..PathTracerConfig::default() };
        let tracer = PathTracer::new(config, &scene, scene.sensor(0).unwrap()).unwrap();
        let (mean, _) = estimate(&tracer, &scene, 16, 1);
        assert_eq!(mean, 0.0);
    }

    #[test]
    fn test_invalid_emission_is_dropped() {
        let (prim, emitter) = sphere_light(Vector3f::new(0.0, 0.0, 3.0), 1.0, RGBSpectrum::new(Float::NAN, 1.0, 1.0));
        let meter: Box<dyn Sensor> = Box::new(RadianceMeter::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None));
        let scene = Scene::new(vec![prim], vec![emitter], vec![meter], Accelerator::List).unwrap();

        let config = PathTracerConfig { max_edges: 1, debug_max: 2, ..PathTracerConfig::default() };
        let tracer = PathTracer::new(config, &scene, scene.sensor(0).unwrap()).unwrap();
        let (mean, _) = estimate(&tracer, &scene, 8, 3);
        assert_eq!(mean, 0.0);
        assert_eq!(tracer.invalid_contributions(), 8);
    }

    #[test]
    fn test_importance_paths_need_specular_sensor() {
        let scene = lit_floor_scene();
        let config = PathTracerConfig {
            path_types: PathType::EMITTED | PathType::IMPORTANCE_DIRECT,
            ..PathTracerConfig::default()
        };
        assert!(PathTracer::new(config, &scene, scene.sensor(0).unwrap()).is_ok());

        let meter = IrradianceMeter::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None);
        let err = PathTracer::new(config, &scene, &meter).err().unwrap();
        assert!(matches!(err, RenderError::UnimplementedStrategy(_)));
    }

    #[test]
    fn test_sample_budget_reuses_three_vertices() {
        let scene = lit_floor_scene();
        let camera = PerspectiveCamera::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::zeros(), Vector3f::new(0.0, 1.0, 0.0),
                                            1.0, 8, 8, 0.0, 100.0, None);

        let tracer = PathTracer::new(PathTracerConfig::default(), &scene, &camera).unwrap();
        // Camera jitter + 3 directions + 3 light points in 2D, 3 choices + 3 light picks in 1D.
        assert_eq!(tracer.sample_config().sizes_2d().len(), 7);
        assert_eq!(tracer.sample_config().sizes_1d().len(), 6);

        let config = PathTracerConfig { max_edges: 2, path_types: PathType::EMITTED, ..PathTracerConfig::default() };
        let tracer = PathTracer::new(config, &scene, &camera).unwrap();
        assert_eq!(tracer.sample_config().sizes_2d().len(), 2);
        assert!(tracer.sample_config().sizes_1d().is_empty());
    }

    #[test]
    fn test_parse_path_options() {
        assert_eq!(PathType::parse("integrator.strategies", "emitted, direct").unwrap(),
                   PathType::EMITTED | PathType::DIRECT_LIGHTING);
        assert!(PathType::parse("integrator.strategies", "emitted,photons").is_err());
        assert!(PathType::parse("integrator.strategies", "").is_err());
        assert_eq!(MisMethod::parse("integrator.mis", "power", 2.0).unwrap(), MisMethod::Power(2.0));
        assert!(MisMethod::parse("integrator.mis", "balance", 1.0).is_err());
        assert_eq!(RouletteMetric::parse("integrator.rr_metric", "albedo").unwrap(), RouletteMetric::Albedo);
    }
}
