// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::core::bsdf::BSDF;
use crate::core::emitter::Emitter;
use crate::core::error::ConfigError;
use crate::core::primitive::Primitive;
use crate::core::sampler::Sampler;
use crate::core::scene::{Accelerator, Scene};
use crate::core::sensor::Sensor;
use crate::core::shape::Shape;
use crate::emitters::area::AreaEmitter;
use crate::integrators::path::{MisMethod, PathTracerConfig, PathType, RouletteMetric};
use crate::integrators::russian_roulette::{RussianRouletteMethod, RussianRouletteState};
use crate::io::obj_utils::{load_obj_triangles, ObjLoadError};
use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;
use crate::renderers::block::RenderOptions;
use crate::samplers::independent::IndependentSampler;
use crate::samplers::stratified::StratifiedSampler;
use crate::sensors::irradiance_meter::IrradianceMeter;
use crate::sensors::perspective::PerspectiveCamera;
use crate::sensors::radiance_meter::RadianceMeter;
use crate::shapes::rectangle::Rectangle;
use crate::shapes::sphere::Sphere;

#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("failed to read scene: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scene XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed scene XML: {0}")]
    Structure(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load mesh '{path}': {source}")]
    Obj { path: String, source: ObjLoadError },
}

/// A loaded scene together with the render settings declared next to it.
pub struct SceneDescription {
    pub scene: Scene,
    pub path_config: PathTracerConfig,
    pub sampler: Box<dyn Sampler>,
    pub render_options: RenderOptions,
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneLoadError> {
    let result = load_scene_with_settings(path, None)?;
    Ok(result.scene)
}

/// `accelerator` replaces the one named in the file.
pub fn load_scene_with_settings<P: AsRef<Path>>(path: P,
                                                accelerator: Option<Accelerator>) -> Result<SceneDescription, SceneLoadError> {
    let path = path.as_ref();
    log::info!("Loading scene from {}.", path.display());
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_scene(&xml, base_dir, accelerator)
}

/// Relative mesh paths are resolved against `base_dir`.
pub fn parse_scene(xml: &str,
                   base_dir: &Path,
                   accelerator: Option<Accelerator>) -> Result<SceneDescription, SceneLoadError> {
    let document = parse_document(xml)?;
    let root = document.child("scene").ok_or_else(|| ConfigError::missing("scene"))?;

    let path_config = parse_path_config(root.child("integrator"))?;
    let (sampler, sample_count) = parse_sampler(root.child("sampler"))?;
    let (render_options, file_accelerator) = parse_render_options(root.child("renderer"), sample_count)?;

    let mut builder = SceneBuilder::new(base_dir);
    for element in &root.children {
        match element.tag.as_str() {
            "sensor" => builder.add_sensor(element)?,
            "bsdf" => builder.add_bsdf(element)?,
            _ => {}
        }
    }
    for element in root.children_named("shape") {
        builder.add_shape(element)?;
    }

    let scene = Scene::new(builder.primitives,
                           builder.emitters,
                           builder.sensors,
                           accelerator.unwrap_or(file_accelerator))?;

    Ok(SceneDescription { scene, path_config, sampler, render_options })
}

#[derive(Debug, Default)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    fn type_name(&self) -> Result<&str, ConfigError> {
        self.attr("type").ok_or_else(|| ConfigError::missing(&format!("{}.type", self.tag)))
    }
}

fn parse_document(xml: &str) -> Result<Element, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();
    let mut stack = vec![Element { tag: "document".to_string(), ..Element::default() }];

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                stack.push(read_element(&e, &defaults)?);
            }
            Event::Empty(e) => {
                let element = read_element(&e, &defaults)?;
                if element.tag == "default" {
                    if let (Some(name), Some(value)) = (element.attr("name"), element.attr("value")) {
                        defaults.insert(name.to_string(), value.to_string());
                    }
                }
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Event::End(e) => {
                if stack.len() < 2 {
                    return Err(SceneLoadError::Structure(format!(
                        "unexpected </{}>", String::from_utf8_lossy(e.name().as_ref()))));
                }
                if let Some(element) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(element);
                    }
                }
            }
            _ => {}
        }
        buf.clear();
    }

    if stack.len() != 1 {
        let open = stack.last().map(|e| e.tag.clone()).unwrap_or_default();
        return Err(SceneLoadError::Structure(format!("<{}> is never closed", open)));
    }
    stack.pop().ok_or_else(|| SceneLoadError::Structure("empty document".to_string()))
}

fn read_element(e: &BytesStart, defaults: &HashMap<String, String>) -> Result<Element, SceneLoadError> {
    let mut element = Element {
        tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        ..Element::default()
    };
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = resolve_value(&attr.unescape_value()?, defaults);
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

const PROPERTY_TAGS: [&str; 8] = ["float", "integer", "string", "boolean", "rgb", "point", "vector", "spectrum"];

/// Named values declared by `<float>`, `<integer>`, ... children of one
/// element. Lookups report errors under `owner.name`.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    owner: String,
    values: HashMap<String, String>,
}

impl Properties {
    pub fn new(owner: &str) -> Self {
        Self { owner: owner.to_string(), values: HashMap::new() }
    }

    fn from_element(owner: &str, element: &Element) -> Self {
        let mut properties = Self::new(owner);
        for child in element.children.iter().filter(|c| PROPERTY_TAGS.contains(&c.tag.as_str())) {
            if let (Some(name), Some(value)) = (child.attr("name"), child.attr("value")) {
                properties.insert(name, value);
            }
        }
        properties
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn key(&self, name: &str) -> String {
        format!("{}.{}", self.owner, name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    pub fn get<T: FromStr>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
                ConfigError::invalid(&self.key(name), raw, format!("expected {}", std::any::type_name::<T>()))
            }),
        }
    }

    pub fn get_or<T: FromStr>(&self, name: &str, default: T) -> Result<T, ConfigError> {
        Ok(self.get(name)?.unwrap_or(default))
    }

    pub fn require<T: FromStr>(&self, name: &str) -> Result<T, ConfigError> {
        self.get(name)?.ok_or_else(|| ConfigError::missing(&self.key(name)))
    }

    /// Three comma separated numbers, or one number used for all three.
    pub fn get_vec3(&self, name: &str) -> Result<Option<Vector3f>, ConfigError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(raw) => parse_vec3(raw).map(Some).map_err(|reason| ConfigError::invalid(&self.key(name), raw, reason)),
        }
    }

    pub fn require_vec3(&self, name: &str) -> Result<Vector3f, ConfigError> {
        self.get_vec3(name)?.ok_or_else(|| ConfigError::missing(&self.key(name)))
    }

    pub fn get_spectrum(&self, name: &str) -> Result<Option<RGBSpectrum>, ConfigError> {
        let value = match self.get_vec3(name)? {
            Some(v) => RGBSpectrum::from_vector(v),
            None => return Ok(None),
        };
        if !value.is_valid() {
            let raw = self.get_string(name).unwrap_or_default();
            return Err(ConfigError::invalid(&self.key(name), raw, "must be finite and non-negative"));
        }
        Ok(Some(value))
    }
}

fn parse_vec3(raw: &str) -> Result<Vector3f, String> {
    let parts: Vec<&str> = raw.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    let numbers = parts
        .iter()
        .map(|p| p.parse::<Float>())
        .collect::<Result<Vec<Float>, _>>()
        .map_err(|_| "expected numbers".to_string())?;
    match numbers.as_slice() {
        [v] => Ok(Vector3f::new(*v, *v, *v)),
        [x, y, z] => Ok(Vector3f::new(*x, *y, *z)),
        _ => Err("expected one or three comma separated numbers".to_string()),
    }
}

/// Reads `x`, `y`, `z` attributes or a `value` attribute.
fn step_vector(step: &Element, key: &str, default: Float) -> Result<Vector3f, ConfigError> {
    if let Some(raw) = step.attr("value") {
        return parse_vec3(raw).map_err(|reason| ConfigError::invalid(key, raw, reason));
    }
    let mut v = Vector3f::new(default, default, default);
    for (i, axis) in ["x", "y", "z"].iter().enumerate() {
        if let Some(raw) = step.attr(axis) {
            v[i] = raw.trim().parse().map_err(|_| ConfigError::invalid(key, raw, "expected a number"))?;
        }
    }
    Ok(v)
}

/// Steps apply in document order.
fn parse_transform(element: &Element, key: &str) -> Result<Transform, ConfigError> {
    let mut to_world = Transform::default();
    for step in &element.children {
        let local = match step.tag.as_str() {
            "translate" => Transform::translate(&step_vector(step, key, 0.0)?),
            "scale" => Transform::scale(&step_vector(step, key, 1.0)?),
            other => return Err(ConfigError::unknown(key, other)),
        };
        to_world = local.compose(&to_world);
    }
    Ok(to_world)
}

fn parse_lookat(element: &Element) -> Result<(Vector3f, Vector3f, Vector3f), ConfigError> {
    let lookat = element.child("lookat").ok_or_else(|| ConfigError::missing("sensor.lookat"))?;
    let point = |name: &str, default: Option<Vector3f>| -> Result<Vector3f, ConfigError> {
        let key = format!("sensor.lookat.{}", name);
        match lookat.attr(name) {
            Some(raw) => parse_vec3(raw).map_err(|reason| ConfigError::invalid(&key, raw, reason)),
            None => default.ok_or_else(|| ConfigError::missing(&key)),
        }
    };
    Ok((point("origin", None)?, point("target", None)?, point("up", Some(Vector3f::new(0.0, 1.0, 0.0)))?))
}

fn parse_path_config(element: Option<&Element>) -> Result<PathTracerConfig, ConfigError> {
    let mut config = PathTracerConfig::default();
    let element = match element {
        Some(element) => element,
        None => return Ok(config),
    };
    let kind = element.type_name()?;
    if kind != "path" {
        return Err(ConfigError::unknown("integrator.type", kind));
    }

    let props = Properties::from_element("integrator", element);
    if let Some(max_depth) = props.get::<usize>("max_depth")? {
        config.max_edges = max_depth;
    }
    if let Some(types) = props.get_string("strategies") {
        config.path_types = PathType::parse(&props.key("strategies"), types)?;
    }
    let beta: Float = props.get_or("mis_beta", 2.0)?;
    let mis = props.get_string("mis").unwrap_or("power");
    config.mis = MisMethod::parse(&props.key("mis"), mis, beta)?;
    if let Some(metric) = props.get_string("rr_metric") {
        config.roulette_metric = RouletteMetric::parse(&props.key("rr_metric"), metric)?;
    }

    let method = props.get_string("rr_method").unwrap_or("proportional");
    config.roulette = if method == "none" {
        RussianRouletteState::disabled()
    } else {
        let parameter: Float = match method {
            "fixed" => props.get_or("rr_probability", 0.8)?,
            _ => props.get_or("rr_delta", 1.0)?,
        };
        let method = RussianRouletteMethod::parse(&props.key("rr_method"), method, parameter)?;
        RussianRouletteState::new(props.get_or("rr_start", 3)?, method, props.get_or("rr_max_probability", 0.95)?)?
    };

    config.debug_level = props.get_or("debug_level", config.debug_level)?;
    config.debug_max = props.get_or("debug_max", config.debug_max)?;
    Ok(config)
}

fn parse_sampler(element: Option<&Element>) -> Result<(Box<dyn Sampler>, usize), ConfigError> {
    let element = match element {
        Some(element) => element,
        None => return Ok((Box::new(IndependentSampler::new(None)), 16)),
    };
    let props = Properties::from_element("sampler", element);
    let sample_count: usize = props.get_or("sample_count", 16)?;
    if sample_count == 0 {
        return Err(ConfigError::invalid(&props.key("sample_count"), "0", "must be positive"));
    }

    let id = element.attr("id").map(str::to_string);
    let sampler: Box<dyn Sampler> = match element.type_name()? {
        "independent" => Box::new(IndependentSampler::new(id)),
        "stratified" => Box::new(StratifiedSampler::new(props.get_or("jitter", true)?, id)),
        other => return Err(ConfigError::unknown("sampler.type", other)),
    };
    Ok((sampler, sample_count))
}

fn parse_render_options(element: Option<&Element>, sample_count: usize) -> Result<(RenderOptions, Accelerator), ConfigError> {
    let mut options = RenderOptions { sample_count, ..RenderOptions::default() };
    let element = match element {
        Some(element) => element,
        None => return Ok((options, Accelerator::default())),
    };
    let props = Properties::from_element("renderer", element);

    let positive = |name: &str| -> Result<Option<usize>, ConfigError> {
        match props.get::<usize>(name)? {
            Some(0) => Err(ConfigError::invalid(&props.key(name), "0", "must be positive")),
            other => Ok(other),
        }
    };
    if let Some(size) = positive("block_size")? {
        options.block_width = size;
        options.block_height = size;
    }
    if let Some(samples) = positive("block_samples")? {
        options.block_samples = samples;
    }
    if let Some(jobs) = positive("jobs")? {
        options.jobs = jobs;
    }
    options.emit_every = positive("emit_every")?;
    options.seed = props.get_or("seed", options.seed)?;

    let accelerator = match props.get_string("accelerator") {
        Some(name) => Accelerator::parse(&props.key("accelerator"), name)?,
        None => Accelerator::default(),
    };
    Ok((options, accelerator))
}

struct SceneBuilder<'a> {
    base_dir: &'a Path,
    bsdfs: HashMap<String, Arc<dyn BSDF>>,
    sensor_ids: HashMap<String, usize>,
    primitives: Vec<Primitive>,
    emitters: Vec<Arc<dyn Emitter>>,
    sensors: Vec<Box<dyn Sensor>>,
}

impl<'a> SceneBuilder<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            bsdfs: HashMap::new(),
            sensor_ids: HashMap::new(),
            primitives: Vec::new(),
            emitters: Vec::new(),
            sensors: Vec::new(),
        }
    }

    fn add_sensor(&mut self, element: &Element) -> Result<(), SceneLoadError> {
        let id = element.attr("id").map(str::to_string);
        let props = Properties::from_element("sensor", element);
        let sensor: Box<dyn Sensor> = match element.type_name()? {
            "perspective" => {
                let transform = element.child("transform").ok_or_else(|| ConfigError::missing("sensor.to_world"))?;
                let (origin, target, up) = parse_lookat(transform)?;
                let film = element.child("film").ok_or_else(|| ConfigError::missing("sensor.film"))?;
                let film_props = Properties::from_element("film", film);
                let width: usize = film_props.require("width")?;
                let height: usize = film_props.require("height")?;
                if width == 0 || height == 0 {
                    return Err(ConfigError::invalid("film.width", &format!("{}x{}", width, height), "empty film").into());
                }
                let fov: Float = props.require("fov")?;
                if !(fov > 0.0 && fov < 180.0) {
                    return Err(ConfigError::invalid(&props.key("fov"), &fov.to_string(), "must lie in (0, 180)").into());
                }
                Box::new(PerspectiveCamera::new(origin,
                                                target,
                                                up,
                                                fov.to_radians(),
                                                width,
                                                height,
                                                props.get_or("near_clip", 1e-2)?,
                                                props.get_or("far_clip", 1e4)?,
                                                id.clone()))
            }
            "radiancemeter" => Box::new(RadianceMeter::new(props.require_vec3("origin")?,
                                                           props.require_vec3("target")?,
                                                           id.clone())),
            "irradiancemeter" => Box::new(IrradianceMeter::new(props.require_vec3("origin")?,
                                                               props.require_vec3("normal")?,
                                                               id.clone())),
            other => return Err(ConfigError::unknown("sensor.type", other).into()),
        };

        log::debug!("Sensor #{}: {}", self.sensors.len(), sensor.to_string());
        if let Some(id) = id {
            self.sensor_ids.insert(id, self.sensors.len());
        }
        self.sensors.push(sensor);
        Ok(())
    }

    fn build_bsdf(element: &Element) -> Result<Arc<dyn BSDF>, ConfigError> {
        let props = Properties::from_element("bsdf", element);
        match element.type_name()? {
            "diffuse" => {
                let reflectance = props.get_spectrum("reflectance")?.unwrap_or(RGBSpectrum::from_value(0.5));
                Ok(Arc::new(LambertianDiffuseBSDF::new(reflectance, element.attr("id").map(str::to_string))))
            }
            other => Err(ConfigError::unknown("bsdf.type", other)),
        }
    }

    fn add_bsdf(&mut self, element: &Element) -> Result<(), SceneLoadError> {
        let id = element.attr("id").ok_or_else(|| ConfigError::missing("bsdf.id"))?;
        let bsdf = Self::build_bsdf(element)?;
        self.bsdfs.insert(id.to_string(), bsdf);
        Ok(())
    }

    fn resolve_path(&self, filename: &str) -> PathBuf {
        let path = Path::new(filename);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn add_shape(&mut self, element: &Element) -> Result<(), SceneLoadError> {
        let props = Properties::from_element("shape", element);
        let to_world = match element.child("transform") {
            Some(transform) => parse_transform(transform, "shape.to_world")?,
            None => Transform::default(),
        };
        let id = element.attr("id").map(str::to_string);

        let shapes: Vec<Arc<dyn Shape>> = match element.type_name()? {
            "sphere" => {
                let center = to_world.apply_point(props.get_vec3("center")?.unwrap_or_else(Vector3f::zeros));
                let radius: Float = props.get_or("radius", 1.0)?;
                if !(radius > 0.0 && radius.is_finite()) {
                    return Err(ConfigError::invalid(&props.key("radius"), &radius.to_string(), "must be positive").into());
                }
                let mut sphere = Sphere::new(center, radius);
                if let Some(id) = id.clone() {
                    sphere = sphere.with_id(id);
                }
                vec![Arc::new(sphere) as Arc<dyn Shape>]
            }
            "rectangle" => {
                let mut rectangle = Rectangle::new(to_world);
                if let Some(id) = id.clone() {
                    rectangle = rectangle.with_id(id);
                }
                vec![Arc::new(rectangle) as Arc<dyn Shape>]
            }
            "obj" => {
                let filename: String = props.require("filename")?;
                let path = self.resolve_path(&filename);
                load_obj_triangles(&path, &to_world)
                    .map_err(|source| SceneLoadError::Obj { path: path.display().to_string(), source })?
                    .into_iter()
                    .map(|t| Arc::new(t) as Arc<dyn Shape>)
                    .collect()
            }
            other => return Err(ConfigError::unknown("shape.type", other).into()),
        };
        if shapes.is_empty() {
            log::warn!("Shape {} has no geometry.", id.as_deref().unwrap_or("<anonymous>"));
            return Ok(());
        }

        let mut material: Option<Arc<dyn BSDF>> = match element.child("bsdf") {
            Some(inline) => Some(Self::build_bsdf(inline)?),
            None => None,
        };
        let mut sensor = None;
        for reference in element.children_named("ref") {
            let target = reference.attr("id").ok_or_else(|| ConfigError::missing("shape.ref.id"))?;
            match reference.attr("name").unwrap_or("bsdf") {
                "bsdf" => {
                    let bsdf = self.bsdfs.get(target)
                        .ok_or_else(|| ConfigError::invalid("shape.bsdf", target, "no bsdf with this id"))?;
                    material = Some(bsdf.clone());
                }
                "sensor" => {
                    let index = self.sensor_ids.get(target)
                        .ok_or_else(|| ConfigError::invalid("shape.sensor", target, "no sensor with this id"))?;
                    sensor = Some(*index);
                }
                other => return Err(ConfigError::unknown("shape.ref.name", other).into()),
            }
        }
        let material = material.unwrap_or_else(|| {
            Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::from_value(0.5), None)) as Arc<dyn BSDF>
        });

        let mut emitter = None;
        if let Some(light) = element.child("emitter") {
            match light.type_name()? {
                "area" => {
                    let light_props = Properties::from_element("emitter", light);
                    let radiance = light_props.get_spectrum("radiance")?
                        .ok_or_else(|| ConfigError::missing("emitter.radiance"))?;
                    let area = AreaEmitter::new(shapes.clone(), radiance, light.attr("id").map(str::to_string));
                    emitter = Some(self.emitters.len());
                    self.emitters.push(Arc::new(area));
                }
                other => return Err(ConfigError::unknown("emitter.type", other).into()),
            }
        }

        for shape in shapes {
            let mut primitive = Primitive::new(shape, material.clone());
            if let Some(index) = emitter {
                primitive = primitive.with_emitter(index);
            }
            if let Some(index) = sensor {
                primitive = primitive.with_sensor(index);
            }
            self.primitives.push(primitive);
        }
        Ok(())
    }
}
