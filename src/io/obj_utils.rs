// Copyright @yucwang 2023

use std::fs;
use std::path::Path;

use thiserror::Error;
use wavefront_obj::{obj, ParseError};

use crate::core::shape::Shape;
use crate::math::constants::Vector3f;
use crate::math::transform::Transform;
use crate::shapes::triangle::Triangle;

#[derive(Debug, Error)]
pub enum ObjLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(ParseError),
    #[error("face refers to missing vertex #{0}")]
    BadIndex(usize),
}

impl From<ParseError> for ObjLoadError {
    fn from(err: ParseError) -> Self {
        ObjLoadError::Parse(err)
    }
}

pub fn load_obj_from_str<S: AsRef<str>>(input: S) -> Result<obj::ObjSet, ParseError> {
    let triangulated = triangulate_faces(input.as_ref());
    obj::parse(triangulated)
}

pub fn load_obj_from_file<P: AsRef<Path>>(path: P) -> Result<obj::ObjSet, ObjLoadError> {
    let data = fs::read_to_string(path)?;
    let obj_set = load_obj_from_str(data)?;
    Ok(obj_set)
}

/// World-space triangles of every object in the set. Degenerate faces are
/// skipped.
pub fn obj_triangles(obj_set: &obj::ObjSet, to_world: &Transform) -> Result<Vec<Triangle>, ObjLoadError> {
    let mut triangles = Vec::new();
    let mut skipped = 0usize;

    for object in &obj_set.objects {
        let vertices: Vec<Vector3f> = object.vertices
            .iter()
            .map(|v| to_world.apply_point(Vector3f::new(v.x as f32, v.y as f32, v.z as f32)))
            .collect();
        let vertex = |i: usize| vertices.get(i).copied().ok_or(ObjLoadError::BadIndex(i));

        for geom in &object.geometry {
            for shape in &geom.shapes {
                if let obj::Primitive::Triangle(a, b, c) = &shape.primitive {
                    let triangle = Triangle::new(vertex(a.0)?, vertex(b.0)?, vertex(c.0)?);
                    if triangle.surface_area() > 0.0 {
                        triangles.push(triangle);
                    } else {
                        skipped += 1;
                    }
                }
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {} degenerate triangles.", skipped);
    }
    Ok(triangles)
}

pub fn load_obj_triangles<P: AsRef<Path>>(path: P, to_world: &Transform) -> Result<Vec<Triangle>, ObjLoadError> {
    let path = path.as_ref();
    let obj_set = load_obj_from_file(path)?;
    let triangles = obj_triangles(&obj_set, to_world)?;
    log::info!("Loaded {} triangles from {}.", triangles.len(), path.display());
    Ok(triangles)
}

fn triangulate_faces(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for line in input.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("f ") || trimmed.starts_with("f\t") {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() > 4 {
                // Fan around the first corner.
                for i in 2..(parts.len() - 1) {
                    out.push_str(&format!("f {} {} {}\n", parts[1], parts[i], parts[i + 1]));
                }
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
