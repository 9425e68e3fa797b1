// Copyright @yucwang 2026

use crate::core::interaction::SurfaceIntersection;
use crate::core::primitive::{collect_sensors, Intersect, Primitive};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

const MAX_VOXELS_PER_AXIS: usize = 64;
const VOXELS_PER_CUBE_ROOT: Float = 3.0;

/// Uniform voxel grid over a primitive set, queried by 3D DDA. Read-only
/// after construction.
pub struct GridAggregate {
    primitives: Vec<Primitive>,
    bounds: AABB,
    resolution: [usize; 3],
    voxel_size: Vector3f,
    inv_voxel_size: Vector3f,
    voxels: Vec<Vec<u32>>,
    sensors: Vec<usize>,
}

impl GridAggregate {
    pub fn new(primitives: Vec<Primitive>) -> Self {
        let sensors = collect_sensors(&primitives);
        let bounds = primitives
            .iter()
            .fold(AABB::default(), |acc, p| acc.union(&p.bounding_box()));

        if primitives.is_empty() || !bounds.is_valid() {
            return Self {
                primitives,
                bounds: AABB::default(),
                resolution: [1, 1, 1],
                voxel_size: Vector3f::zeros(),
                inv_voxel_size: Vector3f::zeros(),
                voxels: vec![Vec::new()],
                sensors,
            };
        }

        // Padding keeps flat scenes from producing zero-sized voxels.
        let diagonal = bounds.diagonal();
        let pad = (diagonal.max() * 1e-4).max(bounds.p_min.amax().max(bounds.p_max.amax()) * 1e-6).max(1e-6);
        let bounds = bounds.dilate(pad);
        let diagonal = bounds.diagonal();

        let max_extent = diagonal[bounds.max_extent()];
        let voxels_per_unit = VOXELS_PER_CUBE_ROOT * (primitives.len() as Float).cbrt() / max_extent;
        let mut resolution = [1usize; 3];
        for axis in 0..3 {
            let count = (diagonal[axis] * voxels_per_unit).round();
            resolution[axis] = (count as usize).clamp(1, MAX_VOXELS_PER_AXIS);
        }

        let voxel_size = Vector3f::new(diagonal.x / resolution[0] as Float,
                                       diagonal.y / resolution[1] as Float,
                                       diagonal.z / resolution[2] as Float);
        let inv_voxel_size = voxel_size.map(|s| 1.0 / s);

        let mut grid = Self {
            primitives: Vec::new(),
            bounds,
            resolution,
            voxel_size,
            inv_voxel_size,
            voxels: vec![Vec::new(); resolution[0] * resolution[1] * resolution[2]],
            sensors,
        };
        grid.insert_all(&primitives);
        grid.primitives = primitives;

        log::debug!("Grid built over {} primitives: {}x{}x{} voxels, {} references.",
                    grid.primitives.len(), resolution[0], resolution[1], resolution[2],
                    grid.voxels.iter().map(|v| v.len()).sum::<usize>());
        grid
    }

    pub fn resolution(&self) -> [usize; 3] {
        self.resolution
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    fn insert_all(&mut self, primitives: &[Primitive]) {
        // Voxel bounds are grown a little so hits on voxel faces are never
        // lost to rounding.
        let tolerance = 1e-3 * self.voxel_size.max();

        for (index, primitive) in primitives.iter().enumerate() {
            let bbox = primitive.bounding_box();
            let lo = self.voxel_of(&bbox.p_min);
            let hi = self.voxel_of(&bbox.p_max);

            for z in lo[2]..=hi[2] {
                for y in lo[1]..=hi[1] {
                    for x in lo[0]..=hi[0] {
                        let voxel_bounds = self.voxel_bounds([x, y, z]).dilate(tolerance);
                        if primitive.shape().overlaps_box(&voxel_bounds) {
                            let offset = self.offset([x, y, z]);
                            self.voxels[offset].push(index as u32);
                        }
                    }
                }
            }
        }
    }

    fn pos_to_voxel(&self, p: Float, axis: usize) -> usize {
        let v = ((p - self.bounds.p_min[axis]) * self.inv_voxel_size[axis]).floor();
        if v <= 0.0 || v.is_nan() {
            0
        } else {
            (v as usize).min(self.resolution[axis] - 1)
        }
    }

    fn voxel_of(&self, p: &Vector3f) -> [usize; 3] {
        [self.pos_to_voxel(p.x, 0), self.pos_to_voxel(p.y, 1), self.pos_to_voxel(p.z, 2)]
    }

    fn voxel_to_pos(&self, voxel: i64, axis: usize) -> Float {
        self.bounds.p_min[axis] + voxel as Float * self.voxel_size[axis]
    }

    fn voxel_bounds(&self, voxel: [usize; 3]) -> AABB {
        let lo = Vector3f::new(self.voxel_to_pos(voxel[0] as i64, 0),
                               self.voxel_to_pos(voxel[1] as i64, 1),
                               self.voxel_to_pos(voxel[2] as i64, 2));
        AABB::new(lo, lo + self.voxel_size)
    }

    fn offset(&self, voxel: [usize; 3]) -> usize {
        voxel[0] + self.resolution[0] * (voxel[1] + self.resolution[1] * voxel[2])
    }

    /// Sets up the DDA walk for `ray`, or `None` when the ray misses the
    /// grid bounds inside its interval.
    fn walk(&self, ray: &Ray3f) -> Option<VoxelWalk> {
        if self.primitives.is_empty() {
            return None;
        }
        // An origin inside the bounds enters at the ray's own min_t.
        let (t_enter, _) = self.bounds.ray_intersect_range(ray)?;
        let entry = ray.at(t_enter);
        let dir = ray.dir();

        let mut walk = VoxelWalk {
            voxel: [0; 3],
            step: [0; 3],
            out: [0; 3],
            next_crossing: [Float::INFINITY; 3],
            delta: [Float::INFINITY; 3],
        };

        for axis in 0..3 {
            let voxel = self.pos_to_voxel(entry[axis], axis) as i64;
            walk.voxel[axis] = voxel;
            // A ray parallel to the axis never crosses its boundaries.
            if dir[axis] == 0.0 {
                walk.step[axis] = 0;
                walk.out[axis] = -1;
            } else if dir[axis] > 0.0 {
                let boundary = self.voxel_to_pos(voxel + 1, axis);
                // Tiny components overflow to +inf rather than failing.
                walk.next_crossing[axis] = finite_or_inf(t_enter + (boundary - entry[axis]) / dir[axis]).max(t_enter);
                walk.delta[axis] = self.voxel_size[axis] / dir[axis];
                walk.step[axis] = 1;
                walk.out[axis] = self.resolution[axis] as i64;
            } else {
                let boundary = self.voxel_to_pos(voxel, axis);
                walk.next_crossing[axis] = finite_or_inf(t_enter + (boundary - entry[axis]) / dir[axis]).max(t_enter);
                walk.delta[axis] = -self.voxel_size[axis] / dir[axis];
                walk.step[axis] = -1;
                walk.out[axis] = -1;
            }
        }

        Some(walk)
    }

    fn cell(&self, walk: &VoxelWalk) -> &[u32] {
        let voxel = [walk.voxel[0] as usize, walk.voxel[1] as usize, walk.voxel[2] as usize];
        &self.voxels[self.offset(voxel)]
    }
}

fn finite_or_inf(t: Float) -> Float {
    if t.is_nan() {
        Float::INFINITY
    } else {
        t
    }
}

struct VoxelWalk {
    voxel: [i64; 3],
    step: [i64; 3],
    out: [i64; 3],
    next_crossing: [Float; 3],
    delta: [Float; 3],
}

impl VoxelWalk {
    /// Moves to the neighbouring voxel along the nearest boundary. Returns
    /// false once that boundary lies beyond `max_t` or the walk leaves the
    /// grid.
    fn advance(&mut self, max_t: Float) -> bool {
        let mut axis = 0;
        if self.next_crossing[1] < self.next_crossing[axis] {
            axis = 1;
        }
        if self.next_crossing[2] < self.next_crossing[axis] {
            axis = 2;
        }

        if max_t < self.next_crossing[axis] || self.next_crossing[axis] == Float::INFINITY {
            return false;
        }
        self.voxel[axis] += self.step[axis];
        if self.voxel[axis] == self.out[axis] {
            return false;
        }
        self.next_crossing[axis] += self.delta[axis];
        true
    }
}

impl Intersect for GridAggregate {
    fn ray_intersection<'a>(&'a self, ray: &mut Ray3f) -> Option<SurfaceIntersection<'a>> {
        let mut walk = self.walk(ray)?;
        let mut closest = None;
        loop {
            for index in self.cell(&walk) {
                if let Some(its) = self.primitives[*index as usize].ray_intersection(ray) {
                    closest = Some(its);
                }
            }
            if !walk.advance(ray.max_t) {
                break;
            }
        }
        closest
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        let mut walk = match self.walk(ray) {
            Some(walk) => walk,
            None => return false,
        };
        loop {
            if self.cell(&walk).iter().any(|index| self.primitives[*index as usize].ray_intersection_t(ray)) {
                return true;
            }
            if !walk.advance(ray.max_t) {
                return false;
            }
        }
    }

    fn bounding_box(&self) -> AABB {
        self.bounds
    }

    fn sensors(&self) -> Vec<usize> {
        self.sensors.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bsdf::BSDF;
    use crate::core::primitive::PrimitiveList;
    use crate::core::rng::LcgRng;
    use crate::core::shape::Shape;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::math::spectrum::RGBSpectrum;
    use crate::shapes::sphere::Sphere;
    use crate::shapes::triangle::Triangle;
    use std::sync::Arc;

    fn random_point(rng: &mut LcgRng, scale: Float) -> Vector3f {
        Vector3f::new(rng.next_f32() - 0.5, rng.next_f32() - 0.5, rng.next_f32() - 0.5) * scale
    }

    fn material(i: usize) -> Arc<dyn BSDF> {
        Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::from_value(0.5), Some(format!("m{}", i))))
    }

    fn random_scene(rng: &mut LcgRng) -> Vec<Primitive> {
        let mut primitives = Vec::new();
        for i in 0..60 {
            let shape: Arc<dyn Shape> = if i % 2 == 0 {
                Arc::new(Sphere::new(random_point(rng, 10.0), 0.1 + 0.6 * rng.next_f32()))
            } else {
                let p0 = random_point(rng, 10.0);
                Arc::new(Triangle::new(p0, p0 + random_point(rng, 3.0), p0 + random_point(rng, 3.0)))
            };
            primitives.push(Primitive::new(shape, material(i)));
        }
        primitives
    }

    fn random_ray(rng: &mut LcgRng) -> Ray3f {
        let origin = random_point(rng, 16.0);
        let mut dir = random_point(rng, 2.0);
        // Some rays run exactly along the axes.
        match rng.next_below(6) {
            0 => { dir.y = 0.0; dir.z = 0.0; }
            1 => { dir.x = 0.0; }
            _ => {}
        }
        if dir.norm() == 0.0 {
            dir = Vector3f::new(0.0, 0.0, 1.0);
        }
        Ray3f::new(origin, dir, None, None)
    }

    #[test]
    fn test_grid_matches_brute_force() {
        let mut rng = LcgRng::new(2024);
        let primitives = random_scene(&mut rng);
        let grid = GridAggregate::new(primitives.clone());
        let list = PrimitiveList::new(primitives);

        let mut hits = 0;
        for _ in 0..4000 {
            let ray = random_ray(&mut rng);

            let mut ray_grid = ray;
            let mut ray_list = ray;
            let a = grid.ray_intersection(&mut ray_grid);
            let b = list.ray_intersection(&mut ray_list);
            match (a, b) {
                (Some(a), Some(b)) => {
                    hits += 1;
                    assert_eq!(a.t(), b.t());
                    assert_eq!(a.p(), b.p());
                    assert_eq!(a.normal(), b.normal());
                    assert_eq!(a.material().id(), b.material().id());
                    assert_eq!(ray_grid.max_t, ray_list.max_t);
                }
                (None, None) => {}
                (a, b) => panic!("grid hit {} but brute force hit {}", a.is_some(), b.is_some()),
            }
            assert_eq!(grid.ray_intersection_t(&ray), list.ray_intersection_t(&ray));
        }
        assert!(hits > 100);
    }

    #[test]
    fn test_resolution_is_clamped() {
        let mut primitives = Vec::new();
        // A long thin row of spheres.
        for i in 0..1000 {
            let sphere = Sphere::new(Vector3f::new(i as Float, 0.0, 0.0), 0.01);
            primitives.push(Primitive::new(Arc::new(sphere), material(i)));
        }
        let grid = GridAggregate::new(primitives);
        let res = grid.resolution();
        assert_eq!(res[0], 30);
        assert_eq!(res[1], 1);
        assert_eq!(res[2], 1);

        let one = GridAggregate::new(vec![Primitive::new(Arc::new(Sphere::new(Vector3f::zeros(), 1.0)), material(0))]);
        assert_eq!(one.resolution(), [3, 3, 3]);
    }

    #[test]
    fn test_sphere_skips_corner_voxels() {
        // 64 copies give a 12x12x12 grid over one unit sphere.
        let spheres: Vec<Primitive> = (0..64)
            .map(|i| Primitive::new(Arc::new(Sphere::new(Vector3f::zeros(), 1.0)), material(i)))
            .collect();
        let grid = GridAggregate::new(spheres);
        assert_eq!(grid.resolution(), [12, 12, 12]);

        assert!(grid.voxels[grid.offset([0, 0, 0])].is_empty());
        assert!(grid.voxels[grid.offset([11, 0, 11])].is_empty());
        assert_eq!(grid.voxels[grid.offset([6, 6, 6])].len(), 64);
        let occupied = grid.voxels.iter().filter(|v| !v.is_empty()).count();
        assert!(occupied < 12 * 12 * 12);
    }

    #[test]
    fn test_dense_scene_caps_resolution() {
        let mut primitives = Vec::new();
        for i in 0..22 * 22 * 22 {
            let c = Vector3f::new((i % 22) as Float, ((i / 22) % 22) as Float, (i / 484) as Float);
            primitives.push(Primitive::new(Arc::new(Sphere::new(c, 0.1)), material(i)));
        }
        let grid = GridAggregate::new(primitives);
        assert_eq!(grid.resolution(), [64, 64, 64]);
    }

    #[test]
    fn test_axis_aligned_ray_and_inside_origin() {
        let spheres: Vec<Primitive> = (0..8)
            .map(|i| Primitive::new(Arc::new(Sphere::new(Vector3f::new(2.0 * i as Float, 0.0, 0.0), 0.5)), material(i)))
            .collect();
        let grid = GridAggregate::new(spheres);

        let mut ray = Ray3f::new(Vector3f::new(3.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let its = grid.ray_intersection(&mut ray).unwrap();
        assert!((its.t() - 0.5).abs() < 1e-5);
        assert_eq!(its.material().id(), "m2");
        assert_eq!(ray.max_t, its.t());

        let mut back = Ray3f::new(Vector3f::new(3.0, 0.0, 0.0), Vector3f::new(-1.0, 0.0, 0.0), None, None);
        let its = grid.ray_intersection(&mut back).unwrap();
        assert_eq!(its.material().id(), "m1");

        let mut miss = Ray3f::new(Vector3f::new(3.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0), None, None);
        assert!(grid.ray_intersection(&mut miss).is_none());

        let short = Ray3f::new(Vector3f::new(3.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), None, Some(0.4));
        assert!(!grid.ray_intersection_t(&short));
    }

    #[test]
    fn test_empty_grid_never_hits() {
        let grid = GridAggregate::new(Vec::new());
        let mut ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), None, None);
        assert!(grid.ray_intersection(&mut ray).is_none());
        assert!(!grid.ray_intersection_t(&ray));
        assert!(grid.sensors().is_empty());
    }
}
