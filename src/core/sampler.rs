// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::rng::LcgRng;
use crate::math::constants::{Float, Vector2f};

/// Declares the random streams one path needs per pixel sample: a list of
/// 1D slots and a list of 2D slots, each with the number of values it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleConfig {
    sizes_1d: Vec<usize>,
    sizes_2d: Vec<usize>,
}

/// Slot indices at which an appended config starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotBase {
    pub base_1d: usize,
    pub base_2d: usize,
}

impl SampleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_1d(&mut self, len: usize) -> usize {
        self.sizes_1d.push(len);
        self.sizes_1d.len() - 1
    }

    pub fn add_2d(&mut self, len: usize) -> usize {
        self.sizes_2d.push(len);
        self.sizes_2d.len() - 1
    }

    pub fn append(&mut self, other: &SampleConfig) -> SlotBase {
        let base = SlotBase { base_1d: self.sizes_1d.len(), base_2d: self.sizes_2d.len() };
        self.sizes_1d.extend_from_slice(&other.sizes_1d);
        self.sizes_2d.extend_from_slice(&other.sizes_2d);
        base
    }

    /// Slot-wise maximum of two configs, for consumers of which only one is
    /// used per sample (e.g. the lights of a scene). Slots present in only
    /// one input keep that input's length.
    pub fn union_max(a: &SampleConfig, b: &SampleConfig) -> SampleConfig {
        fn merge(x: &[usize], y: &[usize]) -> Vec<usize> {
            (0..x.len().max(y.len()))
                .map(|i| x.get(i).copied().unwrap_or(0).max(y.get(i).copied().unwrap_or(0)))
                .collect()
        }

        SampleConfig { sizes_1d: merge(&a.sizes_1d, &b.sizes_1d), sizes_2d: merge(&a.sizes_2d, &b.sizes_2d) }
    }

    pub fn sizes_1d(&self) -> &[usize] {
        &self.sizes_1d
    }

    pub fn sizes_2d(&self) -> &[usize] {
        &self.sizes_2d
    }

    /// True when `other` starts with exactly this config's slots.
    pub fn is_prefix_of(&self, other: &SampleConfig) -> bool {
        other.sizes_1d.starts_with(&self.sizes_1d) && other.sizes_2d.starts_with(&self.sizes_2d)
    }

    pub fn values_per_bundle(&self) -> usize {
        self.sizes_1d.iter().sum::<usize>() + 2 * self.sizes_2d.iter().sum::<usize>()
    }
}

/// One arena holding `capacity` bundles back to back. Allocated once per
/// worker and refilled for every pixel.
#[derive(Debug, Clone)]
pub struct SampleStorage {
    config: SampleConfig,
    offsets_1d: Vec<usize>,
    offsets_2d: Vec<usize>,
    stride: usize,
    capacity: usize,
    len: usize,
    data: Vec<Float>,
}

impl SampleStorage {
    pub fn new(config: &SampleConfig, capacity: usize) -> Self {
        let mut offsets_1d = Vec::with_capacity(config.sizes_1d.len());
        let mut offsets_2d = Vec::with_capacity(config.sizes_2d.len());
        let mut offset = 0;
        for size in &config.sizes_1d {
            offsets_1d.push(offset);
            offset += size;
        }
        for size in &config.sizes_2d {
            offsets_2d.push(offset);
            offset += 2 * size;
        }

        Self {
            config: config.clone(),
            offsets_1d,
            offsets_2d,
            stride: offset,
            capacity,
            len: 0,
            data: vec![0.0; offset * capacity],
        }
    }

    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Marks the first `count` bundles as live before a refill.
    pub fn prepare(&mut self, config: &SampleConfig, count: usize) {
        assert_eq!(&self.config, config, "sample storage was allocated for another config");
        assert!(count <= self.capacity, "{} bundles requested from storage of {}", count, self.capacity);
        self.len = count;
    }

    pub fn bundle(&self, index: usize) -> SampleBundle<'_> {
        debug_assert!(index < self.len);
        SampleBundle { storage: self, base: index * self.stride }
    }

    pub fn set_1d(&mut self, bundle: usize, slot: usize, i: usize, value: Float) {
        let idx = bundle * self.stride + self.offsets_1d[slot] + i;
        self.data[idx] = value;
    }

    pub fn set_2d(&mut self, bundle: usize, slot: usize, i: usize, value: Vector2f) {
        let idx = bundle * self.stride + self.offsets_2d[slot] + 2 * i;
        self.data[idx] = value.x;
        self.data[idx + 1] = value.y;
    }
}

/// Read-only view of one pixel sample's random values.
#[derive(Clone, Copy)]
pub struct SampleBundle<'a> {
    storage: &'a SampleStorage,
    base: usize,
}

impl<'a> SampleBundle<'a> {
    pub fn get_1d(&self, slot: usize, i: usize) -> Float {
        debug_assert!(i < self.storage.config.sizes_1d[slot]);
        self.storage.data[self.base + self.storage.offsets_1d[slot] + i]
    }

    pub fn get_2d(&self, slot: usize, i: usize) -> Vector2f {
        debug_assert!(i < self.storage.config.sizes_2d[slot]);
        let idx = self.base + self.storage.offsets_2d[slot] + 2 * i;
        Vector2f::new(self.storage.data[idx], self.storage.data[idx + 1])
    }

    pub fn config(&self) -> &SampleConfig {
        &self.storage.config
    }
}

pub trait Sampler: ComputationNode + Send + Sync {
    fn allocate_sample_storage(&self, config: &SampleConfig, max_count: usize) -> SampleStorage {
        SampleStorage::new(config, max_count)
    }

    /// Fills the first `count` bundles of `storage`, which then hold the
    /// samples of one pixel.
    fn generate_sample_bundles(&self,
                               config: &SampleConfig,
                               storage: &mut SampleStorage,
                               count: usize,
                               rng: &mut LcgRng);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_max_is_symmetric() {
        let mut a = SampleConfig::new();
        a.add_1d(1);
        a.add_1d(4);
        a.add_2d(2);

        let mut b = SampleConfig::new();
        b.add_1d(3);
        b.add_2d(1);
        b.add_2d(5);

        let ab = SampleConfig::union_max(&a, &b);
        let ba = SampleConfig::union_max(&b, &a);
        assert_eq!(ab, ba);
        assert_eq!(ab.sizes_1d(), &[3, 4]);
        assert_eq!(ab.sizes_2d(), &[2, 5]);
    }

    #[test]
    fn test_append_reports_slot_base() {
        let mut sensor = SampleConfig::new();
        sensor.add_2d(1);
        let mut light = SampleConfig::new();
        light.add_1d(1);
        light.add_2d(1);

        let base = sensor.append(&light);
        assert_eq!(base, SlotBase { base_1d: 0, base_2d: 1 });
        assert_eq!(sensor.values_per_bundle(), 1 + 2 * 2);
    }

    #[test]
    fn test_prefix_compares_leading_slots() {
        let mut sensor = SampleConfig::new();
        sensor.add_2d(1);
        let mut full = sensor.clone();
        full.add_1d(1);
        full.add_2d(4);

        assert!(sensor.is_prefix_of(&full));
        assert!(SampleConfig::new().is_prefix_of(&full));
        assert!(!full.is_prefix_of(&sensor));

        let mut wider = SampleConfig::new();
        wider.add_2d(2);
        assert!(!wider.is_prefix_of(&full));
    }

    #[test]
    fn test_storage_layout_keeps_bundles_apart() {
        let mut config = SampleConfig::new();
        let s1 = config.add_1d(2);
        let s2 = config.add_2d(1);

        let mut storage = SampleStorage::new(&config, 3);
        storage.prepare(&config, 2);
        storage.set_1d(0, s1, 1, 0.25);
        storage.set_2d(1, s2, 0, Vector2f::new(0.5, 0.75));
        storage.set_1d(1, s1, 0, 0.125);

        assert_eq!(storage.bundle(0).get_1d(s1, 1), 0.25);
        assert_eq!(storage.bundle(0).get_2d(s2, 0), Vector2f::new(0.0, 0.0));
        assert_eq!(storage.bundle(1).get_2d(s2, 0), Vector2f::new(0.5, 0.75));
        assert_eq!(storage.bundle(1).get_1d(s1, 0), 0.125);
    }

    #[test]
    #[should_panic]
    fn test_storage_rejects_oversized_request() {
        let mut config = SampleConfig::new();
        config.add_1d(1);
        let mut storage = SampleStorage::new(&config, 2);
        storage.prepare(&config, 3);
    }
}
