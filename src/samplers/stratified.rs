// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::rng::LcgRng;
use crate::core::sampler::{SampleConfig, SampleStorage, Sampler};
use crate::math::constants::{Float, ONE_MINUS_EPSILON, Vector2f};

/// Latin-hypercube stratification across the bundles of one pixel: for
/// every slot value, each of the `count` strata of every dimension is hit
/// exactly once, in a shuffled order.
pub struct StratifiedSampler {
    id: String,
    jitter: bool,
}

impl StratifiedSampler {
    pub fn new(jitter: bool, id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("StratifiedSampler")), jitter }
    }

    fn strata(&self, count: usize, rng: &mut LcgRng) -> Vec<Float> {
        let inv = 1.0 / count as Float;
        let mut values: Vec<Float> = (0..count)
            .map(|k| {
                let offset = if self.jitter { rng.next_f32() } else { 0.5 };
                ((k as Float + offset) * inv).min(ONE_MINUS_EPSILON)
            })
            .collect();
        shuffle(&mut values, rng);
        values
    }
}

fn shuffle(values: &mut [Float], rng: &mut LcgRng) {
    for i in (1..values.len()).rev() {
        let j = rng.next_below((i + 1) as u32) as usize;
        values.swap(i, j);
    }
}

impl ComputationNode for StratifiedSampler {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("StratifiedSampler [id={}, jitter={}]", self.id, self.jitter)
    }
}

impl Sampler for StratifiedSampler {
    fn generate_sample_bundles(&self,
                               config: &SampleConfig,
                               storage: &mut SampleStorage,
                               count: usize,
                               rng: &mut LcgRng) {
        storage.prepare(config, count);
        if count == 0 {
            return;
        }

        for (slot, len) in config.sizes_1d().iter().enumerate() {
            for i in 0..*len {
                let xs = self.strata(count, rng);
                for (bundle, x) in xs.into_iter().enumerate() {
                    storage.set_1d(bundle, slot, i, x);
                }
            }
        }
        for (slot, len) in config.sizes_2d().iter().enumerate() {
            for i in 0..*len {
                let xs = self.strata(count, rng);
                let ys = self.strata(count, rng);
                for bundle in 0..count {
                    storage.set_2d(bundle, slot, i, Vector2f::new(xs[bundle], ys[bundle]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_stratum_hit_once() {
        let mut config = SampleConfig::new();
        config.add_1d(1);
        config.add_2d(1);

        let sampler = StratifiedSampler::new(true, None);
        let count = 16;
        let mut storage = sampler.allocate_sample_storage(&config, count);
        let mut rng = LcgRng::new(5);
        sampler.generate_sample_bundles(&config, &mut storage, count, &mut rng);

        let mut hits_1d = vec![0usize; count];
        let mut hits_x = vec![0usize; count];
        let mut hits_y = vec![0usize; count];
        for b in 0..count {
            let bundle = storage.bundle(b);
            hits_1d[(bundle.get_1d(0, 0) * count as Float) as usize] += 1;
            let v = bundle.get_2d(0, 0);
            hits_x[(v.x * count as Float) as usize] += 1;
            hits_y[(v.y * count as Float) as usize] += 1;
        }
        assert!(hits_1d.iter().all(|h| *h == 1));
        assert!(hits_x.iter().all(|h| *h == 1));
        assert!(hits_y.iter().all(|h| *h == 1));
    }

    #[test]
    fn test_fewer_bundles_than_capacity() {
        let mut config = SampleConfig::new();
        config.add_2d(1);
        let sampler = StratifiedSampler::new(false, None);
        let mut storage = sampler.allocate_sample_storage(&config, 8);
        let mut rng = LcgRng::new(9);
        sampler.generate_sample_bundles(&config, &mut storage, 2, &mut rng);
        assert_eq!(storage.len(), 2);
        let v = storage.bundle(1).get_2d(0, 0);
        assert!(v.x == 0.25 || v.x == 0.75);
    }
}
