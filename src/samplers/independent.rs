// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::rng::LcgRng;
use crate::core::sampler::{SampleConfig, SampleStorage, Sampler};

/// Every value is a fresh uniform draw.
pub struct IndependentSampler {
    id: String,
}

impl IndependentSampler {
    pub fn new(id: Option<String>) -> Self {
        Self { id: id.unwrap_or_else(|| generate_node_id("IndependentSampler")) }
    }
}

impl ComputationNode for IndependentSampler {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("IndependentSampler [id={}]", self.id)
    }
}

impl Sampler for IndependentSampler {
    fn generate_sample_bundles(&self,
                               config: &SampleConfig,
                               storage: &mut SampleStorage,
                               count: usize,
                               rng: &mut LcgRng) {
        storage.prepare(config, count);
        for bundle in 0..count {
            for (slot, len) in config.sizes_1d().iter().enumerate() {
                for i in 0..*len {
                    storage.set_1d(bundle, slot, i, rng.next_f32());
                }
            }
            for (slot, len) in config.sizes_2d().iter().enumerate() {
                for i in 0..*len {
                    storage.set_2d(bundle, slot, i, rng.next_vector2f());
                }
            }
        }
    }
}
