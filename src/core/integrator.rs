// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::core::sampler::{SampleBundle, SampleConfig};
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::spectrum::RGBSpectrum;

/// A Monte Carlo estimator of the signal measured by one sensor.
pub trait Integrator: Send + Sync {
    /// Random streams every bundle passed to `sample_sensor_path` holds.
    fn sample_config(&self) -> &SampleConfig;

    /// Leading slots of `sample_config` laid out for the sensor the
    /// integrator was built for.
    fn sensor_config(&self) -> &SampleConfig;

    /// One sample of the measurement at pixel `(x, y)`.
    fn sample_sensor_path(&self,
                          scene: &Scene,
                          sensor: &dyn Sensor,
                          x: usize,
                          y: usize,
                          bundle: &SampleBundle,
                          rng: &mut LcgRng) -> RGBSpectrum;

    /// Number of contributions discarded as numerically invalid so far.
    fn invalid_contributions(&self) -> usize {
        0
    }
}
