// Copyright @yucwang 2021

use crate::core::error::RenderError;
use crate::core::scene::Scene;
use crate::core::sensor::{SensorSignal, SignalDestination};

pub trait Renderer {
    /// Estimates the signal of sensor `sensor_index`. Snapshots go to
    /// `destination` when one is given.
    fn render(&self,
              scene: &Scene,
              sensor_index: usize,
              destination: Option<&mut dyn SignalDestination>) -> Result<SensorSignal, RenderError>;
}
