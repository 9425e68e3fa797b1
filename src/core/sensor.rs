// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::error::RenderError;
use crate::core::sampler::{SampleBundle, SampleConfig};
use crate::math::bitmap::Bitmap;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Iteration order of `SensorExtent::split`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentOrder {
    /// Spatial blocks outermost, sample slices innermost: every region is
    /// finished before the next one starts.
    Raster,
    /// Sample slices outermost: each pass covers the whole image.
    SampleMajor,
}

/// A pixel rectangle `[x_begin, x_end) x [y_begin, y_end)` together with a
/// slice of per-pixel samples `[sample_begin, sample_begin + sample_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorExtent {
    pub x_begin: usize,
    pub x_end: usize,
    pub y_begin: usize,
    pub y_end: usize,
    pub sample_begin: usize,
    pub sample_count: usize,
}

impl SensorExtent {
    pub fn new(x_begin: usize, x_end: usize, y_begin: usize, y_end: usize, sample_count: usize) -> Self {
        Self { x_begin, x_end, y_begin, y_end, sample_begin: 0, sample_count }
    }

    pub fn width(&self) -> usize {
        self.x_end.saturating_sub(self.x_begin)
    }

    pub fn height(&self) -> usize {
        self.y_end.saturating_sub(self.y_begin)
    }

    pub fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0 || self.sample_count == 0
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x_begin && x < self.x_end && y >= self.y_begin && y < self.y_end
    }

    /// Cuts the extent into sub-extents of at most `block_width` x
    /// `block_height` pixels and `block_samples` samples. The pieces tile
    /// the extent exactly.
    pub fn split(&self,
                 order: ExtentOrder,
                 block_width: usize,
                 block_height: usize,
                 block_samples: usize) -> Vec<SensorExtent> {
        if self.is_empty() {
            return Vec::new();
        }

        let xs = ranges(self.x_begin, self.x_end, block_width.max(1));
        let ys = ranges(self.y_begin, self.y_end, block_height.max(1));
        let ss = ranges(self.sample_begin, self.sample_begin + self.sample_count, block_samples.max(1));

        let make = |(x0, x1): (usize, usize), (y0, y1): (usize, usize), (s0, s1): (usize, usize)| SensorExtent {
            x_begin: x0,
            x_end: x1,
            y_begin: y0,
            y_end: y1,
            sample_begin: s0,
            sample_count: s1 - s0,
        };

        let mut blocks = Vec::with_capacity(xs.len() * ys.len() * ss.len());
        match order {
            ExtentOrder::Raster => {
                for y in &ys {
                    for x in &xs {
                        for s in &ss {
                            blocks.push(make(*x, *y, *s));
                        }
                    }
                }
            }
            ExtentOrder::SampleMajor => {
                for s in &ss {
                    for y in &ys {
                        for x in &xs {
                            blocks.push(make(*x, *y, *s));
                        }
                    }
                }
            }
        }
        blocks
    }
}

fn ranges(begin: usize, end: usize, step: usize) -> Vec<(usize, usize)> {
    (begin..end).step_by(step).map(|b| (b, (b + step).min(end))).collect()
}

/// A light-measuring device.
pub trait Sensor: ComputationNode + Send + Sync {
    /// Pixel resolution `(width, height)`.
    fn resolution(&self) -> (usize, usize);

    fn extent(&self, sample_count: usize) -> SensorExtent {
        let (width, height) = self.resolution();
        SensorExtent::new(0, width, 0, height, sample_count)
    }

    /// Random streams `sample_ray` reads. They occupy the first slots of
    /// every bundle it receives.
    fn sample_config(&self) -> SampleConfig;

    /// A sensor is specular when its importance is a delta distribution,
    /// so that no scene path can ever hit it.
    fn is_specular(&self) -> bool;

    /// Samples a primary ray through pixel `(x, y)` and its weight
    /// `We / pdf`.
    fn sample_ray(&self, x: usize, y: usize, bundle: &SampleBundle) -> Option<(Ray3f, RGBSpectrum)>;
}

/// Per-block running sums filled by one worker.
#[derive(Debug, Clone)]
pub struct SensorBlock {
    extent: SensorExtent,
    sums: Vec<RGBSpectrum>,
    counts: Vec<u32>,
}

impl SensorBlock {
    pub fn new(extent: SensorExtent) -> Self {
        let mut block = Self { extent, sums: Vec::new(), counts: Vec::new() };
        block.reset(extent);
        block
    }

    /// Retargets the block to `extent` and clears it, keeping the
    /// allocation.
    pub fn reset(&mut self, extent: SensorExtent) {
        self.extent = extent;
        self.sums.clear();
        self.sums.resize(extent.pixel_count(), RGBSpectrum::black());
        self.counts.clear();
        self.counts.resize(extent.pixel_count(), 0);
    }

    pub fn extent(&self) -> &SensorExtent {
        &self.extent
    }

    /// Adds one sample at pixel `(x, y)`, given in sensor coordinates.
    pub fn accumulate(&mut self, x: usize, y: usize, value: RGBSpectrum) {
        debug_assert!(self.extent.contains(x, y));
        let idx = (y - self.extent.y_begin) * self.extent.width() + (x - self.extent.x_begin);
        self.sums[idx] += value;
        self.counts[idx] += 1;
    }

    pub fn sample_total(&self) -> u64 {
        self.counts.iter().map(|c| *c as u64).sum()
    }
}

/// Durable per-pixel estimators of one sensor. Only the dispatching thread
/// writes them.
#[derive(Debug, Clone)]
pub struct SensorSignal {
    width: usize,
    height: usize,
    sums: Vec<[f64; 3]>,
    counts: Vec<u64>,
}

impl SensorSignal {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            sums: vec![[0.0; 3]; width * height],
            counts: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Merges a completed block.
    pub fn record(&mut self, block: &SensorBlock) {
        let extent = block.extent;
        let mut idx = 0;
        for y in extent.y_begin..extent.y_end {
            for x in extent.x_begin..extent.x_end {
                let dst = y * self.width + x;
                let value = block.sums[idx];
                for c in 0..3 {
                    self.sums[dst][c] += value[c] as f64;
                }
                self.counts[dst] += block.counts[idx] as u64;
                idx += 1;
            }
        }
    }

    pub fn sample_count(&self, x: usize, y: usize) -> u64 {
        self.counts[y * self.width + x]
    }

    pub fn total_samples(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Mean of the samples recorded at `(x, y)`; black before any.
    pub fn estimate(&self, x: usize, y: usize) -> RGBSpectrum {
        let idx = y * self.width + x;
        let n = self.counts[idx];
        if n == 0 {
            return RGBSpectrum::black();
        }
        let s = self.sums[idx];
        let inv = 1.0 / n as f64;
        RGBSpectrum::new((s[0] * inv) as f32, (s[1] * inv) as f32, (s[2] * inv) as f32)
    }

    pub fn to_bitmap(&self) -> Bitmap {
        let mut bitmap = Bitmap::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                bitmap[(x, y)] = self.estimate(x, y).as_vector();
            }
        }
        bitmap
    }

    pub fn emit_signal(&self, destination: &mut dyn SignalDestination, is_final: bool) -> Result<(), RenderError> {
        destination.emit(self, is_final)
    }
}

/// Receives snapshots of a sensor signal, partial or final.
pub trait SignalDestination {
    fn emit(&mut self, signal: &SensorSignal, is_final: bool) -> Result<(), RenderError>;
}
