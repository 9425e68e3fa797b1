// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::error::RenderError;
use crate::core::integrator::Integrator;
use crate::core::rng::LcgRng;
use crate::core::sampler::{SampleStorage, Sampler};
use crate::core::scene::Scene;
use crate::core::sensor::{ExtentOrder, Sensor, SensorBlock, SensorExtent, SensorSignal, SignalDestination};
use crossbeam_channel::{bounded, Receiver, Select, Sender};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

pub use super::renderer::Renderer;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Worker thread count.
    pub jobs: usize,
    pub block_width: usize,
    pub block_height: usize,
    /// Samples per pixel handled by one block.
    pub block_samples: usize,
    /// Samples per pixel of the whole render.
    pub sample_count: usize,
    pub seed: u64,
    /// Emit a partial signal after every this many merged blocks.
    pub emit_every: Option<usize>,
    pub show_progress: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            jobs: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            block_width: 32,
            block_height: 32,
            block_samples: 16,
            sample_count: 16,
            seed: 0,
            emit_every: None,
            show_progress: true,
        }
    }
}

/// Splits a sensor into blocks and traces them on a fixed worker pool.
pub struct BlockRenderer {
    integrator: Box<dyn Integrator>,
    sampler: Box<dyn Sampler>,
    options: RenderOptions,
    cancel: Option<Arc<AtomicBool>>,
}

/// Dispatcher-side state. Only the dispatching thread touches it.
struct Collector<'d> {
    signal: SensorSignal,
    spare: Vec<SensorBlock>,
    merged: usize,
    total: usize,
    emit_every: Option<usize>,
    destination: Option<&'d mut dyn SignalDestination>,
    progress: ProgressBar,
}

impl<'d> Collector<'d> {
    fn merge(&mut self, block: SensorBlock) -> Result<(), RenderError> {
        self.signal.record(&block);
        self.spare.push(block);
        self.merged += 1;
        self.progress.inc(1);

        if let Some(every) = self.emit_every {
            if self.merged % every == 0 && self.merged < self.total {
                self.emit(false)?;
            }
        }
        Ok(())
    }

    fn emit(&mut self, is_final: bool) -> Result<(), RenderError> {
        if let Some(destination) = self.destination.as_deref_mut() {
            log::debug!("Emitting {} signal after {}/{} blocks.",
                        if is_final { "final" } else { "partial" }, self.merged, self.total);
            self.signal.emit_signal(destination, is_final)?;
        }
        Ok(())
    }

    fn block_for(&mut self, extent: SensorExtent) -> SensorBlock {
        match self.spare.pop() {
            Some(mut block) => {
                block.reset(extent);
                block
            }
            None => SensorBlock::new(extent),
        }
    }
}

impl BlockRenderer {
    pub fn new(integrator: Box<dyn Integrator>, sampler: Box<dyn Sampler>, options: RenderOptions) -> Self {
        Self { integrator, sampler, options, cancel: None }
    }

    /// Setting the token stops the render at the next block boundary.
    pub fn with_cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |c| c.load(Ordering::Relaxed))
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress
    }

    fn run_worker(&self,
                  scene: &Scene,
                  sensor: &dyn Sensor,
                  work: Receiver<SensorBlock>,
                  results: Sender<SensorBlock>,
                  mut rng: LcgRng,
                  mut storage: SampleStorage) {
        for mut block in work.iter() {
            // Cancelled blocks travel back empty so the dispatcher can count them.
            if !self.is_cancelled() {
                self.trace_block(scene, sensor, &mut block, &mut storage, &mut rng);
            }
            if results.send(block).is_err() {
                break;
            }
        }
    }

    fn trace_block(&self,
                   scene: &Scene,
                   sensor: &dyn Sensor,
                   block: &mut SensorBlock,
                   storage: &mut SampleStorage,
                   rng: &mut LcgRng) {
        let extent = *block.extent();
        let config = self.integrator.sample_config();
        for y in extent.y_begin..extent.y_end {
            for x in extent.x_begin..extent.x_end {
                self.sampler.generate_sample_bundles(config, storage, extent.sample_count, rng);
                for i in 0..extent.sample_count {
                    let value = self.integrator.sample_sensor_path(scene, sensor, x, y, &storage.bundle(i), rng);
                    block.accumulate(x, y, value);
                }
            }
        }
    }
}

impl ComputationNode for BlockRenderer {
    fn id(&self) -> &str {
        "block"
    }

    fn to_string(&self) -> String {
        format!("BlockRenderer [jobs={}, block={}x{}x{}, spp={}]",
                self.options.jobs, self.options.block_width, self.options.block_height,
                self.options.block_samples, self.options.sample_count)
    }
}

impl Renderer for BlockRenderer {
    fn render(&self,
              scene: &Scene,
              sensor_index: usize,
              destination: Option<&mut dyn SignalDestination>) -> Result<SensorSignal, RenderError> {
        let sensor = scene.sensor(sensor_index).ok_or(RenderError::MissingSensor(sensor_index))?;
        let sensor_config = sensor.sample_config();
        if self.integrator.sensor_config() != &sensor_config
            || !sensor_config.is_prefix_of(self.integrator.sample_config()) {
            return Err(RenderError::SampleLayoutMismatch(sensor.id().to_string()));
        }
        let (width, height) = sensor.resolution();
        let jobs = self.options.jobs.max(1);
        let order = match self.options.emit_every {
            Some(_) => ExtentOrder::SampleMajor,
            None => ExtentOrder::Raster,
        };
        let blocks = sensor.extent(self.options.sample_count).split(order,
                                                                    self.options.block_width,
                                                                    self.options.block_height,
                                                                    self.options.block_samples);
        let total = blocks.len();
        let storage_size = self.options.block_samples.max(1).min(self.options.sample_count.max(1));

        log::info!("Rendering sensor '{}' ({}x{}, {} spp) in {} blocks on {} workers.",
                   sensor.id(), width, height, self.options.sample_count, total, jobs);
        let started = Instant::now();

        let mut collector = Collector {
            signal: SensorSignal::new(width, height),
            spare: Vec::new(),
            merged: 0,
            total,
            emit_every: self.options.emit_every.filter(|n| *n > 0),
            destination,
            progress: self.progress_bar(total),
        };
        let mut parent_rng = LcgRng::new(self.options.seed);

        let submitted = thread::scope(|scope| -> Result<usize, RenderError> {
            let (work_tx, work_rx) = bounded::<SensorBlock>(jobs);
            let (result_tx, result_rx) = bounded::<SensorBlock>(jobs);

            for _ in 0..jobs {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let rng = parent_rng.derive();
                let storage = self.sampler.allocate_sample_storage(self.integrator.sample_config(), storage_size);
                scope.spawn(move || self.run_worker(scene, sensor, work_rx, result_tx, rng, storage));
            }
            drop(work_rx);
            drop(result_tx);

            let mut submitted = 0;
            let mut pending = blocks.into_iter();
            let mut next: Option<SensorBlock> = None;
            while !self.is_cancelled() {
                let block = match next.take() {
                    Some(block) => block,
                    None => match pending.next() {
                        Some(extent) => collector.block_for(extent),
                        None => break,
                    },
                };

                while let Ok(done) = result_rx.try_recv() {
                    collector.merge(done)?;
                }

                // Wait for a free work slot or a finished block, whichever
                // comes first; a blocking send could stall against a full
                // result queue.
                let mut select = Select::new();
                let send_index = select.send(&work_tx);
                let recv_index = select.recv(&result_rx);
                let operation = select.select();
                if operation.index() == send_index {
                    operation.send(&work_tx, block).map_err(|_| RenderError::WorkerDisconnected)?;
                    submitted += 1;
                } else {
                    debug_assert_eq!(operation.index(), recv_index);
                    let done = operation.recv(&result_rx).map_err(|_| RenderError::WorkerDisconnected)?;
                    next = Some(block);
                    collector.merge(done)?;
                }
            }
            drop(work_tx);

            while collector.merged < submitted {
                let done = result_rx.recv().map_err(|_| RenderError::WorkerDisconnected)?;
                collector.merge(done)?;
            }
            Ok(submitted)
        })?;

        collector.progress.finish_and_clear();
        if self.is_cancelled() {
            log::warn!("Render cancelled after {} of {} blocks.", submitted, total);
        }
        let invalid = self.integrator.invalid_contributions();
        if invalid > 0 {
            log::warn!("{} invalid contributions were dropped.", invalid);
        }
        log::info!("Rendered {} samples in {:.2?}.", collector.signal.total_samples(), started.elapsed());

        collector.emit(true)?;
        Ok(collector.signal)
    }
}
