//! GPU offload strategy.
//!
//! The workload is split across `workgroups × 256` compute work-items; the
//! first `total % work_items` items run one extra iteration. Device, pipeline
//! and buffers are created at construction. The timed region covers submit
//! through completion; result readback happens after the timer stops.
//!
//! The wgpu backend is compiled only with the `gpu` feature. Without it the
//! strategy reports `CapabilityUnavailable`.

use super::{ExecutionStrategy, StrategyKind};
use crate::aggregate::BenchmarkResult;
use crate::error::StrategyError;
use crate::kernel::WorkloadSpec;
use crate::partition::{LaneGroup, Partition};
use serde::{Deserialize, Serialize};

/// Work-items per workgroup (matches `@workgroup_size` in the shader)
pub const WORKGROUP_SIZE: u32 = 256;

/// Upper bound on workgroups in one dispatch dimension
const MAX_WORKGROUPS: u32 = 65_535;

/// Adapter selection hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GpuPowerPreference {
    /// Prefer a discrete GPU
    #[default]
    HighPerformance,
    /// Prefer an integrated GPU
    LowPower,
}

/// GPU dispatch settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuSettings {
    /// Workgroups dispatched; global work size is `workgroups × 256`
    pub workgroups: u32,
    /// Adapter selection hint
    pub power_preference: GpuPowerPreference,
}

impl Default for GpuSettings {
    fn default() -> Self {
        Self {
            workgroups: 256,
            power_preference: GpuPowerPreference::HighPerformance,
        }
    }
}

/// How a workload maps onto GPU work-items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuDispatch {
    workgroups: u32,
    partition: Partition,
}

impl GpuDispatch {
    /// Global work size for `workgroups`, rejecting counts a single dispatch cannot express
    pub fn work_items(workgroups: u32) -> Result<u32, StrategyError> {
        if workgroups == 0 || workgroups > MAX_WORKGROUPS {
            return Err(StrategyError::InvalidWorkload(format!(
                "workgroups must be between 1 and {MAX_WORKGROUPS}, got {workgroups}"
            )));
        }
        Ok(workgroups * WORKGROUP_SIZE)
    }

    /// Plan `total` iterations over `workgroups × 256` items
    pub fn plan(total: u64, workgroups: u32) -> Result<Self, StrategyError> {
        let work_items = Self::work_items(workgroups)?;
        let partition = Partition::new(total, work_items as usize)?;
        // Per-item counts travel to the shader as u32
        if partition.iterations_for(0) > u64::from(u32::MAX) {
            return Err(StrategyError::InvalidWorkload(format!(
                "{} iterations per work-item exceeds the device counter range; \
                 raise the workgroup count",
                partition.iterations_for(0)
            )));
        }
        Ok(Self {
            workgroups,
            partition,
        })
    }

    /// Workgroups dispatched
    pub fn workgroups(&self) -> u32 {
        self.workgroups
    }

    /// Global work size
    pub fn global_work_size(&self) -> u32 {
        self.partition.lanes() as u32
    }

    /// Iterations every item runs
    pub fn base_iterations(&self) -> u32 {
        self.partition.base() as u32
    }

    /// Leading items that run one extra iteration
    pub fn extra_items(&self) -> u32 {
        self.partition.extra() as u32
    }

    /// Iterations for work-item `gid`
    pub fn iterations_for(&self, gid: u32) -> u64 {
        self.partition.iterations_for(gid as usize)
    }

    /// Lane assignment in run-length form
    pub fn groups(&self) -> Vec<LaneGroup> {
        self.partition.groups()
    }
}

/// No adapter or device to run on: the strategy is skipped, not failed
fn no_device(what: &str, cause: impl std::fmt::Display) -> StrategyError {
    StrategyError::unavailable(StrategyKind::GpuOffload.name(), format!("{what}: {cause}"))
}

/// WGSL compute shader offload
pub struct GpuOffload {
    settings: GpuSettings,
    #[cfg(feature = "gpu")]
    device: backend::GpuDevice,
}

impl GpuOffload {
    /// Acquire an adapter and build the pipeline and buffers
    #[cfg(feature = "gpu")]
    pub fn new(settings: &GpuSettings) -> Result<Self, StrategyError> {
        let device = backend::GpuDevice::new(settings)?;
        Ok(Self {
            settings: *settings,
            device,
        })
    }

    /// Always unavailable: the crate was built without the `gpu` feature
    #[cfg(not(feature = "gpu"))]
    pub fn new(settings: &GpuSettings) -> Result<Self, StrategyError> {
        Err(no_device(
            "built without the `gpu` feature",
            format_args!("{} workgroups requested", settings.workgroups),
        ))
    }

    /// Dispatch settings in use
    pub fn settings(&self) -> &GpuSettings {
        &self.settings
    }
}

impl ExecutionStrategy for GpuOffload {
    fn kind(&self) -> StrategyKind {
        StrategyKind::GpuOffload
    }

    fn run(&self, spec: &WorkloadSpec) -> Result<BenchmarkResult, StrategyError> {
        let dispatch = GpuDispatch::plan(spec.total_iterations(), self.settings.workgroups)?;
        tracing::debug!(
            workgroups = dispatch.workgroups(),
            work_items = dispatch.global_work_size(),
            base = dispatch.base_iterations(),
            extra = dispatch.extra_items(),
            "gpu dispatch plan"
        );

        #[cfg(feature = "gpu")]
        {
            let (checksum, elapsed) = self.device.execute(&dispatch)?;
            let result =
                BenchmarkResult::from_lanes(self.name(), dispatch.groups(), elapsed, checksum)?;
            Ok(result.with_detail(self.device.describe()))
        }

        #[cfg(not(feature = "gpu"))]
        {
            Err(StrategyError::unavailable(
                self.name(),
                "built without the `gpu` feature",
            ))
        }
    }
}

#[cfg(feature = "gpu")]
mod backend {
    use super::{GpuDispatch, GpuPowerPreference, GpuSettings, no_device};
    use crate::aggregate::{combine, sink};
    use crate::error::StrategyError;
    use crate::measure::{Measurement, measure};
    use bytemuck::{Pod, Zeroable};
    use std::sync::mpsc;

    const SHADER: &str = r#"
struct Params {
    base_iterations: u32,
    extra_items: u32,
    work_items: u32,
    _pad: u32,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var<storage, read_write> results: array<f32>;

@compute @workgroup_size(256)
fn flops_kernel(@builtin(global_invocation_id) gid: vec3<u32>) {
    let id = gid.x;
    if (id >= params.work_items) {
        return;
    }
    var iterations = params.base_iterations;
    if (id < params.extra_items) {
        iterations = iterations + 1u;
    }
    var a: f32 = 1.23456 + f32(id) * 0.001;
    var b: f32 = 9.87654 + f32(id) * 0.001;
    var result: f32 = 0.0;
    for (var i = 0u; i < iterations; i = i + 1u) {
        result = fma(a, b, result);
        a = result * 0.999999;
        b = a + 1.000001;
    }
    results[id] = result;
}
"#;

    #[repr(C)]
    #[derive(Debug, Clone, Copy, Pod, Zeroable)]
    struct KernelParams {
        base_iterations: u32,
        extra_items: u32,
        work_items: u32,
        _pad: u32,
    }

    pub(super) struct GpuDevice {
        device: wgpu::Device,
        queue: wgpu::Queue,
        pipeline: wgpu::ComputePipeline,
        bind_group: wgpu::BindGroup,
        params: wgpu::Buffer,
        results: wgpu::Buffer,
        staging: wgpu::Buffer,
        results_size: u64,
        adapter_name: String,
        backend: wgpu::Backend,
    }

    fn device_error(stage: &str, scope: Option<wgpu::Error>) -> Result<(), StrategyError> {
        match scope {
            Some(e) => Err(StrategyError::device(stage, e)),
            None => Ok(()),
        }
    }

    impl GpuDevice {
        pub(super) fn new(settings: &GpuSettings) -> Result<Self, StrategyError> {
            let work_items = GpuDispatch::work_items(settings.workgroups)?;

            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
            let power_preference = match settings.power_preference {
                GpuPowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
                GpuPowerPreference::LowPower => wgpu::PowerPreference::LowPower,
            };
            let adapter = pollster::block_on(instance.request_adapter(
                &wgpu::RequestAdapterOptions {
                    power_preference,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                },
            ))
            .map_err(|e| no_device("no GPU adapter", e))?;

            let info = adapter.get_info();
            tracing::info!(adapter = %info.name, backend = ?info.backend, "GPU adapter selected");

            let (device, queue) =
                pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
                    label: Some("flopbench"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: Default::default(),
                    experimental_features: Default::default(),
                    trace: Default::default(),
                }))
                .map_err(|e| no_device("no GPU device", e))?;

            device.push_error_scope(wgpu::ErrorFilter::Validation);
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("flops_kernel"),
                source: wgpu::ShaderSource::Wgsl(SHADER.into()),
            });
            let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("flops_kernel"),
                layout: None,
                module: &module,
                entry_point: Some("flops_kernel"),
                compilation_options: Default::default(),
                cache: None,
            });

            let results_size = u64::from(work_items) * std::mem::size_of::<f32>() as u64;
            let params = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("flops params"),
                size: std::mem::size_of::<KernelParams>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let results = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("flops results"),
                size: results_size,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            });
            let staging = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("flops staging"),
                size: results_size,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("flops bind group"),
                layout: &pipeline.get_bind_group_layout(0),
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: results.as_entire_binding(),
                    },
                ],
            });
            device_error("build pipeline", pollster::block_on(device.pop_error_scope()))?;

            Ok(Self {
                device,
                queue,
                pipeline,
                bind_group,
                params,
                results,
                staging,
                results_size,
                adapter_name: info.name,
                backend: info.backend,
            })
        }

        pub(super) fn describe(&self) -> String {
            format!("{} ({:?})", self.adapter_name, self.backend)
        }

        /// Run the dispatch; returns the sunk checksum and the submit-to-completion time
        pub(super) fn execute(
            &self,
            dispatch: &GpuDispatch,
        ) -> Result<(f64, Measurement), StrategyError> {
            let params = KernelParams {
                base_iterations: dispatch.base_iterations(),
                extra_items: dispatch.extra_items(),
                work_items: dispatch.global_work_size(),
                _pad: 0,
            };
            self.queue
                .write_buffer(&self.params, 0, bytemuck::bytes_of(&params));

            self.device.push_error_scope(wgpu::ErrorFilter::Validation);
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("flops dispatch"),
                });
            {
                let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("flops pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.bind_group, &[]);
                pass.dispatch_workgroups(dispatch.workgroups(), 1, 1);
            }
            let commands = encoder.finish();

            let (polled, elapsed) = measure(|| {
                let index = self.queue.submit([commands]);
                self.device.poll(wgpu::PollType::Wait {
                    submission_index: Some(index),
                    timeout: None,
                })
            });
            polled.map_err(|e| StrategyError::device("execute kernel", e))?;
            device_error(
                "execute kernel",
                pollster::block_on(self.device.pop_error_scope()),
            )?;

            let checksum = self.read_back()?;
            Ok((sink(checksum), elapsed))
        }

        fn read_back(&self) -> Result<f64, StrategyError> {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("flops readback"),
                });
            encoder.copy_buffer_to_buffer(&self.results, 0, &self.staging, 0, self.results_size);
            self.queue.submit([encoder.finish()]);

            let slice = self.staging.slice(..);
            let (tx, rx) = mpsc::channel();
            slice.map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
            self.device
                .poll(wgpu::PollType::Wait {
                    submission_index: None,
                    timeout: None,
                })
                .map_err(|e| StrategyError::device("read back results", e))?;
            rx.recv()
                .map_err(|e| StrategyError::device("read back results", e))?
                .map_err(|e| StrategyError::device("read back results", e))?;

            let checksum = {
                let bytes = slice.get_mapped_range();
                combine(
                    bytes
                        .chunks_exact(4)
                        .map(|c| f64::from(f32::from_le_bytes([c[0], c[1], c[2], c[3]]))),
                )
            };
            self.staging.unmap();
            Ok(checksum)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_remainder_to_leading_items() {
        let dispatch = GpuDispatch::plan(1_000_003, 4).unwrap();
        assert_eq!(dispatch.global_work_size(), 1024);
        assert_eq!(dispatch.base_iterations(), 976);
        assert_eq!(dispatch.extra_items(), 579);
        assert_eq!(dispatch.iterations_for(0), 977);
        assert_eq!(dispatch.iterations_for(1023), 976);
        let total: u64 = dispatch.groups().iter().map(|g| g.lanes * g.iterations).sum();
        assert_eq!(total, 1_000_003);
    }

    #[test]
    fn test_dispatch_rejects_bad_workgroups() {
        assert!(GpuDispatch::plan(100, 0).is_err());
        assert!(GpuDispatch::plan(100, MAX_WORKGROUPS + 1).is_err());
    }

    #[test]
    fn test_dispatch_rejects_u32_overflow() {
        let total = u64::from(u32::MAX) * 256 + 256;
        assert!(matches!(
            GpuDispatch::plan(total, 1),
            Err(StrategyError::InvalidWorkload(_))
        ));
        assert!(GpuDispatch::plan(total, 2).is_ok());
    }

    #[test]
    fn test_missing_device_is_a_skip() {
        let error = no_device("no GPU device", "request timed out");
        assert!(error.is_capability_unavailable());
        assert_eq!(error.kind(), "capability-unavailable");
        assert!(error.to_string().contains("gpu-offload"));
        assert!(error.to_string().contains("no GPU device: request timed out"));
    }

    #[test]
    fn test_gpu_run_or_unavailable() {
        let settings = GpuSettings {
            workgroups: 4,
            ..Default::default()
        };
        let strategy = match GpuOffload::new(&settings) {
            Ok(s) => s,
            Err(e) => {
                assert!(
                    e.is_capability_unavailable()
                        || matches!(e, StrategyError::DeviceOperationFailed { .. })
                );
                return;
            }
        };
        let spec = WorkloadSpec::new(1_000_003).unwrap();
        match strategy.run(&spec) {
            Ok(result) => assert_eq!(result.total_operations(), 4_000_012),
            Err(e) => assert!(matches!(e, StrategyError::DeviceOperationFailed { .. })),
        }
    }
}
