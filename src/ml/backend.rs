// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// Training needs an autodiff backend; evaluation and inference
// run on the inner backend returned by `model.valid()`.
//
//   default build        → NdArray (CPU)
//   --features wgpu      → Wgpu (GPU through WebGPU)

use burn::backend::Autodiff;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

pub type TrainBackend = Autodiff<InferBackend>;

pub type Device = <InferBackend as burn::tensor::backend::Backend>::Device;

pub fn default_device() -> Device {
    Device::default()
}
