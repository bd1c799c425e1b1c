//! Reference CPU kernels for the built-in lite-rs operators.
//!
//! These kernels favour clarity over speed and exist to exercise the
//! operator/kernel contract end to end.

pub mod cpu;

pub use cpu::{CpuKernels, MeanKernel};
#[cfg(feature = "train")]
pub use cpu::MeanGradKernel;
