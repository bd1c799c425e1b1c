//! Scope-resident tensors: shapes and the host tensor type.
//!
//! Operators only ever touch [`Shape`] metadata while binding and inferring;
//! payload bytes are read and written by kernels alone.

mod host_tensor;
pub mod shape;

pub use host_tensor::Tensor;
pub use shape::Shape;
