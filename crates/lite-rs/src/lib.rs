//! Operator binding and shape inference for tensor compute graphs.
//!
//! A graph node arrives as an [`OpDesc`]: a type tag plus argument labels
//! mapped to variable names. The [`registry`] turns the tag into an
//! [`Operator`], which attaches to a [`Scope`] (resolving names to tensor
//! handles in its parameter bundle), checks that the bundle is complete,
//! infers output shapes, and finally hands the bundle to a [`Kernel`].
//! The arithmetic itself belongs to the kernel.

pub mod config;
pub mod error;
pub mod kernel;
pub mod op_desc;
pub mod operator;
pub mod operators;
pub mod params;
pub mod program;
pub mod registry;
pub mod scope;
pub mod tensor;

pub use config::BuildOptions;
pub use error::{LiteError, LiteResult};
pub use kernel::{Kernel, KernelProvider};
pub use op_desc::{grad_name, OpDesc};
pub use operator::{OpNode, OpState, Operator};
pub use program::{Program, ProgramDesc};
pub use registry::{create_op, register_all, OpRegistry};
pub use scope::{Scope, TensorMut, TensorRef};
pub use tensor::{Shape, Tensor};
