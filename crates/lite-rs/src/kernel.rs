//! Kernel interface: the compute side that consumes parameter bundles.
//!
//! Operators only ever call [`Kernel::set_param`]. Running a kernel is left
//! to whoever owns it, normally an [`OpNode`](crate::operator::OpNode).

use crate::error::LiteResult;
use crate::params::OpParam;

pub trait Kernel: Send {
    /// Human-readable kernel identifier (e.g. "mean-cpu").
    fn name(&self) -> &str;

    /// Receives the bundle of the operator this kernel is bound to.
    ///
    /// Rejects bundles of a kind the kernel does not implement.
    fn set_param(&mut self, param: OpParam) -> LiteResult<()>;

    /// Reads inputs and writes output data through the stored bundle.
    fn run(&mut self) -> LiteResult<()>;
}

/// Source of kernels for operator types.
pub trait KernelProvider {
    /// Creates a fresh kernel for `op_type`, if this provider has one.
    fn kernel_for(&self, op_type: &str) -> Option<Box<dyn Kernel>>;
}

/// Provider with no kernels; used when programs are only shape-checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKernels;

impl KernelProvider for NoKernels {
    fn kernel_for(&self, _op_type: &str) -> Option<Box<dyn Kernel>> {
        None
    }
}
