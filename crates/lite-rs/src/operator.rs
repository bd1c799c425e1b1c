//! The operator contract and the per-node state machine that drives it.
//!
//! Every operator kind implements [`Operator`]; the calls must happen in the
//! order attach → check_shape → infer_shape → bind_kernel. [`OpNode`] wraps
//! a boxed operator and enforces that order, owns the bound kernel, and lets a
//! node be re-attached (which resets everything downstream of attach).

use std::fmt;

use crate::error::{LiteError, LiteResult};
use crate::kernel::Kernel;
use crate::op_desc::OpDesc;
use crate::scope::Scope;

pub trait Operator: Send + Sync {
    /// Resolves the descriptor's variable names against `scope` and rebuilds
    /// the parameter bundle.
    ///
    /// On error the previous bundle is left untouched. Contract violations
    /// that make the descriptor unusable for this operator kind panic.
    fn attach(&mut self, desc: &OpDesc, scope: &Scope) -> LiteResult<()>;

    /// Verifies that every bundle field needed for inference is bound.
    fn check_shape(&self) -> LiteResult<()>;

    /// Writes output shapes as a function of input shapes. Never touches data.
    fn infer_shape(&self) -> LiteResult<()>;

    /// Hands a copy of the bundle to `kernel`.
    fn bind_kernel(&self, kernel: &mut dyn Kernel) -> LiteResult<()>;

    /// Stable type tag for diagnostics, e.g. "mean".
    fn describe(&self) -> &'static str;
}

/// Lifecycle of an [`OpNode`], ordered from least to most prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OpState {
    Unattached,
    Attached,
    ShapeChecked,
    ShapeInferred,
    KernelBound,
}

impl fmt::Display for OpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpState::Unattached => "unattached",
            OpState::Attached => "attached",
            OpState::ShapeChecked => "shape-checked",
            OpState::ShapeInferred => "shape-inferred",
            OpState::KernelBound => "kernel-bound",
        };
        f.write_str(name)
    }
}

/// One graph node: an operator instance plus its lifecycle state.
pub struct OpNode {
    op: Box<dyn Operator>,
    state: OpState,
    desc: Option<OpDesc>,
    kernel: Option<Box<dyn Kernel>>,
}

impl fmt::Debug for OpNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpNode")
            .field("op", &self.op.describe())
            .field("state", &self.state)
            .field("desc", &self.desc)
            .field("kernel", &self.kernel.as_ref().map(|k| k.name().to_string()))
            .finish()
    }
}

impl OpNode {
    pub fn new(op: Box<dyn Operator>) -> Self {
        OpNode {
            op,
            state: OpState::Unattached,
            desc: None,
            kernel: None,
        }
    }

    pub fn state(&self) -> OpState {
        self.state
    }

    /// Descriptor of the last successful attach.
    pub fn desc(&self) -> Option<&OpDesc> {
        self.desc.as_ref()
    }

    pub fn describe(&self) -> &'static str {
        self.op.describe()
    }

    pub fn kernel_name(&self) -> Option<&str> {
        self.kernel.as_ref().map(|kernel| kernel.name())
    }

    /// Attaches the operator, resetting any earlier shape or kernel state.
    pub fn attach(&mut self, desc: &OpDesc, scope: &Scope) -> LiteResult<()> {
        self.state = OpState::Unattached;
        self.kernel = None;
        self.desc = None;
        self.op.attach(desc, scope)?;
        self.desc = Some(desc.clone());
        self.advance(OpState::Attached);
        log::debug!("attached {}", desc);
        Ok(())
    }

    pub fn check_shape(&mut self) -> LiteResult<()> {
        self.require(OpState::Attached)?;
        self.op.check_shape()?;
        self.advance(OpState::ShapeChecked);
        Ok(())
    }

    /// Runs shape inference. Repeating it after inference keeps the state.
    pub fn infer_shape(&mut self) -> LiteResult<()> {
        self.require(OpState::ShapeChecked)?;
        self.op.infer_shape()?;
        self.advance(OpState::ShapeInferred);
        Ok(())
    }

    /// Attach, check and infer in one go.
    pub fn prepare(&mut self, desc: &OpDesc, scope: &Scope) -> LiteResult<()> {
        self.attach(desc, scope)?;
        self.check_shape()?;
        self.infer_shape()
    }

    /// Hands the bundle to `kernel` and keeps the kernel for [`OpNode::run`].
    pub fn bind_kernel(&mut self, mut kernel: Box<dyn Kernel>) -> LiteResult<()> {
        self.require(OpState::ShapeInferred)?;
        self.op.bind_kernel(kernel.as_mut())?;
        log::debug!("bound kernel '{}' to {}", kernel.name(), self.op.describe());
        self.kernel = Some(kernel);
        self.advance(OpState::KernelBound);
        Ok(())
    }

    /// Runs the bound kernel.
    pub fn run(&mut self) -> LiteResult<()> {
        self.require(OpState::KernelBound)?;
        match self.kernel.as_mut() {
            Some(kernel) => kernel.run(),
            None => Err(LiteError::MissingKernel(self.op.describe().to_string())),
        }
    }

    fn require(&self, expected: OpState) -> LiteResult<()> {
        if self.state < expected {
            return Err(LiteError::InvalidState {
                op: self.op.describe().to_string(),
                expected,
                found: self.state,
            });
        }
        Ok(())
    }

    fn advance(&mut self, next: OpState) {
        if next > self.state {
            log::trace!("{}: {} -> {}", self.op.describe(), self.state, next);
            self.state = next;
        }
    }
}
