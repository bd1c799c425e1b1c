//! Parameter bundles: per-operator-kind sets of tensor handles.
//!
//! A bundle is rebuilt from scratch on every attach and handed, by value, to
//! the kernel bound to the operator. Its fields are `Weak`-backed scope
//! handles, so a bundle never keeps a tensor alive on its own.

use crate::error::{LiteError, LiteResult};
use crate::scope::{TensorMut, TensorRef};

/// Handles used by the forward `mean` operator.
#[derive(Debug, Clone, Default)]
pub struct MeanParam {
    pub x: Option<TensorRef>,
    pub out: Option<TensorMut>,
}

/// Handles used by the `mean_grad` operator.
#[cfg(feature = "train")]
#[derive(Debug, Clone, Default)]
pub struct MeanGradParam {
    /// Forward activation.
    pub x: Option<TensorRef>,
    /// Upstream gradient of the forward output.
    pub out_grad: Option<TensorRef>,
    /// Gradient produced for `x`.
    pub x_grad: Option<TensorMut>,
}

/// Type-erased bundle passed through the kernel interface.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum OpParam {
    Mean(MeanParam),
    #[cfg(feature = "train")]
    MeanGrad(MeanGradParam),
}

impl OpParam {
    /// Tag naming the bundle kind, used in mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            OpParam::Mean(_) => "mean",
            #[cfg(feature = "train")]
            OpParam::MeanGrad(_) => "mean_grad",
        }
    }
}

/// Returns the bound handle in `field`, or an [`LiteError::UnboundParam`].
pub fn bound<'a, T>(field: &'a Option<T>, op: &str, label: &'static str) -> LiteResult<&'a T> {
    field.as_ref().ok_or_else(|| LiteError::UnboundParam {
        op: op.to_string(),
        field: label,
    })
}
