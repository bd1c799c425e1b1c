//! Built-in operator kinds.
//!
//! Each kind registers its factory in [`OP_FACTORIES`](crate::registry::OP_FACTORIES);
//! gradient kinds exist only with the `train` feature.

mod mean;
#[cfg(feature = "train")]
mod mean_grad;

pub use mean::MeanOp;
#[cfg(feature = "train")]
pub use mean_grad::MeanGradOp;
