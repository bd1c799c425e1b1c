use lite_rs::params::{bound, MeanParam, OpParam};
#[cfg(feature = "train")]
use lite_rs::params::MeanGradParam;
use lite_rs::{Kernel, KernelProvider, LiteError, LiteResult};

/// Hands out reference kernels by operator type.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuKernels;

impl KernelProvider for CpuKernels {
    fn kernel_for(&self, op_type: &str) -> Option<Box<dyn Kernel>> {
        match op_type {
            "mean" => Some(Box::new(MeanKernel::default())),
            #[cfg(feature = "train")]
            "mean_grad" => Some(Box::new(MeanGradKernel::default())),
            _ => None,
        }
    }
}

fn param_mismatch(kernel: &str, expected: &'static str, found: &OpParam) -> LiteError {
    LiteError::KernelParamMismatch {
        kernel: kernel.to_string(),
        expected,
        found: found.kind(),
    }
}

/// `Out[0] = sum(X) / numel(X)`.
#[derive(Debug, Default)]
pub struct MeanKernel {
    param: Option<MeanParam>,
}

impl Kernel for MeanKernel {
    fn name(&self) -> &str {
        "mean-cpu"
    }

    fn set_param(&mut self, param: OpParam) -> LiteResult<()> {
        match param {
            OpParam::Mean(param) => {
                self.param = Some(param);
                Ok(())
            }
            other => Err(param_mismatch(self.name(), "mean", &other)),
        }
    }

    fn run(&mut self) -> LiteResult<()> {
        let param = self
            .param
            .as_ref()
            .ok_or_else(|| LiteError::KernelNotReady(self.name().to_string()))?;
        let x = bound(&param.x, "mean", "X")?;
        let out = bound(&param.out, "mean", "Out")?;

        let values = x.with(|t| t.to_f32_vec())??;
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        log::trace!("mean-cpu: {} elements of '{}' -> {}", values.len(), x.name(), mean);
        out.with_mut(|t| t.write_f32(&[mean]))?
    }
}

/// `X@GRAD[i] = Out@GRAD[0] / numel(X)` for every element.
#[cfg(feature = "train")]
#[derive(Debug, Default)]
pub struct MeanGradKernel {
    param: Option<MeanGradParam>,
}

#[cfg(feature = "train")]
impl Kernel for MeanGradKernel {
    fn name(&self) -> &str {
        "mean_grad-cpu"
    }

    fn set_param(&mut self, param: OpParam) -> LiteResult<()> {
        match param {
            OpParam::MeanGrad(param) => {
                self.param = Some(param);
                Ok(())
            }
            other => Err(param_mismatch(self.name(), "mean_grad", &other)),
        }
    }

    fn run(&mut self) -> LiteResult<()> {
        let param = self
            .param
            .as_ref()
            .ok_or_else(|| LiteError::KernelNotReady(self.name().to_string()))?;
        let x = bound(&param.x, "mean_grad", "X")?;
        let out_grad = bound(&param.out_grad, "mean_grad", "Out@GRAD")?;
        let x_grad = bound(&param.x_grad, "mean_grad", "X@GRAD")?;

        let upstream = out_grad.with(|t| t.to_f32_vec())??;
        let &[scale] = upstream.as_slice() else {
            return Err(LiteError::ElementCount {
                expected: 1,
                found: upstream.len(),
            });
        };
        let count = x.with(|t| t.numel())?;
        let share = scale / count as f32;
        x_grad.with_mut(|t| {
            let values = vec![share; t.numel()];
            t.write_f32(&values)
        })?
    }
}
