use crate::error::LiteResult;
use crate::kernel::Kernel;
use crate::op_desc::{grad_name, OpDesc};
use crate::operator::Operator;
use crate::params::{bound, MeanGradParam, OpParam};
use crate::registry::{OpFactoryDef, OP_FACTORIES};
use crate::scope::Scope;

const OP_TYPE: &str = "mean_grad";

/// Gradient of [`MeanOp`](super::MeanOp): `X@GRAD` takes the shape of `X`.
#[derive(Debug, Default)]
pub struct MeanGradOp {
    param: MeanGradParam,
}

impl MeanGradOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(&self) -> &MeanGradParam {
        &self.param
    }
}

impl Operator for MeanGradOp {
    /// # Panics
    ///
    /// Panics unless the descriptor has exactly two input arguments (`X` and
    /// the gradient of `Out`). A descriptor of any other arity is a malformed
    /// graph, not a recoverable binding failure.
    fn attach(&mut self, desc: &OpDesc, scope: &Scope) -> LiteResult<()> {
        let input_args = desc.input_argument_names();
        assert_eq!(
            input_args.len(),
            2,
            "operator '{OP_TYPE}' takes exactly 2 input arguments, got {}: {desc}",
            input_args.len(),
        );

        let x_name = desc.single_input("X")?;
        let out_grad_name = desc.single_input(&grad_name("Out"))?;
        let x_grad_name = desc.single_output(&grad_name("X"))?;

        let x = scope.get(x_name)?;
        let out_grad = scope.get(out_grad_name)?;
        let x_grad = scope.get_mutable(x_grad_name)?;
        self.param = MeanGradParam {
            x: Some(x),
            out_grad: Some(out_grad),
            x_grad: Some(x_grad),
        };
        Ok(())
    }

    fn check_shape(&self) -> LiteResult<()> {
        bound(&self.param.x, OP_TYPE, "X")?;
        bound(&self.param.out_grad, OP_TYPE, "Out@GRAD")?;
        bound(&self.param.x_grad, OP_TYPE, "X@GRAD")?;
        Ok(())
    }

    fn infer_shape(&self) -> LiteResult<()> {
        let x_shape = bound(&self.param.x, OP_TYPE, "X")?.shape()?;
        bound(&self.param.x_grad, OP_TYPE, "X@GRAD")?.resize(x_shape)
    }

    fn bind_kernel(&self, kernel: &mut dyn Kernel) -> LiteResult<()> {
        kernel.set_param(OpParam::MeanGrad(self.param.clone()))
    }

    fn describe(&self) -> &'static str {
        OP_TYPE
    }
}

fn create() -> Box<dyn Operator> {
    Box::new(MeanGradOp::new())
}

#[linkme::distributed_slice(OP_FACTORIES)]
static MEAN_GRAD_FACTORY: OpFactoryDef = OpFactoryDef {
    op_type: OP_TYPE,
    create,
};
