use crate::error::LiteResult;
use crate::kernel::Kernel;
use crate::op_desc::OpDesc;
use crate::operator::Operator;
use crate::params::{bound, MeanParam, OpParam};
use crate::registry::{OpFactoryDef, OP_FACTORIES};
use crate::scope::Scope;
use crate::tensor::Shape;

const OP_TYPE: &str = "mean";

/// Full reduction of `X` to a single-element `Out`.
#[derive(Debug, Default)]
pub struct MeanOp {
    param: MeanParam,
}

impl MeanOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(&self) -> &MeanParam {
        &self.param
    }
}

impl Operator for MeanOp {
    fn attach(&mut self, desc: &OpDesc, scope: &Scope) -> LiteResult<()> {
        let x_name = desc.single_input("X")?;
        let out_name = desc.single_output("Out")?;

        let x = scope.get(x_name)?;
        let out = scope.get_mutable(out_name)?;
        self.param = MeanParam {
            x: Some(x),
            out: Some(out),
        };
        Ok(())
    }

    fn check_shape(&self) -> LiteResult<()> {
        bound(&self.param.x, OP_TYPE, "X")?;
        bound(&self.param.out, OP_TYPE, "Out")?;
        Ok(())
    }

    fn infer_shape(&self) -> LiteResult<()> {
        // The mean of any tensor is a single value, whatever its rank.
        bound(&self.param.out, OP_TYPE, "Out")?.resize(Shape::scalar())
    }

    fn bind_kernel(&self, kernel: &mut dyn Kernel) -> LiteResult<()> {
        kernel.set_param(OpParam::Mean(self.param.clone()))
    }

    fn describe(&self) -> &'static str {
        OP_TYPE
    }
}

fn create() -> Box<dyn Operator> {
    Box::new(MeanOp::new())
}

#[linkme::distributed_slice(OP_FACTORIES)]
static MEAN_FACTORY: OpFactoryDef = OpFactoryDef {
    op_type: OP_TYPE,
    create,
};
