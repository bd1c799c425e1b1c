use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use lite_rs::kernel::NoKernels;
use lite_rs::params::OpParam;
use lite_rs::{
    BuildOptions, Kernel, KernelProvider, LiteError, LiteResult, OpRegistry, OpState, Program,
    ProgramDesc, Scope, Shape, Tensor,
};

/// Kernel that fills every output with a constant and counts its runs.
struct FillKernel {
    name: String,
    param: Option<OpParam>,
    runs: Arc<AtomicUsize>,
}

impl Kernel for FillKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_param(&mut self, param: OpParam) -> LiteResult<()> {
        self.param = Some(param);
        Ok(())
    }

    fn run(&mut self) -> LiteResult<()> {
        let param = self
            .param
            .as_ref()
            .ok_or_else(|| LiteError::KernelNotReady(self.name.clone()))?;
        let out = match param {
            OpParam::Mean(p) => p.out.clone(),
            #[cfg(feature = "train")]
            OpParam::MeanGrad(p) => p.x_grad.clone(),
            _ => None,
        };
        if let Some(out) = out {
            out.with_mut(|t| {
                let values = vec![0.5; t.numel()];
                t.write_f32(&values)
            })??;
        }
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct FillKernels {
    runs: Arc<AtomicUsize>,
}

impl KernelProvider for FillKernels {
    fn kernel_for(&self, op_type: &str) -> Option<Box<dyn Kernel>> {
        Some(Box::new(FillKernel {
            name: format!("{op_type}-fill"),
            param: None,
            runs: Arc::clone(&self.runs),
        }))
    }
}

const FORWARD: &str = r#"{
    "ops": [
        {"type": "mean", "inputs": {"X": ["x"]}, "outputs": {"Out": ["loss"]}}
    ]
}"#;

#[cfg(feature = "train")]
const FORWARD_BACKWARD: &str = r#"{
    "ops": [
        {"type": "mean", "inputs": {"X": ["x"]}, "outputs": {"Out": ["loss"]}},
        {
            "type": "mean_grad",
            "inputs": {"X": ["x"], "Out@GRAD": ["loss@GRAD"]},
            "outputs": {"X@GRAD": ["x@GRAD"]}
        }
    ]
}"#;

fn input_scope() -> Scope {
    let mut scope = Scope::new();
    scope.insert_tensor("x", Tensor::zeros(Shape::new([3, 4])));
    scope
}

#[test]
fn build_declares_outputs_and_infers_shapes() -> Result<()> {
    let desc = ProgramDesc::from_json_str(FORWARD)?;
    let mut scope = input_scope();
    let options = BuildOptions {
        bind_kernels: false,
        ..BuildOptions::default()
    };

    let program = Program::build(
        &desc,
        &mut scope,
        &OpRegistry::with_builtins()?,
        &options,
        &NoKernels,
    )?;

    assert_eq!(program.len(), 1);
    assert_eq!(program.nodes()[0].state(), OpState::ShapeInferred);
    assert_eq!(scope.shape_of("loss")?, Shape::scalar());
    Ok(())
}

#[test]
fn bound_kernels_run_in_order() -> Result<()> {
    let desc = ProgramDesc::from_json_str(FORWARD)?;
    let mut scope = input_scope();
    let kernels = FillKernels::default();

    let mut program = Program::build(
        &desc,
        &mut scope,
        &OpRegistry::with_builtins()?,
        &BuildOptions::default(),
        &kernels,
    )?;
    assert_eq!(program.nodes()[0].state(), OpState::KernelBound);
    assert_eq!(program.nodes()[0].kernel_name(), Some("mean-fill"));

    program.run()?;
    program.run()?;
    assert_eq!(kernels.runs.load(Ordering::SeqCst), 2);
    assert_eq!(scope.get("loss")?.with(|t| t.to_f32_vec())??, vec![0.5]);
    Ok(())
}

#[test]
fn missing_kernel_is_reported_with_node_context() -> Result<()> {
    let desc = ProgramDesc::from_json_str(FORWARD)?;
    let mut scope = input_scope();
    let err = Program::build(
        &desc,
        &mut scope,
        &OpRegistry::with_builtins()?,
        &BuildOptions::default(),
        &NoKernels,
    )
    .unwrap_err();

    assert!(err.to_string().starts_with("op #0 mean("), "{err}");
    assert!(!err.to_string().contains("no kernel available"), "{err}");
    match err {
        LiteError::Node { index, source, .. } => {
            assert_eq!(index, 0);
            assert!(matches!(*source, LiteError::MissingKernel(ref op) if op == "mean"));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn unknown_operator_fails_the_build() -> Result<()> {
    let desc = ProgramDesc::from_json_str(r#"{"ops": [{"type": "relu"}]}"#)?;
    let mut scope = input_scope();
    let err = Program::build(
        &desc,
        &mut scope,
        &OpRegistry::with_builtins()?,
        &BuildOptions::default(),
        &NoKernels,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LiteError::Node { ref source, .. } if matches!(**source, LiteError::UnknownOperatorType(_))
    ));
    Ok(())
}

#[test]
fn skipped_ops_are_left_out() -> Result<()> {
    let desc = ProgramDesc::from_json_str(FORWARD)?;
    let mut scope = input_scope();
    let options = BuildOptions {
        skip_ops: vec!["mean".to_string()],
        ..BuildOptions::default()
    };
    let program = Program::build(
        &desc,
        &mut scope,
        &OpRegistry::with_builtins()?,
        &options,
        &NoKernels,
    )?;
    assert!(program.is_empty());
    assert!(!scope.contains("loss"));
    Ok(())
}

#[test]
fn dump_shapes_does_not_change_the_build() -> Result<()> {
    let desc = ProgramDesc::from_json_str(FORWARD)?;
    let mut scope = input_scope();
    let options = BuildOptions {
        bind_kernels: false,
        dump_shapes: true,
        ..BuildOptions::default()
    };
    let program = Program::build(
        &desc,
        &mut scope,
        &OpRegistry::with_builtins()?,
        &options,
        &NoKernels,
    )?;
    assert_eq!(program.len(), 1);
    assert_eq!(scope.shape_of("loss")?, Shape::scalar());
    Ok(())
}

#[test]
fn program_desc_round_trips_through_json() -> Result<()> {
    let desc = ProgramDesc::from_json_str(FORWARD)?;
    let again = ProgramDesc::from_json_str(&desc.to_json_string()?)?;
    assert_eq!(desc, again);
    Ok(())
}

#[cfg(feature = "train")]
#[test]
fn forward_and_backward_program() -> Result<()> {
    let desc = ProgramDesc::from_json_str(FORWARD_BACKWARD)?;
    let mut scope = input_scope();
    scope.insert_tensor("loss@GRAD", Tensor::from_vec(Shape::scalar(), vec![1.0])?);

    let kernels = FillKernels::default();
    let mut program = Program::build(
        &desc,
        &mut scope,
        &OpRegistry::with_builtins()?,
        &BuildOptions::default(),
        &kernels,
    )?;
    assert_eq!(scope.shape_of("loss")?, Shape::scalar());
    assert_eq!(scope.shape_of("x@GRAD")?, Shape::new([3, 4]));

    program.run()?;
    assert_eq!(kernels.runs.load(Ordering::SeqCst), 2);
    assert_eq!(scope.get("x@GRAD")?.with(|t| t.to_f32_vec())??, vec![0.5; 12]);
    Ok(())
}
