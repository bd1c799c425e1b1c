//! Subcommand implementations.

use std::path::Path;

use anyhow::{Context, Result};
use lite_rs::kernel::NoKernels;
use lite_rs::{registry, BuildOptions, Program, ProgramDesc, Scope, Shape, Tensor};
use lite_rs_kernels_ref::CpuKernels;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn check(
    program: &Path,
    inputs: &[(String, Shape)],
    options: Option<&Path>,
    run: bool,
    seed: u64,
) -> Result<()> {
    registry::register_all().context("failed to register built-in operators")?;

    let desc = ProgramDesc::from_json_file(program)
        .with_context(|| format!("failed to load program {}", program.display()))?;
    let mut options = match options {
        Some(path) => BuildOptions::from_json_file(path)
            .with_context(|| format!("failed to load build options {}", path.display()))?
            .with_env_overrides(),
        None => BuildOptions::from_env(),
    };
    if run && !options.bind_kernels {
        log::warn!("--run needs kernels; ignoring bind_kernels=false");
    }
    options.bind_kernels = run;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut scope = Scope::new();
    for (name, shape) in inputs {
        let tensor = if run {
            let values: Vec<f32> = (0..shape.num_elements())
                .map(|_| rng.gen_range(-1.0..1.0))
                .collect();
            Tensor::from_vec(shape.clone(), values)?
        } else {
            Tensor::zeros(shape.clone())
        };
        scope.insert_tensor(name.clone(), tensor);
    }

    let mut built = if options.bind_kernels {
        Program::build(&desc, &mut scope, registry::global(), &options, &CpuKernels)
    } else {
        Program::build(&desc, &mut scope, registry::global(), &options, &NoKernels)
    }
    .context("failed to build program")?;
    log::info!("prepared {} operator(s)", built.len());

    if run {
        built.run().context("kernel execution failed")?;
    }

    for name in scope.var_names() {
        let Ok(var) = scope.get(&name) else {
            println!("{name}: <tensor list>");
            continue;
        };
        let shape = var.shape()?;
        if run && shape.num_elements() <= 8 {
            match var.with(|t| t.to_f32_vec())? {
                Ok(values) => println!("{name}: {shape} {values:?}"),
                Err(_) => println!("{name}: {shape}"),
            }
        } else {
            println!("{name}: {shape}");
        }
    }
    Ok(())
}

pub fn ops() -> Result<()> {
    registry::register_all().context("failed to register built-in operators")?;
    for name in registry::list_ops() {
        println!("{name}");
    }
    Ok(())
}
