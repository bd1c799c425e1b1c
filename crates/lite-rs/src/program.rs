//! Programs: ordered lists of operator descriptors, bound against a scope.
//!
//! [`Program::build`] is the graph-loader side of the binding layer. It takes
//! descriptors in the order given (the caller is responsible for that order
//! being topological) and, for each one, creates the operator from a
//! registry, attaches it, checks and infers shapes, and optionally binds a
//! kernel. Output variables are declared in the scope up front so operators
//! can resolve them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::BuildOptions;
use crate::error::{LiteError, LiteResult};
use crate::kernel::KernelProvider;
use crate::op_desc::OpDesc;
use crate::operator::OpNode;
use crate::registry::OpRegistry;
use crate::scope::Scope;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDesc {
    #[serde(default)]
    pub ops: Vec<OpDesc>,
}

impl ProgramDesc {
    pub fn new(ops: Vec<OpDesc>) -> Self {
        ProgramDesc { ops }
    }

    pub fn from_json_str(raw: &str) -> LiteResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> LiteResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_string(&self) -> LiteResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Prepared operator nodes, in execution order.
#[derive(Debug, Default)]
pub struct Program {
    nodes: Vec<OpNode>,
}

impl Program {
    pub fn build(
        desc: &ProgramDesc,
        scope: &mut Scope,
        registry: &OpRegistry,
        options: &BuildOptions,
        kernels: &dyn KernelProvider,
    ) -> LiteResult<Program> {
        let ops: Vec<(usize, &OpDesc)> = desc
            .ops
            .iter()
            .enumerate()
            .filter(|(_, op)| {
                let skip = options.skips(op.op_type());
                if skip {
                    log::warn!("skipping operator {}", op);
                }
                !skip
            })
            .collect();

        for (index, op) in &ops {
            for name in op.output_vars() {
                scope.var(name).map_err(|err| node_error(*index, op, err))?;
            }
        }

        let mut nodes = Vec::with_capacity(ops.len());
        for (index, op) in ops {
            let node = build_node(op, scope, registry, options, kernels)
                .map_err(|err| node_error(index, op, err))?;
            nodes.push(node);
        }
        log::debug!("built program with {} operator(s)", nodes.len());
        Ok(Program { nodes })
    }

    /// Runs every node's kernel in order.
    pub fn run(&mut self) -> LiteResult<()> {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.run().map_err(|err| LiteError::Node {
                index,
                desc: node
                    .desc()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| node.describe().to_string()),
                source: Box::new(err),
            })?;
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[OpNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn build_node(
    desc: &OpDesc,
    scope: &Scope,
    registry: &OpRegistry,
    options: &BuildOptions,
    kernels: &dyn KernelProvider,
) -> LiteResult<OpNode> {
    let mut node = OpNode::new(registry.create(desc.op_type())?);
    node.prepare(desc, scope)?;

    if options.dump_shapes {
        for name in desc.input_vars() {
            log::info!("{} <- {}: {}", desc.op_type(), name, scope.shape_of(name)?);
        }
        for name in desc.output_vars() {
            log::info!("{} -> {}: {}", desc.op_type(), name, scope.shape_of(name)?);
        }
    }

    if options.bind_kernels {
        let kernel = kernels
            .kernel_for(desc.op_type())
            .ok_or_else(|| LiteError::MissingKernel(desc.op_type().to_string()))?;
        node.bind_kernel(kernel)?;
    }
    Ok(node)
}

fn node_error(index: usize, desc: &OpDesc, err: LiteError) -> LiteError {
    LiteError::Node {
        index,
        desc: desc.to_string(),
        source: Box::new(err),
    }
}
