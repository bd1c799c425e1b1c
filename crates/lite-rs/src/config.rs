//! Options for building programs, with environment overrides.

use std::env;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::LiteResult;

static DUMP_SHAPES: OnceLock<Option<bool>> = OnceLock::new();
static BIND_KERNELS: OnceLock<Option<bool>> = OnceLock::new();

fn parse_bool(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
}

fn env_flag(cell: &OnceLock<Option<bool>>, key: &str) -> Option<bool> {
    *cell.get_or_init(|| match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(parse_bool(&value)),
        _ => None,
    })
}

/// Controls what [`Program::build`](crate::program::Program::build) does
/// beyond attaching and inferring shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Bind a kernel to every node once its shapes are inferred.
    pub bind_kernels: bool,
    /// Log every output shape at `info` level after inference.
    pub dump_shapes: bool,
    /// Operator types the builder leaves out of the program.
    pub skip_ops: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            bind_kernels: true,
            dump_shapes: false,
            skip_ops: Vec::new(),
        }
    }
}

impl BuildOptions {
    /// Defaults with `LITE_RS_BIND_KERNELS` / `LITE_RS_DUMP_SHAPES` applied.
    ///
    /// The environment is read once per process.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn from_json_str(raw: &str) -> LiteResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> LiteResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(flag) = env_flag(&BIND_KERNELS, "LITE_RS_BIND_KERNELS") {
            self.bind_kernels = flag;
        }
        if let Some(flag) = env_flag(&DUMP_SHAPES, "LITE_RS_DUMP_SHAPES") {
            self.dump_shapes = flag;
        }
        self
    }

    pub fn skips(&self, op_type: &str) -> bool {
        self.skip_ops.iter().any(|skip| skip == op_type)
    }
}
