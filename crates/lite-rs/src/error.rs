//! Error type shared by every binding stage.
//!
//! Everything here is a soft failure: the caller learns that an operator
//! instance is unusable and decides what to do. Graph malformations that
//! break an operator's fixed contract are not represented; they panic at the
//! point of detection.

use std::io;

use thiserror::Error;

use crate::op_desc::ArgRole;
use crate::operator::OpState;

pub type LiteResult<T> = Result<T, LiteError>;

#[derive(Debug, Error)]
pub enum LiteError {
    #[error("variable '{name}' is not bound in scope")]
    UnboundVariable { name: String },
    #[error("variable '{name}' holds a {found}, expected a {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("operator '{op}' requires {role} argument '{label}'")]
    MissingArgument {
        op: String,
        role: ArgRole,
        label: String,
    },
    #[error("operator '{op}' expects {expected} name(s) for {role} argument '{label}', got {found}")]
    ArgumentCardinality {
        op: String,
        role: ArgRole,
        label: String,
        expected: usize,
        found: usize,
    },
    #[error("operator '{op}' has no tensor bound for '{field}'")]
    UnboundParam { op: String, field: &'static str },
    #[error("tensor '{name}' is no longer held by its scope")]
    DanglingReference { name: String },
    #[error("lock for '{name}' is poisoned")]
    Poisoned { name: String },
    #[error("operator '{op}' is {found}, expected at least {expected}")]
    InvalidState {
        op: String,
        expected: OpState,
        found: OpState,
    },
    #[error("unknown operator type '{0}'")]
    UnknownOperatorType(String),
    #[error("operator type '{0}' is already registered")]
    DuplicateOperator(String),
    #[error("no kernel available for operator type '{0}'")]
    MissingKernel(String),
    #[error("kernel '{kernel}' cannot take {found} parameters, expected {expected}")]
    KernelParamMismatch {
        kernel: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("kernel '{0}' was run before its parameters were set")]
    KernelNotReady(String),
    #[error("tensor holds {found} elements, expected {expected}")]
    ElementCount { expected: usize, found: usize },
    #[error("op #{index} {desc}")]
    Node {
        index: usize,
        desc: String,
        #[source]
        source: Box<LiteError>,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
