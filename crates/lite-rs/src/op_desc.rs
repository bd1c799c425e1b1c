//! Operator descriptors and the gradient naming convention.
//!
//! An [`OpDesc`] is the name-based view of one graph node: a type tag plus
//! `inputs` / `outputs` maps from argument labels to ordered variable names.
//! Descriptors are immutable once built; operators only read them while
//! attaching.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LiteError, LiteResult};

/// Suffix appended to a forward variable name to form its gradient's name.
pub const GRAD_SUFFIX: &str = "@GRAD";

/// Name of the gradient variable paired with forward variable `name`.
pub fn grad_name(name: &str) -> String {
    format!("{name}{GRAD_SUFFIX}")
}

/// Whether `name` follows the gradient naming convention.
pub fn is_grad_name(name: &str) -> bool {
    name.len() > GRAD_SUFFIX.len() && name.ends_with(GRAD_SUFFIX)
}

/// Forward variable name a gradient name was derived from, or `name` itself
/// when it carries no gradient suffix.
pub fn forward_name(name: &str) -> &str {
    if is_grad_name(name) {
        &name[..name.len() - GRAD_SUFFIX.len()]
    } else {
        name
    }
}

/// Which side of a descriptor an argument label lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgRole {
    Input,
    Output,
}

impl fmt::Display for ArgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgRole::Input => f.write_str("input"),
            ArgRole::Output => f.write_str("output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpDesc {
    #[serde(rename = "type")]
    op_type: String,
    #[serde(default)]
    inputs: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    outputs: BTreeMap<String, Vec<String>>,
}

impl OpDesc {
    pub fn new(op_type: impl Into<String>) -> Self {
        OpDesc {
            op_type: op_type.into(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) an input argument.
    pub fn with_input<I, S>(mut self, label: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs
            .insert(label.into(), names.into_iter().map(Into::into).collect());
        self
    }

    /// Adds (or replaces) an output argument.
    pub fn with_output<I, S>(mut self, label: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs
            .insert(label.into(), names.into_iter().map(Into::into).collect());
        self
    }

    pub fn op_type(&self) -> &str {
        &self.op_type
    }

    /// Variable names bound to input `label`; empty when the label is absent.
    pub fn input(&self, label: &str) -> &[String] {
        self.inputs.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Variable names bound to output `label`; empty when the label is absent.
    pub fn output(&self, label: &str) -> &[String] {
        self.outputs.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Input argument labels, sorted.
    pub fn input_argument_names(&self) -> Vec<&str> {
        self.inputs.keys().map(String::as_str).collect()
    }

    /// Every variable name written by this op, in label order.
    pub fn output_vars(&self) -> impl Iterator<Item = &str> {
        self.outputs.values().flatten().map(String::as_str)
    }

    /// Every variable name read by this op, in label order.
    pub fn input_vars(&self) -> impl Iterator<Item = &str> {
        self.inputs.values().flatten().map(String::as_str)
    }

    /// The only variable name bound to input `label`.
    pub fn single_input(&self, label: &str) -> LiteResult<&str> {
        self.single(ArgRole::Input, label)
    }

    /// The only variable name bound to output `label`.
    pub fn single_output(&self, label: &str) -> LiteResult<&str> {
        self.single(ArgRole::Output, label)
    }

    fn single(&self, role: ArgRole, label: &str) -> LiteResult<&str> {
        let names = match role {
            ArgRole::Input => self.input(label),
            ArgRole::Output => self.output(label),
        };
        match names {
            [] => Err(LiteError::MissingArgument {
                op: self.op_type.clone(),
                role,
                label: label.to_string(),
            }),
            [name] => Ok(name.as_str()),
            _ => Err(LiteError::ArgumentCardinality {
                op: self.op_type.clone(),
                role,
                label: label.to_string(),
                expected: 1,
                found: names.len(),
            }),
        }
    }
}

fn fmt_args(f: &mut fmt::Formatter<'_>, args: &BTreeMap<String, Vec<String>>) -> fmt::Result {
    write!(f, "{{")?;
    for (idx, (label, names)) in args.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{label}: [{}]", names.join(", "))?;
    }
    write!(f, "}}")
}

impl fmt::Display for OpDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(inputs=", self.op_type)?;
        fmt_args(f, &self.inputs)?;
        write!(f, ", outputs=")?;
        fmt_args(f, &self.outputs)?;
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grad_names_round_trip_through_forward_name() {
        assert_eq!(grad_name("Out"), "Out@GRAD");
        assert!(is_grad_name("Out@GRAD"));
        assert!(!is_grad_name("@GRAD"));
        assert_eq!(forward_name("Out@GRAD"), "Out");
        assert_eq!(forward_name("Out"), "Out");
    }

    #[test]
    fn single_argument_cardinality() {
        let desc = OpDesc::new("mean")
            .with_input("X", ["a", "b"])
            .with_output("Out", ["c"]);
        assert_eq!(desc.single_output("Out").unwrap(), "c");
        assert!(matches!(
            desc.single_input("X"),
            Err(LiteError::ArgumentCardinality { found: 2, .. })
        ));
        assert!(matches!(
            desc.single_input("Y"),
            Err(LiteError::MissingArgument {
                role: ArgRole::Input,
                ..
            })
        ));
    }

    #[test]
    fn display_is_stable() {
        let desc = OpDesc::new("mean_grad")
            .with_input("X", ["x"])
            .with_input("Out@GRAD", ["out@GRAD"])
            .with_output("X@GRAD", ["x@GRAD"]);
        assert_eq!(
            desc.to_string(),
            "mean_grad(inputs={Out@GRAD: [out@GRAD], X: [x]}, outputs={X@GRAD: [x@GRAD]})"
        );
    }

    #[test]
    fn deserializes_from_json() {
        let desc: OpDesc =
            serde_json::from_str(r#"{"type": "mean", "inputs": {"X": ["x"]}, "outputs": {"Out": ["y"]}}"#)
                .unwrap();
        assert_eq!(desc.op_type(), "mean");
        assert_eq!(desc.input("X"), ["x".to_string()]);
        assert_eq!(desc.input_vars().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(desc.output_vars().collect::<Vec<_>>(), vec!["y"]);
    }
}
