//! Variable scope: the symbol table that owns every tensor of a graph instance.
//!
//! The scope holds each variable behind an `Arc<RwLock<_>>` and hands out
//! [`TensorRef`] / [`TensorMut`] handles that keep only a `Weak` pointer back
//! to the storage. Operators and kernels therefore never own a tensor: once a
//! name is removed or rebound, every handle taken before that point reports
//! [`LiteError::DanglingReference`] instead of keeping stale storage alive.
//!
//! The scope does no locking beyond what a single access needs. Kernels that
//! run concurrently must be scheduled so that no tensor is read while another
//! kernel writes it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use crate::error::{LiteError, LiteResult};
use crate::tensor::{Shape, Tensor};

/// Kind of value bound to a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Tensor,
    TensorList,
}

impl VarKind {
    pub fn name(self) -> &'static str {
        match self {
            VarKind::Tensor => "tensor",
            VarKind::TensorList => "tensor list",
        }
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
enum Slot {
    Tensor(Arc<RwLock<Tensor>>),
    TensorList(Arc<RwLock<Vec<Tensor>>>),
}

impl Slot {
    fn kind(&self) -> VarKind {
        match self {
            Slot::Tensor(_) => VarKind::Tensor,
            Slot::TensorList(_) => VarKind::TensorList,
        }
    }
}

/// Mutable mapping from variable names to the tensors they own.
#[derive(Debug, Default)]
pub struct Scope {
    vars: HashMap<String, Slot>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `tensor` under `name`, replacing whatever was bound before.
    ///
    /// Handles taken on a replaced variable become dangling.
    pub fn insert_tensor(&mut self, name: impl Into<String>, tensor: Tensor) {
        self.vars
            .insert(name.into(), Slot::Tensor(Arc::new(RwLock::new(tensor))));
    }

    /// Binds a tensor array under `name`, replacing whatever was bound before.
    pub fn insert_tensor_list(&mut self, name: impl Into<String>, tensors: Vec<Tensor>) {
        self.vars.insert(
            name.into(),
            Slot::TensorList(Arc::new(RwLock::new(tensors))),
        );
    }

    /// Returns a writable handle on `name`, declaring an unsized tensor if
    /// the name is not bound yet.
    ///
    /// An existing binding is reused as-is, so storage identity is stable
    /// across repeated declarations.
    pub fn var(&mut self, name: &str) -> LiteResult<TensorMut> {
        if !self.vars.contains_key(name) {
            log::trace!("declaring variable '{}'", name);
            self.insert_tensor(name, Tensor::declared());
        }
        self.get_mutable(name)
    }

    /// Read-only lookup of a tensor variable.
    pub fn get(&self, name: &str) -> LiteResult<TensorRef> {
        Ok(TensorRef {
            name: name.to_string(),
            cell: self.tensor_cell(name)?,
        })
    }

    /// Writable lookup of a tensor variable.
    pub fn get_mutable(&self, name: &str) -> LiteResult<TensorMut> {
        Ok(TensorMut {
            name: name.to_string(),
            cell: self.tensor_cell(name)?,
        })
    }

    /// Runs `f` over the tensors of a tensor-list variable.
    pub fn with_tensor_list<R>(&self, name: &str, f: impl FnOnce(&[Tensor]) -> R) -> LiteResult<R> {
        match self.vars.get(name) {
            None => Err(LiteError::UnboundVariable {
                name: name.to_string(),
            }),
            Some(Slot::TensorList(cell)) => {
                let guard = cell.read().map_err(|_| LiteError::Poisoned {
                    name: name.to_string(),
                })?;
                Ok(f(&guard))
            }
            Some(other) => Err(LiteError::TypeMismatch {
                name: name.to_string(),
                expected: VarKind::TensorList.name(),
                found: other.kind().name(),
            }),
        }
    }

    /// Current shape of a tensor variable.
    pub fn shape_of(&self, name: &str) -> LiteResult<Shape> {
        self.get(name)?.shape()
    }

    /// Kind of the variable bound under `name`, if any.
    pub fn kind_of(&self, name: &str) -> Option<VarKind> {
        self.vars.get(name).map(Slot::kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Unbinds `name`. Returns whether a variable was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.vars.remove(name).is_some()
    }

    /// Bound names in lexicographic order.
    pub fn var_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.vars.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    fn tensor_cell(&self, name: &str) -> LiteResult<Weak<RwLock<Tensor>>> {
        match self.vars.get(name) {
            None => Err(LiteError::UnboundVariable {
                name: name.to_string(),
            }),
            Some(Slot::Tensor(cell)) => Ok(Arc::downgrade(cell)),
            Some(other) => Err(LiteError::TypeMismatch {
                name: name.to_string(),
                expected: VarKind::Tensor.name(),
                found: other.kind().name(),
            }),
        }
    }
}

fn upgrade(name: &str, cell: &Weak<RwLock<Tensor>>) -> LiteResult<Arc<RwLock<Tensor>>> {
    cell.upgrade().ok_or_else(|| LiteError::DanglingReference {
        name: name.to_string(),
    })
}

fn poisoned(name: &str) -> LiteError {
    LiteError::Poisoned {
        name: name.to_string(),
    }
}

/// Non-owning, read-only handle on a scope tensor.
#[derive(Debug, Clone)]
pub struct TensorRef {
    name: String,
    cell: Weak<RwLock<Tensor>>,
}

impl TensorRef {
    /// Name the tensor was resolved from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrows the tensor for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&Tensor) -> R) -> LiteResult<R> {
        let cell = upgrade(&self.name, &self.cell)?;
        let guard = cell.read().map_err(|_| poisoned(&self.name))?;
        Ok(f(&guard))
    }

    pub fn shape(&self) -> LiteResult<Shape> {
        self.with(|tensor| tensor.shape().clone())
    }

    /// Whether the scope still holds the referenced tensor.
    pub fn is_live(&self) -> bool {
        self.cell.strong_count() > 0
    }

    /// Whether both handles point at the same storage.
    pub fn same_storage(&self, other: &TensorRef) -> bool {
        Weak::ptr_eq(&self.cell, &other.cell)
    }
}

/// Non-owning, writable handle on a scope tensor.
#[derive(Debug, Clone)]
pub struct TensorMut {
    name: String,
    cell: Weak<RwLock<Tensor>>,
}

impl TensorMut {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with<R>(&self, f: impl FnOnce(&Tensor) -> R) -> LiteResult<R> {
        let cell = upgrade(&self.name, &self.cell)?;
        let guard = cell.read().map_err(|_| poisoned(&self.name))?;
        Ok(f(&guard))
    }

    /// Mutably borrows the tensor for the duration of `f`.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Tensor) -> R) -> LiteResult<R> {
        let cell = upgrade(&self.name, &self.cell)?;
        let mut guard = cell.write().map_err(|_| poisoned(&self.name))?;
        Ok(f(&mut guard))
    }

    pub fn shape(&self) -> LiteResult<Shape> {
        self.with(|tensor| tensor.shape().clone())
    }

    /// Rewrites the tensor's shape metadata; storage is left untouched.
    pub fn resize(&self, shape: Shape) -> LiteResult<()> {
        self.with_mut(|tensor| tensor.resize(shape))
    }

    pub fn is_live(&self) -> bool {
        self.cell.strong_count() > 0
    }

    /// Read-only view of the same tensor.
    pub fn to_ref(&self) -> TensorRef {
        TensorRef {
            name: self.name.clone(),
            cell: self.cell.clone(),
        }
    }
}
