//! Operator registry: maps operator type names to factories.
//!
//! Built-in operators contribute an [`OpFactoryDef`] to the [`OP_FACTORIES`]
//! distributed slice. Nothing is registered implicitly: program start calls
//! [`register_all`] once, before any graph is loaded, to install the built-ins
//! into the process-wide registry. The registry then lives until process exit.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{LiteError, LiteResult};
use crate::operator::Operator;

/// Factory that creates a fresh operator instance.
pub type OpFactory = Box<dyn Fn() -> Box<dyn Operator> + Send + Sync>;

/// Link-time description of a built-in operator kind.
pub struct OpFactoryDef {
    pub op_type: &'static str,
    pub create: fn() -> Box<dyn Operator>,
}

#[linkme::distributed_slice]
pub static OP_FACTORIES: [OpFactoryDef] = [..];

/// Name-to-factory table.
#[derive(Default)]
pub struct OpRegistry {
    factories: RwLock<HashMap<String, OpFactory>>,
}

impl OpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in operator compiled into this build.
    pub fn with_builtins() -> LiteResult<Self> {
        let registry = Self::new();
        registry.install_builtins()?;
        Ok(registry)
    }

    /// Registers `factory` under `op_type`.
    ///
    /// Registering a name twice is a configuration fault and is reported as
    /// [`LiteError::DuplicateOperator`]; the first factory stays in place.
    pub fn register<F>(&self, op_type: impl Into<String>, factory: F) -> LiteResult<()>
    where
        F: Fn() -> Box<dyn Operator> + Send + Sync + 'static,
    {
        let op_type = op_type.into();
        let mut factories = self.write()?;
        if factories.contains_key(&op_type) {
            log::warn!("operator type '{}' registered twice", op_type);
            return Err(LiteError::DuplicateOperator(op_type));
        }
        log::debug!("registered operator type '{}'", op_type);
        factories.insert(op_type, Box::new(factory));
        Ok(())
    }

    /// Creates an operator of type `op_type`.
    pub fn create(&self, op_type: &str) -> LiteResult<Box<dyn Operator>> {
        let factories = self.read()?;
        let factory = factories
            .get(op_type)
            .ok_or_else(|| LiteError::UnknownOperatorType(op_type.to_string()))?;
        Ok(factory())
    }

    pub fn contains(&self, op_type: &str) -> bool {
        self.read()
            .map(|factories| factories.contains_key(op_type))
            .unwrap_or(false)
    }

    /// Registered type names, sorted.
    pub fn op_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .read()
            .map(|factories| factories.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    fn install_builtins(&self) -> LiteResult<()> {
        for def in OP_FACTORIES.iter() {
            self.register(def.op_type, def.create)?;
        }
        Ok(())
    }

    fn read(&self) -> LiteResult<RwLockReadGuard<'_, HashMap<String, OpFactory>>> {
        self.factories.read().map_err(|_| registry_poisoned())
    }

    fn write(&self) -> LiteResult<RwLockWriteGuard<'_, HashMap<String, OpFactory>>> {
        self.factories.write().map_err(|_| registry_poisoned())
    }
}

fn registry_poisoned() -> LiteError {
    LiteError::Poisoned {
        name: "operator registry".to_string(),
    }
}

static GLOBAL_REGISTRY: OnceLock<OpRegistry> = OnceLock::new();
static BUILTINS_INSTALLED: OnceLock<Result<(), InstallFault>> = OnceLock::new();

/// Outcome of installing the built-ins, kept so repeated calls can replay it.
#[derive(Debug, Clone)]
enum InstallFault {
    Duplicate(String),
    Poisoned,
}

/// The process-wide registry.
pub fn global() -> &'static OpRegistry {
    GLOBAL_REGISTRY.get_or_init(OpRegistry::new)
}

/// Installs every built-in operator into the process-wide registry.
///
/// Only the first call does any work; later calls return the same outcome.
/// A duplicate type name, whether among the built-ins or clashing with
/// something registered earlier through [`register_op`], fails here so the
/// fault surfaces at startup rather than when a graph is loaded.
pub fn register_all() -> LiteResult<()> {
    let outcome = BUILTINS_INSTALLED.get_or_init(|| match global().install_builtins() {
        Ok(()) => Ok(()),
        Err(LiteError::DuplicateOperator(name)) => Err(InstallFault::Duplicate(name)),
        Err(_) => Err(InstallFault::Poisoned),
    });
    match outcome {
        Ok(()) => Ok(()),
        Err(InstallFault::Duplicate(name)) => Err(LiteError::DuplicateOperator(name.clone())),
        Err(InstallFault::Poisoned) => Err(registry_poisoned()),
    }
}

/// Registers an operator factory in the process-wide registry.
pub fn register_op<F>(op_type: impl Into<String>, factory: F) -> LiteResult<()>
where
    F: Fn() -> Box<dyn Operator> + Send + Sync + 'static,
{
    global().register(op_type, factory)
}

/// Creates an operator from the process-wide registry.
pub fn create_op(op_type: &str) -> LiteResult<Box<dyn Operator>> {
    global().create(op_type)
}

pub fn has_op(op_type: &str) -> bool {
    global().contains(op_type)
}

/// Type names in the process-wide registry, sorted.
pub fn list_ops() -> Vec<String> {
    global().op_types()
}
