//! The pass interface driven by [`PassManager`](crate::PassManager).

use qunroll_ir::CircuitDag;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// Whether a pass may rewrite the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Inspects the DAG and records results in the property set.
    Analysis,
    /// Rewrites the DAG.
    Transformation,
}

/// One step of a compilation pipeline.
pub trait Pass: Send + Sync {
    /// Name used in logs and in [`PassManager::pass_names`](crate::PassManager::pass_names).
    fn name(&self) -> &str;

    fn kind(&self) -> PassKind;

    /// Run over `dag`.
    ///
    /// Analysis passes leave the DAG untouched and report through
    /// `properties`. A transformation that returns an error leaves the DAG
    /// as it found it.
    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()>;

    /// Skip this pass when it returns `false`.
    fn should_run(&self, _dag: &CircuitDag, _properties: &PropertySet) -> bool {
        true
    }
}
