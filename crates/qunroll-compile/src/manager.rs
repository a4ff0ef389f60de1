//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use qunroll_ir::CircuitDag;

use crate::basis::BasisSet;
use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::GatesInBasis;
use crate::property::PropertySet;
use crate::rules::RuleTable;
use crate::unroller::{DEFAULT_MAX_DEPTH, Unroller};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given DAG, stopping at the first error.
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(dag, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(dag, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!("Pass manager completed, ops: {}", dag.num_ops());
        Ok(())
    }

    /// Names of the passes, in run order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the standard unroll-then-verify pipeline.
pub struct PassManagerBuilder {
    properties: PropertySet,
    rules: RuleTable,
    max_depth: usize,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            properties: PropertySet::new(),
            rules: RuleTable::standard(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the target basis.
    #[must_use]
    pub fn with_basis(mut self, basis: BasisSet) -> Self {
        self.properties.basis_gates = Some(basis);
        self
    }

    /// Set the starting properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Replace the standard rule table.
    #[must_use]
    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    /// Set the bound on nested rule applications.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the pass manager and return it with the properties.
    ///
    /// Both passes read the basis from the returned properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();
        pm.add_pass(
            Unroller::default()
                .with_rules(self.rules)
                .with_max_depth(self.max_depth),
        );
        pm.add_pass(GatesInBasis::new());
        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
