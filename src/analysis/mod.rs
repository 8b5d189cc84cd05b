//! Static analysis of one compilation unit
//!
//! This module decides which render functions receive instrumentation:
//! - Declaration indexing and annotation resolution
//! - Call graph construction between render functions
//! - Closure computation over nested-included calls

pub mod annotations;
pub mod call_graph;
pub mod closure;
pub mod declarations;
pub mod function_info;

pub use annotations::{SkipConfig, TrackingConfig};
pub use call_graph::{CallEdge, CallGraph, CallKind};
pub use closure::ClosureSet;
pub use declarations::{
    DeclarationIndex, FunctionDeclaration, FunctionId, FunctionKind, Param, ScopeLabel,
    SourceLocation, TypeShape,
};
pub use function_info::FunctionInfo;

use crate::options::InstrumentOptions;

/// Result of analyzing a compilation unit
#[derive(Debug, Clone)]
pub struct Analysis {
    functions: Vec<FunctionInfo>,
    call_graph: CallGraph,
    closure: ClosureSet,
    locations: std::collections::HashMap<SourceLocation, FunctionId>,
    warnings: Vec<String>,
}

impl Analysis {
    /// Index, build the call graph, freeze infos, then compute the closure
    pub fn run(file: &syn::File, options: &InstrumentOptions) -> Self {
        let index = DeclarationIndex::build(file, options);
        let call_graph = CallGraph::build(&index);
        let functions = FunctionInfo::freeze_all(&index, &call_graph);

        let mut warnings = Vec::new();
        for info in &functions {
            if info.tracking.is_tracked && !info.is_render() {
                let message = format!(
                    "{} carries {} but is not a render function; marker ignored",
                    info.declaration.display_name(),
                    annotations::TRACK_MARKER
                );
                log::warn!("{}", message);
                warnings.push(message);
            }
        }

        let closure = ClosureSet::compute(&functions);
        log::debug!(
            "Closure: {} of {} functions",
            closure.len(),
            functions.len()
        );

        Self {
            functions,
            call_graph,
            closure,
            locations: index.locations().clone(),
            warnings,
        }
    }

    pub fn function(&self, id: FunctionId) -> Option<&FunctionInfo> {
        self.functions.get(id.index())
    }

    pub fn functions(&self) -> &[FunctionInfo] {
        &self.functions
    }

    /// Find a function by display name
    pub fn find(&self, display_name: &str) -> Option<&FunctionInfo> {
        self.functions
            .iter()
            .find(|info| info.declaration.display_name() == display_name)
    }

    pub fn closure(&self) -> &ClosureSet {
        &self.closure
    }

    pub fn call_graph(&self) -> &CallGraph {
        &self.call_graph
    }

    pub fn lookup(&self, location: SourceLocation) -> Option<FunctionId> {
        self.locations.get(&location).copied()
    }

    /// Closure members in insertion order, resolved to their infos
    pub fn instrumentation_targets(&self) -> impl Iterator<Item = &FunctionInfo> + '_ {
        self.closure.iter().filter_map(|id| self.function(id))
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// DOT rendering of the call graph with closure members highlighted
    pub fn call_graph_dot(&self) -> String {
        self.call_graph.to_dot(
            |id| {
                self.function(id)
                    .map(|info| info.declaration.display_name())
                    .unwrap_or_else(|| id.to_string())
            },
            |id| self.closure.contains(id),
        )
    }
}
