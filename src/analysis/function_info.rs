//! Frozen per-function analysis results

use serde::Serialize;

use super::annotations::{SkipConfig, TrackingConfig};
use super::call_graph::{CallEdge, CallGraph};
use super::declarations::{DeclarationIndex, FunctionDeclaration, FunctionId};

/// Immutable snapshot of one function after call-graph construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionInfo {
    pub declaration: FunctionDeclaration,
    pub tracking: TrackingConfig,
    pub skip: SkipConfig,
    /// Outgoing edges in discovery order
    pub calls: Vec<CallEdge>,
}

impl FunctionInfo {
    pub fn new(
        declaration: FunctionDeclaration,
        tracking: TrackingConfig,
        skip: SkipConfig,
        calls: Vec<CallEdge>,
    ) -> Self {
        Self {
            declaration,
            tracking,
            skip,
            calls,
        }
    }

    pub fn id(&self) -> FunctionId {
        self.declaration.id
    }

    pub fn is_render(&self) -> bool {
        self.declaration.is_render
    }

    pub fn has_body(&self) -> bool {
        self.declaration.has_body
    }

    /// Tracked render function with a body
    pub fn is_seed(&self) -> bool {
        self.tracking.is_tracked && self.is_render() && self.has_body()
    }

    /// Can be pulled in by a nested-including caller
    pub fn is_includable(&self) -> bool {
        self.is_render() && self.has_body() && !self.skip.skip_whole_function
    }

    pub fn callees(&self) -> impl Iterator<Item = FunctionId> + '_ {
        self.calls.iter().map(|edge| edge.callee)
    }

    /// Freeze one info per indexed function, in id order
    pub fn freeze_all(index: &DeclarationIndex<'_>, graph: &CallGraph) -> Vec<FunctionInfo> {
        index
            .functions()
            .iter()
            .map(|function| {
                FunctionInfo::new(
                    function.declaration.clone(),
                    function.tracking,
                    function.skip.clone(),
                    graph.edges_from(function.declaration.id),
                )
            })
            .collect()
    }
}
