//! Instrumentation closure
//!
//! Explicitly tracked functions are always members. Functions tracked with
//! `include_nested` pull in every render function reachable through the call
//! graph, except callees marked with the skip marker.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use super::declarations::FunctionId;
use super::function_info::FunctionInfo;

/// Insertion-ordered set of function ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClosureSet {
    order: Vec<FunctionId>,
    #[serde(skip)]
    members: HashSet<FunctionId>,
}

impl ClosureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id`; returns false when it is already a member
    pub fn insert(&mut self, id: FunctionId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: FunctionId) -> bool {
        self.members.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = FunctionId> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[FunctionId] {
        &self.order
    }

    /// Compute the closure over frozen infos indexed by function id
    pub fn compute(infos: &[FunctionInfo]) -> Self {
        let mut closure = ClosureSet::new();
        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();

        for info in infos.iter().filter(|info| info.is_seed()) {
            closure.insert(info.id());
            if info.skip.skip_whole_function {
                log::debug!(
                    "{} is tracked explicitly; skip marker only blocks nested inclusion",
                    info.declaration.display_name()
                );
            }
            if info.tracking.include_nested_recursively {
                queue.push_back(info.id());
            }
        }

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let Some(info) = infos.get(current.index()) else {
                continue;
            };
            for callee in info.callees() {
                let Some(target) = infos.get(callee.index()) else {
                    continue;
                };
                if !target.is_includable() {
                    log::debug!(
                        "{} not included from {}",
                        target.declaration.display_name(),
                        info.declaration.display_name()
                    );
                    continue;
                }
                if closure.insert(callee) {
                    log::debug!(
                        "{} included through {}",
                        target.declaration.display_name(),
                        info.declaration.display_name()
                    );
                }
                queue.push_back(callee);
            }
        }

        closure
    }
}
