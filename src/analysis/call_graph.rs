//! Call graph between render functions
//!
//! Bodies are walked after the declaration index is complete. Each walk collects
//! unresolved reference sites; resolution then runs against the whole index, so
//! callees declared later in the unit are found. The graph over-approximates:
//! references inside conditionals, loops, unmarked closures and macro arguments
//! all produce edges.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{Expr, Token};

use super::annotations;
use super::declarations::{
    Body, DeclarationIndex, FunctionId, FunctionKind, ResolutionContext, SourceLocation,
};

/// How a callee is referenced from a caller's body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// `callee(...)` or `receiver.callee(...)`
    Direct,
    /// A render-marked closure literal written in the body
    FunctionLiteral,
    /// The callee named as a value, e.g. passed as render content
    Reference,
}

/// Directed edge from caller to callee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CallEdge {
    pub caller: FunctionId,
    pub callee: FunctionId,
    pub kind: CallKind,
}

/// A reference found in a body, before name resolution
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReferenceSite {
    Path {
        segments: Vec<String>,
        kind: CallKind,
    },
    Method {
        name: String,
        self_receiver: bool,
    },
    Literal(FunctionId),
}

/// Collects reference sites from one body without crossing into nested declarations
struct ReferenceCollector<'i, 'ast> {
    index: &'i DeclarationIndex<'ast>,
    sites: Vec<ReferenceSite>,
}

impl<'i, 'ast> ReferenceCollector<'i, 'ast> {
    fn collect(index: &'i DeclarationIndex<'ast>, body: Body<'ast>) -> Vec<ReferenceSite> {
        let mut collector = Self {
            index,
            sites: Vec::new(),
        };
        match body {
            Body::Block(block) => collector.visit_block(block),
            Body::Expr(expr) => collector.visit_expr(expr),
        }
        collector.sites
    }
}

fn path_segments(path: &syn::Path) -> Vec<String> {
    path.segments
        .iter()
        .map(|seg| seg.ident.to_string())
        .collect()
}

impl<'i, 'ast, 'v> Visit<'v> for ReferenceCollector<'i, 'ast> {
    fn visit_expr_call(&mut self, node: &'v syn::ExprCall) {
        match node.func.as_ref() {
            Expr::Path(callee) => self.sites.push(ReferenceSite::Path {
                segments: path_segments(&callee.path),
                kind: CallKind::Direct,
            }),
            other => self.visit_expr(other),
        }
        for arg in &node.args {
            self.visit_expr(arg);
        }
    }

    fn visit_expr_method_call(&mut self, node: &'v syn::ExprMethodCall) {
        let self_receiver =
            matches!(node.receiver.as_ref(), Expr::Path(p) if p.path.is_ident("self"));
        self.sites.push(ReferenceSite::Method {
            name: node.method.to_string(),
            self_receiver,
        });
        self.visit_expr(&node.receiver);
        for arg in &node.args {
            self.visit_expr(arg);
        }
    }

    fn visit_expr_path(&mut self, node: &'v syn::ExprPath) {
        self.sites.push(ReferenceSite::Path {
            segments: path_segments(&node.path),
            kind: CallKind::Reference,
        });
    }

    fn visit_expr_closure(&mut self, node: &'v syn::ExprClosure) {
        if annotations::is_render_marked(&node.attrs) {
            let location = SourceLocation::of(node.or1_token.spans[0]);
            if let Some(id) = self.index.lookup(location) {
                self.sites.push(ReferenceSite::Literal(id));
                return;
            }
            // Not declared (e.g. inside a macro): its references belong to the enclosing body.
        }
        visit::visit_expr_closure(self, node);
    }

    // Nested items are separate declarations with their own bodies.
    fn visit_item(&mut self, _node: &'v syn::Item) {}

    fn visit_macro(&mut self, node: &'v syn::Macro) {
        if let Ok(args) = node.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            for arg in &args {
                self.visit_expr(arg);
            }
        } else if let Ok(stmts) = node.parse_body_with(syn::Block::parse_within) {
            for stmt in &stmts {
                self.visit_stmt(stmt);
            }
        } else {
            log::debug!(
                "Macro {} has no expression body; references inside are not tracked",
                path_segments(&node.path).join("::")
            );
        }
    }
}

/// Name lookup tables over render functions
struct NameTable {
    by_path: HashMap<Vec<String>, Vec<FunctionId>>,
    by_name: HashMap<String, Vec<FunctionId>>,
}

impl NameTable {
    fn new(index: &DeclarationIndex<'_>) -> Self {
        let mut by_path: HashMap<Vec<String>, Vec<FunctionId>> = HashMap::new();
        let mut by_name: HashMap<String, Vec<FunctionId>> = HashMap::new();
        for function in index.functions() {
            let declaration = &function.declaration;
            if !declaration.is_render {
                continue;
            }
            if let Some(path) = &function.source_path {
                by_path.entry(path.clone()).or_default().push(declaration.id);
            }
            if declaration.kind != FunctionKind::Closure {
                by_name
                    .entry(declaration.local_name.clone())
                    .or_default()
                    .push(declaration.id);
            }
        }
        Self { by_path, by_name }
    }

    fn resolve_path(
        &self,
        index: &DeclarationIndex<'_>,
        segments: &[String],
        context: &ResolutionContext,
    ) -> Vec<FunctionId> {
        let mut segments: Vec<String> = segments.to_vec();
        let mut base = context.module.clone();

        let head = segments.first().cloned();
        match head.as_deref() {
            Some("crate") => {
                base.clear();
                segments.remove(0);
            }
            Some("self") => {
                segments.remove(0);
            }
            Some("super") => {
                while segments.first().map(String::as_str) == Some("super") {
                    base.pop();
                    segments.remove(0);
                }
            }
            Some("Self") => match &context.self_type {
                Some(ty) => segments[0] = ty.clone(),
                None => return Vec::new(),
            },
            _ => {}
        }
        if segments.is_empty() {
            return Vec::new();
        }

        // Exact match relative to the current module, then each ancestor.
        let mut scope = base;
        loop {
            let mut key = scope.clone();
            key.extend(segments.iter().cloned());
            if let Some(ids) = self.by_path.get(&key) {
                return ids.clone();
            }
            if scope.pop().is_none() {
                break;
            }
        }

        // Fall back to every render function whose path ends with the written path.
        let last = &segments[segments.len() - 1];
        let Some(candidates) = self.by_name.get(last) else {
            return Vec::new();
        };
        candidates
            .iter()
            .copied()
            .filter(|id| match index.get(*id).and_then(|f| f.source_path.as_ref()) {
                Some(path) => path.ends_with(&segments),
                None => segments.len() == 1,
            })
            .collect()
    }

    fn resolve_method(
        &self,
        index: &DeclarationIndex<'_>,
        name: &str,
        self_receiver: bool,
        context: &ResolutionContext,
    ) -> Vec<FunctionId> {
        if self_receiver {
            if let Some(ty) = &context.self_type {
                let mut scope = context.module.clone();
                loop {
                    let mut key = scope.clone();
                    key.push(ty.clone());
                    key.push(name.to_string());
                    if let Some(ids) = self.by_path.get(&key) {
                        return ids.clone();
                    }
                    if scope.pop().is_none() {
                        break;
                    }
                }
            }
        }
        self.by_name
            .get(name)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| {
                        index
                            .get(*id)
                            .map(|f| f.declaration.kind.is_method())
                            .unwrap_or(false)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Directed call graph over function ids
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    graph: DiGraph<FunctionId, CallKind>,
    nodes: HashMap<FunctionId, NodeIndex>,
}

impl CallGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for every render function with a body in the index
    pub fn build(index: &DeclarationIndex<'_>) -> Self {
        let names = NameTable::new(index);
        let mut graph = CallGraph::new();
        for function in index.functions() {
            graph.node(function.declaration.id);
        }

        for function in index.functions() {
            let caller = function.declaration.id;
            if !function.declaration.is_render {
                continue;
            }
            let Some(body) = function.body else {
                continue;
            };

            for site in ReferenceCollector::collect(index, body) {
                let (callees, kind) = match &site {
                    ReferenceSite::Path { segments, kind } => {
                        (names.resolve_path(index, segments, &function.context), *kind)
                    }
                    ReferenceSite::Method {
                        name,
                        self_receiver,
                    } => (
                        names.resolve_method(index, name, *self_receiver, &function.context),
                        CallKind::Direct,
                    ),
                    ReferenceSite::Literal(id) => (vec![*id], CallKind::FunctionLiteral),
                };
                for callee in callees {
                    graph.add_edge(caller, callee, kind);
                }
            }
        }

        log::debug!(
            "Call graph: {} nodes, {} edges",
            graph.graph.node_count(),
            graph.graph.edge_count()
        );
        graph
    }

    fn node(&mut self, id: FunctionId) -> NodeIndex {
        if let Some(node) = self.nodes.get(&id) {
            return *node;
        }
        let node = self.graph.add_node(id);
        self.nodes.insert(id, node);
        node
    }

    /// Add an edge; returns false when the pair is already connected
    pub fn add_edge(&mut self, caller: FunctionId, callee: FunctionId, kind: CallKind) -> bool {
        let from = self.node(caller);
        let to = self.node(callee);
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, kind);
        true
    }

    /// Outgoing edges of `caller` in the order they were discovered
    pub fn edges_from(&self, caller: FunctionId) -> Vec<CallEdge> {
        let Some(node) = self.nodes.get(&caller) else {
            return Vec::new();
        };
        let mut edges: Vec<CallEdge> = self
            .graph
            .edges_directed(*node, Direction::Outgoing)
            .map(|edge| CallEdge {
                caller,
                callee: self.graph[edge.target()],
                kind: *edge.weight(),
            })
            .collect();
        // petgraph yields the most recently added edge first
        edges.reverse();
        edges
    }

    pub fn contains_edge(&self, caller: FunctionId, callee: FunctionId) -> bool {
        match (self.nodes.get(&caller), self.nodes.get(&callee)) {
            (Some(from), Some(to)) => self.graph.find_edge(*from, *to).is_some(),
            _ => false,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// All edges, grouped by caller in id order
    pub fn edges(&self) -> Vec<CallEdge> {
        let mut callers: Vec<FunctionId> = self.nodes.keys().copied().collect();
        callers.sort();
        callers
            .into_iter()
            .flat_map(|caller| self.edges_from(caller))
            .collect()
    }

    /// Export to DOT; `label` names each node, `highlighted` nodes are filled
    pub fn to_dot<L, H>(&self, label: L, highlighted: H) -> String
    where
        L: Fn(FunctionId) -> String,
        H: Fn(FunctionId) -> bool,
    {
        let mut dot = String::new();
        dot.push_str("digraph CallGraph {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box];\n\n");

        let mut nodes: Vec<(FunctionId, NodeIndex)> =
            self.nodes.iter().map(|(id, node)| (*id, *node)).collect();
        nodes.sort();
        for (id, node) in &nodes {
            let mut attributes = vec![format!("label=\"{}\"", escape_label(&label(*id)))];
            if highlighted(*id) {
                attributes.push("style=filled".to_string());
                attributes.push("fillcolor=\"lightblue\"".to_string());
            }
            dot.push_str(&format!("  {} [{}];\n", node.index(), attributes.join(", ")));
        }

        dot.push('\n');

        for edge in self.edges() {
            let from = self.nodes[&edge.caller];
            let to = self.nodes[&edge.callee];
            let style = match edge.kind {
                CallKind::Direct => "solid",
                CallKind::FunctionLiteral => "dashed",
                CallKind::Reference => "dotted",
            };
            dot.push_str(&format!(
                "  {} -> {} [style={}];\n",
                from.index(),
                to.index(),
                style
            ));
        }

        dot.push_str("}\n");
        dot
    }
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
