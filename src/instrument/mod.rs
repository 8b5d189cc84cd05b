//! Instrumentation of render function bodies
//!
//! Every function in the closure gets one tracker call prepended to its body.
//! Functions are matched to analysis results by the source location of their
//! name token, so the file must be the one the analysis ran on.

pub mod snapshot;

use std::collections::HashSet;

use syn::visit_mut::{self, VisitMut};
use syn::{parse_quote, Block, Expr, Ident, Path, Stmt};

use crate::analysis::{Analysis, FunctionId, FunctionInfo, SourceLocation};
use crate::options::InstrumentOptions;

/// Name of the runtime entry point the injected statement calls
pub const TRACKER_ENTRY: &str = "recomposition_tracker";

/// Why instrumentation cannot run with the configured options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolvable {
    pub message: String,
}

/// What one injection pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionSummary {
    /// Functions whose body received a tracker call, in rewrite order
    pub instrumented: Vec<FunctionId>,
    /// Closure members left untouched (already instrumented or no host parameter)
    pub untouched: Vec<FunctionId>,
    pub warnings: Vec<String>,
}

/// Rewrites bodies; remembers rewritten functions across passes
#[derive(Debug)]
pub struct Injector {
    runtime: Path,
    host: Ident,
    visited: HashSet<FunctionId>,
}

impl Injector {
    pub fn new(options: &InstrumentOptions) -> Result<Self, Unresolvable> {
        let runtime = syn::parse_str::<Path>(&options.runtime_path).map_err(|err| Unresolvable {
            message: format!(
                "runtime path `{}` is not a path ({}); instrumentation skipped",
                options.runtime_path, err
            ),
        })?;
        let host = syn::parse_str::<Ident>(&options.host_context).map_err(|err| Unresolvable {
            message: format!(
                "host context `{}` is not an identifier ({}); instrumentation skipped",
                options.host_context, err
            ),
        })?;
        Ok(Self {
            runtime,
            host,
            visited: HashSet::new(),
        })
    }

    /// Rewrite every closure member found in `file`
    pub fn apply(&mut self, file: &mut syn::File, analysis: &Analysis) -> InjectionSummary {
        let mut pass = InjectionPass {
            injector: self,
            analysis,
            summary: InjectionSummary::default(),
        };
        pass.visit_file_mut(file);

        let summary = pass.summary;
        log::info!(
            "Instrumented {} functions ({} untouched)",
            summary.instrumented.len(),
            summary.untouched.len()
        );
        summary
    }

    fn tracker_stmt(&self, info: &FunctionInfo) -> Stmt {
        let runtime = &self.runtime;
        let host = &self.host;
        let name = info.declaration.display_name();
        let params = snapshot::captured_params(info, host);
        let arguments = snapshot::arguments_expr(runtime, &params);
        let skipped = snapshot::skipped_expr(info);
        parse_quote! {
            #runtime::recomposition_tracker(#host, #name, #arguments, #skipped);
        }
    }
}

/// Whether `stmt` is a call to the tracker entry point
fn is_tracker_call(stmt: &Stmt) -> bool {
    let expr = match stmt {
        Stmt::Expr(expr, Some(_)) => expr,
        _ => return false,
    };
    match expr {
        Expr::Call(call) => match call.func.as_ref() {
            Expr::Path(path) => path
                .path
                .segments
                .last()
                .map(|seg| seg.ident == TRACKER_ENTRY)
                .unwrap_or(false),
            _ => false,
        },
        _ => false,
    }
}

pub fn is_instrumented(block: &Block) -> bool {
    block.stmts.first().map(is_tracker_call).unwrap_or(false)
}

struct InjectionPass<'a> {
    injector: &'a mut Injector,
    analysis: &'a Analysis,
    summary: InjectionSummary,
}

impl InjectionPass<'_> {
    /// Resolve a closure member at `location` that still needs rewriting
    fn target(&self, location: SourceLocation) -> Option<&FunctionInfo> {
        let id = self.analysis.lookup(location)?;
        if !self.analysis.closure().contains(id) {
            return None;
        }
        if self.injector.visited.contains(&id) {
            return None;
        }
        self.analysis.function(id)
    }

    fn rewrite_block(&mut self, location: SourceLocation, block: &mut Block) {
        let Some(info) = self.target(location).cloned() else {
            return;
        };
        let id = info.id();
        self.injector.visited.insert(id);

        if is_instrumented(block) {
            log::debug!("{} already instrumented", info.declaration.display_name());
            self.summary.untouched.push(id);
            return;
        }
        if !info
            .declaration
            .params
            .iter()
            .any(|param| self.injector.host == param.name)
        {
            let message = format!(
                "{} has no `{}` parameter; not instrumented",
                info.declaration.display_name(),
                self.injector.host
            );
            log::warn!("{}", message);
            self.summary.warnings.push(message);
            self.summary.untouched.push(id);
            return;
        }

        block.stmts.insert(0, self.injector.tracker_stmt(&info));
        log::debug!("Instrumented {}", info.declaration.display_name());
        self.summary.instrumented.push(id);
    }
}

impl VisitMut for InjectionPass<'_> {
    fn visit_item_fn_mut(&mut self, node: &mut syn::ItemFn) {
        visit_mut::visit_item_fn_mut(self, node);
        self.rewrite_block(SourceLocation::of(node.sig.ident.span()), &mut node.block);
    }

    fn visit_impl_item_fn_mut(&mut self, node: &mut syn::ImplItemFn) {
        visit_mut::visit_impl_item_fn_mut(self, node);
        self.rewrite_block(SourceLocation::of(node.sig.ident.span()), &mut node.block);
    }

    fn visit_trait_item_fn_mut(&mut self, node: &mut syn::TraitItemFn) {
        visit_mut::visit_trait_item_fn_mut(self, node);
        let location = SourceLocation::of(node.sig.ident.span());
        if let Some(block) = node.default.as_mut() {
            self.rewrite_block(location, block);
        }
    }

    fn visit_expr_closure_mut(&mut self, node: &mut syn::ExprClosure) {
        visit_mut::visit_expr_closure_mut(self, node);
        let location = SourceLocation::of(node.or1_token.spans[0]);
        if self.target(location).is_none() {
            return;
        }
        match node.body.as_mut() {
            Expr::Block(block) if block.label.is_none() && block.attrs.is_empty() => {
                self.rewrite_block(location, &mut block.block);
            }
            body => {
                let inner = body.clone();
                let mut block: Block = parse_quote!({ #inner });
                self.rewrite_block(location, &mut block);
                *body = Expr::Block(syn::ExprBlock {
                    attrs: Vec::new(),
                    label: None,
                    block,
                });
            }
        }
    }
}
