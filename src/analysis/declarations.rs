//! Declaration index
//!
//! A single walk over the compilation unit records every function declaration
//! together with its tracking and skip configuration. Bodies are borrowed from
//! the parsed file so the call graph can be built after the index is complete.

use std::collections::HashMap;
use std::fmt;

use proc_macro2::Span;
use quote::ToTokens;
use serde::Serialize;
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{Attribute, FnArg, Pat, Token, Type};

use super::annotations::{self, SkipConfig, TrackingConfig};
use crate::options::InstrumentOptions;

/// Dense identifier assigned in discovery order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FunctionId(pub u32);

impl FunctionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{}", self.0)
    }
}

/// Line (1-based) and column (0-based) of a declaration's name token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn of(span: Span) -> Self {
        let start = span.start();
        Self {
            line: start.line,
            column: start.column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Label of the scope enclosing a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "label", rename_all = "snake_case")]
pub enum ScopeLabel {
    /// File-level declaration
    File(String),
    /// Member of an `impl` block or trait
    Type(String),
}

impl fmt::Display for ScopeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeLabel::File(label) | ScopeLabel::Type(label) => f.write_str(label),
        }
    }
}

/// Syntactic form of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// Module-level `fn`
    Item,
    /// Method inside an `impl` block
    Method,
    /// Trait method with a default body
    TraitDefault,
    /// Trait method without a body
    TraitRequired,
    /// Function inside an `extern` block
    Foreign,
    /// `fn` declared inside another function's body
    Local,
    /// Render-marked closure literal
    Closure,
}

impl FunctionKind {
    pub fn is_method(self) -> bool {
        matches!(
            self,
            FunctionKind::Method | FunctionKind::TraitDefault | FunctionKind::TraitRequired
        )
    }
}

/// How a parameter's value is captured into the argument snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeShape {
    Plain,
    /// Reactive wrapper, unwrapped to its current value
    Reactive,
    /// `Option<_>`, `None` renders as the absent literal
    Optional,
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    /// Binding name, or the pattern text for destructuring patterns
    pub name: String,
    pub ty: String,
    pub shape: TypeShape,
    /// Whether the pattern is a plain identifier that can be captured
    pub binding: bool,
}

/// Identity and signature of one function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDeclaration {
    pub id: FunctionId,
    pub local_name: String,
    pub qualified_name: Option<String>,
    pub params: Vec<Param>,
    pub has_body: bool,
    pub scope: ScopeLabel,
    pub kind: FunctionKind,
    pub location: SourceLocation,
    /// Render marker present and not excluded by read-only or skip-inline rules
    pub is_render: bool,
    pub is_inline: bool,
}

impl FunctionDeclaration {
    /// Qualified name when resolvable, otherwise the local name prefixed by the scope label
    pub fn display_name(&self) -> String {
        match &self.qualified_name {
            Some(name) => name.clone(),
            None => format!("{}.{}", self.scope, self.local_name),
        }
    }
}

/// Borrowed body of an indexed function
#[derive(Debug, Clone, Copy)]
pub enum Body<'ast> {
    Block(&'ast syn::Block),
    Expr(&'ast syn::Expr),
}

/// Lexical context needed to resolve references made from a body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionContext {
    /// Inline module path from the file root
    pub module: Vec<String>,
    /// Self type of the enclosing `impl`, or the enclosing trait
    pub self_type: Option<String>,
    /// Function whose body contains this declaration
    pub enclosing: Option<FunctionId>,
}

/// An index entry: declaration, resolved annotations, and its borrowed body
#[derive(Debug, Clone)]
pub struct IndexedFunction<'ast> {
    pub declaration: FunctionDeclaration,
    pub tracking: TrackingConfig,
    pub skip: SkipConfig,
    pub body: Option<Body<'ast>>,
    pub context: ResolutionContext,
    /// Source-relative path (`module::Type::name`) for module-level declarations
    pub source_path: Option<Vec<String>>,
}

/// Immutable index of every function declared in a compilation unit
#[derive(Debug, Default)]
pub struct DeclarationIndex<'ast> {
    functions: Vec<IndexedFunction<'ast>>,
    by_location: HashMap<SourceLocation, FunctionId>,
    duplicate_locations: Vec<SourceLocation>,
}

impl<'ast> DeclarationIndex<'ast> {
    /// Scan the whole unit once
    pub fn build(file: &'ast syn::File, options: &InstrumentOptions) -> Self {
        let mut builder = IndexBuilder {
            index: DeclarationIndex::default(),
            options,
            module: Vec::new(),
            self_type: None,
            enclosing: Vec::new(),
            file_closures: 0,
        };
        builder.visit_file(file);
        log::debug!(
            "Indexed {} function declarations ({} render functions)",
            builder.index.functions.len(),
            builder
                .index
                .functions
                .iter()
                .filter(|f| f.declaration.is_render)
                .count()
        );
        builder.index
    }

    pub fn functions(&self) -> &[IndexedFunction<'ast>] {
        &self.functions
    }

    pub fn get(&self, id: FunctionId) -> Option<&IndexedFunction<'ast>> {
        self.functions.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Find the declaration whose name token starts at `location`
    pub fn lookup(&self, location: SourceLocation) -> Option<FunctionId> {
        self.by_location.get(&location).copied()
    }

    pub fn locations(&self) -> &HashMap<SourceLocation, FunctionId> {
        &self.by_location
    }

    /// Locations shared by more than one declaration (only possible for synthesized syntax)
    pub fn duplicate_locations(&self) -> &[SourceLocation] {
        &self.duplicate_locations
    }
}

/// Per-function state while walking a body
struct EnclosingFunction {
    id: FunctionId,
    local_name: String,
    closures: usize,
}

struct IndexBuilder<'ast, 'o> {
    index: DeclarationIndex<'ast>,
    options: &'o InstrumentOptions,
    module: Vec<String>,
    self_type: Option<String>,
    enclosing: Vec<EnclosingFunction>,
    file_closures: usize,
}

/// Inputs of a declaration before conversion into [`Param`]s
enum Inputs<'a> {
    Fn(&'a Punctuated<FnArg, Token![,]>),
    Closure(&'a Punctuated<Pat, Token![,]>),
}

struct Declared<'ast, 'a> {
    local_name: String,
    kind: FunctionKind,
    span: Span,
    attrs: &'a [Attribute],
    inputs: Inputs<'a>,
    body: Option<Body<'ast>>,
}

impl<'ast, 'o> IndexBuilder<'ast, 'o> {
    fn record(&mut self, declared: Declared<'ast, '_>) -> FunctionId {
        let id = FunctionId(self.index.functions.len() as u32);
        let location = SourceLocation::of(declared.span);
        let attrs = declared.attrs;

        let raw_params = self.collect_params(&declared.inputs);
        let skip = annotations::resolve_skip(
            attrs,
            raw_params
                .iter()
                .filter(|(param, _)| param.binding)
                .map(|(param, param_attrs)| (param.name.as_str(), param_attrs.as_slice())),
        );
        let tracking = annotations::resolve_tracking(attrs);
        let params: Vec<Param> = raw_params.into_iter().map(|(param, _)| param).collect();

        let is_inline = annotations::is_inline(attrs);
        let mut is_render = annotations::is_render_marked(attrs);
        if is_render && annotations::is_read_only(attrs) {
            log::debug!("{} is read-only; not a render function", declared.local_name);
            is_render = false;
        }
        if is_render && is_inline && self.options.skip_inline {
            log::debug!("{} is inline; skipped", declared.local_name);
            is_render = false;
        }

        let module_level = self.enclosing.is_empty() && declared.kind != FunctionKind::Closure;
        let source_path = module_level.then(|| {
            let mut path = self.module.clone();
            if let Some(ty) = &self.self_type {
                path.push(ty.clone());
            }
            path.push(declared.local_name.clone());
            path
        });
        let qualified_name = source_path.as_ref().map(|path| {
            let mut segments = self.options.module_prefix_segments();
            segments.extend(path.iter().cloned());
            segments.join("::")
        });

        let scope = match &self.self_type {
            Some(ty) => ScopeLabel::Type(ty.clone()),
            None => ScopeLabel::File(self.options.file_label.clone()),
        };

        let declaration = FunctionDeclaration {
            id,
            local_name: declared.local_name,
            qualified_name,
            params,
            has_body: declared.body.is_some(),
            scope,
            kind: declared.kind,
            location,
            is_render,
            is_inline,
        };

        log::debug!(
            "Declared {} at {} (render: {}, tracked: {}, skipped: {})",
            declaration.display_name(),
            location,
            is_render,
            tracking.is_tracked,
            skip.skip_whole_function
        );

        if self.index.by_location.insert(location, id).is_some() {
            log::warn!("Two declarations share source location {}", location);
            self.index.duplicate_locations.push(location);
        }

        self.index.functions.push(IndexedFunction {
            declaration,
            tracking,
            skip,
            body: declared.body,
            context: ResolutionContext {
                module: self.module.clone(),
                self_type: self.self_type.clone(),
                enclosing: self.enclosing.last().map(|f| f.id),
            },
            source_path,
        });
        id
    }

    fn collect_params(&self, inputs: &Inputs<'_>) -> Vec<(Param, Vec<Attribute>)> {
        match inputs {
            Inputs::Fn(args) => args
                .iter()
                .filter_map(|arg| match arg {
                    FnArg::Receiver(_) => None,
                    FnArg::Typed(pat_type) => Some(self.param(
                        &pat_type.pat,
                        Some(&pat_type.ty),
                        pat_type.attrs.clone(),
                    )),
                })
                .collect(),
            Inputs::Closure(pats) => pats
                .iter()
                .map(|pat| match pat {
                    Pat::Type(pat_type) => {
                        self.param(&pat_type.pat, Some(&pat_type.ty), pat_type.attrs.clone())
                    }
                    Pat::Ident(ident) => self.param(pat, None, ident.attrs.clone()),
                    other => self.param(other, None, Vec::new()),
                })
                .collect(),
        }
    }

    fn param(&self, pat: &Pat, ty: Option<&Type>, attrs: Vec<Attribute>) -> (Param, Vec<Attribute>) {
        let (name, binding) = match pat {
            Pat::Ident(ident) if ident.subpat.is_none() => (ident.ident.to_string(), true),
            other => (other.to_token_stream().to_string(), false),
        };
        let param = Param {
            name,
            ty: ty.map(|t| t.to_token_stream().to_string()).unwrap_or_default(),
            shape: ty.map(|t| self.shape_of(t)).unwrap_or(TypeShape::Plain),
            binding,
        };
        (param, attrs)
    }

    fn shape_of(&self, ty: &Type) -> TypeShape {
        match ty {
            Type::Reference(reference) => self.shape_of(&reference.elem),
            Type::Paren(inner) => self.shape_of(&inner.elem),
            Type::Group(inner) => self.shape_of(&inner.elem),
            Type::Path(path) => match path.path.segments.last() {
                Some(seg) if seg.ident == "Option" => TypeShape::Optional,
                Some(seg) if self.options.is_reactive_wrapper(&seg.ident.to_string()) => {
                    TypeShape::Reactive
                }
                _ => TypeShape::Plain,
            },
            _ => TypeShape::Plain,
        }
    }

    fn with_function<F: FnOnce(&mut Self)>(&mut self, id: FunctionId, local_name: String, f: F) {
        self.enclosing.push(EnclosingFunction {
            id,
            local_name,
            closures: 0,
        });
        f(self);
        self.enclosing.pop();
    }

    fn next_closure_name(&mut self) -> String {
        match self.enclosing.last_mut() {
            Some(parent) => {
                parent.closures += 1;
                format!("{}::{{closure#{}}}", parent.local_name, parent.closures)
            }
            None => {
                self.file_closures += 1;
                format!("{{closure#{}}}", self.file_closures)
            }
        }
    }
}

impl<'ast, 'o> Visit<'ast> for IndexBuilder<'ast, 'o> {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        if let Some((_, items)) = &node.content {
            self.module.push(node.ident.to_string());
            for item in items {
                self.visit_item(item);
            }
            self.module.pop();
        }
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let previous = self.self_type.replace(type_name(&node.self_ty));
        visit::visit_item_impl(self, node);
        self.self_type = previous;
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        let previous = self.self_type.replace(node.ident.to_string());
        visit::visit_item_trait(self, node);
        self.self_type = previous;
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        let local_name = node.sig.ident.to_string();
        let kind = if self.enclosing.is_empty() {
            FunctionKind::Item
        } else {
            FunctionKind::Local
        };
        // A local fn is not a member of an enclosing impl.
        let previous = if kind == FunctionKind::Local {
            self.self_type.take()
        } else {
            None
        };
        let id = self.record(Declared {
            local_name: local_name.clone(),
            kind,
            span: node.sig.ident.span(),
            attrs: &node.attrs,
            inputs: Inputs::Fn(&node.sig.inputs),
            body: Some(Body::Block(&node.block)),
        });
        self.with_function(id, local_name, |this| this.visit_block(&node.block));
        if kind == FunctionKind::Local {
            self.self_type = previous;
        }
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        let local_name = node.sig.ident.to_string();
        let id = self.record(Declared {
            local_name: local_name.clone(),
            kind: FunctionKind::Method,
            span: node.sig.ident.span(),
            attrs: &node.attrs,
            inputs: Inputs::Fn(&node.sig.inputs),
            body: Some(Body::Block(&node.block)),
        });
        self.with_function(id, local_name, |this| this.visit_block(&node.block));
    }

    fn visit_trait_item_fn(&mut self, node: &'ast syn::TraitItemFn) {
        let local_name = node.sig.ident.to_string();
        let (kind, body) = match &node.default {
            Some(block) => (FunctionKind::TraitDefault, Some(Body::Block(block))),
            None => (FunctionKind::TraitRequired, None),
        };
        let id = self.record(Declared {
            local_name: local_name.clone(),
            kind,
            span: node.sig.ident.span(),
            attrs: &node.attrs,
            inputs: Inputs::Fn(&node.sig.inputs),
            body,
        });
        if let Some(block) = &node.default {
            self.with_function(id, local_name, |this| this.visit_block(block));
        }
    }

    fn visit_foreign_item_fn(&mut self, node: &'ast syn::ForeignItemFn) {
        self.record(Declared {
            local_name: node.sig.ident.to_string(),
            kind: FunctionKind::Foreign,
            span: node.sig.ident.span(),
            attrs: &node.attrs,
            inputs: Inputs::Fn(&node.sig.inputs),
            body: None,
        });
    }

    fn visit_expr_closure(&mut self, node: &'ast syn::ExprClosure) {
        if !annotations::is_render_marked(&node.attrs) {
            visit::visit_expr_closure(self, node);
            return;
        }
        let local_name = self.next_closure_name();
        let id = self.record(Declared {
            local_name: local_name.clone(),
            kind: FunctionKind::Closure,
            span: node.or1_token.spans[0],
            attrs: &node.attrs,
            inputs: Inputs::Closure(&node.inputs),
            body: Some(Body::Expr(&node.body)),
        });
        self.with_function(id, local_name, |this| this.visit_expr(&node.body));
    }
}

/// Name used as the scope label for an `impl` self type
pub(crate) fn type_name(ty: &Type) -> String {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string())
            .unwrap_or_else(|| ty.to_token_stream().to_string()),
        Type::Reference(reference) => type_name(&reference.elem),
        Type::Paren(inner) => type_name(&inner.elem),
        Type::Group(inner) => type_name(&inner.elem),
        _ => ty.to_token_stream().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(source: &str) -> (syn::File, InstrumentOptions) {
        (syn::parse_file(source).unwrap(), InstrumentOptions::default())
    }

    #[test]
    fn test_indexes_items_methods_and_traits() {
        let (file, options) = index_of(
            r#"
#[component]
fn header(cx: &mut Host, title: String) {}

struct Screen;

impl Screen {
    #[component]
    fn body(&self, cx: &mut Host) {}
}

trait Row {
    #[component]
    fn row(&self);

    #[component]
    fn divider(&self) {}
}
"#,
        );
        let index = DeclarationIndex::build(&file, &options);
        assert_eq!(index.len(), 4);

        let header = &index.functions()[0].declaration;
        assert_eq!(header.qualified_name.as_deref(), Some("header"));
        assert_eq!(header.kind, FunctionKind::Item);
        assert_eq!(header.params.len(), 2);
        assert_eq!(header.params[1].name, "title");
        assert_eq!(header.params[1].ty, "String");

        let body = &index.functions()[1].declaration;
        assert_eq!(body.qualified_name.as_deref(), Some("Screen::body"));
        assert_eq!(body.scope, ScopeLabel::Type("Screen".to_string()));
        // receiver is not a parameter
        assert_eq!(body.params.len(), 1);

        let row = &index.functions()[2].declaration;
        assert_eq!(row.kind, FunctionKind::TraitRequired);
        assert!(!row.has_body);

        let divider = &index.functions()[3].declaration;
        assert_eq!(divider.kind, FunctionKind::TraitDefault);
        assert!(divider.has_body);
    }

    #[test]
    fn test_inline_modules_extend_qualified_names() {
        let (file, options) = index_of(
            r#"
mod ui {
    pub mod list {
        #[component]
        pub fn item() {}
    }
}
"#,
        );
        let index = DeclarationIndex::build(&file, &options);
        let item = &index.functions()[0];
        assert_eq!(
            item.declaration.qualified_name.as_deref(),
            Some("ui::list::item")
        );
        assert_eq!(item.context.module, vec!["ui", "list"]);
    }

    #[test]
    fn test_module_prefix_applies_to_qualified_names() {
        let file = syn::parse_file("#[component] fn item() {}").unwrap();
        let options = InstrumentOptions {
            module_prefix: Some("app::screens".to_string()),
            ..InstrumentOptions::default()
        };
        let index = DeclarationIndex::build(&file, &options);
        assert_eq!(
            index.functions()[0].declaration.qualified_name.as_deref(),
            Some("app::screens::item")
        );
        assert_eq!(
            index.functions()[0].source_path.as_deref(),
            Some(&["item".to_string()][..])
        );
    }

    #[test]
    fn test_local_functions_and_closures_have_no_qualified_name() {
        let (file, options) = index_of(
            r#"
#[component]
fn screen(cx: &mut Host) {
    #[component]
    fn badge(count: u32) {}

    list(cx, #[component] |cx: &mut Host, index: usize| row(cx, index));
}
"#,
        );
        let index = DeclarationIndex::build(&file, &options);
        assert_eq!(index.len(), 3);

        let badge = &index.functions()[1].declaration;
        assert_eq!(badge.kind, FunctionKind::Local);
        assert_eq!(badge.qualified_name, None);
        assert_eq!(badge.display_name(), "<unit>.badge");
        assert_eq!(index.functions()[1].context.enclosing, Some(FunctionId(0)));

        let closure = &index.functions()[2].declaration;
        assert_eq!(closure.kind, FunctionKind::Closure);
        assert_eq!(closure.local_name, "screen::{closure#1}");
        assert_eq!(closure.params[1].name, "index");
        assert!(closure.is_render);
    }

    #[test]
    fn test_parameter_shapes() {
        let (file, options) = index_of(
            r#"
#[component]
fn field(value: &State<String>, hint: Option<String>, (a, b): (u8, u8), count: u32) {}
"#,
        );
        let index = DeclarationIndex::build(&file, &options);
        let params = &index.functions()[0].declaration.params;
        assert_eq!(params[0].shape, TypeShape::Reactive);
        assert_eq!(params[1].shape, TypeShape::Optional);
        assert!(!params[2].binding);
        assert_eq!(params[3].shape, TypeShape::Plain);
    }

    #[test]
    fn test_read_only_and_inline_rules() {
        let source = r#"
#[component]
#[read_only_component]
fn theme() {}

#[component]
#[inline]
fn column() {}
"#;
        let file = syn::parse_file(source).unwrap();
        let index = DeclarationIndex::build(&file, &InstrumentOptions::default());
        assert!(!index.functions()[0].declaration.is_render);
        assert!(index.functions()[1].declaration.is_render);

        let options = InstrumentOptions {
            skip_inline: true,
            ..InstrumentOptions::default()
        };
        let index = DeclarationIndex::build(&file, &options);
        assert!(!index.functions()[1].declaration.is_render);
        assert!(index.functions()[1].declaration.is_inline);
    }

    #[test]
    fn test_lookup_by_location() {
        let (file, options) = index_of("#[component]\nfn a() {}\n#[component]\nfn b() {}\n");
        let index = DeclarationIndex::build(&file, &options);
        let b = index.functions()[1].declaration.location;
        assert_eq!(b.line, 4);
        assert_eq!(index.lookup(b), Some(FunctionId(1)));
        assert!(index.duplicate_locations().is_empty());
    }

    #[test]
    fn test_skipped_parameter_names() {
        let (file, options) = index_of(
            r#"
#[component]
#[track_recompositions]
fn labelled(x: i32, #[skip_recomposition_tracking] y: String) {}
"#,
        );
        let index = DeclarationIndex::build(&file, &options);
        let entry = &index.functions()[0];
        assert!(entry.tracking.is_tracked);
        assert!(entry.skip.skips_parameter("y"));
        assert!(!entry.skip.skip_whole_function);
    }
}
