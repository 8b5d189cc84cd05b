//! Annotation resolution for render functions
//!
//! Markers are matched on the last segment of the attribute path, so both
//! `#[component]` and `#[leptos::component]` count as render markers.

use std::collections::BTreeSet;

use serde::Serialize;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, Lit, Meta, Token};

/// Attribute names that mark a render function
pub const RENDER_MARKERS: &[&str] = &["component", "composable"];

/// Render functions carrying this marker only read state and are never tracked
pub const READ_ONLY_MARKER: &str = "read_only_component";

/// Requests instrumentation, optionally with `include_nested = true`
pub const TRACK_MARKER: &str = "track_recompositions";

/// Excludes a whole function or a single parameter
pub const SKIP_MARKER: &str = "skip_recomposition_tracking";

const INCLUDE_NESTED_KEYS: &[&str] = &["include_nested", "include_nested_recursively"];

/// Tracking configuration attached to a declaration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackingConfig {
    pub is_tracked: bool,
    pub include_nested_recursively: bool,
}

/// Skip configuration attached to a declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipConfig {
    pub skip_whole_function: bool,
    pub skipped_parameter_names: BTreeSet<String>,
}

impl SkipConfig {
    pub fn skips_parameter(&self, name: &str) -> bool {
        self.skipped_parameter_names.contains(name)
    }
}

/// Last path segment of an attribute, e.g. `component` for `#[leptos::component]`
fn marker_name(attr: &Attribute) -> Option<String> {
    attr.path().segments.last().map(|seg| seg.ident.to_string())
}

/// Check whether any attribute carries the given marker name
pub fn has_marker(attrs: &[Attribute], name: &str) -> bool {
    attrs
        .iter()
        .any(|attr| marker_name(attr).as_deref() == Some(name))
}

fn find_marker<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs
        .iter()
        .find(|attr| marker_name(attr).as_deref() == Some(name))
}

/// Check for a render marker
pub fn is_render_marked(attrs: &[Attribute]) -> bool {
    RENDER_MARKERS.iter().any(|marker| has_marker(attrs, marker))
}

/// Check for the read-only render marker
pub fn is_read_only(attrs: &[Attribute]) -> bool {
    has_marker(attrs, READ_ONLY_MARKER)
}

/// Check for `#[inline]` in any of its forms
pub fn is_inline(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("inline"))
}

/// Resolve the tracking configuration of a declaration
pub fn resolve_tracking(attrs: &[Attribute]) -> TrackingConfig {
    match find_marker(attrs, TRACK_MARKER) {
        Some(attr) => TrackingConfig {
            is_tracked: true,
            include_nested_recursively: include_nested_value(attr),
        },
        None => TrackingConfig::default(),
    }
}

/// Resolve the skip configuration from the function's own attributes and its
/// parameters' attributes
pub fn resolve_skip<'a>(
    attrs: &[Attribute],
    params: impl IntoIterator<Item = (&'a str, &'a [Attribute])>,
) -> SkipConfig {
    let skipped_parameter_names = params
        .into_iter()
        .filter(|(_, param_attrs)| has_marker(param_attrs, SKIP_MARKER))
        .map(|(name, _)| name.to_string())
        .collect();

    SkipConfig {
        skip_whole_function: has_marker(attrs, SKIP_MARKER),
        skipped_parameter_names,
    }
}

/// Extract the `include_nested` flag. Anything that is not a boolean literal
/// resolves to `false`.
fn include_nested_value(attr: &Attribute) -> bool {
    match &attr.meta {
        Meta::Path(_) => false,
        Meta::NameValue(name_value) => bool_literal(&name_value.value).unwrap_or(false),
        Meta::List(_) => {
            let args = match attr.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)
            {
                Ok(args) => args,
                Err(err) => {
                    log::debug!("Malformed {} arguments: {}", TRACK_MARKER, err);
                    return false;
                }
            };

            for (position, arg) in args.iter().enumerate() {
                match arg {
                    Expr::Assign(assign) => {
                        let is_key = matches!(
                            assign.left.as_ref(),
                            Expr::Path(p) if INCLUDE_NESTED_KEYS.iter().any(|k| p.path.is_ident(k))
                        );
                        if is_key {
                            return bool_literal(&assign.right).unwrap_or(false);
                        }
                    }
                    other if position == 0 => {
                        if let Some(value) = bool_literal(other) {
                            return value;
                        }
                    }
                    _ => {}
                }
            }
            false
        }
    }
}

fn bool_literal(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Bool(value) => Some(value.value),
            _ => None,
        },
        Expr::Paren(inner) => bool_literal(&inner.expr),
        Expr::Group(inner) => bool_literal(&inner.expr),
        _ => None,
    }
}
