//! Summary of one analysis / instrumentation run

use serde::Serialize;

use crate::analysis::{Analysis, CallKind, FunctionId, FunctionKind, SourceLocation};

/// Per-function line of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSummary {
    pub id: FunctionId,
    pub name: String,
    pub kind: FunctionKind,
    pub location: SourceLocation,
    pub is_render: bool,
    pub has_body: bool,
    pub tracked: bool,
    pub include_nested: bool,
    pub skipped: bool,
    pub skipped_parameters: Vec<String>,
    pub in_closure: bool,
    pub instrumented: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeSummary {
    pub caller: String,
    pub callee: String,
    pub kind: CallKind,
}

/// Serializable result of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentationReport {
    pub unit: String,
    pub enabled: bool,
    pub functions: Vec<FunctionSummary>,
    pub edges: Vec<EdgeSummary>,
    /// Display names of closure members in insertion order
    pub closure: Vec<String>,
    /// Display names of rewritten functions in rewrite order
    pub instrumented: Vec<String>,
    pub warnings: Vec<String>,
}

impl InstrumentationReport {
    /// Report for a unit that was not looked at
    pub fn disabled(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            enabled: false,
            functions: Vec::new(),
            edges: Vec::new(),
            closure: Vec::new(),
            instrumented: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn from_analysis(unit: &str, analysis: &Analysis, instrumented: &[FunctionId]) -> Self {
        let name_of = |id: FunctionId| {
            analysis
                .function(id)
                .map(|info| info.declaration.display_name())
                .unwrap_or_else(|| id.to_string())
        };

        let functions = analysis
            .functions()
            .iter()
            .map(|info| FunctionSummary {
                id: info.id(),
                name: info.declaration.display_name(),
                kind: info.declaration.kind,
                location: info.declaration.location,
                is_render: info.is_render(),
                has_body: info.has_body(),
                tracked: info.tracking.is_tracked,
                include_nested: info.tracking.include_nested_recursively,
                skipped: info.skip.skip_whole_function,
                skipped_parameters: info.skip.skipped_parameter_names.iter().cloned().collect(),
                in_closure: analysis.closure().contains(info.id()),
                instrumented: instrumented.contains(&info.id()),
            })
            .collect();

        let edges = analysis
            .call_graph()
            .edges()
            .into_iter()
            .map(|edge| EdgeSummary {
                caller: name_of(edge.caller),
                callee: name_of(edge.callee),
                kind: edge.kind,
            })
            .collect();

        Self {
            unit: unit.to_string(),
            enabled: true,
            functions,
            edges,
            closure: analysis.closure().iter().map(name_of).collect(),
            instrumented: instrumented.iter().copied().map(name_of).collect(),
            warnings: analysis.warnings().to_vec(),
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable rendering
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== {} ===\n", self.unit));
        if !self.enabled {
            out.push_str("instrumentation disabled\n");
            return out;
        }

        let render_count = self.functions.iter().filter(|f| f.is_render).count();
        out.push_str(&format!(
            "{} functions, {} render functions, {} call edges\n\n",
            self.functions.len(),
            render_count,
            self.edges.len()
        ));

        out.push_str("Functions:\n");
        for function in self.functions.iter().filter(|f| f.is_render || f.tracked) {
            let mut flags = Vec::new();
            if function.tracked {
                flags.push(if function.include_nested {
                    "tracked+nested"
                } else {
                    "tracked"
                });
            }
            if function.skipped {
                flags.push("skipped");
            }
            if !function.has_body {
                flags.push("no body");
            }
            if function.instrumented {
                flags.push("instrumented");
            } else if function.in_closure {
                flags.push("in closure");
            }
            out.push_str(&format!(
                "  {} @ {}{}\n",
                function.name,
                function.location,
                if flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", flags.join(", "))
                }
            ));
            if !function.skipped_parameters.is_empty() {
                out.push_str(&format!(
                    "    skipped parameters: {}\n",
                    function.skipped_parameters.join(", ")
                ));
            }
        }

        if !self.edges.is_empty() {
            out.push_str("\nCalls:\n");
            for edge in &self.edges {
                out.push_str(&format!(
                    "  {} -> {} ({:?})\n",
                    edge.caller, edge.callee, edge.kind
                ));
            }
        }

        out.push_str(&format!("\nClosure: {}\n", self.closure.join(", ")));
        if !self.warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for warning in &self.warnings {
                out.push_str(&format!("  {}\n", warning));
            }
        }
        out
    }
}
