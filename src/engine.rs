//! Pipeline over one compilation unit
//!
//! Parses the source, runs the analysis, rewrites the closure members and
//! renders the result back to source text.

use crate::analysis::Analysis;
use crate::error::{Error, Result};
use crate::instrument::Injector;
use crate::options::InstrumentOptions;
use crate::report::InstrumentationReport;

/// Rewritten source and what was done to it
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub source: String,
    pub report: InstrumentationReport,
}

/// Analysis and instrumentation engine
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: InstrumentOptions,
}

impl Engine {
    pub fn new(options: InstrumentOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &InstrumentOptions {
        &self.options
    }

    /// Parse `source`; `name` labels diagnostics
    pub fn parse(&self, name: &str, source: &str) -> Result<syn::File> {
        syn::parse_file(source).map_err(|err| Error::parse(&err, name, source))
    }

    /// Run the analysis without rewriting anything
    pub fn analyze(&self, name: &str, source: &str) -> Result<InstrumentationReport> {
        let file = self.parse(name, source)?;
        let analysis = Analysis::run(&file, &self.options);
        Ok(InstrumentationReport::from_analysis(name, &analysis, &[]))
    }

    /// Call graph of the unit in DOT format, closure members highlighted
    pub fn call_graph_dot(&self, name: &str, source: &str) -> Result<String> {
        let file = self.parse(name, source)?;
        Ok(Analysis::run(&file, &self.options).call_graph_dot())
    }

    /// Instrument `source`. Returns it unchanged when disabled or when nothing was rewritten.
    pub fn instrument_source(&self, name: &str, source: &str) -> Result<EngineOutput> {
        log::info!(
            "Instrumenting {} (enabled={}, skip_inline={})",
            name,
            self.options.enabled,
            self.options.skip_inline
        );
        if !self.options.enabled {
            return Ok(EngineOutput {
                source: source.to_string(),
                report: InstrumentationReport::disabled(name),
            });
        }

        let mut file = self.parse(name, source)?;
        let report = self.instrument_file(name, &mut file);
        let source = if report.instrumented.is_empty() {
            source.to_string()
        } else {
            prettyplease::unparse(&file)
        };
        Ok(EngineOutput { source, report })
    }

    /// Instrument an already parsed unit in place
    pub fn instrument_file(&self, name: &str, file: &mut syn::File) -> InstrumentationReport {
        if !self.options.enabled {
            return InstrumentationReport::disabled(name);
        }

        let analysis = Analysis::run(file, &self.options);
        let mut injector = match Injector::new(&self.options) {
            Ok(injector) => injector,
            Err(unresolvable) => {
                log::warn!("{}", unresolvable.message);
                let mut report = InstrumentationReport::from_analysis(name, &analysis, &[]);
                report.warnings.push(unresolvable.message);
                return report;
            }
        };

        let summary = injector.apply(file, &analysis);
        let mut report = InstrumentationReport::from_analysis(name, &analysis, &summary.instrumented);
        report.warnings.extend(summary.warnings);
        report
    }
}
