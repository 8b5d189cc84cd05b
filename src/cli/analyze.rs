use crate::cli::utils;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::options::InstrumentOptions;
use std::path::Path;

/// Print the analysis report of one source file
pub fn analyze(input_path: &Path, format: &str, options: InstrumentOptions) -> Result<()> {
    let source = utils::read_source(input_path)?;
    let name = utils::unit_name(input_path);
    let report = Engine::new(options).analyze(&name, &source)?;

    let rendered = match format {
        "json" => report.to_json()?,
        "text" => report.to_text(),
        other => {
            return Err(Error::config(format!(
                "unknown format `{}` (expected json or text)",
                other
            )))
        }
    };
    utils::write_output(&rendered, None)
}
