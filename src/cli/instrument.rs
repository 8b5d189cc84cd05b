use crate::cli::utils;
use crate::engine::Engine;
use crate::error::Result;
use crate::options::InstrumentOptions;
use std::path::Path;

/// Instrument one source file and write the result to `output_path` or stdout
pub fn instrument(
    input_path: &Path,
    output_path: Option<&Path>,
    options: InstrumentOptions,
) -> Result<()> {
    let source = utils::read_source(input_path)?;
    let name = utils::unit_name(input_path);
    let output = Engine::new(options).instrument_source(&name, &source)?;

    for warning in &output.report.warnings {
        eprintln!("warning: {}", warning);
    }
    log::info!(
        "{}: {} functions instrumented",
        name,
        output.report.instrumented.len()
    );
    utils::write_output(&output.source, output_path)
}
