use crate::cli::utils;
use crate::engine::Engine;
use crate::error::Result;
use crate::options::InstrumentOptions;
use std::path::Path;

/// Export the call graph of one source file as DOT
pub fn graph(input_path: &Path, output_dot: Option<&Path>, options: InstrumentOptions) -> Result<()> {
    let source = utils::read_source(input_path)?;
    let name = utils::unit_name(input_path);
    let dot = Engine::new(options).call_graph_dot(&name, &source)?;

    utils::write_output(&dot, output_dot)?;
    if let Some(path) = output_dot {
        println!("DOT file written to: {}", path.display());
    }
    Ok(())
}
