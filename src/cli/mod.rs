//! Command-line interface module
//!
//! This module contains the implementations for the CLI subcommands.

use clap::Args;
use std::path::PathBuf;

use crate::error::Result;
use crate::options::InstrumentOptions;

pub mod analyze;
pub mod graph;
pub mod instrument;

/// Option flags shared by every subcommand; flags override the config file
#[derive(Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Treat #[inline] render functions as plain functions
    #[arg(long)]
    pub skip_inline: bool,

    /// Leave the unit untouched
    #[arg(long)]
    pub disable: bool,

    /// Module path prepended to qualified names
    #[arg(long)]
    pub module: Option<String>,

    /// Name of the host-context parameter
    #[arg(long)]
    pub host_context: Option<String>,

    /// Path of the runtime module injected calls refer to
    #[arg(long)]
    pub runtime_path: Option<String>,

    /// Scope label for file-level declarations
    #[arg(long)]
    pub file_label: Option<String>,
}

impl OptionArgs {
    /// Load the config file (if any) and apply flag overrides
    pub fn resolve(&self) -> Result<InstrumentOptions> {
        let mut options = match &self.config {
            Some(path) => InstrumentOptions::from_json_file(path)?,
            None => InstrumentOptions::default(),
        };
        if self.skip_inline {
            options.skip_inline = true;
        }
        if self.disable {
            options.enabled = false;
        }
        if let Some(module) = &self.module {
            options.module_prefix = Some(module.clone());
        }
        if let Some(host) = &self.host_context {
            options.host_context = host.clone();
        }
        if let Some(path) = &self.runtime_path {
            options.runtime_path = path.clone();
        }
        if let Some(label) = &self.file_label {
            options.file_label = label.clone();
        }
        Ok(options)
    }
}

/// Common CLI utilities
pub mod utils {
    use crate::error::{Error, Result};
    use std::path::Path;

    /// Read a source file
    pub fn read_source(path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))
    }

    /// Name used for diagnostics and the report
    pub fn unit_name(path: &Path) -> String {
        path.display().to_string()
    }

    /// Write output to file or stdout
    pub fn write_output(content: &str, output_path: Option<&Path>) -> Result<()> {
        match output_path {
            Some(path) => std::fs::write(path, content)
                .map_err(|e| Error::Io(format!("Failed to write {}: {}", path.display(), e))),
            None => {
                print!("{}", content);
                if !content.ends_with('\n') {
                    println!();
                }
                Ok(())
            }
        }
    }
}
