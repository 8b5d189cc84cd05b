use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for instrumentation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the analysis and instrumentation engine
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("I/O error: {0}")]
    #[diagnostic(code(recomp_tracker::io_error))]
    Io(String),

    #[error("Failed to parse compilation unit: {message}")]
    #[diagnostic(code(recomp_tracker::parse_error))]
    Parse {
        message: String,
        #[source_code]
        source_code: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(
        code(recomp_tracker::config_error),
        help("configuration files are JSON objects; every field is optional")
    )]
    Config { message: String },

    #[error("Serialization failed: {message}")]
    #[diagnostic(code(recomp_tracker::serialization_error))]
    Serialization { message: String },
}

impl Error {
    /// Create a parse error pointing at the location reported by `syn`
    pub fn parse(err: &syn::Error, name: &str, source: &str) -> Self {
        let start = err.span().start();
        let end = err.span().end();
        let offset = line_column_to_offset(source, start.line, start.column);
        let end_offset = line_column_to_offset(source, end.line, end.column).max(offset);
        Error::Parse {
            message: err.to_string(),
            source_code: NamedSource::new(name, source.to_string()),
            span: SourceSpan::from((offset, end_offset - offset)),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

/// Byte offset of a 1-based line / 0-based character column, clamped to the source length
fn line_column_to_offset(source: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let within: usize = text.chars().take(column).map(char::len_utf8).sum();
            return offset + within;
        }
        offset += text.len();
    }
    source.len()
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization {
            message: err.to_string(),
        }
    }
}
