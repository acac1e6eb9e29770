//! MeshConvertError: unified error type for the UNV conversion pipeline.
//!
//! Every loader, the reindexer and the writers report through this type so a
//! single top-level handler can print one descriptive message and stop.

use std::path::Path;
use thiserror::Error;

/// Unified error type for conversion operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshConvertError {
    /// A required input path was not supplied.
    #[error("missing required input: {0}")]
    MissingInput(&'static str),
    /// Input text does not match the expected layout.
    #[error("[{component}] {}{message}", line_prefix(.line))]
    Format {
        component: &'static str,
        /// 1-based line number, when known.
        line: Option<usize>,
        message: String,
    },
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(String),
    /// Error raised while processing a specific file.
    #[error("{path}: {source}")]
    InFile {
        path: String,
        #[source]
        source: Box<MeshConvertError>,
    },
    /// Data a writer cannot represent.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|l| format!("line {l}: ")).unwrap_or_default()
}

impl MeshConvertError {
    /// Format error without line context.
    pub fn format(component: &'static str, message: impl Into<String>) -> Self {
        MeshConvertError::Format {
            component,
            line: None,
            message: message.into(),
        }
    }

    /// Format error at a 0-based line index (reported 1-based).
    pub fn format_at(component: &'static str, line_idx: usize, message: impl Into<String>) -> Self {
        MeshConvertError::Format {
            component,
            line: Some(line_idx + 1),
            message: message.into(),
        }
    }

    /// Attach the offending file path.
    pub fn in_file(self, path: &Path) -> Self {
        MeshConvertError::InFile {
            path: path.display().to_string(),
            source: Box::new(self),
        }
    }

    /// Returns true for any flavour of format error, looking through file context.
    pub fn is_format(&self) -> bool {
        match self {
            MeshConvertError::Format { .. } => true,
            MeshConvertError::InFile { source, .. } => source.is_format(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for MeshConvertError {
    fn from(err: std::io::Error) -> Self {
        MeshConvertError::Io(err.to_string())
    }
}
