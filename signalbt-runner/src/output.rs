//! Report output: compact JSON to a file or stdout, plus an infallible fallback.

use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::report::RunReport;

/// Environment variable selecting file output.
pub const OUTPUT_DIR_ENV: &str = "OUTPUT_DIR";
/// File name written inside the output directory.
pub const OUTPUT_FILE: &str = "output.json";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("{0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}

/// Where the report goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    /// `<dir>/output.json`
    Directory(PathBuf),
}

impl OutputTarget {
    /// `OUTPUT_DIR` set and non-empty selects a directory, else stdout.
    pub fn from_env() -> Self {
        Self::from_output_dir(std::env::var_os(OUTPUT_DIR_ENV).map(PathBuf::from))
    }

    pub fn from_output_dir(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(dir) if !dir.as_os_str().is_empty() => Self::Directory(dir),
            _ => Self::Stdout,
        }
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        match self {
            Self::Stdout => None,
            Self::Directory(dir) => Some(dir.join(OUTPUT_FILE)),
        }
    }
}

/// Serialize without extraneous whitespace.
pub fn to_compact_json(report: &RunReport) -> Result<String, OutputError> {
    Ok(serde_json::to_string(report)?)
}

pub fn write_report(report: &RunReport, target: &OutputTarget) -> Result<(), OutputError> {
    let json = to_compact_json(report)?;
    match target {
        OutputTarget::Stdout => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{json}").map_err(OutputError::Stdout)?;
            handle.flush().map_err(OutputError::Stdout)
        }
        OutputTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
                path: dir.clone(),
                source,
            })?;
            let path = dir.join(OUTPUT_FILE);
            std::fs::write(&path, json).map_err(|source| OutputError::Write {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "results written");
            Ok(())
        }
    }
}

/// Best-effort error document with a debug dump of the report.
pub fn render_fallback(error: &dyn Display, report: &RunReport) -> String {
    serde_json::json!({
        "error": error.to_string(),
        "partial_results": format!("{report:?}"),
    })
    .to_string()
}

/// Print the fallback document to stdout. Never fails.
pub fn write_fallback(error: &dyn Display, report: &RunReport) {
    let line = render_fallback(error, report);
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{line}");
    let _ = handle.flush();
}
