//! Output targets for exported documents

use apigw_openapi_common::{GatewayError, Result};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

/// Where a document goes: `-` is standard output, anything else a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl FromStr for OutputTarget {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Err(GatewayError::InvalidArgument(
                "output path must not be empty".to_string(),
            )),
            "-" => Ok(OutputTarget::Stdout),
            path => Ok(OutputTarget::File(PathBuf::from(path))),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => f.write_str("<stdout>"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Receives rendered documents
#[cfg_attr(test, mockall::automock)]
pub trait DocumentSink {
    fn write_document(&mut self, target: &OutputTarget, contents: &str) -> Result<()>;
}

/// Writes to the real standard output and file system
#[derive(Debug, Default)]
pub struct FsSink;

impl DocumentSink for FsSink {
    fn write_document(&mut self, target: &OutputTarget, contents: &str) -> Result<()> {
        match target {
            OutputTarget::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(contents.as_bytes())?;
                stdout.flush()?;
            }
            OutputTarget::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, contents).map_err(|e| {
                    GatewayError::Io(std::io::Error::new(
                        e.kind(),
                        format!("failed to write {}: {}", path.display(), e),
                    ))
                })?;
            }
        }
        Ok(())
    }
}
