// ABOUTME: Selects where the dump script is written (file or stdout)
// ABOUTME: Wraps the destination in a buffered async writer

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, BufWriter};

/// Buffered, append-only destination for one dump
pub type OutputSink = BufWriter<Box<dyn AsyncWrite + Unpin + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `None` and `-` both mean standard output
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            None => OutputTarget::Stdout,
            Some(path) if path.as_os_str() == "-" => OutputTarget::Stdout,
            Some(path) => OutputTarget::File(path.to_path_buf()),
        }
    }

    /// Open the destination, truncating an existing file
    pub async fn open(&self) -> Result<OutputSink> {
        let inner: Box<dyn AsyncWrite + Unpin + Send> = match self {
            OutputTarget::Stdout => Box::new(tokio::io::stdout()),
            OutputTarget::File(path) => {
                let file = tokio::fs::File::create(path)
                    .await
                    .with_context(|| format!("Failed to create output file {}", path.display()))?;
                Box::new(file)
            }
        };
        Ok(BufWriter::new(inner))
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "stdout"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}
