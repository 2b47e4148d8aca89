//! Job files.
//!
//! A job file holds one [`Job`], tagged by its `kind`:
//!
//! ```toml
//! kind = "synthesis"
//! algorithm = "techmap"
//! target_library = "sky130"
//! netlist = "and g0(y, a, b);"
//! ```

use std::path::Path;

use crate::error::{Error, Result};
use crate::Job;

/// The encoding of a job file.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum Format {
    /// TOML.
    Toml,
    /// JSON.
    Json,
}

impl Format {
    /// Infers the format from a file extension, ignoring case.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Decodes a job from text.
pub fn parse_job(text: &str, format: Format) -> Result<Job> {
    Ok(match format {
        Format::Toml => toml::from_str(text)?,
        Format::Json => serde_json::from_str(text)?,
    })
}

/// Reads and decodes a job file, choosing the format by extension.
pub fn load_job(path: impl AsRef<Path>) -> Result<Job> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| Error::UnknownFormat(path.to_path_buf()))?;
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(?path, ?format, "loaded job file");
    parse_job(&text, format)
}
