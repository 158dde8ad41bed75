use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Creates `path` and any missing parents. An existing directory is fine.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes rendered template output followed by a single newline, replacing
/// whatever was at `path`.
pub fn write_rendered(path: &Path, content: &str) -> Result<()> {
    fs::write(path, format!("{}\n", content)).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len() + 1, "wrote file");
    Ok(())
}
