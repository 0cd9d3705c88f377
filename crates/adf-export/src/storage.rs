//! File persistence.

use std::fs;
use std::path::Path;

use crate::{ExportError, Result};

/// Write `content` to `path`, creating parent directories as needed.
pub fn save(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    let result = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
    .and_then(|()| fs::write(path, content));

    match result {
        Ok(()) => {
            log::info!("Saved file: {}", path.display());
            Ok(())
        }
        Err(err) => {
            log::error!("Failed to save file {}: {err}", path.display());
            Err(ExportError::Io {
                path: path.to_path_buf(),
                source: err,
            })
        }
    }
}
