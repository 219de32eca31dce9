//! Environment/runtime helpers
//!
//! Sanity checks so the data file can be written on first save.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the directory holding `data_file` exists; note when the file itself is absent.
pub async fn ensure_data_dir(data_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = data_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    }
    match tokio::fs::metadata(data_file).await {
        Ok(meta) if meta.is_dir() => {
            return Err(anyhow::anyhow!("{} is a directory, expected a JSON file", data_file.display()));
        }
        Ok(_) => info!(data_file = %data_file.display(), "using existing user data file"),
        Err(_) => warn!(data_file = %data_file.display(), "user data file not found; starting with an empty collection"),
    }
    Ok(())
}
