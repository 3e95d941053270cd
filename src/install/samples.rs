//! Sample microscopy files for trying the reader.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, info};
use url::Url;
use zip::ZipArchive;

use super::fetch::Fetcher;
use crate::error::InstallError;

pub const SAMPLES_BASE_URL: &str = "https://samples.scif.io/";

/// Archives fetched by [`fetch_samples`].
pub const SAMPLE_ARCHIVES: [&str; 5] = [
    "2chZT.zip",        // Zeiss
    "mouse-kidney.zip", // Leica LIF
    "leica_stack.zip",  // Leica
    "10-31_E1.zip",     // Olympus Fluoview TIFF
    "wtembryo.zip",     // QuickTime
];

/// Download every sample archive and unpack it into `dest`.
///
/// Archives are extracted from memory and never stored. Top-level `*.txt`
/// files (licenses and readmes shipped in the archives) are removed
/// afterwards. Returns the names of the archives unpacked.
pub async fn fetch_samples(fetcher: &dyn Fetcher, dest: &Path) -> Result<Vec<String>, InstallError> {
    let base = Url::parse(SAMPLES_BASE_URL).map_err(|e| InstallError::Fetch {
        url: SAMPLES_BASE_URL.to_string(),
        message: e.to_string(),
    })?;
    fetch_archives(fetcher, &base, &SAMPLE_ARCHIVES, dest).await
}

pub(crate) async fn fetch_archives(
    fetcher: &dyn Fetcher,
    base: &Url,
    archives: &[&str],
    dest: &Path,
) -> Result<Vec<String>, InstallError> {
    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|e| InstallError::io(dest, e))?;

    let mut unpacked = Vec::with_capacity(archives.len());
    for &name in archives {
        let url = base.join(name).map_err(|e| InstallError::Fetch {
            url: format!("{}{}", base, name),
            message: e.to_string(),
        })?;

        info!("Downloading {}", name);
        let data = fetcher.fetch(&url).await?;

        let archive = name.to_string();
        let target = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extract(data, &archive, &target))
            .await
            .map_err(|e| InstallError::Archive {
                archive: name.to_string(),
                message: e.to_string(),
            })??;
        unpacked.push(name.to_string());
    }

    for removed in remove_text_files(dest)? {
        debug!("Removed {}", removed.display());
    }
    Ok(unpacked)
}

fn extract(data: Bytes, archive: &str, dest: &Path) -> Result<(), InstallError> {
    let archive_error = |message: String| InstallError::Archive {
        archive: archive.to_string(),
        message,
    };

    let mut zip = ZipArchive::new(Cursor::new(data)).map_err(|e| archive_error(e.to_string()))?;
    debug!("{} contains {} entries", archive, zip.len());
    zip.extract(dest).map_err(|e| archive_error(e.to_string()))
}

/// Delete `*.txt` directly inside `dir`.
fn remove_text_files(dir: &Path) -> Result<Vec<PathBuf>, InstallError> {
    let entries = std::fs::read_dir(dir).map_err(|e| InstallError::io(dir, e))?;

    let mut removed = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| InstallError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            std::fs::remove_file(&path).map_err(|e| InstallError::io(&path, e))?;
            removed.push(path);
        }
    }
    Ok(removed)
}

// =============================================================================
// Tests
// =============================================================================
