//! Locating, downloading and verifying `loci_tools.jar`.
//!
//! # Locations
//!
//! Candidate directories, in search order:
//! 1. an explicitly configured directory
//! 2. `$BIOFORMATS_JAR_DIR`
//! 3. `<config dir>/pims` (shared with other Bio-Formats tooling)
//! 4. `<local data dir>/bioformats-bridge`
//!
//! # Verification
//!
//! Every release artifact is published next to a `.sha1` (and `.sha256`)
//! sidecar whose first token is the hex digest. The jar is only written to its
//! final path after the digest matches, via a temp file in the same directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use sha1::Sha1;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use url::Url;

use super::fetch::Fetcher;
use crate::error::InstallError;

/// File name of the Bio-Formats bundle.
pub const LOCI_TOOLS_JAR: &str = "loci_tools.jar";

/// Environment variable naming an extra jar directory.
pub const JAR_DIR_ENV: &str = "BIOFORMATS_JAR_DIR";

const DOWNLOAD_BASE: &str = "https://downloads.openmicroscopy.org/bio-formats";

// =============================================================================
// Checksums
// =============================================================================

/// Digest used to verify a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumKind {
    #[default]
    Sha1,
    Sha256,
}

impl ChecksumKind {
    /// Extension of the sidecar file, without the dot.
    pub const fn extension(&self) -> &'static str {
        match self {
            ChecksumKind::Sha1 => "sha1",
            ChecksumKind::Sha256 => "sha256",
        }
    }

    /// Length of the hex digest.
    pub const fn hex_len(&self) -> usize {
        match self {
            ChecksumKind::Sha1 => 40,
            ChecksumKind::Sha256 => 64,
        }
    }

    /// Lowercase hex digest of `data`.
    pub fn digest(&self, data: &[u8]) -> String {
        match self {
            ChecksumKind::Sha1 => hex::encode(Sha1::digest(data)),
            ChecksumKind::Sha256 => hex::encode(Sha256::digest(data)),
        }
    }

    /// URL of the sidecar for `artifact`.
    pub fn sidecar_url(&self, artifact: &Url) -> Result<Url, InstallError> {
        let sidecar = format!("{}.{}", artifact, self.extension());
        Url::parse(&sidecar).map_err(|e| InstallError::Fetch {
            url: sidecar,
            message: e.to_string(),
        })
    }
}

/// Expected digest from a sidecar file: its first whitespace-separated token.
pub fn parse_checksum_file(
    content: &[u8],
    kind: ChecksumKind,
    url: &Url,
) -> Result<String, InstallError> {
    let invalid = || InstallError::InvalidChecksumFile {
        url: url.to_string(),
    };

    let text = std::str::from_utf8(content).map_err(|_| invalid())?;
    let token = text.split_whitespace().next().ok_or_else(invalid)?;
    if token.len() != kind.hex_len() || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    Ok(token.to_ascii_lowercase())
}

/// Compare the digest of `data` against `expected`.
pub fn verify_checksum(
    kind: ChecksumKind,
    data: &[u8],
    expected: &str,
    artifact: &str,
) -> Result<(), InstallError> {
    let actual = kind.digest(data);
    if actual != expected.to_ascii_lowercase() {
        return Err(InstallError::ChecksumMismatch {
            artifact: artifact.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

// =============================================================================
// Locations
// =============================================================================

/// Download URL of `loci_tools.jar` for a release (e.g. `latest`, `7.3.0`).
pub fn artifact_url(version: &str) -> Result<Url, InstallError> {
    let url = format!("{}/{}/artifacts/{}", DOWNLOAD_BASE, version, LOCI_TOOLS_JAR);
    Url::parse(&url).map_err(|e| InstallError::Fetch {
        url,
        message: e.to_string(),
    })
}

/// Candidate jar directories, in search order, without duplicates.
pub fn jar_locations(configured: Option<&Path>) -> Vec<PathBuf> {
    let candidates = [
        configured.map(Path::to_path_buf),
        std::env::var_os(JAR_DIR_ENV)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from),
        dirs::config_dir().map(|dir| dir.join("pims")),
        dirs::data_local_dir().map(|dir| dir.join("bioformats-bridge")),
    ];

    let mut locations = Vec::new();
    for candidate in candidates.into_iter().flatten() {
        if !locations.contains(&candidate) {
            locations.push(candidate);
        }
    }
    locations
}

/// First candidate directory that contains `loci_tools.jar`.
pub fn find_jar(configured: Option<&Path>) -> Option<PathBuf> {
    jar_locations(configured)
        .into_iter()
        .map(|dir| dir.join(LOCI_TOOLS_JAR))
        .find(|jar| jar.is_file())
}

/// First candidate directory we can write to.
///
/// A missing candidate is created when its parent exists and is writable.
pub fn find_writable_location(configured: Option<&Path>) -> Option<PathBuf> {
    jar_locations(configured).into_iter().find(|dir| {
        if dir.is_dir() {
            return is_writable(dir);
        }
        match dir.parent() {
            Some(parent) if parent.is_dir() && is_writable(parent) => {
                std::fs::create_dir(dir).is_ok()
            }
            _ => false,
        }
    })
}

fn is_writable(dir: &Path) -> bool {
    tempfile::tempfile_in(dir).is_ok()
}

// =============================================================================
// Download
// =============================================================================

/// Download and verify `loci_tools.jar`, returning its installed path.
///
/// With no `location`, the first writable candidate directory is used. On a
/// checksum mismatch nothing is written.
pub async fn download_loci_jar(
    fetcher: &dyn Fetcher,
    version: &str,
    location: Option<&Path>,
    kind: ChecksumKind,
) -> Result<PathBuf, InstallError> {
    let url = artifact_url(version)?;

    let dir = match location {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| InstallError::io(dir, e))?;
            dir.to_path_buf()
        }
        None => find_writable_location(None).ok_or_else(|| InstallError::NoWritableLocation {
            url: url.to_string(),
            candidates: jar_locations(None),
        })?,
    };

    info!("Downloading {} (version: {})", LOCI_TOOLS_JAR, version);
    let sidecar = kind.sidecar_url(&url)?;
    let checksum = fetcher.fetch(&sidecar).await?;
    let expected = parse_checksum_file(&checksum, kind, &sidecar)?;

    let jar = fetcher.fetch(&url).await?;
    debug!("Fetched {} bytes from {}", jar.len(), url);
    verify_checksum(kind, &jar, &expected, LOCI_TOOLS_JAR)?;

    let target = dir.join(LOCI_TOOLS_JAR);
    write_atomically(&dir, &target, &jar)?;
    info!("Installed {} to {}", LOCI_TOOLS_JAR, target.display());
    Ok(target)
}

fn write_atomically(dir: &Path, target: &Path, data: &[u8]) -> Result<(), InstallError> {
    let mut file = NamedTempFile::new_in(dir).map_err(|e| InstallError::io(dir, e))?;
    file.write_all(data)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| InstallError::io(file.path(), e))?;
    file.persist(target)
        .map_err(|e| InstallError::io(target, e.error))?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
