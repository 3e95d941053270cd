//! Provisioning tests against an in-memory fetcher.

use std::fs;
use std::path::Path;

use bioformats_bridge::error::InstallError;
use bioformats_bridge::install::{
    artifact_url, download_loci_jar, fetch_samples, ChecksumKind, LOCI_TOOLS_JAR,
    SAMPLES_BASE_URL, SAMPLE_ARCHIVES,
};

use super::test_utils::{make_zip, MockFetcher};

const JAR_BYTES: &[u8] = b"PK\x03\x04 not really a jar";

fn jar_url(version: &str) -> String {
    artifact_url(version).unwrap().to_string()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =============================================================================
// Jar Download
// =============================================================================

#[tokio::test]
async fn test_download_verified_with_sha1() {
    let dir = tempfile::tempdir().unwrap();
    let url = jar_url("latest");
    let digest = ChecksumKind::Sha1.digest(JAR_BYTES);
    let fetcher = MockFetcher::new()
        .with(url.clone(), JAR_BYTES)
        .with(format!("{}.sha1", url), format!("{}  {}\n", digest, LOCI_TOOLS_JAR));

    let path = download_loci_jar(&fetcher, "latest", Some(dir.path()), ChecksumKind::Sha1)
        .await
        .unwrap();

    assert_eq!(path, dir.path().join(LOCI_TOOLS_JAR));
    assert_eq!(fs::read(&path).unwrap(), JAR_BYTES);
    assert_eq!(file_names(dir.path()), vec![LOCI_TOOLS_JAR.to_string()]);
    assert_eq!(
        fetcher.requests().await,
        vec![format!("{}.sha1", url), url]
    );
}

#[tokio::test]
async fn test_download_uses_sha256_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let url = jar_url("7.3.0");
    let digest = ChecksumKind::Sha256.digest(JAR_BYTES);
    let fetcher = MockFetcher::new()
        .with(url.clone(), JAR_BYTES)
        .with(format!("{}.sha256", url), digest);

    let path = download_loci_jar(&fetcher, "7.3.0", Some(dir.path()), ChecksumKind::Sha256)
        .await
        .unwrap();

    assert!(path.is_file());
    assert!(fetcher
        .requests()
        .await
        .iter()
        .all(|request| !request.ends_with(".sha1")));
}

#[tokio::test]
async fn test_checksum_mismatch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let url = jar_url("latest");
    let wrong = ChecksumKind::Sha1.digest(b"some other payload");
    let fetcher = MockFetcher::new()
        .with(url.clone(), JAR_BYTES)
        .with(format!("{}.sha1", url), wrong.clone());

    let err = download_loci_jar(&fetcher, "latest", Some(dir.path()), ChecksumKind::Sha1)
        .await
        .unwrap_err();

    match err {
        InstallError::ChecksumMismatch {
            artifact,
            expected,
            actual,
        } => {
            assert_eq!(artifact, LOCI_TOOLS_JAR);
            assert_eq!(expected, wrong);
            assert_eq!(actual, ChecksumKind::Sha1.digest(JAR_BYTES));
        }
        other => panic!("expected a checksum mismatch, got {:?}", other),
    }
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_invalid_checksum_file() {
    let dir = tempfile::tempdir().unwrap();
    let url = jar_url("latest");
    let fetcher = MockFetcher::new()
        .with(url.clone(), JAR_BYTES)
        .with(format!("{}.sha1", url), "<html>moved</html>");

    let err = download_loci_jar(&fetcher, "latest", Some(dir.path()), ChecksumKind::Sha1)
        .await
        .unwrap_err();

    assert!(matches!(err, InstallError::InvalidChecksumFile { .. }));
    assert!(file_names(dir.path()).is_empty());
    // the jar itself is never requested
    assert_eq!(fetcher.requests().await.len(), 1);
}

#[tokio::test]
async fn test_missing_artifact_is_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new();

    let err = download_loci_jar(&fetcher, "0.0.0", Some(dir.path()), ChecksumKind::Sha1)
        .await
        .unwrap_err();

    match err {
        InstallError::Fetch { url, message } => {
            assert!(url.ends_with("/0.0.0/artifacts/loci_tools.jar.sha1"), "{}", url);
            assert!(message.contains("404"));
        }
        other => panic!("expected a fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_download_creates_configured_dir() {
    let parent = tempfile::tempdir().unwrap();
    let dir = parent.path().join("nested").join("jars");
    let url = jar_url("latest");
    let fetcher = MockFetcher::new()
        .with(url.clone(), JAR_BYTES)
        .with(format!("{}.sha1", url), ChecksumKind::Sha1.digest(JAR_BYTES));

    let path = download_loci_jar(&fetcher, "latest", Some(dir.as_path()), ChecksumKind::Sha1)
        .await
        .unwrap();
    assert_eq!(path, dir.join(LOCI_TOOLS_JAR));
}

// =============================================================================
// Sample Data
// =============================================================================

fn sample_fetcher() -> MockFetcher {
    SAMPLE_ARCHIVES
        .iter()
        .fold(MockFetcher::new(), |fetcher, &archive| {
            let stem = archive.trim_end_matches(".zip");
            let image = format!("{}/{}.tif", stem, stem);
            let notes = format!("{}/notes.txt", stem);
            let license = format!("{}-LICENSE.txt", stem);
            let body = make_zip(&[
                (image.as_str(), b"II*\x00".as_slice()),
                (notes.as_str(), b"nested notes stay".as_slice()),
                (license.as_str(), b"top-level text is removed".as_slice()),
            ]);
            fetcher.with(format!("{}{}", SAMPLES_BASE_URL, archive), body)
        })
}

#[tokio::test]
async fn test_fetch_samples_extracts_every_archive() {
    let dest = tempfile::tempdir().unwrap();
    let fetcher = sample_fetcher();

    let unpacked = fetch_samples(&fetcher, dest.path()).await.unwrap();
    assert_eq!(unpacked, SAMPLE_ARCHIVES.to_vec());

    let mut expected: Vec<String> = SAMPLE_ARCHIVES
        .iter()
        .map(|archive| archive.trim_end_matches(".zip").to_string())
        .collect();
    expected.sort();
    // no archives and no top-level text files are left behind
    assert_eq!(file_names(dest.path()), expected);

    for stem in &expected {
        let folder = dest.path().join(stem);
        assert_eq!(
            fs::read(folder.join(format!("{}.tif", stem))).unwrap(),
            b"II*\x00"
        );
        assert!(folder.join("notes.txt").is_file());
    }

    let requests = fetcher.requests().await;
    assert_eq!(requests.len(), SAMPLE_ARCHIVES.len());
    assert!(requests.iter().all(|url| url.starts_with(SAMPLES_BASE_URL)));
}

#[tokio::test]
async fn test_fetch_samples_stops_on_missing_archive() {
    let dest = tempfile::tempdir().unwrap();
    let fetcher = MockFetcher::new();

    let err = fetch_samples(&fetcher, dest.path()).await.unwrap_err();
    assert!(matches!(err, InstallError::Fetch { .. }));
    assert_eq!(fetcher.requests().await.len(), 1);
}

#[tokio::test]
async fn test_fetch_samples_rejects_corrupt_archive() {
    let dest = tempfile::tempdir().unwrap();
    let first = SAMPLE_ARCHIVES[0];
    let fetcher =
        MockFetcher::new().with(format!("{}{}", SAMPLES_BASE_URL, first), "not a zip file");

    let err = fetch_samples(&fetcher, dest.path()).await.unwrap_err();
    match err {
        InstallError::Archive { archive, .. } => assert_eq!(archive, first),
        other => panic!("expected an archive error, got {:?}", other),
    }
}
