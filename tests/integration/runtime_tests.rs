//! Java runtime tests.
//!
//! These start a real JVM, so they are skipped when no Java runtime can be
//! located. A JVM lives for the whole process: every test here shares the one
//! started by whichever test runs first.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use bioformats_bridge::error::BridgeError;
use bioformats_bridge::{open_jvm_reader, Runtime, RuntimeConfig};

use super::test_utils::make_zip;

/// Helper to skip test with a message
macro_rules! skip_if {
    ($cond:expr, $msg:expr) => {
        if $cond {
            eprintln!("SKIPPED: {}", $msg);
            return;
        }
    };
}

fn jvm_available() -> bool {
    java_locator::locate_jvm_dyn_library().is_ok()
}

/// A jar with no Bio-Formats classes: the JVM starts but `DebugTools` is missing.
fn jar_without_bioformats(dir: &Path) -> PathBuf {
    let jar = dir.join("loci_tools.jar");
    fs::write(&jar, make_zip(&[("README", b"no classes here".as_slice())])).unwrap();
    jar
}

fn config(dir: &Path) -> RuntimeConfig {
    RuntimeConfig::default().with_jar(jar_without_bioformats(dir))
}

#[test]
fn test_runtime_kept_when_log_level_cannot_be_set() {
    skip_if!(!jvm_available(), "no Java runtime found");
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());

    let first = Runtime::get_or_start(&config).expect("JVM should start without Bio-Formats");
    assert!(Runtime::is_started());

    // a second call reuses the JVM instead of trying to create another
    let second = Runtime::get_or_start(&config).unwrap();
    assert!(std::ptr::eq(first, second));
}

#[test]
fn test_pool_threads_stay_attached() {
    skip_if!(!jvm_available(), "no Java runtime found");
    let dir = tempfile::tempdir().unwrap();
    let runtime = Runtime::get_or_start(&config(dir.path())).unwrap();

    thread::spawn(move || {
        assert!(runtime.vm().get_env().is_err());
        drop(runtime.attach().unwrap());
        // still attached after the env is dropped
        assert!(runtime.vm().get_env().is_ok());
    })
    .join()
    .unwrap();
}

#[test]
fn test_missing_file_fails_to_open() {
    skip_if!(!jvm_available(), "no Java runtime found");
    let dir = tempfile::tempdir().unwrap();

    let err = open_jvm_reader(&dir.path().join("absent.czi"), &config(dir.path())).unwrap_err();
    assert!(matches!(err, BridgeError::OpenFailed { .. }), "{}", err);
}

#[test]
fn test_java_exception_reported_and_cleared() {
    skip_if!(!jvm_available(), "no Java runtime found");
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("cells.czi");
    fs::write(&image, b"not an image").unwrap();
    let config = config(dir.path());

    // the second attempt only gets the same message if the first exception was cleared
    for _ in 0..2 {
        match open_jvm_reader(&image, &config).unwrap_err() {
            BridgeError::OpenFailed { path, reason } => {
                assert_eq!(path, image);
                assert!(reason.contains("ImageReader"), "{}", reason);
            }
            other => panic!("expected an open failure, got {:?}", other),
        }
    }
}
