//! Configuration management for bioformats-bridge.
//!
//! Two layers:
//! - [`RuntimeConfig`]: what the library needs to start the JVM and find the jar
//! - [`Cli`]: command-line arguments via clap, with `BIOFORMATS_` environment fallbacks
//!
//! # Environment Variables
//!
//! - `BIOFORMATS_JAVA_MEMORY` - Maximum JVM heap (default: 1024m)
//! - `BIOFORMATS_JAR` - Explicit path to `loci_tools.jar`
//! - `BIOFORMATS_JAR_DIR` - Extra directory searched for (and used to install) the jar
//! - `BIOFORMATS_LOG_LEVEL` - Root log level of the Java library (default: ERROR)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Default Values
// =============================================================================

/// Default maximum JVM heap size.
pub const DEFAULT_JAVA_MEMORY: &str = "1024m";

/// Default root log level of the Java library.
pub const DEFAULT_JAVA_LOG_LEVEL: &str = "ERROR";

/// Default Bio-Formats release to download.
pub const DEFAULT_JAR_VERSION: &str = "latest";

/// Default directory for sample data.
pub const DEFAULT_SAMPLES_DIR: &str = "sample_data";

const JAVA_LOG_LEVELS: &[&str] = &["ALL", "TRACE", "DEBUG", "INFO", "WARN", "ERROR", "OFF"];

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Settings used when starting the Java runtime.
///
/// Only the first successful start in a process applies; later configs are
/// ignored because a JVM cannot be restarted.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Explicit jar path. When unset the standard locations are searched.
    pub jar_path: Option<PathBuf>,

    /// Maximum heap, passed as `-Xmx<java_memory>`.
    pub java_memory: String,

    /// Root level for the library's logger.
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            jar_path: None,
            java_memory: DEFAULT_JAVA_MEMORY.to_string(),
            log_level: DEFAULT_JAVA_LOG_LEVEL.to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn with_jar(mut self, jar_path: impl Into<PathBuf>) -> Self {
        self.jar_path = Some(jar_path.into());
        self
    }

    pub fn with_java_memory(mut self, java_memory: impl Into<String>) -> Self {
        self.java_memory = java_memory.into();
        self
    }

    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_memory_size(&self.java_memory) {
            return Err(format!(
                "java_memory must look like 512m, 2g or 1048576, got '{}'",
                self.java_memory
            ));
        }

        if !JAVA_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(format!(
                "log_level must be one of {:?}, got '{}'",
                JAVA_LOG_LEVELS, self.log_level
            ));
        }

        Ok(())
    }
}

/// `<digits>` with an optional `k`, `m` or `g` unit, as `-Xmx` accepts.
fn is_valid_memory_size(value: &str) -> bool {
    let digits = value.trim_end_matches(|c| matches!(c, 'k' | 'K' | 'm' | 'M' | 'g' | 'G'));
    let unit_len = value.len() - digits.len();
    unit_len <= 1
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && digits.bytes().any(|b| b != b'0')
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// bioformats-bridge - open microscopy files through Bio-Formats.
#[derive(Parser, Debug, Clone)]
#[command(name = "bioformats-bridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Maximum JVM heap size.
    #[arg(long, global = true, default_value = DEFAULT_JAVA_MEMORY, env = "BIOFORMATS_JAVA_MEMORY")]
    pub java_memory: String,

    /// Path to loci_tools.jar (searched in standard locations if unset).
    #[arg(long, global = true, env = "BIOFORMATS_JAR")]
    pub jar: Option<PathBuf>,

    /// Root log level of the Java library.
    #[arg(long, global = true, default_value = DEFAULT_JAVA_LOG_LEVEL, env = "BIOFORMATS_LOG_LEVEL")]
    pub java_log_level: String,
}

impl Cli {
    /// Runtime settings shared by every subcommand.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            jar_path: self.jar.clone(),
            java_memory: self.java_memory.clone(),
            log_level: self.java_log_level.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open a file and print its dimensions and display metadata.
    Info(InfoConfig),

    /// Download and verify loci_tools.jar.
    InstallJar(InstallJarConfig),

    /// Download the sample data archives.
    Samples(SamplesConfig),

    /// Check that Java and the Bio-Formats jar can be found.
    Check,
}

/// Arguments for `info`.
#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    /// File to open.
    pub path: PathBuf,

    /// Keep channels as an array axis instead of one layer per channel.
    #[arg(long, default_value_t = false)]
    pub no_split_channels: bool,

    /// Print machine-readable JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Also load the plane at `t,c,z` and print its value range.
    #[arg(long, value_delimiter = ',')]
    pub plane: Option<Vec<u32>>,

    /// Print the embedded OME-XML document.
    #[arg(long, default_value_t = false)]
    pub ome_xml: bool,

    /// Offer to install Java with conda when it is missing.
    #[arg(long, default_value_t = false)]
    pub install_java: bool,
}

impl InfoConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref plane) = self.plane {
            if plane.len() != 3 {
                return Err(format!(
                    "--plane takes exactly three values t,c,z, got {}",
                    plane.len()
                ));
            }
        }
        Ok(())
    }
}

/// Arguments for `install-jar`.
#[derive(Args, Debug, Clone)]
pub struct InstallJarConfig {
    /// Bio-Formats release, e.g. `latest` or `7.3.0`.
    #[arg(long, default_value = DEFAULT_JAR_VERSION)]
    pub jar_version: String,

    /// Target directory (first writable standard location if unset).
    #[arg(long, env = "BIOFORMATS_JAR_DIR")]
    pub dest: Option<PathBuf>,

    /// Verify against the published SHA-256 instead of SHA-1.
    #[arg(long, default_value_t = false)]
    pub sha256: bool,
}

impl InstallJarConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.jar_version.is_empty() || self.jar_version.contains('/') {
            return Err(format!("invalid jar version '{}'", self.jar_version));
        }
        Ok(())
    }
}

/// Arguments for `samples`.
#[derive(Args, Debug, Clone)]
pub struct SamplesConfig {
    /// Directory to unpack the samples into.
    #[arg(default_value = DEFAULT_SAMPLES_DIR)]
    pub dest: PathBuf,
}

// =============================================================================
// Tests
// =============================================================================
