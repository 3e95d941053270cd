//! Recovering from a missing Java runtime.
//!
//! When the JVM cannot be located, a read may hand the error to a
//! [`RuntimeRemediation`]. If the hook reports that it fixed the environment,
//! the read is attempted once more.

use std::process::Command;

use tracing::{info, warn};

use crate::error::BridgeError;

/// A one-shot attempt to make a Java runtime available.
pub trait RuntimeRemediation: Send + Sync {
    /// Try to fix the environment. Returns `true` if a retry may now succeed.
    fn remediate(&self, error: &BridgeError) -> bool;
}

/// Confirmation callback shown the prompt text before anything is installed.
pub type ConfirmFn = Box<dyn Fn(&str) -> bool + Send + Sync>;

// =============================================================================
// CondaJdkInstaller
// =============================================================================

/// Installs `openjdk` into the active conda environment.
///
/// On success `JAVA_HOME` is pointed at the environment prefix so the next
/// runtime start finds the new JVM.
pub struct CondaJdkInstaller {
    env_name: String,
    prefix: String,
    program: String,
    confirm: ConfirmFn,
}

impl CondaJdkInstaller {
    /// Build from `CONDA_DEFAULT_ENV` and `CONDA_PREFIX`.
    ///
    /// `None` outside an active conda environment.
    pub fn from_env(confirm: ConfirmFn) -> Option<Self> {
        Self::from_vars(
            std::env::var("CONDA_DEFAULT_ENV").ok(),
            std::env::var("CONDA_PREFIX").ok(),
            confirm,
        )
    }

    pub fn from_vars(
        env_name: Option<String>,
        prefix: Option<String>,
        confirm: ConfirmFn,
    ) -> Option<Self> {
        match (env_name, prefix) {
            (Some(env_name), Some(prefix)) if !env_name.is_empty() && !prefix.is_empty() => {
                Some(Self {
                    env_name,
                    prefix,
                    program: "conda".to_string(),
                    confirm,
                })
            }
            _ => None,
        }
    }

    /// Use a different executable in place of `conda`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    /// Text the user is asked to confirm.
    pub fn prompt(&self) -> String {
        format!(
            "bioformats-bridge requires java but could not detect it in your environment.\n\n\
             It looks like you are running in a conda environment ('{}'). \
             Would you like to install 'openjdk' from the conda-forge channel?\n\n\
             (You may also install java manually and set the JAVA_HOME environment variable.)",
            self.env_name
        )
    }

    /// The arguments passed to the installer executable.
    pub fn install_args(&self) -> Vec<String> {
        vec![
            "install".to_string(),
            "-y".to_string(),
            "--name".to_string(),
            self.env_name.clone(),
            "openjdk".to_string(),
        ]
    }

    fn install(&self) -> bool {
        info!("Installing openjdk into conda environment '{}'", self.env_name);
        match Command::new(&self.program).args(self.install_args()).status() {
            Ok(status) if status.success() => true,
            Ok(status) => {
                warn!("{} exited with {}", self.program, status);
                false
            }
            Err(e) => {
                warn!("Could not run {}: {}", self.program, e);
                false
            }
        }
    }
}

impl RuntimeRemediation for CondaJdkInstaller {
    fn remediate(&self, error: &BridgeError) -> bool {
        if !error.is_runtime_not_found() {
            return false;
        }
        if !(self.confirm)(&self.prompt()) {
            info!("openjdk installation declined");
            return false;
        }
        if !self.install() {
            return false;
        }
        std::env::set_var("JAVA_HOME", &self.prefix);
        info!("Set JAVA_HOME to {}", self.prefix);
        true
    }
}

impl std::fmt::Debug for CondaJdkInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CondaJdkInstaller")
            .field("env_name", &self.env_name)
            .field("prefix", &self.prefix)
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
