//! Process-wide Java runtime lifecycle.
//!
//! A JVM can be created at most once per process and never torn down, so the
//! runtime lives in a `static`. Start attempts are serialized by a mutex. A
//! failure before the JVM exists (for example because Java is not installed
//! yet) leaves the slot empty so a later call can retry; once `JavaVM::new`
//! returns, the runtime is published before anything else can fail.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use jni::objects::JValue;
use jni::{InitArgsBuilder, JNIEnv, JNIVersion, JavaVM};
use tracing::{debug, info, warn};

use super::jvm::describe_error;

use crate::config::RuntimeConfig;
use crate::error::BridgeError;
use crate::install::{find_jar, jar_locations};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();
static START_LOCK: Mutex<()> = Mutex::new(());

/// The running JVM with Bio-Formats on its class path.
pub struct Runtime {
    vm: JavaVM,
    jar: PathBuf,
}

impl Runtime {
    /// Return the running JVM, starting it first if needed.
    ///
    /// The first successful call decides the JVM options; later calls return
    /// the same runtime and ignore `config`.
    pub fn get_or_start(config: &RuntimeConfig) -> Result<&'static Runtime, BridgeError> {
        if let Some(runtime) = RUNTIME.get() {
            return Ok(runtime);
        }

        let _start = START_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(runtime) = RUNTIME.get() {
            return Ok(runtime);
        }

        let started = Self::start(config)?;
        let runtime = RUNTIME.get_or_init(|| started);
        if let Err(e) = runtime.configure_logging(&config.log_level) {
            warn!("Could not set the Java log level: {}", e);
        }
        Ok(runtime)
    }

    /// The running JVM, if one was started.
    pub fn get() -> Option<&'static Runtime> {
        RUNTIME.get()
    }

    pub fn is_started() -> bool {
        RUNTIME.get().is_some()
    }

    pub fn vm(&self) -> &JavaVM {
        &self.vm
    }

    /// The jar the runtime was started with.
    pub fn jar(&self) -> &Path {
        &self.jar
    }

    /// Attach the calling thread for the rest of its life.
    ///
    /// Reader calls come from long-lived pool threads, so the thread stays
    /// attached instead of paying an attach and detach on every call.
    pub fn attach(&self) -> Result<JNIEnv<'_>, BridgeError> {
        self.vm
            .attach_current_thread_permanently()
            .map_err(|e| BridgeError::Java(e.to_string()))
    }

    /// Create the JVM. Nothing after `JavaVM::new` may fail.
    fn start(config: &RuntimeConfig) -> Result<Runtime, BridgeError> {
        config.validate().map_err(BridgeError::RuntimeStart)?;

        let libjvm_dir = locate_jvm()?;
        debug!("Found libjvm in {}", libjvm_dir);
        let jar = resolve_jar(config)?;

        let options = jvm_options(config, &jar);
        let mut builder = InitArgsBuilder::new().version(JNIVersion::V8);
        for option in &options {
            builder = builder.option(option.as_str());
        }
        let args = builder
            .build()
            .map_err(|e| BridgeError::RuntimeStart(e.to_string()))?;

        let vm = JavaVM::new(args).map_err(|e| BridgeError::RuntimeStart(e.to_string()))?;
        info!(
            "Started JVM with {} (max heap {})",
            jar.display(),
            config.java_memory
        );

        Ok(Runtime { vm, jar })
    }

    /// Set the Java library's root log level. Runs once, right after start.
    fn configure_logging(&self, level: &str) -> Result<(), BridgeError> {
        let mut env = self.attach()?;
        env.with_local_frame(4, |env| -> jni::errors::Result<()> {
            let level = env.new_string(level)?;
            env.call_static_method(
                "loci/common/DebugTools",
                "setRootLevel",
                "(Ljava/lang/String;)V",
                &[JValue::from(&level)],
            )?;
            Ok(())
        })
        .map_err(|e| {
            BridgeError::Java(format!("setRootLevel failed: {}", describe_error(&mut env, e)))
        })
    }
}

/// JVM options for a config and jar, in the order they are passed.
pub fn jvm_options(config: &RuntimeConfig, jar: &Path) -> Vec<String> {
    vec![
        "-ea".to_string(),
        format!("-Djava.class.path={}", jar.display()),
        format!("-Xmx{}", config.java_memory),
    ]
}

fn resolve_jar(config: &RuntimeConfig) -> Result<PathBuf, BridgeError> {
    match config.jar_path {
        Some(ref jar) if jar.is_file() => Ok(jar.clone()),
        Some(ref jar) => Err(BridgeError::JarNotFound {
            searched: vec![jar.clone()],
        }),
        None => find_jar(None).ok_or_else(|| BridgeError::JarNotFound {
            searched: jar_locations(None),
        }),
    }
}

/// Directory containing the JVM shared library, honoring `JAVA_HOME`.
fn locate_jvm() -> Result<String, BridgeError> {
    java_locator::locate_jvm_dyn_library().map_err(|e| BridgeError::RuntimeNotFound(e.to_string()))
}

// =============================================================================
// Tests
// =============================================================================
