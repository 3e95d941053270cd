//! bioformats-bridge - inspect microscopy files through Bio-Formats.
//!
//! This binary wraps the library's reader and provisioning functions.

use clap::Parser;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bioformats_bridge::{
    config::{Cli, Command, InfoConfig, InstallJarConfig, RuntimeConfig, SamplesConfig},
    download_loci_jar, fetch_samples, find_jar, jar_locations, read_bioformats, ChecksumKind,
    CondaJdkInstaller, HttpFetcher, LayerData, LayerName, PlaneCoord, ReadOptions, Runtime,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let runtime = cli.runtime_config();

    match cli.command {
        Command::Info(config) => run_info(config, runtime).await,
        Command::InstallJar(config) => run_install_jar(config).await,
        Command::Samples(config) => run_samples(config).await,
        Command::Check => run_check(runtime),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "bioformats_bridge=debug"
    } else {
        "bioformats_bridge=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Info Command
// =============================================================================

async fn run_info(config: InfoConfig, runtime: RuntimeConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    // JNI calls block; keep them off the async workers
    let result = tokio::task::spawn_blocking(move || describe_file(&config, runtime)).await;

    match result {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Reader task failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn describe_file(config: &InfoConfig, runtime: RuntimeConfig) -> Result<(), String> {
    let mut options = ReadOptions::default()
        .with_split_channels(!config.no_split_channels)
        .with_runtime(runtime);
    if config.install_java {
        if let Some(installer) = CondaJdkInstaller::from_env(Box::new(confirm_on_stdin)) {
            options = options.with_remediation(Arc::new(installer));
        }
    }

    let mut layers = read_bioformats(&config.path, &options).map_err(|e| e.to_string())?;
    let layer = layers
        .pop()
        .ok_or_else(|| format!("no layers read from {}", config.path.display()))?;

    let plane_range = match config.plane.as_deref() {
        Some(&[t, c, z]) => {
            let coord = PlaneCoord::new(t, c, z);
            let plane = layer.data.chunk(coord).map_err(|e| e.to_string())?;
            Some((coord, plane.min_max()))
        }
        _ => None,
    };

    if config.json {
        print_json(&layer, plane_range)?;
    } else {
        print_summary(&layer, plane_range);
    }

    if config.ome_xml {
        println!();
        println!("{}", layer.meta.metadata.xml());
    }
    Ok(())
}

type PlaneRange = Option<(PlaneCoord, Option<(f64, f64)>)>;

fn print_json(layer: &LayerData, plane_range: PlaneRange) -> Result<(), String> {
    let data = &layer.data;
    let mut value = serde_json::json!({
        "path": data.path().display().to_string(),
        "shape": data.shape(),
        "dtype": data.dtype().tag(),
        "chunks": data.chunks(),
        "meta": &layer.meta,
    });
    if let Some((coord, range)) = plane_range {
        value["plane"] = serde_json::json!({
            "t": coord.t,
            "c": coord.c,
            "z": coord.z,
            "min": range.map(|r| r.0),
            "max": range.map(|r| r.1),
        });
    }

    let text = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
    println!("{}", text);
    Ok(())
}

fn print_summary(layer: &LayerData, plane_range: PlaneRange) {
    let data = &layer.data;
    let meta = &layer.meta;

    println!("File:         {}", data.path().display());
    println!("Shape (TCZYX): {:?}", data.shape());
    println!("Dtype:        {}", data.dtype());
    println!(
        "Chunks:       {} planes of {:?}",
        data.num_chunks(),
        data.chunk_shape()
    );

    match meta.name {
        LayerName::Single(ref name) => println!("Name:         {}", name),
        LayerName::PerChannel(ref names) => {
            println!("Names:");
            for name in names {
                println!("  {}", name);
            }
        }
    }

    match meta.channel_axis {
        Some(axis) => println!("Channel axis: {}", axis),
        None => println!("Channel axis: none"),
    }
    match meta.scale {
        Some(ref scale) => println!("Scale:        {:?}", scale),
        None => println!("Scale:        unknown"),
    }
    if let Some(ref colormaps) = meta.colormap {
        println!("Colormaps:");
        for (c, colormap) in colormaps.iter().enumerate() {
            match colormap {
                Some(colormap) => println!("  {}: {}", c, colormap),
                None => println!("  {}: default", c),
            }
        }
    }

    if let Some((coord, range)) = plane_range {
        match range {
            Some((min, max)) => println!("Plane {}: min {}, max {}", coord, min, max),
            None => println!("Plane {}: empty", coord),
        }
    }
}

/// Ask a yes/no question on the terminal.
fn confirm_on_stdin(prompt: &str) -> bool {
    println!("{}", prompt);
    print!("[y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// =============================================================================
// Install Commands
// =============================================================================

async fn run_install_jar(config: InstallJarConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let kind = if config.sha256 {
        ChecksumKind::Sha256
    } else {
        ChecksumKind::Sha1
    };
    let fetcher = HttpFetcher::new();

    match download_loci_jar(&fetcher, &config.jar_version, config.dest.as_deref(), kind).await {
        Ok(path) => {
            println!("✓ Installed {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_samples(config: SamplesConfig) -> ExitCode {
    let fetcher = HttpFetcher::new();
    info!("Fetching sample data into {}", config.dest.display());

    match fetch_samples(&fetcher, &config.dest).await {
        Ok(archives) => {
            for archive in &archives {
                println!("✓ {}", archive);
            }
            println!("Sample data in {}", config.dest.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Check Command
// =============================================================================

fn run_check(runtime: RuntimeConfig) -> ExitCode {
    println!("bioformats-bridge Environment Check");
    println!("═══════════════════════════════════");
    println!();

    if let Err(e) = runtime.validate() {
        println!("✗ Configuration: {}", e);
        return ExitCode::FAILURE;
    }
    println!("✓ Java memory: {}", runtime.java_memory);
    println!("✓ Java log level: {}", runtime.log_level);

    let mut ok = true;

    match java_locator::locate_jvm_dyn_library() {
        Ok(dir) => println!("✓ JVM library: {}", dir),
        Err(e) => {
            println!("✗ JVM library: {}", e);
            println!("  Install java or set JAVA_HOME.");
            ok = false;
        }
    }

    let jar = match runtime.jar_path {
        Some(ref jar) => Some(jar.clone()).filter(|jar| jar.is_file()),
        None => find_jar(None),
    };
    match jar {
        Some(ref jar) => println!("✓ Bio-Formats jar: {}", jar.display()),
        None => {
            println!("✗ Bio-Formats jar: not found");
            println!("  Searched:");
            let searched = match runtime.jar_path {
                Some(ref jar) => vec![jar.clone()],
                None => jar_locations(None),
            };
            for location in searched {
                println!("    {}", location.display());
            }
            println!("  Run `bioformats-bridge install-jar` to download it.");
            ok = false;
        }
    }

    if ok {
        print!("Starting JVM... ");
        match Runtime::get_or_start(&runtime) {
            Ok(_) => println!("✓ success"),
            Err(e) => {
                println!("✗ failed");
                println!();
                println!("Error: {}", e);
                ok = false;
            }
        }
    }

    println!();
    println!("═══════════════════════════════════");
    if ok {
        println!("✓ All checks passed!");
        ExitCode::SUCCESS
    } else {
        println!("✗ Some checks failed");
        ExitCode::FAILURE
    }
}
