//! inkhost CLI
//!
//! Local embedder for the inkhost playground host: boots a guest module
//! from a file-backed resource manifest, drives frames against a recording
//! canvas, and surfaces compiler diagnostics for a source file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use inkhost_boot::{BootOptions, Bootstrapper, FileAssetFetcher, ReadyModule};
use inkhost_events::{FrameClock, FrameScheduler, InputEvent, IntervalScheduler};
use inkhost_session::SessionCoordinator;
use inkhost_session::lsp_types::DiagnosticSeverity;
use inkhost_surface::{DrawTarget, RecordingCanvas, SurfaceProvider};

/// inkhost - WASM playground host
#[derive(Parser)]
#[command(name = "inkhost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Boot a guest module and run it for a number of frames
    Run {
        /// Directory holding the resource manifest and its assets
        assets: PathBuf,

        /// Manifest file name inside the asset directory
        #[arg(long, default_value = "manifest.json")]
        manifest: String,

        /// Number of frames to drive
        #[arg(long, default_value_t = 60)]
        frames: u32,

        /// Frame period in milliseconds
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,

        /// Canvas backing width in pixels
        #[arg(long, default_value_t = 800)]
        width: u32,

        /// Canvas backing height in pixels
        #[arg(long, default_value_t = 600)]
        height: u32,

        /// Skip sha256 verification of downloaded assets
        #[arg(long)]
        no_integrity: bool,

        /// Dump the recorded draw commands as JSON
        #[arg(long)]
        dump_draws: bool,
    },

    /// Boot a guest module and print diagnostics for a source file
    Check {
        /// Directory holding the resource manifest and its assets
        assets: PathBuf,

        /// Source file to check
        source: PathBuf,

        /// Manifest file name inside the asset directory
        #[arg(long, default_value = "manifest.json")]
        manifest: String,

        /// Skip sha256 verification of downloaded assets
        #[arg(long)]
        no_integrity: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    match cli.command {
        Commands::Run {
            assets,
            manifest,
            frames,
            frame_ms,
            width,
            height,
            no_integrity,
            dump_draws,
        } => runtime
            .block_on(run_guest(
                &assets,
                &manifest,
                frames,
                frame_ms,
                (width, height),
                no_integrity,
                dump_draws,
            ))
            .map(|_| false),
        Commands::Check {
            assets,
            source,
            manifest,
            no_integrity,
        } => runtime.block_on(check_source(&assets, &source, &manifest, no_integrity)),
    }
}

async fn boot(
    assets: &Path,
    manifest: &str,
    size: (u32, u32),
    no_integrity: bool,
) -> Result<(Arc<RecordingCanvas>, ReadyModule)> {
    let canvas = Arc::new(RecordingCanvas::new(size.0, size.1));
    let options = BootOptions::new()
        .surface(SurfaceProvider::value(Arc::clone(&canvas) as Arc<dyn DrawTarget>))
        .disable_integrity_check(no_integrity)
        .on_download_resource_progress(|loaded, total| {
            info!("Loaded {}/{} resources", loaded, total);
        });

    let bootstrapper = Bootstrapper::new(FileAssetFetcher::new(assets));
    let ready = bootstrapper
        .initialize(manifest, options)
        .await
        .into_diagnostic()?;
    Ok((canvas, ready))
}

async fn run_guest(
    assets: &Path,
    manifest: &str,
    frames: u32,
    frame_ms: u64,
    size: (u32, u32),
    no_integrity: bool,
    dump_draws: bool,
) -> Result<()> {
    let (canvas, ready) = boot(assets, manifest, size, no_integrity).await?;

    let mut clock = FrameClock::new();
    let mut scheduler = IntervalScheduler::new(Duration::from_millis(frame_ms));
    for _ in 0..frames {
        scheduler.next_frame().await;
        ready
            .forwarder
            .dispatch(InputEvent::FrameTick { delta_seconds: clock.tick() });
    }

    let commands = canvas.surface().lock().take_commands();
    info!("Guest drew {} commands over {} frames", commands.len(), frames);

    if dump_draws {
        println!(
            "{}",
            serde_json::to_string_pretty(&commands).into_diagnostic()?
        );
    }

    Ok(())
}

async fn check_source(
    assets: &Path,
    source: &Path,
    manifest: &str,
    no_integrity: bool,
) -> Result<bool> {
    let text = std::fs::read_to_string(source).into_diagnostic()?;
    let (_canvas, ready) = boot(assets, manifest, (800, 600), no_integrity).await?;

    let coordinator = SessionCoordinator::new();
    coordinator.on_document_changed(&text);
    let handle = Arc::clone(&ready.handle);
    coordinator.ensure_session(async move { Some(handle) }).await;

    let diagnostics = coordinator.get_diagnostics();
    if diagnostics.is_empty() {
        info!("No diagnostics for {}", source.display());
        return Ok(false);
    }

    for diag in &diagnostics {
        let severity = match diag.severity {
            Some(DiagnosticSeverity::ERROR) => "error",
            Some(DiagnosticSeverity::WARNING) => "warning",
            _ => "info",
        };
        println!(
            "{}:{}:{} {}: {}",
            source.display(),
            diag.range.start.line + 1,
            diag.range.start.character + 1,
            severity,
            diag.message
        );
    }

    let has_errors = diagnostics
        .iter()
        .any(|d| d.severity == Some(DiagnosticSeverity::ERROR));
    Ok(has_errors)
}

#[cfg(test)]
mod tests {
    use inkhost_boot::IntegrityDigest;
    use inkhost_guest::test_utils::{playground_guest_wat, wat_to_wasm};

    use super::*;

    fn seed_asset_dir(diagnostics_json: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let wasm = wat_to_wasm(&playground_guest_wat("[]", diagnostics_json));
        let integrity = IntegrityDigest::of_bytes(&wasm).to_string();
        std::fs::write(dir.path().join("core.wasm"), &wasm).expect("write wasm");
        let manifest = format!(
            r#"{{
                "assembly": [],
                "coreAssembly": [{{"virtualPath":"core.wasm","resolvedUrl":"core.wasm","integrity":"{integrity}"}}],
                "satelliteResources": {{}}
            }}"#,
        );
        std::fs::write(dir.path().join("manifest.json"), manifest).expect("write manifest");
        dir
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn run_drives_frames_against_a_quiet_guest() {
        let dir = seed_asset_dir("[]");
        run_guest(dir.path(), "manifest.json", 3, 1, (320, 240), false, false)
            .await
            .expect("run");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn check_reports_guest_diagnostics() {
        let diagnostics = r#"[{"start":0,"end":3,"message":"; expected","severity":"Error"}]"#;
        let dir = seed_asset_dir(diagnostics);
        let source = dir.path().join("program.cs");
        std::fs::write(&source, "var x = 1").expect("write source");

        let has_errors = check_source(dir.path(), &source, "manifest.json", false)
            .await
            .expect("check");
        assert!(has_errors);
    }
}
