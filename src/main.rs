//! my4cuts - headless booth driver
//!
//! Wires the workflow to the simulated platform and plays one scripted visit:
//!
//! 1. Initialize logging -> logs/my4cuts.<date>
//! 2. Load `My4Cuts Data/My4Cuts Config.yaml` (plus `MY4CUTS__BOOTH__*` overrides)
//!    and apply its `debug_mode` to the log level
//! 3. Open the persisted permission memory
//! 4. Spawn the workflow actor on a multi-threaded tokio runtime
//! 5. Camera path: four shots, each saved, then processing
//! 6. Gallery path: pick two photos, swap the first two slots, process
//! 7. Drop the handle, wait for the actor and log the metrics summary

use anyhow::{Context, Result, bail};
use my4cuts::platform::simulated::{
    SimulatedAsset, SimulatedCamera, SimulatedPermissions, SimulatedPicker, sample_image,
};
use my4cuts::{
    APP_NAME, Command, ConfigManager, Platform, Screen, VERSION, WorkflowController,
    WorkflowHandle, spawn_workflow,
};
use std::sync::Arc;
use std::time::Duration;

/// Longest the driver waits for any single screen.
const SCREEN_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> Result<()> {
    // Installed before the config is read so its warnings reach the log
    let log_guard = my4cuts::logging::setup_logging_with_console("logs", "my4cuts", false, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new("My4Cuts Data")?;
    config_manager.ensure_booth_config()?;
    let booth_config = config_manager.load_booth_config()?;
    log_guard.set_debug_mode(booth_config.booth.debug_mode)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("my4cuts-worker")
        .build()
        .context("Failed to build tokio runtime")?;

    let permission_memory = Arc::new(config_manager.permission_memory()?);
    tracing::info!("Permission memory at {}", permission_memory.path());

    let picker = SimulatedPicker::new();
    picker.queue_selection(vec![
        SimulatedAsset::ok("beach", sample_image(64)),
        SimulatedAsset::ok("city", sample_image(192)),
    ]);

    let controller = WorkflowController::new(
        Platform {
            permissions: SimulatedPermissions::new(),
            camera: SimulatedCamera::new(),
            picker,
        },
        permission_memory,
        booth_config.booth,
    );
    let metrics = controller.metrics();

    runtime.block_on(async move {
        let (handle, task) = spawn_workflow(controller);

        let outcome = run_session(&handle).await;

        drop(handle);
        task.await.context("Workflow task panicked")?;
        outcome
    })?;

    metrics.log_summary();
    runtime.shutdown_timeout(Duration::from_secs(5));
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_session(handle: &WorkflowHandle) -> Result<()> {
    expect_screen(handle, Screen::PermissionGate).await?;
    handle.execute(Command::AllowPermissions).await?;
    expect_screen(handle, Screen::Home).await?;

    tracing::info!("--- Camera session ---");
    handle.execute(Command::OpenCamera).await?;
    loop {
        handle.execute(Command::Shutter).await?;
        handle.execute(Command::SavePhoto).await?;
        if handle.snapshot().screen == Screen::Home {
            break;
        }
    }
    let history = handle.snapshot().history.len();
    tracing::info!("Recent photos strip holds {} photos", history);

    tracing::info!("--- Gallery session ---");
    handle.execute(Command::OpenGallery).await?;
    expect_screen(handle, Screen::Reviewing).await?;
    handle.execute(Command::BeginDrag(0)).await?;
    handle.execute(Command::SetDropTarget(1)).await?;
    handle.execute(Command::CommitSwap).await?;
    handle.execute(Command::ConfirmReview).await?;
    expect_screen(handle, Screen::Home).await?;

    let state = handle.snapshot();
    tracing::info!("Booth visit finished with {} processed jobs", state.completed_jobs);
    Ok(())
}

async fn expect_screen(handle: &WorkflowHandle, screen: Screen) -> Result<()> {
    if !handle.wait_for_screen(screen, SCREEN_TIMEOUT).await {
        bail!(
            "Timed out waiting for the {} screen (still on {})",
            screen,
            handle.snapshot().screen
        );
    }
    Ok(())
}
