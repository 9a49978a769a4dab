//! Integration tests for the booth services
//!
//! These tests verify:
//! - Gallery selection feeding the reorder grid
//! - Capture sessions against a camera with slow start-up
//! - Permission prompts backed by the file permission memory

use camino::Utf8PathBuf;
use my4cuts::config::FilePermissionMemory;
use my4cuts::models::{
    CameraState, CaptureSettings, DevicePosition, FlashMode, PermissionStatus,
    PlatformAuthorization, Resource,
};
use my4cuts::platform::simulated::{
    SimulatedAsset, SimulatedCamera, SimulatedPermissions, SimulatedPicker, sample_image,
};
use my4cuts::services::{
    CaptureSession, CountdownSettings, GallerySelector, PermissionGateway, PermissionMemory,
    ReorderableCollection, SLOT_COUNT, cancellable_timer,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_gallery_selection_fills_grid() {
    let picker = SimulatedPicker::new();
    let first = sample_image(1);
    let second = sample_image(2);
    let third = sample_image(3);
    picker.queue_selection(vec![
        SimulatedAsset::ok("1", first.clone()).delayed(Duration::from_millis(20)),
        SimulatedAsset::broken("2", "truncated file"),
        SimulatedAsset::ok("3", second.clone()).delayed(Duration::from_millis(5)),
        SimulatedAsset::ok("4", third.clone()),
    ]);
    let selector = GallerySelector::new(picker.clone(), 4);

    let selection = selector.present().await;
    assert_eq!(selection.images.len(), 3);
    assert_eq!(selection.dropped.len(), 1);

    let grid = ReorderableCollection::new(selection.images);
    let ids: Vec<u64> = grid.slots().iter().map(|image| image.id()).collect();
    assert_eq!(ids, vec![first.id(), second.id(), third.id(), third.id()]);
    assert_eq!(picker.loads(), 4);
}

#[tokio::test]
async fn test_empty_selection_gives_placeholder_grid() {
    let selector = GallerySelector::new(SimulatedPicker::new(), 4);

    let selection = selector.present().await;
    assert!(selection.is_empty());

    let grid = ReorderableCollection::new(selection.images);
    assert_eq!(grid.slots().len(), SLOT_COUNT);
    assert!(grid.slots().iter().all(|image| image.is_placeholder()));
}

#[tokio::test]
async fn test_slow_camera_start_is_awaited() {
    let camera = SimulatedCamera::with_start_latency(Duration::from_millis(30));
    let mut session = CaptureSession::new(
        camera.clone(),
        CaptureSettings {
            flash_mode: FlashMode::On,
        },
        CountdownSettings {
            seconds: 3,
            interval: Duration::from_millis(1),
        },
    );
    let (_canceller, mut timer) = cancellable_timer();

    session.start(DevicePosition::Front).await.unwrap();
    assert_eq!(session.state(), CameraState::Running);
    assert!(camera.is_running());

    session.capture(true, &mut timer).await.unwrap();
    assert_eq!(
        camera.last_settings().map(|s| s.flash_mode),
        Some(FlashMode::On)
    );

    session.switch_device().await.unwrap();
    assert_eq!(session.position(), DevicePosition::Back);
    assert_eq!(camera.stop_calls(), 1);
}

#[tokio::test]
async fn test_denial_persisted_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().join("Permission Memory.yaml")).unwrap();
    let memory = Arc::new(FilePermissionMemory::open(&path).unwrap());

    let platform = SimulatedPermissions::new();
    platform.answer_with(Resource::Camera, PlatformAuthorization::Denied);
    let gateway = PermissionGateway::new(platform, Arc::clone(&memory) as Arc<dyn PermissionMemory>);

    assert_eq!(
        gateway.request(Resource::Camera).await,
        Some(PermissionStatus::Denied)
    );
    assert!(gateway.was_previously_denied(Resource::Camera));

    let reopened = FilePermissionMemory::open(&path).unwrap();
    assert!(reopened.was_denied(Resource::Camera));
}
