use crate::error::{BoothError, BoothResult};
use crate::metrics::Metrics;
use crate::models::{
    Alert, AppState, BoothSettings, CaptureSettings, CountProgress, JobOrigin,
    PHOTOS_PER_SESSION, PermissionStatus, ProcessingJob, Resource, Screen,
};
use crate::platform::{AssetPicker, CameraBackend, PermissionPlatform, Platform};
use crate::services::{
    CancellableTimer, CaptureSession, CountdownSettings, GallerySelector, PermissionGateway,
    PermissionMemory, ReorderableCollection, TimerCanceller, TimerOutcome, cancellable_timer,
};
use crate::state::StateManager;
use crate::workflow::Command;
use std::sync::Arc;
use std::time::Instant;

/// Top-level booth state machine.
///
/// Owns every component and is driven one command at a time, normally by the
/// actor started with [`spawn_workflow`](crate::workflow::spawn_workflow).
/// All observable state is published through the shared [`StateManager`].
///
/// Every command method returns `Err` when it was rejected for the current
/// screen, or when it failed and raised an alert. In both cases the workflow
/// is left on a stable screen.
pub struct WorkflowController<P, C, A> {
    settings: BoothSettings,
    state: Arc<StateManager>,
    metrics: Arc<Metrics>,
    permissions: PermissionGateway<P>,
    camera: CaptureSession<C>,
    gallery: GallerySelector<A>,
    timer: CancellableTimer,
    canceller: TimerCanceller,
    collection: Option<ReorderableCollection>,
}

impl<P, C, A> WorkflowController<P, C, A>
where
    P: PermissionPlatform,
    C: CameraBackend,
    A: AssetPicker,
{
    pub fn new(
        platform: Platform<P, C, A>,
        memory: Arc<dyn PermissionMemory>,
        settings: BoothSettings,
    ) -> Self {
        let settings = settings.validated();
        let metrics = Arc::new(Metrics::new());
        let state = Arc::new(StateManager::new().with_metrics(Arc::clone(&metrics)));

        let camera_state = Arc::clone(&state);
        let camera = CaptureSession::new(
            platform.camera,
            CaptureSettings {
                flash_mode: settings.flash_mode,
            },
            CountdownSettings {
                seconds: settings.countdown_seconds,
                interval: settings.countdown_interval(),
            },
        )
        .with_observer(Box::new(move |camera, position| {
            camera_state.set_camera(camera, position);
        }));

        let (canceller, timer) = cancellable_timer();

        tracing::debug!("Workflow configured: {:?}", settings);

        Self {
            permissions: PermissionGateway::new(platform.permissions, memory),
            gallery: GallerySelector::new(platform.picker, settings.max_selection),
            settings,
            state,
            metrics,
            camera,
            timer,
            canceller,
            collection: None,
        }
    }

    pub fn state_manager(&self) -> Arc<StateManager> {
        Arc::clone(&self.state)
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Handle that interrupts the splash, countdown or processing wait.
    pub fn canceller(&self) -> TimerCanceller {
        self.canceller.clone()
    }

    pub fn settings(&self) -> &BoothSettings {
        &self.settings
    }

    /// Dispatch one user intent.
    pub async fn handle(&mut self, command: Command) -> BoothResult<()> {
        tracing::debug!("Handling {:?}", command);
        match command {
            Command::AllowPermissions => self.allow_permissions().await,
            Command::DenyPermissions => self.deny_permissions(),
            Command::OpenCamera => self.open_camera().await,
            Command::OpenGallery => self.open_gallery().await,
            Command::SwitchCamera => self.switch_camera().await,
            Command::Shutter => self.shutter().await,
            Command::SavePhoto => self.save_photo().await,
            Command::DiscardPhoto => self.discard_photo(),
            Command::LeaveCamera => self.leave_camera(),
            Command::BeginDrag(index) => self.begin_drag(index),
            Command::SetDropTarget(index) => self.set_drop_target(index),
            Command::CommitSwap => self.commit_swap(),
            Command::CancelDrag => self.cancel_drag(),
            Command::CancelReview => self.cancel_review(),
            Command::ConfirmReview => self.confirm_review().await,
            Command::DismissAlert => {
                self.state.clear_alert();
                Ok(())
            }
        }
    }

    /// Show the splash, then move to the permission gate.
    pub async fn run_splash(&mut self) {
        if self.state.read(|s| s.screen) != Screen::Splash {
            return;
        }

        match self.timer.sleep(self.settings.splash_delay()).await {
            TimerOutcome::Elapsed => tracing::debug!("Splash finished"),
            TimerOutcome::Cancelled => tracing::info!("Splash skipped"),
        }
        self.enter(Screen::PermissionGate, |_| {});
    }

    // Permission gate

    /// Prompt for the camera, then the library once the camera settled.
    pub async fn allow_permissions(&mut self) -> BoothResult<()> {
        self.require(&[Screen::PermissionGate], "allow permissions")?;

        let camera = self.prompt(Resource::Camera).await;
        let library = self.prompt(Resource::Library).await;
        tracing::info!("Permission gate answered: camera={:?}, library={:?}", camera, library);

        self.enter_home();
        Ok(())
    }

    pub fn deny_permissions(&mut self) -> BoothResult<()> {
        self.require(&[Screen::PermissionGate], "deny permissions")?;

        self.permissions.record_denial(Resource::Camera);
        self.permissions.record_denial(Resource::Library);
        tracing::info!("Permission gate declined");

        self.enter_home();
        Ok(())
    }

    async fn prompt(&self, resource: Resource) -> Option<PermissionStatus> {
        if self.permissions.status(resource) == Some(PermissionStatus::Undetermined) {
            self.metrics.record_permission_prompt();
        }
        self.permissions.request(resource).await
    }

    /// Resolve `resource` for a feature entry point.
    ///
    /// `Ok(true)` when granted, `Ok(false)` when the platform gave no usable
    /// answer and the workflow should stay put.
    async fn ensure_permission(&mut self, resource: Resource) -> BoothResult<bool> {
        let status = match self.permissions.status(resource) {
            Some(PermissionStatus::Undetermined) => self.prompt(resource).await,
            other => other,
        };

        self.state.update(|s| match resource {
            Resource::Camera => s.camera_permission = status,
            Resource::Library => s.library_permission = status,
        });

        match status {
            Some(PermissionStatus::Granted) => Ok(true),
            Some(PermissionStatus::Denied) => {
                self.state
                    .raise_alert(Alert::settings_redirect(resource.denied_message()));
                Err(BoothError::PermissionDenied(resource))
            }
            Some(PermissionStatus::Undetermined) | None => {
                tracing::warn!("No usable {} authorization, staying put", resource);
                Ok(false)
            }
        }
    }

    // Home

    fn enter_home(&mut self) {
        for resource in [Resource::Camera, Resource::Library] {
            if self.permissions.was_previously_denied(resource) {
                tracing::info!("{} access was denied earlier", resource);
            }
        }

        let camera = self.permissions.status(Resource::Camera);
        let library = self.permissions.status(Resource::Library);
        self.collection = None;

        self.enter(Screen::Home, |s| {
            s.camera_permission = camera;
            s.library_permission = library;
            s.review_grid = None;
            s.pending_photo = None;
        });
    }

    /// Start a fresh four-photo session on the configured sensor.
    ///
    /// A sensor that cannot be opened still lands on the capture screen,
    /// with the camera in its error state, so the user can switch sensors.
    pub async fn open_camera(&mut self) -> BoothResult<()> {
        self.require(&[Screen::Home], "open the camera")?;
        if !self.ensure_permission(Resource::Camera).await? {
            return Ok(());
        }

        self.state.update(AppState::reset_session);
        let started = self.camera.start(self.settings.default_camera).await;
        self.enter(Screen::Capturing, |_| {});

        started.inspect_err(|e| {
            self.state.raise_alert(Alert::error(e.to_string()));
        })
    }

    /// Pick up to four photos; a non-empty pick moves to the reorder grid.
    pub async fn open_gallery(&mut self) -> BoothResult<()> {
        self.require(&[Screen::Home], "open the gallery")?;
        if !self.ensure_permission(Resource::Library).await? {
            return Ok(());
        }

        self.enter(Screen::GalleryPicking, |_| {});
        let selection = self.gallery.present().await;

        if selection.is_empty() {
            tracing::info!(
                "Nothing usable picked ({} dropped), back to home",
                selection.dropped.len()
            );
            self.enter_home();
            return Ok(());
        }

        self.metrics.record_gallery_pick(selection.dropped.len());
        let collection = ReorderableCollection::new(selection.images);
        let grid = collection.grid();
        self.collection = Some(collection);
        self.enter(Screen::Reviewing, |s| s.review_grid = Some(grid));
        Ok(())
    }

    // Capturing

    pub async fn switch_camera(&mut self) -> BoothResult<()> {
        self.require(&[Screen::Capturing], "switch cameras")?;

        self.camera.switch_device().await.inspect_err(|e| {
            self.state.raise_alert(Alert::error(e.to_string()));
        })
    }

    /// Take one photo and show it for review.
    ///
    /// A cancelled countdown is not an error worth an alert; the session
    /// simply stays ready for the next press.
    pub async fn shutter(&mut self) -> BoothResult<()> {
        self.require(&[Screen::Capturing], "take a photo")?;

        let use_countdown = self.settings.countdown_enabled;
        match self.camera.capture(use_countdown, &mut self.timer).await {
            Ok(photo) => {
                self.metrics.record_photo_captured();
                self.enter(Screen::PhotoReview, |s| s.pending_photo = Some(photo));
                Ok(())
            }
            Err(BoothError::CaptureCancelled) => Err(BoothError::CaptureCancelled),
            // No shot was attempted, so this is not a capture failure
            Err(BoothError::CameraNotReady) => {
                tracing::warn!("Shutter pressed while the camera is {:?}", self.camera.state());
                self.state
                    .raise_alert(Alert::error(BoothError::CameraNotReady.to_string()));
                Err(BoothError::CameraNotReady)
            }
            Err(e) => {
                self.metrics.record_capture_failure();
                self.state.raise_alert(Alert::error(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn leave_camera(&mut self) -> BoothResult<()> {
        self.require(&[Screen::Capturing], "leave the camera")?;

        self.camera.stop();
        self.state.update(AppState::reset_session);
        self.enter_home();
        Ok(())
    }

    // Photo review

    /// Keep the pending photo and write it to the album. The fourth one ends
    /// the session and starts processing.
    ///
    /// An album write failure raises an alert and is returned once the
    /// workflow has moved on; the photo still counts toward the session.
    pub async fn save_photo(&mut self) -> BoothResult<()> {
        self.require(&[Screen::PhotoReview], "save the photo")?;

        let mut progress = CountProgress::AlreadyComplete;
        let mut kept = None;
        self.state.update(|s| {
            let Some(photo) = s.pending_photo.take() else {
                return;
            };
            progress = s.capture_count.increment();
            if progress != CountProgress::AlreadyComplete {
                s.history.push(photo.clone());
                s.session_photos.push(photo.clone());
                kept = Some(photo);
            }
        });

        let mut album_write = Ok(());
        if let Some(photo) = kept {
            album_write = self.gallery.save_to_library(&photo).await;
            if let Err(e) = &album_write {
                tracing::warn!("Photo {} kept but not written to the album: {}", photo.id(), e);
                self.metrics.record_library_write_failure();
                self.state.raise_alert(Alert::error(e.to_string()));
            }
        }

        match progress {
            CountProgress::InProgress(count) => {
                self.metrics.record_photo_saved();
                tracing::info!("Saved photo {}/{}", count, PHOTOS_PER_SESSION);
                self.enter(Screen::Capturing, |_| {});
            }
            CountProgress::Complete => {
                self.metrics.record_photo_saved();
                tracing::info!("Session complete with {} photos", PHOTOS_PER_SESSION);
                self.camera.stop();

                let photos = self.state.read(|s| s.session_photos.clone());
                let images = ReorderableCollection::new(photos).into_slots();
                self.run_processing(ProcessingJob {
                    origin: JobOrigin::Camera,
                    images,
                })
                .await;
            }
            CountProgress::AlreadyComplete => {
                tracing::warn!("Session already holds {} photos", PHOTOS_PER_SESSION);
                self.enter(Screen::Capturing, |_| {});
            }
        }

        album_write
    }

    pub fn discard_photo(&mut self) -> BoothResult<()> {
        self.require(&[Screen::PhotoReview], "discard the photo")?;

        self.metrics.record_photo_discarded();
        self.enter(Screen::Capturing, |s| s.pending_photo = None);
        Ok(())
    }

    // Reviewing

    fn collection_mut(&mut self, command: &'static str) -> BoothResult<&mut ReorderableCollection> {
        self.require(&[Screen::Reviewing], command)?;
        self.collection
            .as_mut()
            .ok_or(BoothError::InvalidTransition {
                screen: Screen::Reviewing,
                command,
            })
    }

    fn publish_grid(&self) {
        if let Some(collection) = &self.collection {
            let grid = collection.grid();
            self.state.update(|s| s.review_grid = Some(grid));
        }
    }

    pub fn begin_drag(&mut self, index: usize) -> BoothResult<()> {
        if !self.collection_mut("start dragging")?.begin_drag(index) {
            tracing::debug!("Ignoring drag from slot {}", index);
        }
        self.publish_grid();
        Ok(())
    }

    pub fn set_drop_target(&mut self, index: usize) -> BoothResult<()> {
        if !self.collection_mut("choose a drop target")?.set_drop_target(index) {
            tracing::debug!("Ignoring drop target {}", index);
        }
        self.publish_grid();
        Ok(())
    }

    pub fn commit_swap(&mut self) -> BoothResult<()> {
        self.collection_mut("drop")?.commit_swap();
        self.publish_grid();
        Ok(())
    }

    pub fn cancel_drag(&mut self) -> BoothResult<()> {
        self.collection_mut("cancel dragging")?.cancel_drag();
        self.publish_grid();
        Ok(())
    }

    /// Throw the picked photos away.
    pub fn cancel_review(&mut self) -> BoothResult<()> {
        self.require(&[Screen::Reviewing], "cancel the review")?;
        tracing::info!("Gallery review cancelled");
        self.enter_home();
        Ok(())
    }

    /// Process the four slots in their current order.
    pub async fn confirm_review(&mut self) -> BoothResult<()> {
        self.require(&[Screen::Reviewing], "confirm the review")?;

        let Some(collection) = self.collection.take() else {
            return Err(BoothError::InvalidTransition {
                screen: Screen::Reviewing,
                command: "confirm the review",
            });
        };

        self.run_processing(ProcessingJob {
            origin: JobOrigin::Gallery,
            images: collection.into_slots(),
        })
        .await;
        Ok(())
    }

    // Processing

    async fn run_processing(&mut self, job: ProcessingJob) {
        self.timer.reset();
        self.enter(Screen::Processing, |s| s.review_grid = None);

        let started = Instant::now();
        match self.timer.sleep(self.settings.processing_delay()).await {
            TimerOutcome::Elapsed => {
                let elapsed = started.elapsed();
                self.metrics.record_job_completed(elapsed);
                tracing::info!("Processed {:?} job in {:.2}s", job.origin, elapsed.as_secs_f64());
                self.state.update(|s| {
                    s.last_job = Some(job);
                    s.completed_jobs += 1;
                });
            }
            TimerOutcome::Cancelled => {
                self.metrics.record_job_cancelled();
                tracing::info!("Processing cancelled for {:?} job", job.origin);
            }
        }

        self.enter_home();
    }

    /// Release the camera before the workflow goes away.
    pub fn shutdown(&mut self) {
        self.camera.stop();
        tracing::info!("Workflow shut down");
    }

    // Helpers

    fn require(&self, allowed: &[Screen], command: &'static str) -> BoothResult<()> {
        let screen = self.state.read(|s| s.screen);
        if allowed.contains(&screen) {
            return Ok(());
        }

        self.metrics.record_rejected_command();
        tracing::warn!("Rejected '{}' on the {} screen", command, screen);
        Err(BoothError::InvalidTransition { screen, command })
    }

    fn enter<F>(&self, to: Screen, apply: F)
    where
        F: FnOnce(&mut AppState),
    {
        let from = self.state.read(|s| s.screen);
        if from != to {
            tracing::info!("Screen: {} -> {}", from, to);
        }
        self.state.update(|s| {
            apply(s);
            s.screen = to;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CameraState, DevicePosition, PlatformAuthorization};
    use crate::platform::simulated::{
        SimulatedAsset, SimulatedCamera, SimulatedPermissions, SimulatedPicker, sample_image,
    };
    use crate::services::InMemoryPermissionMemory;

    type TestController = WorkflowController<SimulatedPermissions, SimulatedCamera, SimulatedPicker>;

    fn fast_settings() -> BoothSettings {
        BoothSettings {
            splash_delay_ms: 1,
            countdown_enabled: false,
            countdown_interval_ms: 1,
            processing_delay_ms: 1,
            ..BoothSettings::default()
        }
    }

    fn controller(camera: SimulatedCamera, picker: SimulatedPicker) -> TestController {
        let permissions = SimulatedPermissions::new();
        permissions.set_status(Resource::Camera, PlatformAuthorization::Authorized);
        permissions.set_status(Resource::Library, PlatformAuthorization::Authorized);

        WorkflowController::new(
            Platform {
                permissions,
                camera,
                picker,
            },
            Arc::new(InMemoryPermissionMemory::new()),
            fast_settings(),
        )
    }

    async fn at_home(controller: &mut TestController) {
        controller.run_splash().await;
        controller.allow_permissions().await.unwrap();
    }

    fn screen(controller: &TestController) -> Screen {
        controller.state_manager().read(|s| s.screen)
    }

    #[tokio::test]
    async fn test_splash_then_gate() {
        let mut controller = controller(SimulatedCamera::new(), SimulatedPicker::new());
        assert_eq!(screen(&controller), Screen::Splash);

        controller.run_splash().await;
        assert_eq!(screen(&controller), Screen::PermissionGate);
    }

    #[tokio::test]
    async fn test_camera_observer_publishes_state() {
        let mut controller = controller(SimulatedCamera::new(), SimulatedPicker::new());
        at_home(&mut controller).await;

        controller.open_camera().await.unwrap();

        let state = controller.state_manager().snapshot();
        assert_eq!(state.screen, Screen::Capturing);
        assert_eq!(state.camera_state, CameraState::Running);
        assert_eq!(state.camera_position, DevicePosition::Back);
    }

    #[tokio::test]
    async fn test_discard_keeps_count() {
        let mut controller = controller(SimulatedCamera::new(), SimulatedPicker::new());
        at_home(&mut controller).await;
        controller.open_camera().await.unwrap();

        controller.shutter().await.unwrap();
        assert_eq!(screen(&controller), Screen::PhotoReview);
        controller.discard_photo().unwrap();

        let state = controller.state_manager().snapshot();
        assert_eq!(state.screen, Screen::Capturing);
        assert_eq!(state.capture_count.value(), 0);
        assert!(state.pending_photo.is_none());
        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn test_fourth_save_processes_and_returns_home() {
        let camera = SimulatedCamera::new();
        let mut controller = controller(camera.clone(), SimulatedPicker::new());
        at_home(&mut controller).await;
        controller.open_camera().await.unwrap();

        for _ in 0..PHOTOS_PER_SESSION {
            controller.shutter().await.unwrap();
            controller.save_photo().await.unwrap();
        }

        let state = controller.state_manager().snapshot();
        assert_eq!(state.screen, Screen::Home);
        assert_eq!(state.completed_jobs, 1);
        assert_eq!(state.last_job.as_ref().map(|job| job.origin), Some(JobOrigin::Camera));
        assert!(!camera.is_running());
    }

    #[tokio::test]
    async fn test_gallery_review_swap_is_processed_in_order() {
        let picker = SimulatedPicker::new();
        let first = sample_image(10);
        let second = sample_image(20);
        picker.queue_selection(vec![
            SimulatedAsset::ok("first", first.clone()),
            SimulatedAsset::ok("second", second.clone()),
        ]);
        let mut controller = controller(SimulatedCamera::new(), picker);
        at_home(&mut controller).await;

        controller.open_gallery().await.unwrap();
        assert_eq!(screen(&controller), Screen::Reviewing);

        controller.begin_drag(0).unwrap();
        controller.set_drop_target(1).unwrap();
        controller.commit_swap().unwrap();
        controller.confirm_review().await.unwrap();

        let job = controller.state_manager().snapshot().last_job.unwrap();
        let ids: Vec<u64> = job.images.iter().map(|image| image.id()).collect();
        assert_eq!(ids, vec![second.id(), first.id(), second.id(), second.id()]);
    }

    #[tokio::test]
    async fn test_rejected_command_leaves_state() {
        let mut controller = controller(SimulatedCamera::new(), SimulatedPicker::new());
        at_home(&mut controller).await;
        let before = controller.state_manager().snapshot();

        let err = controller.save_photo().await.unwrap_err();

        assert_eq!(
            err,
            BoothError::InvalidTransition {
                screen: Screen::Home,
                command: "save the photo"
            }
        );
        let after = controller.state_manager().snapshot();
        assert_eq!(after.screen, before.screen);
        assert_eq!(after.capture_count, before.capture_count);
    }
}
