// In-process stand-ins for the platform capabilities.
//
// Each simulated type is a cheap handle over shared state, so a test can keep
// a clone to script answers and inspect call counts after handing the other
// clone to the workflow.

use super::{AssetPicker, AssetRef, CameraBackend, CameraFault, PermissionPlatform, PickerConfig};
use crate::models::{CaptureSettings, DevicePosition, Image, PlatformAuthorization, Resource};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Generate a small solid-color test frame.
pub fn sample_image(shade: u8) -> Image {
    Image::new(4, 3, vec![shade; 4 * 3 * 4])
}

#[derive(Debug, Default)]
struct PermissionInner {
    statuses: Mutex<HashMap<Resource, PlatformAuthorization>>,
    answers: Mutex<HashMap<Resource, PlatformAuthorization>>,
    requests: Mutex<Vec<Resource>>,
}

/// Permission subsystem whose prompts are answered from a script.
///
/// Resources start `NotDetermined`; an unscripted prompt is answered with
/// `Authorized`.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPermissions {
    inner: Arc<PermissionInner>,
}

impl SimulatedPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, resource: Resource, status: PlatformAuthorization) {
        self.inner.statuses.lock().unwrap().insert(resource, status);
    }

    /// Script what the user answers when prompted for `resource`.
    pub fn answer_with(&self, resource: Resource, answer: PlatformAuthorization) {
        self.inner.answers.lock().unwrap().insert(resource, answer);
    }

    /// Prompts shown so far, in order.
    pub fn requests(&self) -> Vec<Resource> {
        self.inner.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, resource: Resource) -> usize {
        self.inner
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| **r == resource)
            .count()
    }
}

impl PermissionPlatform for SimulatedPermissions {
    fn authorization_status(&self, resource: Resource) -> PlatformAuthorization {
        self.inner
            .statuses
            .lock()
            .unwrap()
            .get(&resource)
            .copied()
            .unwrap_or(PlatformAuthorization::NotDetermined)
    }

    fn request_authorization(
        &self,
        resource: Resource,
    ) -> impl Future<Output = PlatformAuthorization> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            tokio::task::yield_now().await;
            inner.requests.lock().unwrap().push(resource);
            let answer = inner
                .answers
                .lock()
                .unwrap()
                .get(&resource)
                .copied()
                .unwrap_or(PlatformAuthorization::Authorized);
            inner.statuses.lock().unwrap().insert(resource, answer);
            answer
        }
    }
}

#[derive(Debug)]
struct CameraInner {
    available: Mutex<HashSet<DevicePosition>>,
    attached: Mutex<Option<DevicePosition>>,
    running: AtomicBool,
    scripted_shots: Mutex<VecDeque<Result<Image, CameraFault>>>,
    last_settings: Mutex<Option<CaptureSettings>>,
    configure_calls: AtomicUsize,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    shots: AtomicUsize,
    start_latency: Duration,
}

/// Camera with configurable sensors and a queue of scripted shot results.
///
/// Once the queue is empty every shot succeeds with a fresh sample frame.
#[derive(Debug, Clone)]
pub struct SimulatedCamera {
    inner: Arc<CameraInner>,
}

impl SimulatedCamera {
    /// A device with both back and front sensors.
    pub fn new() -> Self {
        Self::with_sensors(&[DevicePosition::Back, DevicePosition::Front])
    }

    pub fn with_sensors(sensors: &[DevicePosition]) -> Self {
        Self::build(sensors, Duration::ZERO)
    }

    /// Like [`Self::new`], but `start_running` blocks for `latency`.
    pub fn with_start_latency(latency: Duration) -> Self {
        Self::build(&[DevicePosition::Back, DevicePosition::Front], latency)
    }

    fn build(sensors: &[DevicePosition], start_latency: Duration) -> Self {
        Self {
            inner: Arc::new(CameraInner {
                available: Mutex::new(sensors.iter().copied().collect()),
                attached: Mutex::new(None),
                running: AtomicBool::new(false),
                scripted_shots: Mutex::new(VecDeque::new()),
                last_settings: Mutex::new(None),
                configure_calls: AtomicUsize::new(0),
                start_calls: AtomicUsize::new(0),
                stop_calls: AtomicUsize::new(0),
                shots: AtomicUsize::new(0),
                start_latency,
            }),
        }
    }

    pub fn queue_shot(&self, result: Result<Image, CameraFault>) {
        self.inner.scripted_shots.lock().unwrap().push_back(result);
    }

    pub fn attached(&self) -> Option<DevicePosition> {
        *self.inner.attached.lock().unwrap()
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub fn last_settings(&self) -> Option<CaptureSettings> {
        *self.inner.last_settings.lock().unwrap()
    }

    pub fn configure_calls(&self) -> usize {
        self.inner.configure_calls.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.inner.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.inner.stop_calls.load(Ordering::SeqCst)
    }

    pub fn shots(&self) -> usize {
        self.inner.shots.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for SimulatedCamera {
    fn configure(&self, position: DevicePosition) -> Result<(), CameraFault> {
        self.inner.configure_calls.fetch_add(1, Ordering::SeqCst);
        let mut attached = self.inner.attached.lock().unwrap();
        // Existing input is always removed before attaching a new one.
        *attached = None;
        if !self.inner.available.lock().unwrap().contains(&position) {
            return Err(CameraFault::NoDevice(position));
        }
        *attached = Some(position);
        Ok(())
    }

    fn start_running(&self) {
        if !self.inner.start_latency.is_zero() {
            std::thread::sleep(self.inner.start_latency);
        }
        self.inner.start_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.running.store(true, Ordering::SeqCst);
    }

    fn stop_running(&self) {
        self.inner.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.running.store(false, Ordering::SeqCst);
    }

    fn capture_still(
        &self,
        settings: CaptureSettings,
    ) -> impl Future<Output = Result<Image, CameraFault>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            tokio::task::yield_now().await;
            *inner.last_settings.lock().unwrap() = Some(settings);
            let shot = inner.shots.fetch_add(1, Ordering::SeqCst);
            let scripted = inner.scripted_shots.lock().unwrap().pop_front();
            scripted.unwrap_or_else(|| Ok(sample_image((shot % 255) as u8)))
        }
    }
}

/// One asset in a scripted picker selection.
#[derive(Debug, Clone)]
pub struct SimulatedAsset {
    pub id: String,
    pub decoded: Result<Image, String>,
    pub load_delay: Duration,
}

impl SimulatedAsset {
    pub fn ok(id: impl Into<String>, image: Image) -> Self {
        Self {
            id: id.into(),
            decoded: Ok(image),
            load_delay: Duration::ZERO,
        }
    }

    pub fn broken(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            decoded: Err(reason.into()),
            load_delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }
}

#[derive(Debug, Default)]
struct PickerInner {
    sessions: Mutex<VecDeque<Option<Vec<SimulatedAsset>>>>,
    assets: Mutex<HashMap<String, SimulatedAsset>>,
    last_config: Mutex<Option<PickerConfig>>,
    album: Mutex<Vec<Image>>,
    failing_saves: Mutex<VecDeque<String>>,
    presented: AtomicUsize,
    loads: AtomicUsize,
}

/// Photo picker that replays scripted selections.
///
/// Each `present` pops the next scripted session; an unscripted
/// presentation behaves like a dismissal.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPicker {
    inner: Arc<PickerInner>,
}

impl SimulatedPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next presentation to finish with `assets`, in tap order.
    pub fn queue_selection(&self, assets: Vec<SimulatedAsset>) {
        self.inner.sessions.lock().unwrap().push_back(Some(assets));
    }

    /// Script the next presentation to be dismissed.
    pub fn queue_dismissal(&self) {
        self.inner.sessions.lock().unwrap().push_back(None);
    }

    pub fn presented(&self) -> usize {
        self.inner.presented.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> usize {
        self.inner.loads.load(Ordering::SeqCst)
    }

    pub fn last_config(&self) -> Option<PickerConfig> {
        *self.inner.last_config.lock().unwrap()
    }

    /// Make the next album write fail with `reason`.
    pub fn fail_next_save(&self, reason: impl Into<String>) {
        self.inner.failing_saves.lock().unwrap().push_back(reason.into());
    }

    /// Photos written to the album so far, oldest first.
    pub fn album(&self) -> Vec<Image> {
        self.inner.album.lock().unwrap().clone()
    }
}

impl AssetPicker for SimulatedPicker {
    fn present(&self, config: PickerConfig) -> impl Future<Output = Option<Vec<AssetRef>>> + Send {
        let inner = Arc::clone(&self.inner);
        async move {
            tokio::task::yield_now().await;
            inner.presented.fetch_add(1, Ordering::SeqCst);
            *inner.last_config.lock().unwrap() = Some(config);

            let session = inner.sessions.lock().unwrap().pop_front().flatten()?;
            let mut assets = inner.assets.lock().unwrap();
            let refs = session
                .into_iter()
                .map(|asset| {
                    let reference = AssetRef(asset.id.clone());
                    assets.insert(asset.id.clone(), asset);
                    reference
                })
                .collect();
            Some(refs)
        }
    }

    fn load_image(&self, asset: &AssetRef) -> impl Future<Output = Result<Image, String>> + Send {
        let inner = Arc::clone(&self.inner);
        let id = asset.0.clone();
        async move {
            inner.loads.fetch_add(1, Ordering::SeqCst);
            let scripted = inner.assets.lock().unwrap().get(&id).cloned();
            let Some(scripted) = scripted else {
                return Err(format!("unknown asset {id}"));
            };
            if !scripted.load_delay.is_zero() {
                tokio::time::sleep(scripted.load_delay).await;
            }
            scripted.decoded
        }
    }

    fn save_to_library(&self, image: &Image) -> impl Future<Output = Result<(), String>> + Send {
        let inner = Arc::clone(&self.inner);
        let image = image.clone();
        async move {
            tokio::task::yield_now().await;
            if let Some(reason) = inner.failing_saves.lock().unwrap().pop_front() {
                return Err(reason);
            }
            inner.album.lock().unwrap().push(image);
            Ok(())
        }
    }
}
