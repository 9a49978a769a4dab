use crate::error::{BoothError, BoothResult};
use crate::models::{CameraState, CaptureSettings, DevicePosition, Image};
use crate::platform::CameraBackend;
use crate::services::timer::{CancellableTimer, TimerOutcome};
use std::sync::Arc;
use std::time::Duration;

/// Callback notified on every camera state change.
pub type CameraObserver = Box<dyn Fn(CameraState, DevicePosition) + Send + Sync>;

/// Countdown behaviour for the shutter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownSettings {
    pub seconds: u32,
    pub interval: Duration,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            seconds: 3,
            interval: Duration::from_secs(1),
        }
    }
}

/// Owns the camera lifecycle: start/stop, sensor switching, countdown and
/// shutter.
///
/// States move `Idle → Configuring → Running → Countdown(n) → Capturing →
/// Running`; configuration failures land in `Error`, from which `start` or
/// [`switch_device`](Self::switch_device) can recover.
pub struct CaptureSession<C> {
    backend: Arc<C>,
    state: CameraState,
    position: DevicePosition,
    settings: CaptureSettings,
    countdown: CountdownSettings,
    observer: Option<CameraObserver>,
}

impl<C: CameraBackend> CaptureSession<C> {
    pub fn new(backend: C, settings: CaptureSettings, countdown: CountdownSettings) -> Self {
        Self {
            backend: Arc::new(backend),
            state: CameraState::Idle,
            position: DevicePosition::Back,
            settings,
            countdown,
            observer: None,
        }
    }

    /// Register the state change callback.
    pub fn with_observer(mut self, observer: CameraObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn position(&self) -> DevicePosition {
        self.position
    }

    fn set_state(&mut self, state: CameraState) {
        if self.state == state {
            return;
        }
        tracing::debug!("Camera {:?} -> {:?} ({})", self.state, state, self.position);
        self.state = state;
        if let Some(observer) = &self.observer {
            observer(state, self.position);
        }
    }

    /// Attach the sensor at `position` and start streaming.
    ///
    /// A session already running on `position` is reused as is. The blocking
    /// hardware start runs on the blocking pool and is awaited once.
    pub async fn start(&mut self, position: DevicePosition) -> BoothResult<()> {
        if self.state == CameraState::Running && self.position == position {
            tracing::debug!("Camera already running on {} sensor, reusing session", position);
            return Ok(());
        }

        self.position = position;
        self.set_state(CameraState::Configuring);

        if let Err(fault) = self.backend.configure(position) {
            tracing::warn!("Camera configuration failed for {} sensor: {}", position, fault);
            self.set_state(CameraState::Error);
            return Err(fault.into());
        }

        let backend = Arc::clone(&self.backend);
        if let Err(e) = tokio::task::spawn_blocking(move || backend.start_running()).await {
            self.set_state(CameraState::Error);
            return Err(BoothError::SessionConfiguration(e.to_string()));
        }

        tracing::info!("Camera running on {} sensor", position);
        self.set_state(CameraState::Running);
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.state == CameraState::Idle {
            return;
        }
        self.backend.stop_running();
        tracing::info!("Camera stopped");
        self.set_state(CameraState::Idle);
    }

    /// Stop and restart on the opposite sensor.
    pub async fn switch_device(&mut self) -> BoothResult<()> {
        let target = self.position.opposite();
        tracing::info!("Switching camera from {} to {}", self.position, target);
        self.stop();
        self.start(target).await
    }

    /// Take one photo, optionally after the countdown.
    ///
    /// On failure the session stays `Running`; nothing is retried.
    pub async fn capture(
        &mut self,
        use_countdown: bool,
        timer: &mut CancellableTimer,
    ) -> BoothResult<Image> {
        if !self.state.is_ready() {
            return Err(BoothError::CameraNotReady);
        }

        if use_countdown {
            let CountdownSettings { seconds, interval } = self.countdown;
            let outcome = timer
                .countdown(seconds, interval, |n| self.set_state(CameraState::Countdown(n)))
                .await;

            if outcome == TimerOutcome::Cancelled {
                tracing::info!("Countdown cancelled");
                self.set_state(CameraState::Running);
                return Err(BoothError::CaptureCancelled);
            }
        }

        self.set_state(CameraState::Capturing);
        let result = self.backend.capture_still(self.settings).await;
        self.set_state(CameraState::Running);

        match result {
            Ok(image) => {
                tracing::info!("Captured photo {} ({}x{})", image.id(), image.width(), image.height());
                Ok(image)
            }
            Err(fault) => {
                tracing::warn!("Still capture failed: {}", fault);
                Err(fault.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::CameraFault;
    use crate::platform::simulated::SimulatedCamera;
    use crate::services::timer::cancellable_timer;
    use std::sync::Mutex;

    fn fast_countdown() -> CountdownSettings {
        CountdownSettings {
            seconds: 3,
            interval: Duration::from_millis(1),
        }
    }

    fn session(camera: &SimulatedCamera) -> CaptureSession<SimulatedCamera> {
        CaptureSession::new(camera.clone(), CaptureSettings::default(), fast_countdown())
    }

    #[tokio::test]
    async fn test_start_runs_camera() {
        let camera = SimulatedCamera::new();
        let mut session = session(&camera);

        session.start(DevicePosition::Back).await.unwrap();

        assert_eq!(session.state(), CameraState::Running);
        assert_eq!(camera.attached(), Some(DevicePosition::Back));
        assert!(camera.is_running());
    }

    #[tokio::test]
    async fn test_start_is_idempotent_while_running() {
        let camera = SimulatedCamera::new();
        let mut session = session(&camera);

        session.start(DevicePosition::Back).await.unwrap();
        session.start(DevicePosition::Back).await.unwrap();

        assert_eq!(camera.configure_calls(), 1);
        assert_eq!(camera.start_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_sensor_enters_error() {
        let camera = SimulatedCamera::with_sensors(&[DevicePosition::Back]);
        let mut session = session(&camera);

        let err = session.start(DevicePosition::Front).await.unwrap_err();

        assert_eq!(err, BoothError::DeviceUnavailable(DevicePosition::Front));
        assert_eq!(session.state(), CameraState::Error);
    }

    #[tokio::test]
    async fn test_switch_recovers_from_error() {
        let camera = SimulatedCamera::with_sensors(&[DevicePosition::Back]);
        let mut session = session(&camera);

        assert!(session.start(DevicePosition::Front).await.is_err());
        session.switch_device().await.unwrap();

        assert_eq!(session.state(), CameraState::Running);
        assert_eq!(session.position(), DevicePosition::Back);
    }

    #[tokio::test]
    async fn test_capture_reports_countdown_states() {
        let camera = SimulatedCamera::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut session = session(&camera).with_observer(Box::new(move |state, _| {
            sink.lock().unwrap().push(state);
        }));
        let (_canceller, mut timer) = cancellable_timer();

        session.start(DevicePosition::Back).await.unwrap();
        seen.lock().unwrap().clear();

        let image = session.capture(true, &mut timer).await.unwrap();
        assert!(!image.is_placeholder());

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                CameraState::Countdown(3),
                CameraState::Countdown(2),
                CameraState::Countdown(1),
                CameraState::Capturing,
                CameraState::Running,
            ]
        );
    }

    #[tokio::test]
    async fn test_capture_failure_stays_running() {
        let camera = SimulatedCamera::new();
        camera.queue_shot(Err(CameraFault::UndecodableData));
        let mut session = session(&camera);
        let (_canceller, mut timer) = cancellable_timer();

        session.start(DevicePosition::Back).await.unwrap();
        let err = session.capture(false, &mut timer).await.unwrap_err();

        assert!(matches!(err, BoothError::CaptureFailed(_)));
        assert_eq!(session.state(), CameraState::Running);
    }

    #[tokio::test]
    async fn test_capture_requires_running_session() {
        let camera = SimulatedCamera::new();
        let mut session = session(&camera);
        let (_canceller, mut timer) = cancellable_timer();

        let err = session.capture(false, &mut timer).await.unwrap_err();
        assert_eq!(err, BoothError::CameraNotReady);
        assert_eq!(camera.shots(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_countdown_skips_shutter() {
        let camera = SimulatedCamera::new();
        let mut session = CaptureSession::new(
            camera.clone(),
            CaptureSettings::default(),
            CountdownSettings {
                seconds: 3,
                interval: Duration::from_secs(30),
            },
        );
        let (canceller, mut timer) = cancellable_timer();
        session.start(DevicePosition::Back).await.unwrap();

        let cancel = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = session.capture(true, &mut timer).await.unwrap_err();
        cancel.await.unwrap();

        assert_eq!(err, BoothError::CaptureCancelled);
        assert_eq!(session.state(), CameraState::Running);
        assert_eq!(camera.shots(), 0);
    }

    #[tokio::test]
    async fn test_stop_returns_to_idle() {
        let camera = SimulatedCamera::new();
        let mut session = session(&camera);

        session.start(DevicePosition::Back).await.unwrap();
        session.stop();

        assert_eq!(session.state(), CameraState::Idle);
        assert!(!camera.is_running());
    }
}
