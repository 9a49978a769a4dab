// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for observers.

use crate::metrics::Metrics;
use crate::models::{
    Alert, AppState, CameraState, DevicePosition, JobOrigin, PermissionStatus, Screen,
};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// Observers (a view layer, the headless driver, tests) subscribe instead of
/// polling the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The workflow moved to another screen
    ScreenChanged { from: Screen, to: Screen },

    /// Camera lifecycle or sensor changed
    CameraChanged {
        state: CameraState,
        position: DevicePosition,
    },

    /// Accepted photo count for the current session changed
    CaptureProgress { count: usize },

    /// A captured photo is waiting for save/discard, or no longer is
    PendingPhotoChanged { pending: bool },

    /// The reorder grid changed (slots or drag indices)
    GridChanged {
        drag_source: Option<usize>,
        drop_target: Option<usize>,
    },

    /// The recent photos strip changed
    HistoryUpdated { len: usize },

    /// Last observed permission statuses changed
    PermissionsChanged {
        camera: Option<PermissionStatus>,
        library: Option<PermissionStatus>,
    },

    /// A user-facing message was raised
    AlertRaised {
        message: String,
        offers_settings: bool,
    },

    /// The alert was dismissed
    AlertCleared,

    /// A processing job finished
    JobCompleted { origin: JobOrigin, total: usize },

    /// State has been reset
    StateReset,
}

/// Thread-safe state manager with event emission
///
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// The workflow actor is the only writer; everything else reads snapshots.
pub struct StateManager {
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,

    metrics: Option<Arc<Metrics>>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// The broadcast channel buffers 100 events; slow subscribers see a
    /// `Lagged` error rather than blocking the workflow.
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
            metrics: None,
        }
    }

    /// Count every broadcast in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Clone of the current state, safe to hold without locks.
    pub fn snapshot(&self) -> AppState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let screen = state_manager.read(|state| state.screen);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// Captures the old state, applies `update_fn`, diffs, and broadcasts one
    /// event per detected change. Returns the emitted events.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);
        drop(state);

        for change in &changes {
            self.emit(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn emit(&self, change: StateChange) {
        // No subscribers is fine
        let _ = self.state_tx.send(change);
        if let Some(metrics) = &self.metrics {
            metrics.record_state_broadcast();
        }
    }

    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.screen != new.screen {
            changes.push(StateChange::ScreenChanged {
                from: old.screen,
                to: new.screen,
            });
        }

        if old.camera_state != new.camera_state || old.camera_position != new.camera_position {
            changes.push(StateChange::CameraChanged {
                state: new.camera_state,
                position: new.camera_position,
            });
        }

        if old.capture_count != new.capture_count {
            changes.push(StateChange::CaptureProgress {
                count: new.capture_count.value(),
            });
        }

        if old.pending_photo.is_some() != new.pending_photo.is_some() {
            changes.push(StateChange::PendingPhotoChanged {
                pending: new.pending_photo.is_some(),
            });
        }

        if old.review_grid != new.review_grid {
            let (drag_source, drop_target) = new
                .review_grid
                .as_ref()
                .map(|grid| (grid.drag_source, grid.drop_target))
                .unwrap_or((None, None));
            changes.push(StateChange::GridChanged {
                drag_source,
                drop_target,
            });
        }

        if old.history != new.history {
            changes.push(StateChange::HistoryUpdated {
                len: new.history.len(),
            });
        }

        if old.camera_permission != new.camera_permission
            || old.library_permission != new.library_permission
        {
            changes.push(StateChange::PermissionsChanged {
                camera: new.camera_permission,
                library: new.library_permission,
            });
        }

        if old.alert != new.alert {
            match &new.alert {
                Some(alert) => changes.push(StateChange::AlertRaised {
                    message: alert.message.clone(),
                    offers_settings: alert.offers_settings,
                }),
                None => changes.push(StateChange::AlertCleared),
            }
        }

        if new.completed_jobs > old.completed_jobs {
            if let Some(job) = &new.last_job {
                changes.push(StateChange::JobCompleted {
                    origin: job.origin,
                    total: new.completed_jobs,
                });
            }
        }

        changes
    }

    // Convenience methods for common state updates

    pub fn set_screen(&self, screen: Screen) -> Vec<StateChange> {
        self.update(|state| state.screen = screen)
    }

    pub fn set_camera(&self, camera_state: CameraState, position: DevicePosition) -> Vec<StateChange> {
        self.update(|state| {
            state.camera_state = camera_state;
            state.camera_position = position;
        })
    }

    pub fn raise_alert(&self, alert: Alert) -> Vec<StateChange> {
        tracing::info!("Alert: {}", alert.message);
        self.update(|state| state.alert = Some(alert))
    }

    pub fn clear_alert(&self) -> Vec<StateChange> {
        self.update(|state| state.alert = None)
    }

    /// Reset everything to a cold start.
    pub fn reset(&self) -> Vec<StateChange> {
        let mut changes = self.update(|state| *state = AppState::default());

        let reset_event = StateChange::StateReset;
        self.emit(reset_event.clone());
        changes.push(reset_event);

        changes
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
