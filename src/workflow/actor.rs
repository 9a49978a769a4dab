use crate::error::{BoothError, BoothResult};
use crate::models::{AppState, Screen};
use crate::platform::{AssetPicker, CameraBackend, PermissionPlatform};
use crate::services::TimerCanceller;
use crate::state::{StateChange, StateManager};
use crate::workflow::WorkflowController;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

/// Commands buffered before `send` starts waiting.
const COMMAND_BUFFER: usize = 32;

/// A user intent for the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    AllowPermissions,
    DenyPermissions,
    OpenCamera,
    OpenGallery,
    SwitchCamera,
    Shutter,
    SavePhoto,
    DiscardPhoto,
    LeaveCamera,
    BeginDrag(usize),
    SetDropTarget(usize),
    CommitSwap,
    CancelDrag,
    CancelReview,
    ConfirmReview,
    DismissAlert,
}

struct Envelope {
    command: Command,
    reply: Option<oneshot::Sender<BoothResult<()>>>,
}

/// Cloneable front end of a running workflow.
///
/// Commands are queued and executed strictly in order. Timer cancellation
/// skips the queue so it can interrupt the wait currently running.
#[derive(Clone)]
pub struct WorkflowHandle {
    commands: mpsc::Sender<Envelope>,
    canceller: TimerCanceller,
    state: Arc<StateManager>,
}

impl WorkflowHandle {
    /// Queue `command` without waiting for its outcome.
    pub async fn send(&self, command: Command) -> BoothResult<()> {
        self.commands
            .send(Envelope {
                command,
                reply: None,
            })
            .await
            .map_err(|_| BoothError::WorkflowClosed)
    }

    /// Queue `command` and wait until the workflow has handled it.
    pub async fn execute(&self, command: Command) -> BoothResult<()> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Envelope {
                command,
                reply: Some(reply),
            })
            .await
            .map_err(|_| BoothError::WorkflowClosed)?;

        outcome.await.map_err(|_| BoothError::WorkflowClosed)?
    }

    /// Interrupt the splash, countdown or processing wait.
    pub fn cancel_timer(&self) {
        self.canceller.cancel();
    }

    pub fn state(&self) -> &Arc<StateManager> {
        &self.state
    }

    pub fn snapshot(&self) -> AppState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state.subscribe()
    }

    /// Wait until the workflow shows `screen`, or `timeout` passes.
    ///
    /// Returns `true` as soon as the screen is current or was entered.
    pub async fn wait_for_screen(&self, screen: Screen, timeout: Duration) -> bool {
        let mut changes = self.state.subscribe();
        if self.state.read(|s| s.screen) == screen {
            return true;
        }

        let reached = async {
            loop {
                match changes.recv().await {
                    Ok(StateChange::ScreenChanged { to, .. }) if to == screen => return true,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!("Screen watcher lagged by {} events", skipped);
                        if self.state.read(|s| s.screen) == screen {
                            return true;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => return false,
                }
            }
        };

        tokio::time::timeout(timeout, reached).await.unwrap_or(false)
    }
}

/// Run `controller` on its own task: splash first, then commands until every
/// handle is dropped.
pub fn spawn_workflow<P, C, A>(
    mut controller: WorkflowController<P, C, A>,
) -> (WorkflowHandle, JoinHandle<()>)
where
    P: PermissionPlatform + 'static,
    C: CameraBackend,
    A: AssetPicker + 'static,
{
    let (commands, mut inbox) = mpsc::channel::<Envelope>(COMMAND_BUFFER);
    let handle = WorkflowHandle {
        commands,
        canceller: controller.canceller(),
        state: controller.state_manager(),
    };

    let task = tokio::spawn(async move {
        tracing::info!("Workflow started");
        controller.run_splash().await;

        while let Some(Envelope { command, reply }) = inbox.recv().await {
            let outcome = controller.handle(command).await;
            if let Err(e) = &outcome {
                tracing::warn!("{:?} failed: {}", command, e);
            }
            if let Some(reply) = reply {
                // The caller may have stopped waiting
                let _ = reply.send(outcome);
            }
        }

        tracing::info!("All workflow handles dropped, stopping");
        controller.shutdown();
    });

    (handle, task)
}
