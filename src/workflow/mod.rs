//! The booth workflow: screen state machine plus the actor that drives it.
//!
//! ```text
//! Splash -> PermissionGate -> Home -> Capturing <-> PhotoReview
//!                              |  \                    |
//!                              |   GalleryPicking -> Reviewing
//!                              |                       |
//!                              +------ Processing <----+
//! ```
//!
//! [`WorkflowController`] owns every component and applies one command at a
//! time. [`spawn_workflow`] moves it onto a tokio task and returns a
//! [`WorkflowHandle`] for sending [`Command`]s, cancelling timed stages, and
//! watching state.

pub mod actor;
pub mod controller;

pub use actor::{Command, WorkflowHandle, spawn_workflow};
pub use controller::WorkflowController;
