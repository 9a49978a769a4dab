//! Services module - the booth components the workflow is assembled from.
//!
//! Everything here is framework-agnostic: platform access goes through the
//! traits in [`crate::platform`], and no service knows about screens.
//!
//! # Components
//!
//! - [`PermissionGateway`]: tri-state camera/library authorization, prompting
//!   at most once per resource and remembering denials in a
//!   [`PermissionMemory`]
//! - [`CaptureSession`]: camera lifecycle, sensor switching, countdown and
//!   shutter
//! - [`GallerySelector`]: ordered multi-select with concurrent decoding and a
//!   single join before delivery
//! - [`ReorderableCollection`]: the four-slot grid with drag-to-swap
//! - [`CancellableTimer`]: delays for splash, countdown and processing that
//!   can be interrupted from outside the workflow task

pub mod capture;
pub mod gallery;
pub mod permission;
pub mod reorder;
pub mod timer;

pub use capture::{CameraObserver, CaptureSession, CountdownSettings};
pub use gallery::{GallerySelection, GallerySelector};
pub use permission::{InMemoryPermissionMemory, PermissionGateway, PermissionMemory};
pub use reorder::{ReorderableCollection, SLOT_COUNT};
pub use timer::{CancellableTimer, TimerCanceller, TimerOutcome, cancellable_timer};
