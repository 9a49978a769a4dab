// my4cuts - capture-and-arrange core of a four-cut photo booth
//
// This is the library crate containing the workflow, its components and the
// platform seams. The binary crate (main.rs) runs a scripted headless session.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod platform;
pub mod services;
pub mod state;
pub mod workflow;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::{BoothError, BoothResult};
pub use models::{AppState, BoothConfig, BoothSettings, Image, Screen};
pub use platform::Platform;
pub use state::{StateChange, StateManager};
pub use workflow::{Command, WorkflowController, WorkflowHandle, spawn_workflow};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
