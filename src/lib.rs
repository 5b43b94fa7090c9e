// ABOUTME: Library root for demoboot — re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod config;
pub mod error;
pub mod launch;
pub mod layout;
pub mod manifest;
pub mod orchestrator;
pub mod preflight;

pub use config::{Config, ServiceSpec};
pub use error::BootError;
pub use orchestrator::{LaunchReport, Orchestrator};
