//! Analysis session orchestration for ShotScope.
//!
//! This crate provides:
//! - `SessionController`: submit, stream, replay and reset analysis sessions
//! - View state and application areas
//! - Export of the in-memory result
//! - Environment-driven engine configuration
//! - Plain-text track rendering used by the `shotscope` binary

pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod render;
pub mod session;
pub mod state;

pub use config::EngineConfig;
pub use controller::SessionController;
pub use error::{SessionError, SessionResult};
pub use export::ExportDocument;
pub use session::Session;
pub use state::{AppArea, SessionOrigin, ViewState};
