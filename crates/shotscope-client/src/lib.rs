//! Client for the video analysis job service.
//!
//! This crate provides:
//! - The `JobApi` seam (create, poll, history, delete)
//! - `HttpJobClient`, the reqwest implementation
//! - The bounded polling loop, both awaited inline and as a spawned task
//! - Environment-driven configuration and metrics

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod poller;


pub use api::JobApi;
pub use client::HttpJobClient;
pub use config::{ClientConfig, PollConfig};
pub use error::{ClientError, ClientResult};
pub use poller::{await_completion, spawn_poller, PollEvent, PollTask};
