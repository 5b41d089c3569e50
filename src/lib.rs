//! Aura document intake client
//!
//! Uploads identity documents to the extraction service and renders the
//! extracted fields, a preview and a quality readout into a pluggable view.

pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod services;
pub mod view;

pub use config::ClientConfig;
pub use controller::{EditState, Phase, SessionId, UploadController};
pub use error::{UploadError, UploadResult, ValidationError};
