//! Headless engine for the QR upload form and the Chinese → Vietnamese
//! translation widget. A front-end drives it one JSON line at a time.

pub mod config;
pub mod error;
pub mod model;
pub mod protocol;
pub mod services;

pub use config::Config;
pub use error::{Result, WebhookError};
pub use protocol::Core;
