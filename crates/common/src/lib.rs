//! Common utilities and shared types for tsocial.
//!
//! This crate provides foundational components used across all tsocial crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//!
//! # Example
//!
//! ```no_run
//! use tsocial_common::{AppResult, Config};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     println!("Listening on {}:{}", config.server.host, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{AppError, AppResult, SuspensionNotice};
