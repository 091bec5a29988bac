//! Core business logic for tsocial.

pub mod services;

pub use services::*;
