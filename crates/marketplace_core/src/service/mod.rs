//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store/repository calls into use-case level APIs.
//! - Return only classified `CoreError`s to outer layers.

pub mod account_service;
pub mod credentials;
pub mod item_service;
