//! Marketplace domain model.
//!
//! # Responsibility
//! - Define the item (listing) and account records shared by services and stores.
//!
//! # Invariants
//! - Item identity and creation time are assigned server-side, once.
//! - Account password hashes never leave the core in serialized form.

pub mod account;
pub mod item;
