//! # Algorithms Module
//!
//! Coordination-free helpers shared by every entity kind.

pub mod identifier;

pub use identifier::{generate_identifier, IdentifierKind};
