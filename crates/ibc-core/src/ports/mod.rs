//! # Ports Module
//!
//! Hexagonal architecture ports. The core consumes one capability: chain
//! header/proof validation and height/time queries.

pub mod outbound;

pub use outbound::*;
