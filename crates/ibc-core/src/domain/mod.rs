//! # Domain Module
//!
//! Protocol entities, their statuses, metrics and errors.

pub mod entities;
pub mod errors;
pub mod metrics;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use metrics::{ChannelMetrics, ClientMetrics, ConnectionMetrics, PacketMetrics};
pub use value_objects::*;
