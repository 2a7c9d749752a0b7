//! # Domain Entities
//!
//! Client → Connection → Channel → Packet. Each entity guards its mutable
//! state with its own lock; no operation holds two entity locks at once.

mod channel;
mod client;
mod connection;
mod packet;

pub use channel::{Channel, CHANNEL_VERSION};
pub use client::Client;
pub use connection::Connection;
pub use packet::{Packet, PacketParams};
