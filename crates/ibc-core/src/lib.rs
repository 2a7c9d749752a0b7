//! # IBC Core
//!
//! Light-client handshake protocol between two independent ledgers.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Establish mutual trust between two chains and move ordered,
//! timeout-bounded packets over it:
//! - Clients track a remote chain and gate connection creation
//! - Connections bind two active clients (Init → TryOpen → Open)
//! - Channels carry packets between a local and counterparty port
//! - Packets move Pending → Sent → Received → Acknowledged, or Timeout
//!
//! ## Concurrency
//!
//! | Entity | Shared as | Lock |
//! |--------|-----------|------|
//! | Client | `Arc<Client>` | own `RwLock` |
//! | Connection | `Arc<Connection>` | own `RwLock` |
//! | Channel | `Arc<Channel>` | own `RwLock`, sequence assigned under write |
//! | Packet | `Arc<Packet>` | own `RwLock`, `Weak<Channel>` back-reference |
//!
//! No operation ever holds two entity locks at once.
//!
//! ## Module Structure
//!
//! ```text
//! ibc-core/
//! ├── domain/          # Client, Connection, Channel, Packet, statuses, errors
//! ├── algorithms/      # Identifier generation
//! ├── config/          # Runtime config records, TOML file loader
//! └── ports/           # ChainValidator (consumed capability)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use algorithms::{generate_identifier, IdentifierKind};
pub use config::{
    ChannelConfig, ClientConfig, ConnectionConfig, IbcConfigFile, PacketConfig,
};
pub use domain::{
    Channel, ChannelMetrics, ChannelOrdering, ChannelState, Client, ClientKind, ClientMetrics,
    ClientStatus, ConfigError, Connection, ConnectionMetrics, ConnectionStatus, Counterparty,
    IbcError, Packet, PacketMetrics, PacketParams, PacketStatus, SecurityLevel, TrustLevel,
    CHANNEL_VERSION,
};
pub use ports::{ChainValidator, MockChainValidator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
