//! # Domain Errors
//!
//! Error taxonomy for the handshake protocol. Entity-scoped variants carry
//! the offending entity id and the status observed at call time.

use super::value_objects::{ChannelState, ClientStatus, ConnectionStatus, PacketStatus};
use thiserror::Error;

/// Protocol error types.
#[derive(Debug, Error)]
pub enum IbcError {
    /// Originating client is not Active.
    #[error("Client {client_id} is not active, status: {status:?}")]
    ClientNotActive {
        /// Client id
        client_id: String,
        /// Status observed
        status: ClientStatus,
    },

    /// Counterparty client is not Active.
    #[error("Counterparty client {client_id} is not active, status: {status:?}")]
    CounterpartyNotActive {
        /// Counterparty client id
        client_id: String,
        /// Status observed
        status: ClientStatus,
    },

    /// Connection operation attempted from the wrong status.
    #[error("Connection {connection_id} cannot transition from status {status:?}")]
    InvalidConnectionState {
        /// Connection id
        connection_id: String,
        /// Status observed
        status: ConnectionStatus,
    },

    /// Channel creation attempted on a connection that is not Open.
    #[error("Connection {connection_id} is not open, status: {status:?}")]
    ConnectionNotOpen {
        /// Connection id
        connection_id: String,
        /// Status observed
        status: ConnectionStatus,
    },

    /// Channel operation attempted from the wrong state.
    #[error("Channel {channel_id} cannot transition from state {state:?}")]
    InvalidChannelState {
        /// Channel id
        channel_id: String,
        /// State observed
        state: ChannelState,
    },

    /// Packet send attempted on a channel that is not Open.
    #[error("Channel {channel_id} is not open, state: {state:?}")]
    ChannelNotOpen {
        /// Channel id
        channel_id: String,
        /// State observed
        state: ChannelState,
    },

    /// Payload exceeds the channel's maximum packet size.
    #[error("Packet data size {size} exceeds maximum {max} on channel {channel_id}")]
    PacketTooLarge {
        /// Channel id
        channel_id: String,
        /// Payload size in bytes
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Packet operation attempted from the wrong status.
    #[error("Packet {packet_id} cannot transition from status {status:?}")]
    InvalidPacketState {
        /// Packet id
        packet_id: String,
        /// Status observed
        status: PacketStatus,
    },

    /// Receive attempted after the packet deadline. The packet is already
    /// in `Timeout` when this is returned.
    #[error("Packet {packet_id} has timed out")]
    PacketTimedOut {
        /// Packet id
        packet_id: String,
    },

    /// Header exceeds the client's maximum header size.
    #[error("Header size {size} exceeds maximum {max} for client {client_id}")]
    HeaderTooLarge {
        /// Client id
        client_id: String,
        /// Header size in bytes
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// The chain validator rejected a header or proof for a client.
    #[error("Validation failed for client {client_id}: {reason}")]
    Validation {
        /// Client id
        client_id: String,
        /// Validator message
        reason: String,
    },

    /// Raw rejection raised by a `ChainValidator` implementation.
    #[error("Validator rejected input: {0}")]
    ValidatorRejected(String),

    /// Client has no chain validator attached.
    #[error("No chain validator attached to client {client_id}")]
    ValidatorMissing {
        /// Client id
        client_id: String,
    },

    /// Configuration could not be loaded or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl IbcError {
    /// Stable taxonomy name for hosts.
    pub fn kind(&self) -> &'static str {
        match self {
            IbcError::ClientNotActive { .. } => "ClientNotActive",
            IbcError::CounterpartyNotActive { .. } => "CounterpartyNotActive",
            IbcError::InvalidConnectionState { .. } => "InvalidConnectionState",
            IbcError::ConnectionNotOpen { .. } => "ConnectionNotOpen",
            IbcError::InvalidChannelState { .. } => "InvalidChannelState",
            IbcError::ChannelNotOpen { .. } => "ChannelNotOpen",
            IbcError::PacketTooLarge { .. } => "PacketTooLarge",
            IbcError::InvalidPacketState { .. } => "InvalidPacketState",
            IbcError::PacketTimedOut { .. } => "PacketTimedOut",
            IbcError::HeaderTooLarge { .. } => "HeaderTooLarge",
            IbcError::Validation { .. } | IbcError::ValidatorRejected(_) => "ValidationFailed",
            IbcError::ValidatorMissing { .. } => "ValidatorMissing",
            IbcError::Config(_) => "ConfigParseError",
        }
    }

    /// Id of the entity the error is about, if any.
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            IbcError::ClientNotActive { client_id, .. }
            | IbcError::CounterpartyNotActive { client_id, .. }
            | IbcError::HeaderTooLarge { client_id, .. }
            | IbcError::Validation { client_id, .. }
            | IbcError::ValidatorMissing { client_id } => Some(client_id),
            IbcError::InvalidConnectionState { connection_id, .. }
            | IbcError::ConnectionNotOpen { connection_id, .. } => Some(connection_id),
            IbcError::InvalidChannelState { channel_id, .. }
            | IbcError::ChannelNotOpen { channel_id, .. }
            | IbcError::PacketTooLarge { channel_id, .. } => Some(channel_id),
            IbcError::InvalidPacketState { packet_id, .. }
            | IbcError::PacketTimedOut { packet_id } => Some(packet_id),
            IbcError::ValidatorRejected(_) | IbcError::Config(_) => None,
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has the wrong shape.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Duration string could not be parsed.
    #[error("Invalid {field}: {value:?} ({reason})")]
    InvalidDuration {
        /// Field name
        field: &'static str,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },

    /// Unknown security level token.
    #[error("Unknown security level: {0:?}")]
    UnknownSecurityLevel(String),
}
