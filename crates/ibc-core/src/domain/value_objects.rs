//! # Domain Value Objects
//!
//! Closed enumerations for every status/state field, plus the transition
//! tables the entities consult before mutating.

use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of remote chain a client tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientKind {
    /// Tendermint-like BFT chain.
    #[default]
    Tendermint,
    /// Ethereum-like chain.
    Ethereum,
    /// Bitcoin-like PoW chain.
    Bitcoin,
    /// Polkadot-like relay/parachain.
    Polkadot,
}

/// Client status.
///
/// No transition table is enforced: status is administratively settable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientStatus {
    /// Tracking the remote chain; may open connections.
    #[default]
    Active,
    /// Suspended, e.g. after misbehaviour.
    Frozen,
    /// Trusting period elapsed.
    Expired,
    /// Permanently withdrawn.
    Revoked,
}

impl ClientStatus {
    /// Check if the client may originate or accept a connection.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Check if terminal status.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Expired | Self::Revoked => true,
            Self::Active | Self::Frozen => false,
        }
    }
}

/// Qualitative trust in a client. Informational only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrustLevel {
    /// Low trust.
    Low,
    /// Medium trust.
    Medium,
    /// High trust (assigned at creation).
    #[default]
    High,
    /// Ultra trust.
    Ultra,
}

/// Security level threaded through every config record.
///
/// Interpreted by external policy; never enforced by the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    /// `low`
    #[default]
    Low,
    /// `medium`
    Medium,
    /// `high`
    High,
    /// `ultra`
    Ultra,
}

impl SecurityLevel {
    /// Config token for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityLevel::Low => "low",
            SecurityLevel::Medium => "medium",
            SecurityLevel::High => "high",
            SecurityLevel::Ultra => "ultra",
        }
    }
}

impl FromStr for SecurityLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(SecurityLevel::Low),
            "medium" => Ok(SecurityLevel::Medium),
            "high" => Ok(SecurityLevel::High),
            "ultra" => Ok(SecurityLevel::Ultra),
            _ => Err(ConfigError::UnknownSecurityLevel(s.to_string())),
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection handshake status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Created, handshake not started.
    #[default]
    Init,
    /// Handshake in progress.
    TryOpen,
    /// Handshake complete.
    Open,
    /// Closed.
    Closed,
}

impl ConnectionStatus {
    /// Check if transition is valid. Strictly forward, or to Closed.
    pub fn can_transition_to(&self, next: ConnectionStatus) -> bool {
        match (self, next) {
            (Self::Init, Self::TryOpen) => true,
            (Self::TryOpen, Self::Open) => true,
            (Self::Init | Self::TryOpen | Self::Open, Self::Closed) => true,
            _ => false,
        }
    }

    /// Check if terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Packet ordering on a channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelOrdering {
    /// Packets may be delivered in any order.
    #[default]
    Unordered,
    /// Packets are delivered in sequence order.
    Ordered,
}

/// Channel handshake state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelState {
    /// Created, handshake not started.
    #[default]
    Init,
    /// Handshake in progress.
    TryOpen,
    /// Accepting packets.
    Open,
    /// Closed.
    Closed,
}

impl ChannelState {
    /// Check if transition is valid. Strictly forward, or to Closed.
    pub fn can_transition_to(&self, next: ChannelState) -> bool {
        match (self, next) {
            (Self::Init, Self::TryOpen) => true,
            (Self::TryOpen, Self::Open) => true,
            (Self::Init | Self::TryOpen | Self::Open, Self::Closed) => true,
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Packet lifecycle status.
///
/// `Pending → Sent → {Received → Acknowledged} | Timeout`; `Failed` is
/// entered only by caller-driven abandonment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PacketStatus {
    /// Created, not yet sent.
    #[default]
    Pending,
    /// Sent, awaiting receipt.
    Sent,
    /// Received by the counterparty.
    Received,
    /// Acknowledged back to the sender.
    Acknowledged,
    /// Receipt attempted after the deadline.
    Timeout,
    /// Abandoned by the caller.
    Failed,
}

impl PacketStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: PacketStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Sent) => true,
            (Self::Sent, Self::Received) => true,
            (Self::Sent, Self::Timeout) => true,
            (Self::Received, Self::Acknowledged) => true,
            (Self::Pending | Self::Sent, Self::Failed) => true,
            _ => false,
        }
    }

    /// Check if terminal status.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Acknowledged | Self::Timeout | Self::Failed => true,
            Self::Pending | Self::Sent | Self::Received => false,
        }
    }
}

/// Counterparty end of a channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Counterparty {
    /// Counterparty port.
    pub port_id: String,
    /// Counterparty channel.
    pub channel_id: String,
}

impl Counterparty {
    /// Create a new counterparty.
    pub fn new(port_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            port_id: port_id.into(),
            channel_id: channel_id.into(),
        }
    }
}
