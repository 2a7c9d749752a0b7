//! # Channel
//!
//! Port-scoped lane over a connection. Assigns packet sequences and
//! aggregates per-channel delivery metrics.

use super::packet::{Packet, PacketParams};
use crate::algorithms::{generate_identifier, IdentifierKind};
use crate::config::{ChannelConfig, PacketConfig, DEFAULT_MAX_PACKET_TIMEOUT};
use crate::domain::metrics::running_average;
use crate::domain::{ChannelMetrics, ChannelOrdering, ChannelState, Counterparty, IbcError};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Channel version tag.
pub const CHANNEL_VERSION: &str = "1.0.0";

/// Channel on a connection.
#[derive(Debug)]
pub struct Channel {
    id: String,
    connection_id: String,
    port_id: String,
    channel_id: String,
    counterparty: Counterparty,
    ordering: ChannelOrdering,
    version: String,
    created_at: SystemTime,
    config: ChannelConfig,
    inner: RwLock<ChannelInner>,
}

#[derive(Debug)]
struct ChannelInner {
    state: ChannelState,
    established_at: Option<SystemTime>,
    metrics: ChannelMetrics,
}

impl Channel {
    /// `config` must already have defaults applied.
    pub(crate) fn new(
        connection_id: &str,
        port_id: String,
        channel_id: String,
        ordering: ChannelOrdering,
        config: ChannelConfig,
    ) -> Self {
        // Loopback: the counterparty mirrors the local port/channel pair.
        let counterparty = Counterparty::new(port_id.clone(), channel_id.clone());
        Self {
            id: generate_identifier(IdentifierKind::Channel),
            connection_id: connection_id.to_string(),
            port_id,
            channel_id,
            counterparty,
            ordering,
            version: CHANNEL_VERSION.to_string(),
            created_at: SystemTime::now(),
            config,
            inner: RwLock::new(ChannelInner {
                state: ChannelState::Init,
                established_at: None,
                metrics: ChannelMetrics::default(),
            }),
        }
    }

    /// Move the channel from Init to Open.
    pub fn open_channel(&self) -> Result<(), IbcError> {
        let now = SystemTime::now();
        let mut inner = self.inner.write();
        let state = inner.state;
        match state {
            ChannelState::Init => {}
            state @ (ChannelState::TryOpen | ChannelState::Open | ChannelState::Closed) => {
                drop(inner);
                warn!(channel_id = %self.id, ?state, "[ibc] Open rejected");
                return Err(IbcError::InvalidChannelState {
                    channel_id: self.id.clone(),
                    state,
                });
            }
        }

        self.transition(&mut inner, ChannelState::TryOpen)?;
        self.transition(&mut inner, ChannelState::Open)?;
        inner.established_at = Some(now);
        inner.metrics.last_update = Some(now);
        drop(inner);

        info!(channel_id = %self.id, port_id = %self.port_id, "[ibc] Channel opened");
        Ok(())
    }

    /// Send a packet with a default packet config.
    ///
    /// `timeout_timestamp = None` means "use the channel's
    /// `max_packet_timeout` from now".
    pub fn send_packet(
        self: &Arc<Self>,
        data: impl Into<Vec<u8>>,
        dest_port: impl Into<String>,
        dest_channel: impl Into<String>,
        timeout_height: u64,
        timeout_timestamp: Option<SystemTime>,
    ) -> Result<Arc<Packet>, IbcError> {
        let params = PacketParams::new(data, dest_port, dest_channel)
            .timeout_height(timeout_height)
            .timeout_timestamp(timeout_timestamp);
        self.send_packet_with_config(params, PacketConfig::default())
    }

    /// Send a packet. The packet starts Pending with the next sequence.
    ///
    /// Sequence assignment happens under the channel write lock, so
    /// concurrent senders observe a gap-free, duplicate-free sequence.
    pub fn send_packet_with_config(
        self: &Arc<Self>,
        params: PacketParams,
        config: PacketConfig,
    ) -> Result<Arc<Packet>, IbcError> {
        let mut inner = self.inner.write();
        let state = inner.state;
        match state {
            ChannelState::Open => {}
            state @ (ChannelState::Init | ChannelState::TryOpen | ChannelState::Closed) => {
                drop(inner);
                warn!(channel_id = %self.id, ?state, "[ibc] Send rejected: channel not open");
                return Err(IbcError::ChannelNotOpen {
                    channel_id: self.id.clone(),
                    state,
                });
            }
        }

        let size = params.data.len();
        if size > self.config.max_packet_size {
            drop(inner);
            warn!(
                channel_id = %self.id,
                size,
                max = self.config.max_packet_size,
                "[ibc] Send rejected: packet too large"
            );
            return Err(IbcError::PacketTooLarge {
                channel_id: self.id.clone(),
                size,
                max: self.config.max_packet_size,
            });
        }

        let now = SystemTime::now();
        let timeout_timestamp = params.timeout_timestamp.unwrap_or_else(|| {
            now.checked_add(self.config.max_packet_timeout)
                .unwrap_or(now + DEFAULT_MAX_PACKET_TIMEOUT)
        });

        let sequence = inner.metrics.total_packets + 1;
        let packet = Packet::new(self, sequence, params, timeout_timestamp, config.with_defaults());
        inner.metrics.total_packets = sequence;
        inner.metrics.last_update = Some(now);
        drop(inner);

        debug!(
            channel_id = %self.id,
            packet_id = %packet.id(),
            sequence,
            size,
            "[ibc] Packet created"
        );
        Ok(Arc::new(packet))
    }

    /// Close the channel. Closing twice is an error.
    pub fn close(&self) -> Result<(), IbcError> {
        let mut inner = self.inner.write();
        self.transition(&mut inner, ChannelState::Closed)?;
        inner.metrics.last_update = Some(SystemTime::now());
        drop(inner);

        info!(channel_id = %self.id, "[ibc] Channel closed");
        Ok(())
    }

    /// Administratively set the state, bypassing the transition table.
    pub fn set_state(&self, state: ChannelState) {
        self.inner.write().state = state;
    }

    pub(crate) fn record_acknowledgement(&self, latency: Duration) {
        let mut inner = self.inner.write();
        inner.metrics.successful_packets += 1;
        inner.metrics.average_latency = running_average(
            inner.metrics.average_latency,
            inner.metrics.successful_packets,
            latency,
        );
        inner.metrics.last_update = Some(SystemTime::now());
    }

    pub(crate) fn record_failure(&self) {
        let mut inner = self.inner.write();
        inner.metrics.failed_packets += 1;
        inner.metrics.last_update = Some(SystemTime::now());
    }

    fn transition(&self, inner: &mut ChannelInner, next: ChannelState) -> Result<(), IbcError> {
        if !inner.state.can_transition_to(next) {
            return Err(IbcError::InvalidChannelState {
                channel_id: self.id.clone(),
                state: inner.state,
            });
        }
        inner.state = next;
        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> ChannelState {
        self.inner.read().state
    }

    /// Metrics snapshot.
    pub fn metrics(&self) -> ChannelMetrics {
        self.inner.read().metrics.clone()
    }

    /// When the channel opened.
    pub fn established_at(&self) -> Option<SystemTime> {
        self.inner.read().established_at
    }

    /// Channel identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Owning connection id.
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// Local port.
    pub fn port_id(&self) -> &str {
        &self.port_id
    }

    /// Caller-chosen channel name.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Remote endpoint.
    pub fn counterparty(&self) -> &Counterparty {
        &self.counterparty
    }

    /// Ordering tag. Recorded only; delivery order is not enforced.
    pub fn ordering(&self) -> ChannelOrdering {
        self.ordering
    }

    /// Version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Creation time.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Effective configuration.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }
}
