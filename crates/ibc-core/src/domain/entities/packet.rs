//! # Packet
//!
//! Unit of transfer over a channel.
//!
//! Lifecycle: Pending → Sent → Received → Acknowledged, with Sent → Timeout
//! when receive is attempted past the deadline and Pending/Sent → Failed
//! when the caller abandons the packet.
//!
//! The packet holds a weak reference to its channel. Channel metrics are
//! updated after the packet's own guard is released, so the two locks are
//! never held together.

use super::channel::Channel;
use crate::algorithms::{generate_identifier, IdentifierKind};
use crate::config::PacketConfig;
use crate::domain::{IbcError, PacketMetrics, PacketStatus};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Caller-supplied packet contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacketParams {
    /// Payload.
    pub data: Vec<u8>,
    /// Destination port.
    pub dest_port: String,
    /// Destination channel.
    pub dest_channel: String,
    /// Remote height deadline (recorded only).
    pub timeout_height: u64,
    /// Wall-clock deadline; `None` uses the channel default.
    pub timeout_timestamp: Option<SystemTime>,
}

impl PacketParams {
    /// Params with no explicit deadlines.
    pub fn new(
        data: impl Into<Vec<u8>>,
        dest_port: impl Into<String>,
        dest_channel: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            dest_port: dest_port.into(),
            dest_channel: dest_channel.into(),
            ..Default::default()
        }
    }

    /// Set the remote height deadline.
    pub fn timeout_height(mut self, height: u64) -> Self {
        self.timeout_height = height;
        self
    }

    /// Set the wall-clock deadline.
    pub fn timeout_timestamp(mut self, timestamp: Option<SystemTime>) -> Self {
        self.timeout_timestamp = timestamp;
        self
    }
}

/// Packet on a channel.
#[derive(Debug)]
pub struct Packet {
    id: String,
    channel_id: String,
    sequence: u64,
    source_port: String,
    source_channel: String,
    dest_port: String,
    dest_channel: String,
    data: Vec<u8>,
    timeout_height: u64,
    timeout_timestamp: SystemTime,
    created_at: SystemTime,
    config: PacketConfig,
    channel: Weak<Channel>,
    inner: RwLock<PacketInner>,
}

#[derive(Debug)]
struct PacketInner {
    status: PacketStatus,
    sent_at: Option<SystemTime>,
    received_at: Option<SystemTime>,
    metrics: PacketMetrics,
}

impl Packet {
    pub(crate) fn new(
        channel: &Arc<Channel>,
        sequence: u64,
        params: PacketParams,
        timeout_timestamp: SystemTime,
        config: PacketConfig,
    ) -> Self {
        let now = SystemTime::now();
        Self {
            id: generate_identifier(IdentifierKind::Packet),
            channel_id: channel.id().to_string(),
            sequence,
            source_port: channel.port_id().to_string(),
            source_channel: channel.channel_id().to_string(),
            dest_port: params.dest_port,
            dest_channel: params.dest_channel,
            data: params.data,
            timeout_height: params.timeout_height,
            timeout_timestamp,
            created_at: now,
            config,
            channel: Arc::downgrade(channel),
            inner: RwLock::new(PacketInner {
                status: PacketStatus::Pending,
                sent_at: None,
                received_at: None,
                metrics: PacketMetrics {
                    total_packets: 1,
                    last_update: Some(now),
                    ..Default::default()
                },
            }),
        }
    }

    /// Mark the packet as dispatched: Pending → Sent.
    pub fn send_now(&self) -> Result<(), IbcError> {
        let now = SystemTime::now();
        let mut inner = self.inner.write();
        match inner.status {
            PacketStatus::Pending => {}
            status @ (PacketStatus::Sent
            | PacketStatus::Received
            | PacketStatus::Acknowledged
            | PacketStatus::Timeout
            | PacketStatus::Failed) => return Err(self.invalid_state(status)),
        }

        self.transition(&mut inner, PacketStatus::Sent)?;
        inner.sent_at = Some(now);
        inner.metrics.last_update = Some(now);
        drop(inner);

        debug!(packet_id = %self.id, sequence = self.sequence, "[ibc] Packet sent");
        Ok(())
    }

    /// Receive the packet now. See [`Packet::receive_at`].
    pub fn receive(&self) -> Result<(), IbcError> {
        self.receive_at(SystemTime::now())
    }

    /// Receive the packet as of `now`.
    ///
    /// Requires Sent. A receive strictly after the deadline moves the packet
    /// to Timeout, counts a failure on the packet and its channel, and
    /// returns `PacketTimedOut`.
    pub fn receive_at(&self, now: SystemTime) -> Result<(), IbcError> {
        let mut inner = self.inner.write();
        match inner.status {
            PacketStatus::Sent => {}
            status @ (PacketStatus::Pending
            | PacketStatus::Received
            | PacketStatus::Acknowledged
            | PacketStatus::Timeout
            | PacketStatus::Failed) => return Err(self.invalid_state(status)),
        }

        if now > self.timeout_timestamp {
            self.transition(&mut inner, PacketStatus::Timeout)?;
            inner.metrics.failed_packets += 1;
            inner.metrics.last_update = Some(now);
            drop(inner);

            self.notify_failure();
            warn!(
                packet_id = %self.id,
                channel_id = %self.channel_id,
                sequence = self.sequence,
                "[ibc] Packet timed out"
            );
            return Err(IbcError::PacketTimedOut {
                packet_id: self.id.clone(),
            });
        }

        self.transition(&mut inner, PacketStatus::Received)?;
        inner.received_at = Some(now);
        inner.metrics.last_update = Some(now);
        drop(inner);

        debug!(packet_id = %self.id, sequence = self.sequence, "[ibc] Packet received");
        Ok(())
    }

    /// Acknowledge the packet: Received → Acknowledged.
    ///
    /// Records the send-to-acknowledge latency on the packet and folds it
    /// into the channel's metrics.
    pub fn acknowledge(&self) -> Result<(), IbcError> {
        let now = SystemTime::now();
        let latency = {
            let mut inner = self.inner.write();
            match inner.status {
                PacketStatus::Received => {}
                status @ (PacketStatus::Pending
                | PacketStatus::Sent
                | PacketStatus::Acknowledged
                | PacketStatus::Timeout
                | PacketStatus::Failed) => return Err(self.invalid_state(status)),
            }

            self.transition(&mut inner, PacketStatus::Acknowledged)?;
            let latency = inner
                .sent_at
                .and_then(|sent_at| now.duration_since(sent_at).ok())
                .unwrap_or_default();
            inner.metrics.successful_packets += 1;
            inner.metrics.average_latency = latency;
            inner.metrics.last_update = Some(now);
            latency
        };

        if let Some(channel) = self.channel.upgrade() {
            channel.record_acknowledgement(latency);
        }

        info!(
            packet_id = %self.id,
            channel_id = %self.channel_id,
            sequence = self.sequence,
            latency_us = latency.as_micros() as u64,
            "[ibc] Packet acknowledged"
        );
        Ok(())
    }

    /// Abandon the packet: Pending/Sent → Failed.
    pub fn mark_failed(&self) -> Result<(), IbcError> {
        let mut inner = self.inner.write();
        self.transition(&mut inner, PacketStatus::Failed)?;
        inner.metrics.failed_packets += 1;
        inner.metrics.last_update = Some(SystemTime::now());
        drop(inner);

        self.notify_failure();
        warn!(packet_id = %self.id, sequence = self.sequence, "[ibc] Packet marked failed");
        Ok(())
    }

    /// Record a caller-driven retry. Returns whether the retry budget
    /// (`max_retries`) still has room after this one.
    pub fn record_retry(&self, succeeded: bool) -> bool {
        let mut inner = self.inner.write();
        inner.metrics.total_retries += 1;
        if succeeded {
            inner.metrics.successful_retries += 1;
        } else {
            inner.metrics.failed_retries += 1;
        }
        inner.metrics.last_update = Some(SystemTime::now());
        inner.metrics.total_retries < u64::from(self.config.max_retries)
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }

    /// Whether the deadline has passed as of `now`.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now > self.timeout_timestamp
    }

    /// Administratively set the status, bypassing the transition table.
    pub fn set_status(&self, status: PacketStatus) {
        self.inner.write().status = status;
    }

    fn transition(&self, inner: &mut PacketInner, next: PacketStatus) -> Result<(), IbcError> {
        if !inner.status.can_transition_to(next) {
            return Err(self.invalid_state(inner.status));
        }
        inner.status = next;
        Ok(())
    }

    fn invalid_state(&self, status: PacketStatus) -> IbcError {
        IbcError::InvalidPacketState {
            packet_id: self.id.clone(),
            status,
        }
    }

    fn notify_failure(&self) {
        if let Some(channel) = self.channel.upgrade() {
            channel.record_failure();
        }
    }

    /// Current status.
    pub fn status(&self) -> PacketStatus {
        self.inner.read().status
    }

    /// Metrics snapshot.
    pub fn metrics(&self) -> PacketMetrics {
        self.inner.read().metrics.clone()
    }

    /// When the packet was sent.
    pub fn sent_at(&self) -> Option<SystemTime> {
        self.inner.read().sent_at
    }

    /// When the packet was received.
    pub fn received_at(&self) -> Option<SystemTime> {
        self.inner.read().received_at
    }

    /// Packet identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Owning channel id.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Sequence within the channel, starting at 1.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Source port (the channel's port).
    pub fn source_port(&self) -> &str {
        &self.source_port
    }

    /// Source channel (the channel's caller-chosen name).
    pub fn source_channel(&self) -> &str {
        &self.source_channel
    }

    /// Destination port.
    pub fn dest_port(&self) -> &str {
        &self.dest_port
    }

    /// Destination channel.
    pub fn dest_channel(&self) -> &str {
        &self.dest_channel
    }

    /// Payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Remote height deadline.
    pub fn timeout_height(&self) -> u64 {
        self.timeout_height
    }

    /// Wall-clock deadline.
    pub fn timeout_timestamp(&self) -> SystemTime {
        self.timeout_timestamp
    }

    /// Time remaining until the deadline, zero once passed.
    pub fn time_remaining(&self) -> Duration {
        self.timeout_timestamp
            .duration_since(SystemTime::now())
            .unwrap_or_default()
    }

    /// Creation time.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Effective configuration.
    pub fn config(&self) -> &PacketConfig {
        &self.config
    }
}
