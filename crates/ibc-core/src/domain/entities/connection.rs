//! # Connection
//!
//! Authenticated link between two clients. Lifecycle follows the
//! `ConnectionStatus` table: Init → TryOpen → Open, any non-terminal
//! status → Closed.

use super::channel::Channel;
use super::client::Client;
use crate::algorithms::{generate_identifier, IdentifierKind};
use crate::config::{ChannelConfig, ConnectionConfig};
use crate::domain::metrics::running_average;
use crate::domain::{ChannelOrdering, ConnectionMetrics, ConnectionStatus, IbcError};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

/// Connection between two light clients.
#[derive(Debug)]
pub struct Connection {
    id: String,
    client_a: String,
    client_b: String,
    chain_a: String,
    chain_b: String,
    delay_period: Duration,
    created_at: SystemTime,
    config: ConnectionConfig,
    inner: RwLock<ConnectionInner>,
}

#[derive(Debug)]
struct ConnectionInner {
    status: ConnectionStatus,
    established_at: Option<SystemTime>,
    metrics: ConnectionMetrics,
}

impl Connection {
    /// `config` must already have defaults applied.
    pub(crate) fn new(client_a: &Client, client_b: &Client, config: ConnectionConfig) -> Self {
        Self {
            id: generate_identifier(IdentifierKind::Connection),
            client_a: client_a.id().to_string(),
            client_b: client_b.id().to_string(),
            chain_a: client_a.chain_id().to_string(),
            chain_b: client_b.chain_id().to_string(),
            delay_period: config.max_delay_period,
            created_at: SystemTime::now(),
            config,
            inner: RwLock::new(ConnectionInner {
                status: ConnectionStatus::Init,
                established_at: None,
                metrics: ConnectionMetrics::default(),
            }),
        }
    }

    /// Run the handshake locally: Init → TryOpen → Open in one step.
    ///
    /// Every call counts as an attempt. Calls from any status other than
    /// Init fail and count as failed attempts.
    pub fn open_connection(&self) -> Result<(), IbcError> {
        let now = SystemTime::now();
        let mut inner = self.inner.write();
        inner.metrics.total_attempts += 1;
        inner.metrics.last_update = Some(now);

        let status = inner.status;
        match status {
            ConnectionStatus::Init => {}
            status @ (ConnectionStatus::TryOpen
            | ConnectionStatus::Open
            | ConnectionStatus::Closed) => {
                inner.metrics.failed_attempts += 1;
                drop(inner);
                warn!(connection_id = %self.id, ?status, "[ibc] Open rejected");
                return Err(IbcError::InvalidConnectionState {
                    connection_id: self.id.clone(),
                    status,
                });
            }
        }

        self.transition(&mut inner, ConnectionStatus::TryOpen)?;
        self.transition(&mut inner, ConnectionStatus::Open)?;

        inner.established_at = Some(now);
        inner.metrics.successful_attempts += 1;
        let setup_time = now.duration_since(self.created_at).unwrap_or_default();
        inner.metrics.average_setup_time = running_average(
            inner.metrics.average_setup_time,
            inner.metrics.successful_attempts,
            setup_time,
        );
        drop(inner);

        info!(
            connection_id = %self.id,
            chain_a = %self.chain_a,
            chain_b = %self.chain_b,
            "[ibc] Connection opened"
        );
        Ok(())
    }

    /// Create a channel on this connection in state Init.
    pub fn create_channel(
        &self,
        port_id: impl Into<String>,
        channel_id: impl Into<String>,
        ordering: ChannelOrdering,
        config: ChannelConfig,
    ) -> Result<Arc<Channel>, IbcError> {
        let inner = self.inner.read();
        let status = inner.status;
        match status {
            ConnectionStatus::Open => {}
            status @ (ConnectionStatus::Init
            | ConnectionStatus::TryOpen
            | ConnectionStatus::Closed) => {
                drop(inner);
                warn!(
                    connection_id = %self.id,
                    ?status,
                    "[ibc] Channel rejected: connection not open"
                );
                return Err(IbcError::ConnectionNotOpen {
                    connection_id: self.id.clone(),
                    status,
                });
            }
        }

        let channel = Channel::new(
            &self.id,
            port_id.into(),
            channel_id.into(),
            ordering,
            config.with_defaults(),
        );
        drop(inner);

        info!(
            connection_id = %self.id,
            channel_id = %channel.id(),
            port_id = %channel.port_id(),
            ?ordering,
            "[ibc] Channel created"
        );
        Ok(Arc::new(channel))
    }

    /// Close the connection. Closing twice is an error.
    pub fn close(&self) -> Result<(), IbcError> {
        let mut inner = self.inner.write();
        self.transition(&mut inner, ConnectionStatus::Closed)?;
        inner.metrics.last_update = Some(SystemTime::now());
        drop(inner);

        info!(connection_id = %self.id, "[ibc] Connection closed");
        Ok(())
    }

    /// Administratively set the status, bypassing the transition table.
    pub fn set_status(&self, status: ConnectionStatus) {
        self.inner.write().status = status;
    }

    fn transition(
        &self,
        inner: &mut ConnectionInner,
        next: ConnectionStatus,
    ) -> Result<(), IbcError> {
        if !inner.status.can_transition_to(next) {
            return Err(IbcError::InvalidConnectionState {
                connection_id: self.id.clone(),
                status: inner.status,
            });
        }
        inner.status = next;
        Ok(())
    }

    /// Current status.
    pub fn status(&self) -> ConnectionStatus {
        self.inner.read().status
    }

    /// Metrics snapshot.
    pub fn metrics(&self) -> ConnectionMetrics {
        self.inner.read().metrics.clone()
    }

    /// When the handshake completed.
    pub fn established_at(&self) -> Option<SystemTime> {
        self.inner.read().established_at
    }

    /// Connection identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creating client id.
    pub fn client_a(&self) -> &str {
        &self.client_a
    }

    /// Counterparty client id.
    pub fn client_b(&self) -> &str {
        &self.client_b
    }

    /// Creating client's chain id.
    pub fn chain_a(&self) -> &str {
        &self.chain_a
    }

    /// Counterparty chain id.
    pub fn chain_b(&self) -> &str {
        &self.chain_b
    }

    /// Delay period, fixed from `max_delay_period` at creation.
    pub fn delay_period(&self) -> Duration {
        self.delay_period
    }

    /// Creation time.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Effective configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}
