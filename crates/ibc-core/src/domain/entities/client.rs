//! # Client
//!
//! In-process light client tracking one remote chain. Gates connection
//! creation and fronts the chain's `ChainValidator`.

use super::connection::Connection;
use crate::algorithms::{generate_identifier, IdentifierKind};
use crate::config::{ClientConfig, ConnectionConfig};
use crate::domain::{ClientKind, ClientMetrics, ClientStatus, IbcError, TrustLevel};
use crate::ports::ChainValidator;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Light client for a remote chain.
pub struct Client {
    id: String,
    chain_id: String,
    kind: ClientKind,
    created_at: SystemTime,
    config: ClientConfig,
    validator: Option<Arc<dyn ChainValidator>>,
    inner: RwLock<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    status: ClientStatus,
    trust_level: TrustLevel,
    last_update: SystemTime,
    metrics: ClientMetrics,
}

impl Client {
    /// Create an Active, High-trust client. Zero-valued config fields are
    /// replaced by defaults.
    pub fn new(chain_id: impl Into<String>, kind: ClientKind, config: ClientConfig) -> Self {
        let now = SystemTime::now();
        let client = Self {
            id: generate_identifier(IdentifierKind::Client),
            chain_id: chain_id.into(),
            kind,
            created_at: now,
            config: config.with_defaults(),
            validator: None,
            inner: RwLock::new(ClientInner {
                status: ClientStatus::Active,
                trust_level: TrustLevel::High,
                last_update: now,
                metrics: ClientMetrics::default(),
            }),
        };

        info!(
            client_id = %client.id,
            chain_id = %client.chain_id,
            kind = ?client.kind,
            "[ibc] Client created"
        );
        client
    }

    /// Attach the chain validator this client delegates verification to.
    pub fn with_validator(mut self, validator: Arc<dyn ChainValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Create a connection to `counterparty` in status Init.
    ///
    /// Both clients must be Active. Only this client's metrics change.
    /// The counterparty status is a best-effort snapshot taken under the
    /// counterparty's own lock, released before this client's lock is taken.
    pub fn create_connection(
        &self,
        counterparty: &Client,
        config: ConnectionConfig,
    ) -> Result<Arc<Connection>, IbcError> {
        let counterparty_status = counterparty.status();

        let mut inner = self.inner.write();
        match inner.status {
            ClientStatus::Active => {}
            status @ (ClientStatus::Frozen | ClientStatus::Expired | ClientStatus::Revoked) => {
                warn!(
                    client_id = %self.id,
                    ?status,
                    "[ibc] Connection rejected: client not active"
                );
                return Err(IbcError::ClientNotActive {
                    client_id: self.id.clone(),
                    status,
                });
            }
        }
        match counterparty_status {
            ClientStatus::Active => {}
            status @ (ClientStatus::Frozen | ClientStatus::Expired | ClientStatus::Revoked) => {
                warn!(
                    client_id = %self.id,
                    counterparty_id = %counterparty.id,
                    ?status,
                    "[ibc] Connection rejected: counterparty not active"
                );
                return Err(IbcError::CounterpartyNotActive {
                    client_id: counterparty.id.clone(),
                    status,
                });
            }
        }

        let connection = Connection::new(self, counterparty, config.with_defaults());

        inner.metrics.total_connections += 1;
        inner.metrics.last_update = Some(SystemTime::now());
        drop(inner);

        info!(
            client_id = %self.id,
            connection_id = %connection.id(),
            chain_a = %self.chain_id,
            chain_b = %counterparty.chain_id,
            "[ibc] Connection created"
        );
        Ok(Arc::new(connection))
    }

    /// Validate and accept a header from the remote chain.
    ///
    /// Requires Active status and `header.len() <= max_header_size`.
    /// Rejections are returned; freezing is left to the caller.
    pub async fn update_header(&self, header: &[u8]) -> Result<(), IbcError> {
        self.ensure_active()?;

        if header.len() > self.config.max_header_size {
            return Err(IbcError::HeaderTooLarge {
                client_id: self.id.clone(),
                size: header.len(),
                max: self.config.max_header_size,
            });
        }

        self.validator()?
            .validate_header(header)
            .await
            .map_err(|e| self.validation_error(e))?;

        let now = SystemTime::now();
        {
            let mut inner = self.inner.write();
            inner.last_update = now;
            inner.metrics.last_update = Some(now);
        }

        debug!(client_id = %self.id, size = header.len(), "[ibc] Header accepted");
        Ok(())
    }

    /// Verify a proof over `data` through the chain validator.
    pub async fn verify_proof(&self, proof: &[u8], data: &[u8]) -> Result<(), IbcError> {
        self.ensure_active()?;

        self.validator()?
            .validate_proof(proof, data)
            .await
            .map_err(|e| self.validation_error(e))
    }

    /// Latest remote height reported by the validator.
    pub async fn latest_height(&self) -> Result<u64, IbcError> {
        Ok(self.validator()?.get_latest_height().await)
    }

    /// Remote block time at `height`.
    pub async fn timestamp_at(&self, height: u64) -> Result<SystemTime, IbcError> {
        self.validator()?.get_timestamp(height).await
    }

    /// Administratively set the status. No transition table applies.
    pub fn set_status(&self, status: ClientStatus) {
        let previous = {
            let mut inner = self.inner.write();
            let previous = std::mem::replace(&mut inner.status, status);
            inner.last_update = SystemTime::now();
            previous
        };
        info!(client_id = %self.id, from = ?previous, to = ?status, "[ibc] Client status set");
    }

    /// Set status Frozen.
    pub fn freeze(&self) {
        self.set_status(ClientStatus::Frozen);
    }

    /// Set status Expired.
    pub fn expire(&self) {
        self.set_status(ClientStatus::Expired);
    }

    /// Set status Revoked.
    pub fn revoke(&self) {
        self.set_status(ClientStatus::Revoked);
    }

    /// Set the informational trust level.
    pub fn set_trust_level(&self, trust_level: TrustLevel) {
        let mut inner = self.inner.write();
        inner.trust_level = trust_level;
        inner.last_update = SystemTime::now();
    }

    /// Check whether the last update is still within the trusting period.
    pub fn is_trusted_at(&self, now: SystemTime) -> bool {
        let last_update = self.inner.read().last_update;
        match now.duration_since(last_update) {
            Ok(elapsed) => elapsed <= self.config.trusting_period,
            Err(_) => true,
        }
    }

    /// Current status.
    pub fn status(&self) -> ClientStatus {
        self.inner.read().status
    }

    /// Metrics snapshot.
    pub fn metrics(&self) -> ClientMetrics {
        self.inner.read().metrics.clone()
    }

    /// Current trust level.
    pub fn trust_level(&self) -> TrustLevel {
        self.inner.read().trust_level
    }

    /// Last status or header update.
    pub fn last_update(&self) -> SystemTime {
        self.inner.read().last_update
    }

    /// Client identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Remote chain identifier.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Remote chain kind.
    pub fn kind(&self) -> ClientKind {
        self.kind
    }

    /// Creation time.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Effective configuration (defaults applied).
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn ensure_active(&self) -> Result<(), IbcError> {
        match self.status() {
            ClientStatus::Active => Ok(()),
            status @ (ClientStatus::Frozen | ClientStatus::Expired | ClientStatus::Revoked) => {
                Err(IbcError::ClientNotActive {
                    client_id: self.id.clone(),
                    status,
                })
            }
        }
    }

    fn validator(&self) -> Result<&Arc<dyn ChainValidator>, IbcError> {
        self.validator.as_ref().ok_or_else(|| IbcError::ValidatorMissing {
            client_id: self.id.clone(),
        })
    }

    fn validation_error(&self, err: IbcError) -> IbcError {
        warn!(client_id = %self.id, error = %err, "[ibc] Validation failed");
        IbcError::Validation {
            client_id: self.id.clone(),
            reason: err.to_string(),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("chain_id", &self.chain_id)
            .field("kind", &self.kind)
            .field("config", &self.config)
            .field("has_validator", &self.validator.is_some())
            .field("inner", &*self.inner.read())
            .finish()
    }
}
