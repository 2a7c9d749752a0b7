//! TOML configuration file.
//!
//! Durations are human-readable strings (`"10s"`, `"336h"`, `"2weeks"`) and
//! security levels are `low|medium|high|ultra` tokens. An absent field maps
//! to the zero value so the entity defaults apply; a present but malformed
//! field is an error naming that field.
//!
//! ```toml
//! [clients.default]
//! max_clock_drift = "10s"
//! trusting_period = "336h"
//! security_level = "high"
//!
//! [connections.default]
//! max_delay_period = "24h"
//! retry_attempts = 3
//!
//! [channels.transfer]
//! max_packet_size = 1048576
//! max_packet_timeout = "168h"
//!
//! [packets.default]
//! max_retries = 3
//! retry_delay = "1s"
//!
//! [security.validation]
//! validate_headers = true
//!
//! [performance.packet_batching]
//! enabled = true
//! max_batch_size = 4
//! max_batch_delay = "10ms"
//! ```

use super::{ChannelConfig, ClientConfig, ConnectionConfig, PacketConfig};
use crate::domain::{ConfigError, SecurityLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Whole protocol configuration file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IbcConfigFile {
    /// Named client sections.
    pub clients: BTreeMap<String, ClientSection>,
    /// Named connection sections.
    pub connections: BTreeMap<String, ConnectionSection>,
    /// Named channel sections.
    pub channels: BTreeMap<String, ChannelSection>,
    /// Named packet sections.
    pub packets: BTreeMap<String, PacketSection>,
    /// Security policy inputs.
    pub security: SecuritySection,
    /// Host tuning inputs.
    pub performance: PerformanceSection,
}

/// `[clients.<name>]`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    /// e.g. `"10s"`
    pub max_clock_drift: Option<String>,
    /// e.g. `"336h"`
    pub trusting_period: Option<String>,
    /// e.g. `"504h"`
    pub unbonding_period: Option<String>,
    /// Bytes.
    pub max_header_size: usize,
    /// Compression hint.
    pub enable_compression: bool,
    /// `low|medium|high|ultra`
    pub security_level: Option<String>,
    /// Policy hint.
    pub auto_freeze: bool,
}

/// `[connections.<name>]`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    /// e.g. `"24h"`
    pub max_delay_period: Option<String>,
    /// Retry budget hint.
    pub retry_attempts: u32,
    /// e.g. `"5m"`
    pub timeout: Option<String>,
    /// Compression hint.
    pub enable_compression: bool,
    /// `low|medium|high|ultra`
    pub security_level: Option<String>,
    /// Policy hint.
    pub auto_retry: bool,
}

/// `[channels.<name>]`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSection {
    /// Bytes.
    pub max_packet_size: usize,
    /// e.g. `"168h"`
    pub max_packet_timeout: Option<String>,
    /// Compression hint.
    pub enable_compression: bool,
    /// `low|medium|high|ultra`
    pub security_level: Option<String>,
    /// Policy hint.
    pub auto_close: bool,
}

/// `[packets.<name>]`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketSection {
    /// Retry budget.
    pub max_retries: u32,
    /// e.g. `"1s"`
    pub retry_delay: Option<String>,
    /// e.g. `"5m"`
    pub timeout: Option<String>,
    /// Compression hint.
    pub enable_compression: bool,
    /// `low|medium|high|ultra`
    pub security_level: Option<String>,
    /// Policy hint.
    pub auto_retry: bool,
}

/// `[security]`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    /// `[security.rate_limit]`
    pub rate_limit: RateLimitSection,
    /// `[security.validation]`
    pub validation: ValidationSection,
}

/// `[security.rate_limit]` - carried for hosts, not enforced by the core.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    /// 0 means unlimited.
    pub max_connections_per_minute: u32,
    /// 0 means unlimited.
    pub max_packets_per_minute: u32,
    /// 0 means unlimited.
    pub max_channels_per_minute: u32,
}

/// `[security.validation]` - consumed by hosts deciding whether to run
/// headers and proofs through a client's `ChainValidator`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSection {
    /// Require a proof alongside every packet.
    pub require_proofs: bool,
    /// Run headers through the validator.
    pub validate_headers: bool,
    /// Run proofs through the validator.
    pub validate_proofs: bool,
    /// Largest proof accepted, in bytes. 0 means unbounded.
    pub max_proof_size: usize,
}

/// `[performance]`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSection {
    /// `[performance.packet_batching]`
    pub packet_batching: PacketBatchingSection,
}

/// `[performance.packet_batching]` - how a host groups packet sends.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketBatchingSection {
    /// Group sends into batches.
    pub enabled: bool,
    /// Packets per batch.
    pub max_batch_size: usize,
    /// Pause between batches, e.g. `"10ms"`.
    pub max_batch_delay: Option<String>,
}

impl PacketBatchingSection {
    /// Parsed pause between batches; zero when absent.
    pub fn batch_delay(&self) -> Result<Duration, ConfigError> {
        parse_duration("max_batch_delay", &self.max_batch_delay)
    }
}

impl IbcConfigFile {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Client config for section `name`; zero config when absent.
    pub fn client_config(&self, name: &str) -> Result<ClientConfig, ConfigError> {
        self.clients
            .get(name)
            .map_or(Ok(ClientConfig::default()), ClientSection::to_client_config)
    }

    /// Connection config for section `name`; zero config when absent.
    pub fn connection_config(&self, name: &str) -> Result<ConnectionConfig, ConfigError> {
        self.connections
            .get(name)
            .map_or(Ok(ConnectionConfig::default()), ConnectionSection::to_connection_config)
    }

    /// Channel config for section `name`; zero config when absent.
    pub fn channel_config(&self, name: &str) -> Result<ChannelConfig, ConfigError> {
        self.channels
            .get(name)
            .map_or(Ok(ChannelConfig::default()), ChannelSection::to_channel_config)
    }

    /// Packet config for section `name`; zero config when absent.
    pub fn packet_config(&self, name: &str) -> Result<PacketConfig, ConfigError> {
        self.packets
            .get(name)
            .map_or(Ok(PacketConfig::default()), PacketSection::to_packet_config)
    }
}

impl ClientSection {
    /// Convert to a runtime `ClientConfig`.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        Ok(ClientConfig {
            max_clock_drift: parse_duration("max_clock_drift", &self.max_clock_drift)?,
            trusting_period: parse_duration("trusting_period", &self.trusting_period)?,
            unbonding_period: parse_duration("unbonding_period", &self.unbonding_period)?,
            max_header_size: self.max_header_size,
            enable_compression: self.enable_compression,
            security_level: parse_security_level(&self.security_level)?,
            auto_freeze: self.auto_freeze,
        })
    }
}

impl ConnectionSection {
    /// Convert to a runtime `ConnectionConfig`.
    pub fn to_connection_config(&self) -> Result<ConnectionConfig, ConfigError> {
        Ok(ConnectionConfig {
            max_delay_period: parse_duration("max_delay_period", &self.max_delay_period)?,
            retry_attempts: self.retry_attempts,
            timeout: parse_duration("timeout", &self.timeout)?,
            enable_compression: self.enable_compression,
            security_level: parse_security_level(&self.security_level)?,
            auto_retry: self.auto_retry,
        })
    }
}

impl ChannelSection {
    /// Convert to a runtime `ChannelConfig`.
    pub fn to_channel_config(&self) -> Result<ChannelConfig, ConfigError> {
        Ok(ChannelConfig {
            max_packet_size: self.max_packet_size,
            max_packet_timeout: parse_duration("max_packet_timeout", &self.max_packet_timeout)?,
            enable_compression: self.enable_compression,
            security_level: parse_security_level(&self.security_level)?,
            auto_close: self.auto_close,
        })
    }
}

impl PacketSection {
    /// Convert to a runtime `PacketConfig`.
    pub fn to_packet_config(&self) -> Result<PacketConfig, ConfigError> {
        Ok(PacketConfig {
            max_retries: self.max_retries,
            retry_delay: parse_duration("retry_delay", &self.retry_delay)?,
            timeout: parse_duration("timeout", &self.timeout)?,
            enable_compression: self.enable_compression,
            security_level: parse_security_level(&self.security_level)?,
            auto_retry: self.auto_retry,
        })
    }
}

fn parse_duration(field: &'static str, value: &Option<String>) -> Result<Duration, ConfigError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(Duration::ZERO),
        Some(raw) => humantime::parse_duration(raw).map_err(|e| {
            ConfigError::InvalidDuration {
                field,
                value: raw.to_string(),
                reason: e.to_string(),
            }
        }),
    }
}

fn parse_security_level(value: &Option<String>) -> Result<SecurityLevel, ConfigError> {
    value
        .as_deref()
        .map_or(Ok(SecurityLevel::default()), |token| token.parse())
}
