//! # Protocol Configuration
//!
//! Plain config records for each entity kind. `Default` is the zero value;
//! `with_defaults` fills every zero-valued field independently, which is
//! what the entity constructors apply.

mod file;

pub use file::{
    ChannelSection, ClientSection, ConnectionSection, IbcConfigFile, PacketBatchingSection,
    PacketSection, PerformanceSection, RateLimitSection, SecuritySection, ValidationSection,
};

use crate::domain::SecurityLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DAY: Duration = Duration::from_secs(24 * 3600);

/// Default max clock drift (10 seconds).
pub const DEFAULT_MAX_CLOCK_DRIFT: Duration = Duration::from_secs(10);
/// Default trusting period (2 weeks).
pub const DEFAULT_TRUSTING_PERIOD: Duration = Duration::from_secs(14 * 24 * 3600);
/// Default unbonding period (3 weeks).
pub const DEFAULT_UNBONDING_PERIOD: Duration = Duration::from_secs(21 * 24 * 3600);
/// Default max header size (1 MiB).
pub const DEFAULT_MAX_HEADER_SIZE: usize = 1024 * 1024;

/// Default connection max delay period (1 day).
pub const DEFAULT_MAX_DELAY_PERIOD: Duration = DAY;
/// Default connection retry attempts.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
/// Default connection timeout (5 minutes).
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Default max packet size (1 MiB).
pub const DEFAULT_MAX_PACKET_SIZE: usize = 1024 * 1024;
/// Default max packet timeout (1 week).
pub const DEFAULT_MAX_PACKET_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 3600);

/// Default packet retry budget.
pub const DEFAULT_PACKET_MAX_RETRIES: u32 = 3;
/// Default delay between packet retries (1 second).
pub const DEFAULT_PACKET_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Default packet timeout hint (5 minutes).
pub const DEFAULT_PACKET_TIMEOUT: Duration = Duration::from_secs(5 * 60);

fn or_default(value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        default
    } else {
        value
    }
}

/// Client configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Tolerated clock drift against the remote chain.
    pub max_clock_drift: Duration,
    /// How long a header stays trusted.
    pub trusting_period: Duration,
    /// Remote chain unbonding period.
    pub unbonding_period: Duration,
    /// Largest header accepted, in bytes.
    pub max_header_size: usize,
    /// Compression hint.
    pub enable_compression: bool,
    /// Security level hint.
    pub security_level: SecurityLevel,
    /// Policy hint: freeze on misbehaviour.
    pub auto_freeze: bool,
}

impl ClientConfig {
    /// Fill zero-valued fields with protocol defaults.
    pub fn with_defaults(mut self) -> Self {
        self.max_clock_drift = or_default(self.max_clock_drift, DEFAULT_MAX_CLOCK_DRIFT);
        self.trusting_period = or_default(self.trusting_period, DEFAULT_TRUSTING_PERIOD);
        self.unbonding_period = or_default(self.unbonding_period, DEFAULT_UNBONDING_PERIOD);
        if self.max_header_size == 0 {
            self.max_header_size = DEFAULT_MAX_HEADER_SIZE;
        }
        self
    }
}

/// Connection configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Max delay period; also the connection's delay period.
    pub max_delay_period: Duration,
    /// Retry budget hint.
    pub retry_attempts: u32,
    /// Handshake timeout hint.
    pub timeout: Duration,
    /// Compression hint.
    pub enable_compression: bool,
    /// Security level hint.
    pub security_level: SecurityLevel,
    /// Policy hint: retry failed handshakes.
    pub auto_retry: bool,
}

impl ConnectionConfig {
    /// Fill zero-valued fields with protocol defaults.
    pub fn with_defaults(mut self) -> Self {
        self.max_delay_period = or_default(self.max_delay_period, DEFAULT_MAX_DELAY_PERIOD);
        if self.retry_attempts == 0 {
            self.retry_attempts = DEFAULT_RETRY_ATTEMPTS;
        }
        self.timeout = or_default(self.timeout, DEFAULT_CONNECTION_TIMEOUT);
        self
    }
}

/// Channel configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Largest payload accepted, in bytes (inclusive).
    pub max_packet_size: usize,
    /// Deadline applied when a packet is sent without one.
    pub max_packet_timeout: Duration,
    /// Compression hint.
    pub enable_compression: bool,
    /// Security level hint.
    pub security_level: SecurityLevel,
    /// Policy hint: close on repeated failure.
    pub auto_close: bool,
}

impl ChannelConfig {
    /// Fill zero-valued fields with protocol defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.max_packet_size == 0 {
            self.max_packet_size = DEFAULT_MAX_PACKET_SIZE;
        }
        self.max_packet_timeout = or_default(self.max_packet_timeout, DEFAULT_MAX_PACKET_TIMEOUT);
        self
    }
}

/// Packet configuration. Data only: the core never drives retries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketConfig {
    /// Retry budget.
    pub max_retries: u32,
    /// Delay between retries.
    pub retry_delay: Duration,
    /// Per-attempt timeout hint.
    pub timeout: Duration,
    /// Compression hint.
    pub enable_compression: bool,
    /// Security level hint.
    pub security_level: SecurityLevel,
    /// Policy hint: retry on failure.
    pub auto_retry: bool,
}

impl PacketConfig {
    /// Fill zero-valued fields with protocol defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.max_retries == 0 {
            self.max_retries = DEFAULT_PACKET_MAX_RETRIES;
        }
        self.retry_delay = or_default(self.retry_delay, DEFAULT_PACKET_RETRY_DELAY);
        self.timeout = or_default(self.timeout, DEFAULT_PACKET_TIMEOUT);
        self
    }
}
