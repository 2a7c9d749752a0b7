//! # Entity Metrics
//!
//! Snapshot types returned by the `metrics()` accessors. Every counter is
//! mutated only under the owning entity's write lock.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Client metrics.
///
/// Only `total_connections` and `last_update` are maintained. A client holds
/// no reference to its channels or packets, so the remaining counters are
/// reserved and always zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMetrics {
    /// Connections originated by this client.
    pub total_connections: u64,
    /// Reserved, always zero.
    pub active_connections: u64,
    /// Reserved, always zero.
    pub total_channels: u64,
    /// Reserved, always zero.
    pub active_channels: u64,
    /// Reserved, always zero.
    pub total_packets: u64,
    /// Reserved, always zero.
    pub successful_packets: u64,
    /// Reserved, always zero.
    pub failed_packets: u64,
    /// Last mutation.
    pub last_update: Option<SystemTime>,
}

/// Connection metrics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionMetrics {
    /// `open_connection` calls.
    pub total_attempts: u64,
    /// Calls that reached Open.
    pub successful_attempts: u64,
    /// Calls rejected by the status check.
    pub failed_attempts: u64,
    /// Mean time from creation to Open.
    pub average_setup_time: Duration,
    /// Last mutation.
    pub last_update: Option<SystemTime>,
}

/// Channel metrics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMetrics {
    /// Packets created; also the last assigned sequence.
    pub total_packets: u64,
    /// Packets acknowledged.
    pub successful_packets: u64,
    /// Packets timed out or abandoned.
    pub failed_packets: u64,
    /// Mean send-to-acknowledge latency.
    pub average_latency: Duration,
    /// Last mutation.
    pub last_update: Option<SystemTime>,
}

/// Packet metrics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketMetrics {
    /// Always 1 once the packet exists.
    pub total_packets: u64,
    /// Retries recorded by the caller.
    pub total_retries: u64,
    /// Retries that succeeded.
    pub successful_retries: u64,
    /// Retries that failed.
    pub failed_retries: u64,
    /// 1 once timed out or abandoned.
    pub failed_packets: u64,
    /// 1 once acknowledged.
    pub successful_packets: u64,
    /// Send-to-acknowledge latency.
    pub average_latency: Duration,
    /// Last mutation.
    pub last_update: Option<SystemTime>,
}

/// Fold `sample` into a running mean over `samples` observations
/// (`samples` includes the new one).
pub(crate) fn running_average(current: Duration, samples: u64, sample: Duration) -> Duration {
    if samples <= 1 {
        return sample;
    }
    let total = current.as_nanos() * u128::from(samples - 1) + sample.as_nanos();
    let mean = total / u128::from(samples);
    Duration::from_nanos(u64::try_from(mean).unwrap_or(u64::MAX))
}
