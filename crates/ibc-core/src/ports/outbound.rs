//! # Outbound Ports
//!
//! Light-client verification is not implemented here; clients delegate to
//! a pluggable `ChainValidator`.

use crate::domain::IbcError;
use async_trait::async_trait;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Chain validator - outbound port.
#[async_trait]
pub trait ChainValidator: Send + Sync {
    /// Validate an encoded header from the remote chain.
    async fn validate_header(&self, header: &[u8]) -> Result<(), IbcError>;

    /// Validate a proof over `data`.
    async fn validate_proof(&self, proof: &[u8], data: &[u8]) -> Result<(), IbcError>;

    /// Latest height known for the remote chain.
    async fn get_latest_height(&self) -> u64;

    /// Block time at `height`.
    async fn get_timestamp(&self, height: u64) -> Result<SystemTime, IbcError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Fixed height returned by `MockChainValidator::default()`.
pub const MOCK_LATEST_HEIGHT: u64 = 1000;

/// Fixed unix timestamp returned by `MockChainValidator::default()`.
pub const MOCK_TIMESTAMP_SECS: u64 = 1_700_000_000;

/// Reference validator: accepts everything, reports a fixed height and time.
#[derive(Clone, Debug)]
pub struct MockChainValidator {
    /// Height reported by `get_latest_height`.
    pub latest_height: u64,
    /// Time reported by `get_timestamp`.
    pub timestamp: SystemTime,
    /// Should fail?
    pub should_fail: bool,
}

impl MockChainValidator {
    /// Create the always-succeeding validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator that rejects every header and proof.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }
}

impl Default for MockChainValidator {
    fn default() -> Self {
        Self {
            latest_height: MOCK_LATEST_HEIGHT,
            timestamp: UNIX_EPOCH + Duration::from_secs(MOCK_TIMESTAMP_SECS),
            should_fail: false,
        }
    }
}

#[async_trait]
impl ChainValidator for MockChainValidator {
    async fn validate_header(&self, _header: &[u8]) -> Result<(), IbcError> {
        if self.should_fail {
            return Err(IbcError::ValidatorRejected("mock header rejection".to_string()));
        }
        Ok(())
    }

    async fn validate_proof(&self, _proof: &[u8], _data: &[u8]) -> Result<(), IbcError> {
        if self.should_fail {
            return Err(IbcError::ValidatorRejected("mock proof rejection".to_string()));
        }
        Ok(())
    }

    async fn get_latest_height(&self) -> u64 {
        self.latest_height
    }

    async fn get_timestamp(&self, _height: u64) -> Result<SystemTime, IbcError> {
        if self.should_fail {
            return Err(IbcError::ValidatorRejected("mock timestamp rejection".to_string()));
        }
        Ok(self.timestamp)
    }
}
