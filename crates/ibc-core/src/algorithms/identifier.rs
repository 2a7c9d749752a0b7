//! # Identifier Generation
//!
//! Opaque, collision-resistant identifiers for every protocol entity.
//! No central counter: 16 random bytes are hashed with SHA-256 and the
//! first 8 digest bytes are hex-encoded behind a kind prefix.

use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of random bytes fed into the digest.
const ENTROPY_BYTES: usize = 16;

/// Number of digest bytes kept in the identifier.
const DIGEST_PREFIX_BYTES: usize = 8;

/// Entity kind an identifier is minted for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    /// Light client.
    Client,
    /// Connection between two clients.
    Connection,
    /// Channel on a connection.
    Channel,
    /// Packet on a channel.
    Packet,
}

impl IdentifierKind {
    /// Prefix placed in front of the hex digest.
    pub fn prefix(&self) -> &'static str {
        match self {
            IdentifierKind::Client => "ibc_client",
            IdentifierKind::Connection => "ibc_connection",
            IdentifierKind::Channel => "ibc_channel",
            IdentifierKind::Packet => "ibc_packet",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Generate a fresh identifier: `"<kind>_" + hex(sha256(random)[..8])`.
pub fn generate_identifier(kind: IdentifierKind) -> String {
    let mut entropy = [0u8; ENTROPY_BYTES];
    rand::thread_rng().fill_bytes(&mut entropy);

    let digest = Sha256::digest(entropy);
    format!("{}_{}", kind.prefix(), hex::encode(&digest[..DIGEST_PREFIX_BYTES]))
}
