//! # IBC Test Suite
//!
//! Cross-entity tests for `ibc-core`.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs            # Open client/connection/channel builders
//! │   └── integration/
//! │       ├── flows.rs           # Lifecycle, gating, timeout, size limits
//! │       └── concurrency.rs     # Sequence assignment, metrics, lock order
//! └── benches/
//!     └── packet_benchmarks.rs   # send_packet and full lifecycle
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ibc-tests
//! cargo test -p ibc-tests integration::concurrency
//! cargo bench -p ibc-tests
//! ```

#![allow(dead_code)]
