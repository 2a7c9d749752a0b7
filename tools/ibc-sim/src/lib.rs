//! IBC-Sim: drives the interchain handshake end to end in one process.

pub mod scenario;

pub use scenario::{run_scenario, ScenarioOptions, ScenarioReport};
