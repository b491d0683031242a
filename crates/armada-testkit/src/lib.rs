//! Simulated collection backend for tests and demos.
//!
//! Wires a generated in-memory dataset behind the
//! [`CollectionBackend`](armada_core::CollectionBackend) trait, with
//! bounded simulated latency and scripted fault injection. Everything is
//! seeded: the same [`SimConfig`] always produces the same fleet, the
//! same latency samples, and therefore the same test run.

pub mod backend;
pub mod config;
pub mod fault;
pub mod fixtures;
pub mod generator;
pub mod latency;
pub mod rng;

pub use backend::InMemoryBackend;
pub use config::{ConfigError, SimConfig};
pub use fault::FaultPlan;
pub use fixtures::{starship, starship_backend, starship_fleet, ShipStatus, Starship};
pub use generator::generate;
pub use latency::DelayProfile;
pub use rng::SimRng;
