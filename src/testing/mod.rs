//! Testing utilities and fixtures
//!
//! Shared by the unit tests and the integration tests in `tests/`: an
//! in-memory [`NodeHost`](crate::host::NodeHost), config builders and node
//! directories on disk.

pub mod fixtures;
pub mod mocks;

pub use fixtures::{ConfigBuilder, NodeDir, TestCluster};
pub use mocks::MemoryHost;
