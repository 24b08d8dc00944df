//! # federated-onehot
//!
//! Federated one-hot encoding: every node holds its own table, the nodes
//! agree on the set of levels per categorical column by exchanging only
//! metadata, then each node encodes its table locally against the agreed
//! levels so all outputs share the same columns in the same order.
//!
//! ## Usage
//!
//! ```bash
//! federated-onehot serve --port 5000
//! federated-onehot simulate site-a site-b site-c -o out
//! federated-onehot encode -t data.csv -l levels.yml -o encoded.csv
//! ```
//!
//! ## Modules
//!
//! - `api` - HTTP surface used by an external controller
//! - `app` - Logging setup and fatal error reporting
//! - `cli` - Command line parsing and command handlers
//! - `config` - Per-node `config.yml` parsing and loading
//! - `encoding` - Levels, column summaries and the one-hot encoder
//! - `error` - Unified error type with stable codes
//! - `host` - Access to a node's configuration and tables
//! - `protocol` - Messages exchanged between nodes and level aggregation
//! - `round` - The per-node state machine and its async driver
//! - `table` - In-memory tables and CSV reading/writing
//! - `transport` - Node-to-node delivery (in-process and controller-relayed)
//! - `testing` - Testing utilities and fixtures
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod encoding;
pub mod error;
pub mod host;
pub mod protocol;
pub mod round;
pub mod table;
pub mod transport;

pub mod testing;
