//! One encoding round across all nodes
//!
//! Every node runs the same phase sequence. The role decides which branch
//! is taken in the aggregation-type phases:
//!
//! ```text
//! initializing -> read-config -> send-mode
//!                                    |
//!          +-------------------------+--------------------------+
//!          | coordinator                                        | participant
//!          v                                                    v
//! global-check-mode-agreement ---- disagree ----+     wait-for-mode-agreement --- false --> error
//!          | agree                               |               | true
//!          v                                     |               v
//!      read-input -> summarize-columns           |   read-input -> summarize-columns
//!          |                                     |               |
//!          v                                     |               v
//!   global-aggregate                             |      wait-for-aggregation
//!          |                                     |               |
//!          +------------> encode-data <----------|---------------+
//!                              |                 |
//!                              v                 |
//!                           finish <-------------+
//!                              |
//!                              v
//!                          terminal
//! ```
//!
//! In `finish` every node writes its output and signals the coordinator;
//! the coordinator then stays in `finish` until every node (itself
//! included) has signalled, and broadcasts `closed`. Participants stay in
//! `finish` until that arrives, so a node looping into its next round
//! never overlaps the coordinator's last gather. On the disagreement path
//! the coordinator skips all of this and the round ends with an agreement
//! error on every node.
//!
//! - [`RoundMachine`] is the pure, replayable state machine
//! - [`RoundRunner`] drives it over a [`Transport`](crate::transport::Transport)
//!   and a [`NodeHost`](crate::host::NodeHost)
//! - [`StatusHandle`] exposes progress to the API

pub mod driver;
pub mod machine;
pub mod phase;
pub mod state;
pub mod status;


pub use driver::{run_local_cluster, RoundReport, RoundRunner};
pub use machine::{Input, Need, Output, RoundMachine};
pub use phase::{Phase, TransitionTable};
pub use state::RoundState;
pub use status::{RoundStatus, StatusHandle};
