use super::Phase;
use crate::config::NodeConfig;
use crate::encoding::{GlobalLevelMap, LevelDirective};
use crate::protocol::NodeIdentity;
use crate::table::Table;

/// Everything a node accumulates during one round
///
/// All of it is ephemeral: [`RoundState::reset`] returns the node to a
/// clean `initializing` state so it can take part in another round.
#[derive(Debug, Clone, Default)]
pub struct RoundState {
    pub phase: Phase,
    pub identity: Option<NodeIdentity>,
    pub config: Option<NodeConfig>,
    /// Validated directive, held by a predefined-mode coordinator only
    pub directive: Option<LevelDirective>,
    /// The local table, as read and with categorical columns marked
    pub table: Option<Table>,
    pub levels: Option<GlobalLevelMap>,
    pub encoded: Option<Table>,
    /// Coordinator saw disagreeing modes
    pub aborted: bool,
    /// Output written and completion signalled; only closing the round is left
    pub done_sent: bool,
}

impl RoundState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
