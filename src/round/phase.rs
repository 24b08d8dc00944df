//! Round phases and the role-gated transition table

use crate::protocol::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A step of the round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Initializing,
    ReadConfig,
    SendMode,
    GlobalCheckModeAgreement,
    WaitForModeAgreement,
    ReadInput,
    SummarizeColumns,
    GlobalAggregate,
    WaitForAggregation,
    EncodeData,
    Finish,
    Terminal,
}

impl Phase {
    pub const ALL: [Phase; 12] = [
        Phase::Initializing,
        Phase::ReadConfig,
        Phase::SendMode,
        Phase::GlobalCheckModeAgreement,
        Phase::WaitForModeAgreement,
        Phase::ReadInput,
        Phase::SummarizeColumns,
        Phase::GlobalAggregate,
        Phase::WaitForAggregation,
        Phase::EncodeData,
        Phase::Finish,
        Phase::Terminal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Initializing => "initializing",
            Phase::ReadConfig => "read-config",
            Phase::SendMode => "send-mode",
            Phase::GlobalCheckModeAgreement => "global-check-mode-agreement",
            Phase::WaitForModeAgreement => "wait-for-mode-agreement",
            Phase::ReadInput => "read-input",
            Phase::SummarizeColumns => "summarize-columns",
            Phase::GlobalAggregate => "global-aggregate",
            Phase::WaitForAggregation => "wait-for-aggregation",
            Phase::EncodeData => "encode-data",
            Phase::Finish => "finish",
            Phase::Terminal => "terminal",
        }
    }

    /// Human readable progress shown while the phase runs
    pub fn progress(self) -> &'static str {
        match self {
            Phase::Initializing => "initializing...",
            Phase::ReadConfig => "read config...",
            Phase::SendMode => "send mode...",
            Phase::GlobalCheckModeAgreement => "check mode agreement...",
            Phase::WaitForModeAgreement => "wait for mode agreement...",
            Phase::ReadInput => "read input...",
            Phase::SummarizeColumns => "summarize columns...",
            Phase::GlobalAggregate => "aggregate column information...",
            Phase::WaitForAggregation => "wait for aggregated results...",
            Phase::EncodeData => "encode data...",
            Phase::Finish => "finishing...",
            Phase::Terminal => "finished.",
        }
    }

    /// Phases that only one role ever enters
    pub fn required_role(self) -> Option<Role> {
        match self {
            Phase::GlobalCheckModeAgreement | Phase::GlobalAggregate => Some(Role::Coordinator),
            Phase::WaitForModeAgreement | Phase::WaitForAggregation => Some(Role::Participant),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Terminal
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Valid transitions between phases for one role
#[derive(Debug, Clone)]
pub struct TransitionTable {
    transitions: HashMap<Phase, Vec<Phase>>,
}

impl TransitionTable {
    pub fn for_role(role: Role) -> Self {
        let mut transitions = HashMap::new();

        transitions.insert(Phase::Initializing, vec![Phase::ReadConfig]);
        transitions.insert(Phase::ReadConfig, vec![Phase::SendMode]);
        transitions.insert(Phase::ReadInput, vec![Phase::SummarizeColumns]);
        transitions.insert(Phase::EncodeData, vec![Phase::Finish]);
        transitions.insert(Phase::Terminal, vec![]); // Terminal state

        match role {
            Role::Coordinator => {
                transitions.insert(Phase::SendMode, vec![Phase::GlobalCheckModeAgreement]);
                // disagreement skips straight to finish
                transitions.insert(
                    Phase::GlobalCheckModeAgreement,
                    vec![Phase::ReadInput, Phase::Finish],
                );
                transitions.insert(Phase::SummarizeColumns, vec![Phase::GlobalAggregate]);
                transitions.insert(Phase::GlobalAggregate, vec![Phase::EncodeData]);
                // finish re-enters itself to wait for every completion signal
                transitions.insert(Phase::Finish, vec![Phase::Finish, Phase::Terminal]);
            }
            Role::Participant => {
                transitions.insert(Phase::SendMode, vec![Phase::WaitForModeAgreement]);
                transitions.insert(Phase::WaitForModeAgreement, vec![Phase::ReadInput]);
                transitions.insert(Phase::SummarizeColumns, vec![Phase::WaitForAggregation]);
                transitions.insert(Phase::WaitForAggregation, vec![Phase::EncodeData]);
                // finish re-enters itself to wait for the coordinator to close
                transitions.insert(Phase::Finish, vec![Phase::Finish, Phase::Terminal]);
            }
        }

        Self { transitions }
    }

    pub fn is_valid_transition(&self, from: Phase, to: Phase) -> bool {
        self.transitions
            .get(&from)
            .map(|targets| targets.contains(&to))
            .unwrap_or(false)
    }

    pub fn get_valid_transitions(&self, from: Phase) -> Vec<Phase> {
        self.transitions.get(&from).cloned().unwrap_or_default()
    }
}
