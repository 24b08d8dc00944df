//! Sans-IO round state machine
//!
//! [`RoundMachine`] never waits or talks to anyone. Each phase declares
//! what it is blocked on through [`RoundMachine::need`]; whoever drives the
//! machine fulfils that need and hands the result to
//! [`RoundMachine::advance`], which runs the phase, moves to the next one and
//! returns the messages and writes the driver must carry out, in order.
//!
//! This keeps the protocol replayable in tests without a network.

use super::{Phase, RoundState, TransitionTable};
use crate::config::NodeConfig;
use crate::encoding::{encode_and_filter, summarize, CategorySet, GlobalLevelMap};
use crate::error::{common, ErrorCode, FederationError, Result};
use crate::protocol::{aggregate, check_agreement, LevelSource, Message, Mode, NodeIdentity};
use crate::table::Table;
use tracing::{debug, info, warn};

/// What the current phase is blocked on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Need {
    /// This node's identity from its transport
    Identity,
    /// The node configuration
    Config,
    /// The local input table
    Table,
    /// One message from every node (coordinator)
    Gather,
    /// The coordinator's next broadcast (participant)
    Broadcast,
    /// Nothing; the phase runs on local state alone
    Nothing,
}

/// The fulfilment of a [`Need`]
#[derive(Debug, Clone)]
pub enum Input {
    Identity(NodeIdentity),
    Config(NodeConfig),
    Table(Table),
    Gathered(Vec<Message>),
    Received(Message),
    Nothing,
}

impl Input {
    fn kind(&self) -> &'static str {
        match self {
            Input::Identity(_) => "identity",
            Input::Config(_) => "config",
            Input::Table(_) => "table",
            Input::Gathered(_) => "gathered messages",
            Input::Received(_) => "received message",
            Input::Nothing => "nothing",
        }
    }
}

/// A side effect the driver must perform
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    SendToCoordinator(Message),
    Broadcast { message: Message, include_self: bool },
    /// Write the encoded table through the host
    WriteTable(Table),
}

#[derive(Debug, Default)]
pub struct RoundMachine {
    state: RoundState,
    transitions: Option<TransitionTable>,
}

impl RoundMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.phase.is_terminal()
    }

    /// The coordinator ended the round because modes disagreed
    pub fn aborted(&self) -> bool {
        self.state.aborted
    }

    /// Forget everything about the current round
    pub fn reset(&mut self) {
        self.state.reset();
        self.transitions = None;
    }

    pub fn need(&self) -> Need {
        let coordinator = self.is_coordinator();
        match self.state.phase {
            Phase::Initializing => Need::Identity,
            Phase::ReadConfig => Need::Config,
            Phase::ReadInput => Need::Table,
            Phase::GlobalCheckModeAgreement | Phase::GlobalAggregate => Need::Gather,
            Phase::WaitForModeAgreement | Phase::WaitForAggregation => Need::Broadcast,
            Phase::Finish if coordinator && self.state.done_sent => Need::Gather,
            Phase::Finish if self.state.done_sent => Need::Broadcast,
            Phase::SendMode
            | Phase::SummarizeColumns
            | Phase::EncodeData
            | Phase::Finish
            | Phase::Terminal => Need::Nothing,
        }
    }

    /// Run the current phase on `input` and move to the next one
    pub fn advance(&mut self, input: Input) -> Result<Vec<Output>> {
        let phase = self.state.phase;
        let (next, outputs) = match (phase, input) {
            (Phase::Initializing, Input::Identity(identity)) => self.initialize(identity),
            (Phase::ReadConfig, Input::Config(config)) => self.read_config(config)?,
            (Phase::SendMode, Input::Nothing) => self.send_mode()?,
            (Phase::GlobalCheckModeAgreement, Input::Gathered(messages)) => {
                self.check_mode_agreement(messages)?
            }
            (Phase::WaitForModeAgreement, Input::Received(message)) => {
                self.receive_agreement(message)?
            }
            (Phase::ReadInput, Input::Table(table)) => self.read_input(table)?,
            (Phase::SummarizeColumns, Input::Nothing) => self.summarize_columns()?,
            (Phase::GlobalAggregate, Input::Gathered(messages)) => {
                self.aggregate_levels(messages)?
            }
            (Phase::WaitForAggregation, Input::Received(message)) => {
                self.receive_levels(message)?
            }
            (Phase::EncodeData, Input::Nothing) => self.encode_data()?,
            (Phase::Finish, Input::Nothing) if !self.state.done_sent => self.finish()?,
            (Phase::Finish, Input::Gathered(messages)) if self.state.done_sent => {
                self.close_round(messages)?
            }
            (Phase::Finish, Input::Received(message)) if self.state.done_sent => {
                self.receive_close(message)?
            }
            (phase, input) => {
                return Err(FederationError::protocol(
                    ErrorCode::PROTOCOL_INVALID_TRANSITION,
                    phase,
                    format!("phase cannot consume {}", input.kind()),
                ))
            }
        };

        self.transition(next)?;
        Ok(outputs)
    }

    fn transition(&mut self, next: Phase) -> Result<()> {
        let from = self.state.phase;
        let valid = self
            .transitions
            .as_ref()
            .map(|table| table.is_valid_transition(from, next))
            .unwrap_or(false);
        if !valid {
            return Err(FederationError::protocol(
                ErrorCode::PROTOCOL_INVALID_TRANSITION,
                from,
                format!("cannot move to '{}'", next),
            ));
        }
        if from != next {
            debug!("Phase {} -> {}", from, next);
        }
        self.state.phase = next;
        Ok(())
    }

    fn is_coordinator(&self) -> bool {
        self.state
            .identity
            .as_ref()
            .map(NodeIdentity::is_coordinator)
            .unwrap_or(false)
    }

    fn identity(&self) -> Result<&NodeIdentity> {
        self.state
            .identity
            .as_ref()
            .ok_or_else(|| missing_state(self.state.phase, "node identity"))
    }

    fn config(&self) -> Result<&NodeConfig> {
        self.state
            .config
            .as_ref()
            .ok_or_else(|| missing_state(self.state.phase, "configuration"))
    }

    fn table(&self) -> Result<&Table> {
        self.state
            .table
            .as_ref()
            .ok_or_else(|| missing_state(self.state.phase, "input table"))
    }

    fn after_send(&self, coordinator_next: Phase, participant_next: Phase) -> Phase {
        if self.is_coordinator() {
            coordinator_next
        } else {
            participant_next
        }
    }

    /// Exactly one message per node, or the gather was broken
    fn expect_cardinality(&self, messages: &[Message]) -> Result<()> {
        let expected = self.identity()?.node_count;
        if messages.len() != expected {
            return Err(FederationError::protocol(
                ErrorCode::PROTOCOL_WRONG_CARDINALITY,
                self.state.phase,
                format!("gathered {} message(s) from {} node(s)", messages.len(), expected),
            ));
        }
        Ok(())
    }

    fn initialize(&mut self, identity: NodeIdentity) -> (Phase, Vec<Output>) {
        info!(
            "Node {} is {} of {} node(s)",
            identity.node_id, identity.role, identity.node_count
        );
        self.transitions = Some(TransitionTable::for_role(identity.role));
        self.state.identity = Some(identity);
        (Phase::ReadConfig, vec![])
    }

    fn read_config(&mut self, config: NodeConfig) -> Result<(Phase, Vec<Output>)> {
        let role = self.identity()?.role;
        self.state.directive = config.directive_for(role)?;
        if let Some(directive) = &self.state.directive {
            debug!("Predefined levels for {} column(s)", directive.len());
        }
        self.state.config = Some(config);
        Ok((Phase::SendMode, vec![]))
    }

    fn send_mode(&mut self) -> Result<(Phase, Vec<Output>)> {
        let mode = self.config()?.mode;
        let next = self.after_send(Phase::GlobalCheckModeAgreement, Phase::WaitForModeAgreement);
        Ok((next, vec![Output::SendToCoordinator(Message::Mode(mode))]))
    }

    fn check_mode_agreement(&mut self, messages: Vec<Message>) -> Result<(Phase, Vec<Output>)> {
        self.expect_cardinality(&messages)?;
        let phase = self.state.phase;
        let modes = messages
            .into_iter()
            .map(|message| match message {
                Message::Mode(mode) => Ok(mode),
                other => Err(common::unexpected_message(phase, "mode", other.kind())),
            })
            .collect::<Result<Vec<Mode>>>()?;

        let agreed = check_agreement(&modes);
        let outputs = vec![Output::Broadcast {
            message: Message::Agreement(agreed),
            include_self: false,
        }];
        if agreed {
            info!("All nodes agree on mode {}", modes[0]);
            Ok((Phase::ReadInput, outputs))
        } else {
            warn!("Nodes reported different modes: {:?}", modes);
            self.state.aborted = true;
            Ok((Phase::Finish, outputs))
        }
    }

    fn receive_agreement(&mut self, message: Message) -> Result<(Phase, Vec<Output>)> {
        match message {
            Message::Agreement(true) => Ok((Phase::ReadInput, vec![])),
            Message::Agreement(false) => Err(FederationError::mode_disagreement()),
            other => Err(common::unexpected_message(
                self.state.phase,
                "agreement",
                other.kind(),
            )),
        }
    }

    fn read_input(&mut self, mut table: Table) -> Result<(Phase, Vec<Output>)> {
        for column in &self.config()?.categorical_columns {
            table.mark_categorical(column)?;
        }
        debug!(
            "Input has {} row(s) and {} column(s)",
            table.row_count(),
            table.columns().len()
        );
        self.state.table = Some(table);
        Ok((Phase::SummarizeColumns, vec![]))
    }

    fn summarize_columns(&mut self) -> Result<(Phase, Vec<Output>)> {
        let summary: Option<CategorySet> = match self.config()?.mode {
            Mode::Auto => Some(summarize(self.table()?)),
            Mode::Predefined => self.state.directive.as_ref().map(|d| d.to_category_set()),
        };
        if let Some(summary) = &summary {
            debug!("Summary covers columns {:?}", summary.columns().collect::<Vec<_>>());
        }
        let next = self.after_send(Phase::GlobalAggregate, Phase::WaitForAggregation);
        Ok((next, vec![Output::SendToCoordinator(Message::Summary(summary))]))
    }

    fn aggregate_levels(&mut self, messages: Vec<Message>) -> Result<(Phase, Vec<Output>)> {
        self.expect_cardinality(&messages)?;
        let phase = self.state.phase;
        let summaries = messages
            .into_iter()
            .map(|message| match message {
                Message::Summary(summary) => Ok(summary),
                other => Err(common::unexpected_message(phase, "summary", other.kind())),
            })
            .collect::<Result<Vec<_>>>()?;

        let source = match self.config()?.mode {
            Mode::Auto => LevelSource::Observed,
            Mode::Predefined => LevelSource::Predefined(
                self.state
                    .directive
                    .clone()
                    .ok_or_else(|| missing_state(phase, "level directive"))?,
            ),
        };
        let levels = aggregate(&source, &summaries);
        info!("Agreed levels for {} column(s)", levels.len());

        self.state.levels = Some(levels.clone());
        Ok((
            Phase::EncodeData,
            vec![Output::Broadcast {
                message: Message::Levels(levels),
                include_self: false,
            }],
        ))
    }

    fn receive_levels(&mut self, message: Message) -> Result<(Phase, Vec<Output>)> {
        match message {
            Message::Levels(levels) => {
                debug!("Received levels for {} column(s)", levels.len());
                self.state.levels = Some(levels);
                Ok((Phase::EncodeData, vec![]))
            }
            other => Err(common::unexpected_message(
                self.state.phase,
                "levels",
                other.kind(),
            )),
        }
    }

    fn encode_data(&mut self) -> Result<(Phase, Vec<Output>)> {
        let levels: &GlobalLevelMap = self
            .state
            .levels
            .as_ref()
            .ok_or_else(|| missing_state(self.state.phase, "level map"))?;
        let encoded = encode_and_filter(self.table()?, levels)?;
        info!(
            "Encoded {} row(s) into {} column(s)",
            encoded.row_count(),
            encoded.columns().len()
        );
        self.state.encoded = Some(encoded);
        Ok((Phase::Finish, vec![]))
    }

    fn finish(&mut self) -> Result<(Phase, Vec<Output>)> {
        if self.state.aborted {
            // participants already left with the disagreement, nobody will report
            return Ok((Phase::Terminal, vec![]));
        }
        let encoded = self
            .state
            .encoded
            .clone()
            .ok_or_else(|| missing_state(self.state.phase, "encoded table"))?;
        self.state.done_sent = true;
        Ok((
            Phase::Finish,
            vec![
                Output::WriteTable(encoded),
                Output::SendToCoordinator(Message::Done),
            ],
        ))
    }

    fn close_round(&mut self, messages: Vec<Message>) -> Result<(Phase, Vec<Output>)> {
        self.expect_cardinality(&messages)?;
        if let Some(other) = messages.iter().find(|m| **m != Message::Done) {
            return Err(common::unexpected_message(
                self.state.phase,
                "done",
                other.kind(),
            ));
        }
        info!("All {} node(s) finished", messages.len());
        Ok((
            Phase::Terminal,
            vec![Output::Broadcast {
                message: Message::Closed,
                include_self: false,
            }],
        ))
    }

    /// Participants leave only once the coordinator stopped gathering, so an
    /// early next round cannot mix with this one
    fn receive_close(&mut self, message: Message) -> Result<(Phase, Vec<Output>)> {
        match message {
            Message::Closed => Ok((Phase::Terminal, vec![])),
            other => Err(common::unexpected_message(
                self.state.phase,
                "closed",
                other.kind(),
            )),
        }
    }
}

fn missing_state(phase: Phase, what: &str) -> FederationError {
    FederationError::protocol(
        ErrorCode::PROTOCOL_MISSING_STATE,
        phase,
        format!("no {} available", what),
    )
}
