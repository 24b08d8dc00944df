use super::{Input, Need, Output, Phase, RoundMachine, StatusHandle};
use crate::config::NodeConfig;
use crate::encoding::GlobalLevelMap;
use crate::error::{ErrorCode, FederationError, Result};
use crate::host::NodeHost;
use crate::protocol::{Message, Mode, NodeIdentity};
use crate::transport::{LocalCluster, Transport};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info, info_span, Instrument};

/// What a node ends a successful round with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    pub identity: NodeIdentity,
    pub mode: Mode,
    pub levels: GlobalLevelMap,
    pub input_rows: usize,
    pub output_rows: usize,
    pub output_columns: Vec<String>,
}

/// Runs rounds for one node over a transport and a host
pub struct RoundRunner<T, H> {
    transport: T,
    host: H,
    machine: RoundMachine,
    status: StatusHandle,
}

impl<T: Transport, H: NodeHost> RoundRunner<T, H> {
    pub fn new(transport: T, host: H) -> Self {
        Self::with_status(transport, host, StatusHandle::new())
    }

    pub fn with_status(transport: T, host: H, status: StatusHandle) -> Self {
        Self {
            transport,
            host,
            machine: RoundMachine::new(),
            status,
        }
    }

    pub fn status(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Run one full round; the node is reset afterwards whatever the outcome
    ///
    /// Nodes may call this again straight away: no external barrier between
    /// rounds is needed.
    pub async fn run_round(&mut self) -> Result<RoundReport> {
        self.status.enter(Phase::Initializing);
        let result = self.drive().await;

        match &result {
            Ok(report) => {
                info!(
                    "Round finished on {}: {} of {} row(s) kept",
                    report.identity.node_id, report.output_rows, report.input_rows
                );
                self.status.finish();
            }
            Err(e) => {
                error!("Round failed in phase {}: {}", self.machine.phase(), e);
                self.status.fail(e.user_message());
            }
        }

        // a closed round consumed its messages; anything queued now belongs to the next one
        let closed = self.machine.is_terminal();
        self.machine.reset();
        if !closed {
            self.transport.reset().await;
        }
        result
    }

    async fn drive(&mut self) -> Result<RoundReport> {
        while !self.machine.is_terminal() {
            let phase = self.machine.phase();
            self.status.enter(phase);

            let span = match &self.machine.state().identity {
                Some(identity) => info_span!("phase", node = %identity.node_id, role = %identity.role, %phase),
                None => info_span!("phase", %phase),
            };
            let input = self.fulfil(self.machine.need()).instrument(span.clone()).await?;
            let outputs = span.in_scope(|| self.machine.advance(input))?;
            for output in outputs {
                self.perform(output).instrument(span.clone()).await?;
            }
        }

        if self.machine.aborted() {
            return Err(FederationError::mode_disagreement());
        }
        self.report()
    }

    async fn fulfil(&self, need: Need) -> Result<Input> {
        debug!("Waiting for {:?}", need);
        Ok(match need {
            Need::Nothing => Input::Nothing,
            Need::Identity => Input::Identity(self.transport.identity().await?),
            Need::Config => Input::Config(self.host.load_config().await?),
            Need::Table => Input::Table(self.host.read_table(self.config()?).await?),
            Need::Gather => {
                let payloads = self.transport.gather().await?;
                Input::Gathered(
                    payloads
                        .iter()
                        .map(|payload| Message::decode(payload))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            Need::Broadcast => {
                let payload = self.transport.await_one().await?;
                Input::Received(Message::decode(&payload)?)
            }
        })
    }

    async fn perform(&self, output: Output) -> Result<()> {
        match output {
            Output::SendToCoordinator(message) => {
                debug!("Send {} to coordinator", message.kind());
                self.transport.send_to_coordinator(message.encode()?).await?;
            }
            Output::Broadcast {
                message,
                include_self,
            } => {
                debug!("Broadcast {}", message.kind());
                self.transport
                    .broadcast(message.encode()?, include_self)
                    .await?;
            }
            Output::WriteTable(table) => {
                self.host.write_table(self.config()?, &table).await?;
            }
        }
        Ok(())
    }

    fn config(&self) -> Result<&NodeConfig> {
        self.machine.state().config.as_ref().ok_or_else(|| {
            FederationError::protocol(
                ErrorCode::PROTOCOL_MISSING_STATE,
                self.machine.phase(),
                "no configuration available",
            )
        })
    }

    fn report(&self) -> Result<RoundReport> {
        let state = self.machine.state();
        let missing = |what: &str| {
            FederationError::protocol(
                ErrorCode::PROTOCOL_MISSING_STATE,
                Phase::Terminal,
                format!("round ended without {}", what),
            )
        };
        let encoded = state.encoded.as_ref().ok_or_else(|| missing("an encoded table"))?;
        Ok(RoundReport {
            identity: state.identity.clone().ok_or_else(|| missing("an identity"))?,
            mode: self.config()?.mode,
            levels: state.levels.clone().ok_or_else(|| missing("levels"))?,
            input_rows: state.table.as_ref().map(|t| t.row_count()).unwrap_or(0),
            output_rows: encoded.row_count(),
            output_columns: encoded
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }
}

/// Run one round over an in-process cluster, the first host coordinating
///
/// Results come back in host order.
pub async fn run_local_cluster<H: NodeHost>(hosts: Vec<H>) -> Vec<Result<RoundReport>> {
    let transports = LocalCluster::new(hosts.len());
    let mut runners: Vec<_> = transports
        .into_iter()
        .zip(hosts)
        .map(|(transport, host)| RoundRunner::new(transport, host))
        .collect();
    join_all(runners.iter_mut().map(|runner| runner.run_round())).await
}
