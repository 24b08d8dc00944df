//! In-process cluster over tokio channels
//!
//! Used by `simulate` and by the integration tests. Node 0 is the
//! coordinator; every node holds a sender to every inbox, its own included.

use super::{require_role, warn_while_waiting, Transport, TransportError};
use crate::protocol::{NodeIdentity, Role};
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::trace;

pub struct LocalCluster;

impl LocalCluster {
    /// Create `node_count` connected transports, coordinator first
    pub fn new(node_count: usize) -> Vec<LocalTransport> {
        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..node_count).map(|_| mpsc::unbounded_channel()).unzip();

        receivers
            .into_iter()
            .enumerate()
            .map(|(index, inbox)| LocalTransport {
                index,
                identity: NodeIdentity {
                    node_id: node_name(index),
                    role: if index == 0 {
                        Role::Coordinator
                    } else {
                        Role::Participant
                    },
                    node_count,
                },
                peers: senders.clone(),
                inbox: Mutex::new(inbox),
            })
            .collect()
    }
}

pub fn node_name(index: usize) -> String {
    format!("node-{}", index)
}

/// One node's end of a [`LocalCluster`]
pub struct LocalTransport {
    index: usize,
    identity: NodeIdentity,
    peers: Vec<mpsc::UnboundedSender<Vec<u8>>>,
    inbox: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl LocalTransport {
    fn deliver(&self, to: usize, payload: Vec<u8>) -> Result<(), TransportError> {
        trace!("{} -> {}: {} bytes", self.identity.node_id, node_name(to), payload.len());
        self.peers[to]
            .send(payload)
            .map_err(|_| TransportError::Disconnected {
                peer: node_name(to),
            })
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn identity(&self) -> Result<NodeIdentity, TransportError> {
        Ok(self.identity.clone())
    }

    async fn send_to_coordinator(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        self.deliver(0, payload)
    }

    async fn gather(&self) -> Result<Vec<Vec<u8>>, TransportError> {
        require_role(&self.identity, Role::Coordinator, "gather")?;
        let expected = self.identity.node_count;
        let mut inbox = self.inbox.lock().await;
        let mut gathered = Vec::with_capacity(expected);
        while gathered.len() < expected {
            let remaining = expected - gathered.len();
            let payload = warn_while_waiting(inbox.recv(), || {
                format!("{} node(s) to report", remaining)
            })
            .await
            .ok_or_else(|| TransportError::Disconnected {
                peer: "cluster".to_string(),
            })?;
            gathered.push(payload);
        }
        Ok(gathered)
    }

    async fn broadcast(&self, payload: Vec<u8>, include_self: bool) -> Result<(), TransportError> {
        require_role(&self.identity, Role::Coordinator, "broadcast")?;
        if include_self {
            self.deliver(self.index, payload.clone())?;
        }
        for to in (0..self.peers.len()).filter(|&to| to != self.index) {
            self.deliver(to, payload.clone())?;
        }
        Ok(())
    }

    async fn await_one(&self) -> Result<Vec<u8>, TransportError> {
        require_role(&self.identity, Role::Participant, "await_one")?;
        let mut inbox = self.inbox.lock().await;
        warn_while_waiting(inbox.recv(), || "the coordinator".to_string())
            .await
            .ok_or_else(|| TransportError::Disconnected {
                peer: node_name(0),
            })
    }

    async fn reset(&self) {
        let mut inbox = self.inbox.lock().await;
        while inbox.try_recv().is_ok() {}
    }
}
