//! Mailbox transport driven by an external controller
//!
//! The node never opens a connection itself. A controller assigns the
//! node's identity, polls the outgoing queue and pushes payloads from
//! other nodes into the incoming queue; see [`crate::api`] for the HTTP
//! surface on top of this.

use super::{require_role, warn_while_waiting, Transport, TransportError};
use crate::protocol::{NodeIdentity, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Notify};
use tracing::{debug, info};

/// Body of a setup call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupRequest {
    /// This node's id
    pub id: String,
    /// Whether this node coordinates the round
    pub coordinator: bool,
    /// Ids of every node taking part, this one included
    pub clients: Vec<String>,
    /// Id of the coordinating node; without it a participant's messages
    /// leave with no destination and the controller routes them
    #[serde(default)]
    pub coordinator_id: Option<String>,
}

/// A payload waiting to be picked up by the controller
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub payload: Vec<u8>,
    /// Target node id; `None` means every other node
    pub destination: Option<String>,
}

struct Mailbox {
    identity: watch::Sender<Option<NodeIdentity>>,
    coordinator_id: Mutex<Option<String>>,
    incoming: Mutex<VecDeque<Vec<u8>>>,
    arrived: Notify,
    outgoing: Mutex<VecDeque<Outgoing>>,
}

#[derive(Clone)]
pub struct ControllerTransport {
    mailbox: Arc<Mailbox>,
}

impl Default for ControllerTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerTransport {
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            mailbox: Arc::new(Mailbox {
                identity,
                coordinator_id: Mutex::new(None),
                incoming: Mutex::new(VecDeque::new()),
                arrived: Notify::new(),
                outgoing: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Assign this node's identity, unblocking anyone waiting on [`Transport::identity`]
    pub async fn setup(&self, request: SetupRequest) -> Result<NodeIdentity, TransportError> {
        if request.clients.is_empty() || !request.clients.contains(&request.id) {
            return Err(TransportError::NotSetUp);
        }
        if let Some(coordinator_id) = &request.coordinator_id {
            let names_other = request.coordinator && *coordinator_id != request.id;
            if names_other || !request.clients.contains(coordinator_id) {
                return Err(TransportError::NotSetUp);
            }
        }
        let identity = NodeIdentity {
            node_id: request.id.clone(),
            role: if request.coordinator {
                Role::Coordinator
            } else {
                Role::Participant
            },
            node_count: request.clients.len(),
        };
        info!(
            "Setup as {} {} of {} node(s)",
            identity.role, identity.node_id, identity.node_count
        );

        let coordinator_id = if request.coordinator {
            Some(request.id.clone())
        } else {
            request.coordinator_id.clone()
        };
        *self.mailbox.coordinator_id.lock().await = coordinator_id;
        self.mailbox.identity.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    pub fn current_identity(&self) -> Option<NodeIdentity> {
        self.mailbox.identity.borrow().clone()
    }

    /// Append a payload received from another node
    pub async fn push_incoming(&self, payload: Vec<u8>) {
        debug!("Received {} bytes", payload.len());
        self.mailbox.incoming.lock().await.push_back(payload);
        self.mailbox.arrived.notify_one();
    }

    /// Take the next payload the controller should forward
    pub async fn pop_outgoing(&self) -> Option<Outgoing> {
        self.mailbox.outgoing.lock().await.pop_front()
    }

    /// Destination of the next outgoing payload, if one is queued
    pub async fn peek_outgoing(&self) -> Option<Option<String>> {
        self.mailbox
            .outgoing
            .lock()
            .await
            .front()
            .map(|o| o.destination.clone())
    }

    fn setup_identity(&self) -> Result<NodeIdentity, TransportError> {
        self.current_identity().ok_or(TransportError::NotSetUp)
    }

    async fn enqueue(&self, payload: Vec<u8>, destination: Option<String>) {
        self.mailbox.outgoing.lock().await.push_back(Outgoing {
            payload,
            destination,
        });
    }

    /// Wait until at least `count` payloads are queued, then take exactly `count`
    async fn take_incoming(&self, count: usize) -> Vec<Vec<u8>> {
        loop {
            {
                let mut incoming = self.mailbox.incoming.lock().await;
                if incoming.len() >= count {
                    return incoming.drain(..count).collect();
                }
            }
            self.mailbox.arrived.notified().await;
        }
    }

    async fn incoming_len(&self) -> usize {
        self.mailbox.incoming.lock().await.len()
    }
}

#[async_trait]
impl Transport for ControllerTransport {
    async fn identity(&self) -> Result<NodeIdentity, TransportError> {
        let mut rx = self.mailbox.identity.subscribe();
        let wait = async move {
            loop {
                let current = rx.borrow_and_update().clone();
                if let Some(identity) = current {
                    return Ok(identity);
                }
                if rx.changed().await.is_err() {
                    return Err(TransportError::NotSetUp);
                }
            }
        };
        warn_while_waiting(wait, || "setup from the controller".to_string()).await
    }

    async fn send_to_coordinator(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        let identity = self.setup_identity()?;
        if identity.is_coordinator() {
            self.push_incoming(payload).await;
        } else {
            let coordinator = self.mailbox.coordinator_id.lock().await.clone();
            self.enqueue(payload, coordinator).await;
        }
        Ok(())
    }

    async fn gather(&self) -> Result<Vec<Vec<u8>>, TransportError> {
        let identity = self.setup_identity()?;
        require_role(&identity, Role::Coordinator, "gather")?;
        let expected = identity.node_count;
        let incoming = &self.mailbox.incoming;
        Ok(warn_while_waiting(self.take_incoming(expected), || {
            let pending = incoming
                .try_lock()
                .map(|queue| expected.saturating_sub(queue.len()))
                .unwrap_or(expected);
            format!("{} node(s) to report", pending)
        })
        .await)
    }

    async fn broadcast(&self, payload: Vec<u8>, include_self: bool) -> Result<(), TransportError> {
        let identity = self.setup_identity()?;
        require_role(&identity, Role::Coordinator, "broadcast")?;
        if include_self {
            self.push_incoming(payload.clone()).await;
        }
        self.enqueue(payload, None).await;
        Ok(())
    }

    async fn await_one(&self) -> Result<Vec<u8>, TransportError> {
        let identity = self.setup_identity()?;
        require_role(&identity, Role::Participant, "await_one")?;
        let mut one = warn_while_waiting(self.take_incoming(1), || {
            "the coordinator".to_string()
        })
        .await;
        one.pop().ok_or(TransportError::Disconnected {
            peer: "coordinator".to_string(),
        })
    }

    async fn reset(&self) {
        self.mailbox.incoming.lock().await.clear();
    }
}
