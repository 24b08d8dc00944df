//! Node-to-node messaging
//!
//! The round only needs four primitives: point-to-point send to the
//! coordinator, a blocking gather of exactly one message per node, a
//! broadcast and a blocking receive of one message. Payloads are opaque
//! bytes; see [`crate::protocol::Message`] for what goes inside.
//!
//! Two implementations ship with the crate:
//!
//! - [`local::LocalCluster`] connects N in-process nodes over tokio channels
//! - [`controller::ControllerTransport`] is a mailbox emptied and filled by
//!   an external controller through the HTTP API

pub mod controller;
pub mod local;

use crate::error::{ErrorCode, FederationError};
use crate::protocol::{NodeIdentity, Role};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub use controller::ControllerTransport;
pub use local::{LocalCluster, LocalTransport};

/// How long a blocking receive waits before logging that it is still waiting
pub const WAIT_WARNING_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel to {peer} closed")]
    Disconnected { peer: String },

    #[error("{operation} is only available to the {required}")]
    WrongRole {
        operation: &'static str,
        required: Role,
    },

    #[error("node has not been set up yet")]
    NotSetUp,
}

impl From<TransportError> for FederationError {
    fn from(err: TransportError) -> Self {
        let code = match &err {
            TransportError::Disconnected { .. } => ErrorCode::TRANSPORT_DISCONNECTED,
            TransportError::WrongRole { .. } => ErrorCode::TRANSPORT_WRONG_ROLE,
            TransportError::NotSetUp => ErrorCode::TRANSPORT_NOT_SET_UP,
        };
        FederationError::transport_with_code(code, err.to_string())
    }
}

/// Message passing between the nodes of one round
#[async_trait]
pub trait Transport: Send + Sync {
    /// Identity of this node; waits until the host has assigned one
    async fn identity(&self) -> Result<NodeIdentity, TransportError>;

    /// Deliver a payload to the coordinator; a coordinator delivers to itself
    async fn send_to_coordinator(&self, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Block until one message from every node has arrived (coordinator only)
    async fn gather(&self) -> Result<Vec<Vec<u8>>, TransportError>;

    /// Deliver a payload to every participant, and to this node if `include_self`
    async fn broadcast(&self, payload: Vec<u8>, include_self: bool) -> Result<(), TransportError>;

    /// Block until the next message arrives (participants only)
    async fn await_one(&self) -> Result<Vec<u8>, TransportError>;

    /// Drop anything left over from a previous round
    async fn reset(&self) {}
}

pub(crate) fn require_role(
    identity: &NodeIdentity,
    required: Role,
    operation: &'static str,
) -> Result<(), TransportError> {
    if identity.role == required {
        Ok(())
    } else {
        Err(TransportError::WrongRole {
            operation,
            required,
        })
    }
}

/// Await `fut`, logging a warning every [`WAIT_WARNING_INTERVAL`] until it completes
///
/// `describe` is called on every tick so the message can reflect progress.
pub(crate) async fn warn_while_waiting<F, D>(fut: F, describe: D) -> F::Output
where
    F: Future,
    D: Fn() -> String,
{
    tokio::pin!(fut);
    loop {
        match tokio::time::timeout(WAIT_WARNING_INTERVAL, &mut fut).await {
            Ok(output) => return output,
            Err(_) => warn!("Still waiting for {}", describe()),
        }
    }
}
