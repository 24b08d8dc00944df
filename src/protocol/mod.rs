//! Wire-level vocabulary shared by coordinator and participants
//!
//! Only column metadata crosses node boundaries. Every payload handed to a
//! [`Transport`](crate::transport::Transport) is a JSON-encoded [`Message`].

pub mod aggregate;

use crate::encoding::{CategorySet, GlobalLevelMap};
use crate::error::{ErrorCode, FederationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use aggregate::{aggregate, check_agreement, LevelSource};

/// How a node derives category levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Levels are the union of what every node observed
    Auto,
    /// Levels come from the coordinator's `categorical_variables` directive
    Predefined,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Auto => write!(f, "auto"),
            Mode::Predefined => write!(f, "predefined"),
        }
    }
}

impl FromStr for Mode {
    type Err = FederationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Mode::Auto),
            "predefined" => Ok(Mode::Predefined),
            other => Err(FederationError::config_with_code(
                ErrorCode::CONFIG_UNKNOWN_MODE,
                format!("Unknown mode '{}', expected 'auto' or 'predefined'", other),
            )),
        }
    }
}

/// Which side of the protocol a node plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coordinator,
    Participant,
}

impl Role {
    pub fn is_coordinator(self) -> bool {
        matches!(self, Role::Coordinator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Coordinator => write!(f, "coordinator"),
            Role::Participant => write!(f, "participant"),
        }
    }
}

/// Identity assigned to a node by its host before the round starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub node_id: String,
    pub role: Role,
    /// Number of nodes in the round, this one included
    pub node_count: usize,
}

impl NodeIdentity {
    pub fn is_coordinator(&self) -> bool {
        self.role.is_coordinator()
    }
}

/// A protocol message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Message {
    /// A node's configured mode, sent to the coordinator
    Mode(Mode),
    /// Coordinator's verdict on mode agreement
    Agreement(bool),
    /// A node's local category summary; `None` is the predefined-mode placeholder
    Summary(Option<CategorySet>),
    /// The agreed level map
    Levels(GlobalLevelMap),
    /// A node finished writing its output
    Done,
    /// Coordinator heard from every node; the round is over everywhere
    Closed,
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Mode(_) => "mode",
            Message::Agreement(_) => "agreement",
            Message::Summary(_) => "summary",
            Message::Levels(_) => "levels",
            Message::Done => "done",
            Message::Closed => "closed",
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            FederationError::protocol(
                ErrorCode::PROTOCOL_ENCODE_FAILED,
                self.kind(),
                "could not serialise message",
            )
            .with_context(e)
        })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            FederationError::protocol(
                ErrorCode::PROTOCOL_DECODE_FAILED,
                "decode",
                "could not parse message",
            )
            .with_context(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("auto".parse::<Mode>().unwrap(), Mode::Auto);
        assert_eq!("predefined".parse::<Mode>().unwrap(), Mode::Predefined);
        let err = "manual".parse::<Mode>().unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_UNKNOWN_MODE);
    }

    #[test]
    fn test_message_wire_format() {
        let bytes = Message::Mode(Mode::Predefined).encode().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"type":"mode","data":"predefined"}"#
        );
        let bytes = Message::Done.encode().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), r#"{"type":"done"}"#);
        let bytes = Message::Closed.encode().unwrap();
        assert_eq!(Message::decode(&bytes).unwrap(), Message::Closed);
        let bytes = Message::Summary(None).encode().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"type":"summary","data":null}"#
        );
    }

    #[test]
    fn test_levels_message_decodes() {
        let msg = Message::decode(br#"{"type":"levels","data":{"b":["mid","high","low"]}}"#)
            .unwrap();
        let Message::Levels(map) = msg else {
            panic!("expected a levels message");
        };
        assert_eq!(
            map.levels("b").unwrap().iter().map(|l| l.to_string()).collect::<Vec<_>>(),
            vec!["high", "low", "mid"]
        );
    }

    #[test]
    fn test_garbage_rejected() {
        let err = Message::decode(b"DONE").unwrap_err();
        assert_eq!(err.code(), ErrorCode::PROTOCOL_DECODE_FAILED);
    }
}
