use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;
pub mod helpers;


pub use codes::{describe_error_code, ErrorCode};
pub use helpers::{common, ErrorExt};

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, FederationError>;

/// The unified error type for a node taking part in an encoding round
#[derive(Error, Debug)]
pub enum FederationError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Agreement failure: {message}")]
    Agreement { code: u16, message: String },

    #[error("[E{code:04}] Protocol error in phase '{phase}': {message}")]
    Protocol {
        code: u16,
        message: String,
        phase: String,
    },

    #[error("[E{code:04}] Transport error: {message}")]
    Transport {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Table error: {message}")]
    Table {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl FederationError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// The nodes were configured with different modes
    pub fn mode_disagreement() -> Self {
        Self::Agreement {
            code: ErrorCode::AGREEMENT_MODE_MISMATCH,
            message: "Participants do not agree on mode".to_string(),
        }
    }

    /// Create a protocol error attributed to a phase
    pub fn protocol(code: u16, phase: impl Display, message: impl Into<String>) -> Self {
        Self::Protocol {
            code,
            message: message.into(),
            phase: phase.to_string(),
        }
    }

    /// Create a transport error with default code
    pub fn transport(message: impl Into<String>) -> Self {
        Self::transport_with_code(ErrorCode::TRANSPORT_GENERIC, message)
    }

    /// Create a transport error with specific code
    pub fn transport_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a table error with default code
    pub fn table(message: impl Into<String>) -> Self {
        Self::table_with_code(ErrorCode::TABLE_GENERIC, message, None)
    }

    /// Create a table error with specific code and path
    pub fn table_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Table {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a generic other error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    ///
    /// Variants without a source slot are returned unchanged.
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Transport { source: src, .. }
            | Self::Table { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::Agreement { .. } | Self::Protocol { .. } => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Agreement { message, .. }
            | Self::Protocol { message, .. }
            | Self::Transport { message, .. }
            | Self::Table { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Agreement { .. } => 3,
            Self::Protocol { .. } => 4,
            Self::Transport { .. } => 5,
            Self::Table { .. } => 6,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Agreement { code, .. }
            | Self::Protocol { code, .. }
            | Self::Transport { code, .. }
            | Self::Table { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Whether every node of the round is expected to fail with this error
    ///
    /// Only agreement failures are distributed; everything else was detected
    /// by the local node alone.
    pub fn is_distributed(&self) -> bool {
        matches!(self, Self::Agreement { .. })
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Agreement { message, .. } => {
                format!("Round aborted, nodes could not agree: {}", message)
            }
            Self::Protocol { message, phase, .. } => {
                format!("Protocol violation during '{}': {}", phase, message)
            }
            Self::Transport { message, .. } => format!("Transport problem: {}", message),
            Self::Table { message, path, .. } => {
                if let Some(p) = path {
                    format!("Table error at {}: {}", p.display(), message)
                } else {
                    format!("Table error: {}", message)
                }
            }
            Self::Other { message, .. } => message.clone(),
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        let mut msg = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            msg.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        msg
    }
}

impl From<std::io::Error> for FederationError {
    fn from(err: std::io::Error) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_IO,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for FederationError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_INVALID_YAML, err.to_string()).with_source(err)
    }
}

impl From<csv::Error> for FederationError {
    fn from(err: csv::Error) -> Self {
        Self::table_with_code(ErrorCode::TABLE_CSV, err.to_string(), None).with_source(err)
    }
}
