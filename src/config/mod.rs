//! Node configuration
//!
//! Each node reads a `config.yml` from its input directory. Everything the
//! round needs lives under the `fc_one_hot_encoding` section:
//!
//! ```yaml
//! fc_one_hot_encoding:
//!   files:
//!     input_filename: data.csv
//!     output_filename: encoded.csv
//!     sep: ","
//!   mode: predefined
//!   categorical_variables:
//!     Celltype: ['large', 'adeno', 'smallcell', 'squamous']
//!   categorical_columns: [stage]
//! ```
//!
//! `categorical_variables` is only read by the coordinator in predefined
//! mode, and only validated then (see [`NodeConfig::directive_for`]).

pub mod loader;


use crate::encoding::LevelDirective;
use crate::error::{common, ErrorCode, FederationError, Result};
use crate::protocol::{Mode, Role};
use serde::Deserialize;

pub use loader::ConfigLoader;

pub const CONFIG_FILE_NAME: &str = "config.yml";
pub const CONFIG_SECTION: &str = "fc_one_hot_encoding";

#[derive(Debug, Clone, Deserialize)]
struct RawFiles {
    input_filename: Option<String>,
    output_filename: Option<String>,
    sep: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSection {
    files: Option<RawFiles>,
    mode: Option<String>,
    categorical_variables: Option<serde_yaml::Value>,
    #[serde(default)]
    categorical_columns: Vec<String>,
}

/// Validated configuration of one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    pub input_filename: String,
    pub output_filename: String,
    /// Field delimiter for input and output tables
    pub separator: u8,
    pub mode: Mode,
    /// Raw `categorical_variables` value, validated on demand
    pub categorical_variables: Option<serde_yaml::Value>,
    /// Non-text columns to treat as categorical
    pub categorical_columns: Vec<String>,
}

impl NodeConfig {
    /// Parse a whole `config.yml` document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let document: serde_yaml::Value = serde_yaml::from_str(content)?;
        let section = document
            .get(CONFIG_SECTION)
            .cloned()
            .ok_or_else(|| common::missing_config_key(CONFIG_SECTION))?;
        let raw: RawSection = serde_yaml::from_value(section)?;

        let files = raw.files.ok_or_else(|| common::missing_config_key("files"))?;
        let input_filename = files
            .input_filename
            .ok_or_else(|| common::missing_config_key("files.input_filename"))?;
        let output_filename = files
            .output_filename
            .ok_or_else(|| common::missing_config_key("files.output_filename"))?;
        let sep = files
            .sep
            .ok_or_else(|| common::missing_config_key("files.sep"))?;
        let separator = parse_separator(&sep)?;

        let mode: Mode = raw
            .mode
            .ok_or_else(|| common::missing_config_key("mode"))?
            .parse()?;

        Ok(Self {
            input_filename,
            output_filename,
            separator,
            mode,
            categorical_variables: raw.categorical_variables,
            categorical_columns: raw.categorical_columns,
        })
    }

    /// The level directive this node must hold for its role
    ///
    /// Only a coordinator in predefined mode holds one; for it a missing or
    /// malformed directive is a configuration error.
    pub fn directive_for(&self, role: Role) -> Result<Option<LevelDirective>> {
        match (self.mode, role) {
            (Mode::Predefined, Role::Coordinator) => {
                LevelDirective::parse(self.categorical_variables.as_ref()).map(Some)
            }
            _ => Ok(None),
        }
    }
}

/// A delimiter must be a single ASCII character; `\t` is accepted spelled out
pub fn parse_separator(sep: &str) -> Result<u8> {
    let sep = if sep == "\\t" { "\t" } else { sep };
    match sep.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(FederationError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            format!("Separator must be a single ASCII character, got {:?}", sep),
        )),
    }
}
