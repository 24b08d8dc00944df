/// Error code registry
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Agreement errors
/// - 3000-3999: Protocol errors
/// - 4000-4999: Transport errors
/// - 5000-5999: Table errors
/// - 9000-9999: Other errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_YAML: u16 = 1002;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1004;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;
    pub const CONFIG_UNKNOWN_MODE: u16 = 1010;
    pub const CONFIG_INVALID_DIRECTIVE: u16 = 1011;

    // Agreement errors (2000-2999)
    pub const AGREEMENT_GENERIC: u16 = 2000;
    pub const AGREEMENT_MODE_MISMATCH: u16 = 2001;

    // Protocol errors (3000-3999)
    pub const PROTOCOL_GENERIC: u16 = 3000;
    pub const PROTOCOL_UNEXPECTED_MESSAGE: u16 = 3001;
    pub const PROTOCOL_INVALID_TRANSITION: u16 = 3002;
    pub const PROTOCOL_DECODE_FAILED: u16 = 3003;
    pub const PROTOCOL_ENCODE_FAILED: u16 = 3004;
    pub const PROTOCOL_MISSING_STATE: u16 = 3005;
    pub const PROTOCOL_WRONG_CARDINALITY: u16 = 3006;

    // Transport errors (4000-4999)
    pub const TRANSPORT_GENERIC: u16 = 4000;
    pub const TRANSPORT_DISCONNECTED: u16 = 4001;
    pub const TRANSPORT_WRONG_ROLE: u16 = 4002;
    pub const TRANSPORT_NOT_SET_UP: u16 = 4003;

    // Table errors (5000-5999)
    pub const TABLE_GENERIC: u16 = 5000;
    pub const TABLE_NOT_FOUND: u16 = 5001;
    pub const TABLE_CSV: u16 = 5002;
    pub const TABLE_UNKNOWN_COLUMN: u16 = 5003;
    pub const TABLE_NOT_CATEGORICAL: u16 = 5004;
    pub const TABLE_SHAPE_MISMATCH: u16 = 5005;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
    pub const OTHER_IO: u16 = 9001;
}

/// Get a description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "Generic configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_INVALID_YAML => "Invalid YAML syntax in configuration",
        ErrorCode::CONFIG_MISSING_REQUIRED => "Required configuration field missing",
        ErrorCode::CONFIG_INVALID_VALUE => "Invalid configuration value",
        ErrorCode::CONFIG_UNKNOWN_MODE => "Unknown operating mode",
        ErrorCode::CONFIG_INVALID_DIRECTIVE => "Malformed categorical_variables directive",

        ErrorCode::AGREEMENT_GENERIC => "Nodes failed to agree",
        ErrorCode::AGREEMENT_MODE_MISMATCH => "Nodes are configured with different modes",

        ErrorCode::PROTOCOL_GENERIC => "Generic protocol error",
        ErrorCode::PROTOCOL_UNEXPECTED_MESSAGE => "Received a message not valid for this phase",
        ErrorCode::PROTOCOL_INVALID_TRANSITION => "Phase transition not allowed for this role",
        ErrorCode::PROTOCOL_DECODE_FAILED => "Could not decode a wire message",
        ErrorCode::PROTOCOL_ENCODE_FAILED => "Could not encode a wire message",
        ErrorCode::PROTOCOL_MISSING_STATE => "Round state required by this phase is missing",
        ErrorCode::PROTOCOL_WRONG_CARDINALITY => "Gather returned the wrong number of messages",

        ErrorCode::TRANSPORT_GENERIC => "Generic transport error",
        ErrorCode::TRANSPORT_DISCONNECTED => "Peer channel closed",
        ErrorCode::TRANSPORT_WRONG_ROLE => "Operation not permitted for this node's role",
        ErrorCode::TRANSPORT_NOT_SET_UP => "Node identity has not been assigned",

        ErrorCode::TABLE_GENERIC => "Generic table error",
        ErrorCode::TABLE_NOT_FOUND => "Input table not found",
        ErrorCode::TABLE_CSV => "Malformed delimited file",
        ErrorCode::TABLE_UNKNOWN_COLUMN => "Column does not exist",
        ErrorCode::TABLE_NOT_CATEGORICAL => "Column cannot be treated as categorical",
        ErrorCode::TABLE_SHAPE_MISMATCH => "Tables do not have matching rows",

        ErrorCode::OTHER_GENERIC => "Unclassified error",
        ErrorCode::OTHER_IO => "I/O error",

        _ => "Unknown error code",
    }
}
