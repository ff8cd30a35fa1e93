use secp256k1::Error as SecpError;
use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ConnectionError,
    ProtocolViolation,
    FairnessViolation,
    DoubleSignAttempt,
    CapacityExceeded,
    Timeout,
    SessionAborted,
    InvalidInput,
    InvalidSignature,
    InvalidSigningIndex,
    InvariantViolation,
    InvalidStateTransition,
    InvalidAddress,
    LedgerError,
    WalletError,
    InsufficientFunds,
    ConfigError,
    SerializationError,
    EncodingError,
    MessageTooLarge,
    CryptoError,
    StorageError,
    Message,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum MixError {
    // === Round-fatal protocol errors ===
    #[error("connection error during {operation}: {details}")]
    ConnectionError { operation: String, details: String },

    #[error("protocol violation from participant {index:?}: {details}")]
    ProtocolViolation { index: Option<usize>, details: String },

    #[error("fairness violation: {details}")]
    FairnessViolation { details: String },

    #[error("double sign attempt for signing index {index}")]
    DoubleSignAttempt { index: usize },

    /// Admission refused; the running round is unaffected.
    #[error("capacity exceeded: {admitted} of {capacity} slots already taken")]
    CapacityExceeded { admitted: usize, capacity: usize },

    #[error("timed out waiting for {phase} after {timeout_secs}s")]
    Timeout { phase: String, timeout_secs: u64 },

    #[error("session aborted: {reason}")]
    SessionAborted { reason: String },

    // === Validation ===
    #[error("invalid input from participant {index}: {details}")]
    InvalidInput { index: usize, details: String },

    #[error("invalid signature for input {input_index}")]
    InvalidSignature { input_index: usize },

    #[error("invalid signing index: {index} (inputs {inputs})")]
    InvalidSigningIndex { index: usize, inputs: usize },

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    // === Ledger / wallet ===
    #[error("ledger error during {operation}: {details}")]
    LedgerError { operation: String, details: String },

    #[error("wallet error during {operation}: {details}")]
    WalletError { operation: String, details: String },

    #[error("no spendable output of at least {amount}")]
    InsufficientFunds { amount: u64 },

    // === Ambient ===
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("message too large: {size} exceeds max {max}")]
    MessageTooLarge { size: usize, max: usize },

    #[error("crypto error during {operation}: {details}")]
    CryptoError { operation: String, details: String },

    #[error("storage error during {operation}: {details}")]
    StorageError { operation: String, details: String },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, MixError>;

impl MixError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MixError::ConnectionError { .. } => ErrorCode::ConnectionError,
            MixError::ProtocolViolation { .. } => ErrorCode::ProtocolViolation,
            MixError::FairnessViolation { .. } => ErrorCode::FairnessViolation,
            MixError::DoubleSignAttempt { .. } => ErrorCode::DoubleSignAttempt,
            MixError::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            MixError::Timeout { .. } => ErrorCode::Timeout,
            MixError::SessionAborted { .. } => ErrorCode::SessionAborted,
            MixError::InvalidInput { .. } => ErrorCode::InvalidInput,
            MixError::InvalidSignature { .. } => ErrorCode::InvalidSignature,
            MixError::InvalidSigningIndex { .. } => ErrorCode::InvalidSigningIndex,
            MixError::InvariantViolation(_) => ErrorCode::InvariantViolation,
            MixError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            MixError::InvalidAddress(_) => ErrorCode::InvalidAddress,
            MixError::LedgerError { .. } => ErrorCode::LedgerError,
            MixError::WalletError { .. } => ErrorCode::WalletError,
            MixError::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
            MixError::ConfigError(_) => ErrorCode::ConfigError,
            MixError::SerializationError { .. } => ErrorCode::SerializationError,
            MixError::EncodingError(_) => ErrorCode::EncodingError,
            MixError::MessageTooLarge { .. } => ErrorCode::MessageTooLarge,
            MixError::CryptoError { .. } => ErrorCode::CryptoError,
            MixError::StorageError { .. } => ErrorCode::StorageError,
            MixError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    /// Whether the error tears down the whole round.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MixError::CapacityExceeded { .. })
    }

    pub fn connection(operation: impl Into<String>, details: impl ToString) -> Self {
        MixError::ConnectionError { operation: operation.into(), details: details.to_string() }
    }

    pub fn protocol(index: Option<usize>, details: impl Into<String>) -> Self {
        MixError::ProtocolViolation { index, details: details.into() }
    }

    pub fn fairness(details: impl Into<String>) -> Self {
        MixError::FairnessViolation { details: details.into() }
    }

    pub fn ledger(operation: impl Into<String>, details: impl ToString) -> Self {
        MixError::LedgerError { operation: operation.into(), details: details.to_string() }
    }

    pub fn wallet(operation: impl Into<String>, details: impl ToString) -> Self {
        MixError::WalletError { operation: operation.into(), details: details.to_string() }
    }
}

impl From<hex::FromHexError> for MixError {
    fn from(err: hex::FromHexError) -> Self {
        MixError::EncodingError(format!("hex decode error: {}", err))
    }
}

impl From<toml::de::Error> for MixError {
    fn from(err: toml::de::Error) -> Self {
        MixError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<figment::Error> for MixError {
    fn from(err: figment::Error) -> Self {
        MixError::ConfigError(err.to_string())
    }
}

impl From<bincode::Error> for MixError {
    fn from(err: bincode::Error) -> Self {
        MixError::SerializationError { format: "bincode".to_string(), details: err.to_string() }
    }
}

#[macro_export]
macro_rules! storage_err {
    ($op:expr, $err:expr) => {
        $crate::foundation::MixError::StorageError { operation: $op.into(), details: $err.to_string() }
    };
}

#[macro_export]
macro_rules! serde_err {
    ($fmt:expr, $err:expr) => {
        $crate::foundation::MixError::SerializationError { format: $fmt.into(), details: $err.to_string() }
    };
}

impl From<io::Error> for MixError {
    fn from(err: io::Error) -> Self {
        MixError::StorageError { operation: "io".to_string(), details: err.to_string() }
    }
}

impl From<serde_json::Error> for MixError {
    fn from(err: serde_json::Error) -> Self {
        MixError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

impl From<SecpError> for MixError {
    fn from(err: SecpError) -> Self {
        MixError::CryptoError { operation: "secp256k1".to_string(), details: err.to_string() }
    }
}

// NOTE: io errors on sockets must be mapped with `MixError::connection` at the call site;
// the blanket `From<io::Error>` is for file access only.
