//! Error taxonomy: parameter / resource / system.
//!
//! Each layer gets its own `thiserror` enum, composed into `DispatchError`
//! at the dispatcher boundary via `#[from]`.

use thiserror::Error;

/// One `(parameter, message)` violation, as accumulated by the validation
/// layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamError {
    pub parameter: String,
    pub message: String,
}

impl ParamError {
    pub fn new(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        ParamError {
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.parameter, self.message)
    }
}

/// Faults raised by the matching engine itself. These should never occur in
/// practice — they guard invariants that admission is supposed to uphold —
/// but are propagated rather than `unwrap`-ed so a bug here degrades to a
/// system error instead of a panic.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("order {0} not found in the book store")]
    OrderNotFound(u64),
    #[error("internal engine invariant violated: {0}")]
    Internal(String),
}

/// Faults from the persistence collaborator.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("parity-db error: {0}")]
    Db(#[from] parity_db::Error),
    #[error("bincode encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("bincode decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// The three-way taxonomy assembled at the dispatcher boundary.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("parameter error")]
    Parameter(Vec<ParamError>),
    #[error("resource error: {0}")]
    Resource(String),
    #[error("system error: {0}")]
    System(String),
}

impl From<EngineError> for DispatchError {
    fn from(e: EngineError) -> Self {
        DispatchError::System(format!("EngineError: {e}"))
    }
}

impl From<PersistError> for DispatchError {
    fn from(e: PersistError) -> Self {
        DispatchError::Resource(format!("PersistError: {e}"))
    }
}

impl DispatchError {
    /// Renders the envelope the way a caller should display it: parameter
    /// errors join every `(parameter, message)` pair on its own line.
    pub fn render(&self) -> String {
        match self {
            DispatchError::Parameter(errs) => errs
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
            DispatchError::Resource(msg) => msg.clone(),
            DispatchError::System(msg) => msg.clone(),
        }
    }
}
