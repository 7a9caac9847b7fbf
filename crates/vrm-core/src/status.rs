use thiserror::Error;

/// Errors raised by the low-level readers in this crate.
///
/// Every variant is fatal for the parse that produced it: a truncated or
/// mistyped binary payload cannot be repaired by retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Read out of bounds: need {requested} bytes at offset {offset}, buffer has {available}")]
    OutOfBounds {
        offset: usize,
        requested: usize,
        available: usize,
    },
    #[error("Position {position} exceeds buffer length {len}")]
    InvalidPosition { position: usize, len: usize },
    #[error("Invalid text: {0}")]
    InvalidText(String),
    #[error("Unknown component type: {0}")]
    UnknownComponentType(u32),
    #[error("Unknown accessor type: {0}")]
    UnknownElementType(String),
}

impl CoreError {
    /// True for reads past the end of the buffer.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            CoreError::OutOfBounds { .. } | CoreError::InvalidPosition { .. }
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
