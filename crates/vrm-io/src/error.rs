use std::io;

use thiserror::Error;
use vrm_core::status::CoreError;

/// Errors that can occur when reading VRM files.
///
/// All of these abort the whole import; no partial document is returned.
/// The license checkpoint is deliberately not represented here, see
/// [`crate::license::LicenseStatus`].
#[derive(Error, Debug)]
pub enum VrmError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid GLB: {0}")]
    InvalidGlb(String),

    #[error("Invalid glTF: {0}")]
    InvalidGltf(String),

    #[error("Unknown accessor type: {0}")]
    UnknownAccessorType(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    #[error("Out of bounds: {0}")]
    OutOfBounds(CoreError),

    #[error("Decode error: {0}")]
    Decode(CoreError),
}

impl VrmError {
    /// True for malformed or unsupported content, as opposed to I/O failures
    /// and truncated payloads.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            VrmError::Json(_)
                | VrmError::InvalidGlb(_)
                | VrmError::InvalidGltf(_)
                | VrmError::UnknownAccessorType(_)
                | VrmError::Unsupported(_)
                | VrmError::Decode(_)
        )
    }

    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, VrmError::OutOfBounds(_))
    }
}

impl From<CoreError> for VrmError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownElementType(tag) => VrmError::UnknownAccessorType(tag),
            err if err.is_out_of_bounds() => VrmError::OutOfBounds(err),
            err => VrmError::Decode(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, VrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let oob: VrmError = CoreError::OutOfBounds {
            offset: 0,
            requested: 4,
            available: 0,
        }
        .into();
        assert!(oob.is_out_of_bounds());
        assert!(!oob.is_format_error());

        let unknown: VrmError = CoreError::UnknownElementType("VEC7".into()).into();
        assert!(matches!(unknown, VrmError::UnknownAccessorType(ref t) if t == "VEC7"));
        assert!(unknown.is_format_error());

        let text: VrmError = CoreError::InvalidText("bad".into()).into();
        assert!(matches!(text, VrmError::Decode(_)));
    }
}
