//! Coding context specific errors

use thiserror::Error;

/// Errors raised by coding contexts.
///
/// The argument variants indicate programmer error in the block description
/// (a malformed field path, a zero width, a blank variable name) and are
/// distinguished from data errors by [`ContextError::is_argument_error`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ContextError {
    /// A move or field binding would leave the buffered window.
    #[error("position {position} is outside the {length}-bit window")]
    PositionOutOfWindow { position: i64, length: u64 },

    /// Field paths must be absolute.
    #[error("field path must be absolute: {path}")]
    FieldPathNotAbsolute { path: String },

    /// Field paths must name a node below the root.
    #[error("field path must not be the root")]
    FieldPathIsRoot,

    /// Field widths must be positive.
    #[error("field {path} has a width of zero bits")]
    ZeroWidthField { path: String },

    /// Variable names must contain a non-whitespace character.
    #[error("variable name is blank")]
    BlankVariableName,
}

impl ContextError {
    /// Check if this error indicates an invalid argument rather than bad
    /// data in the stream or tree.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            ContextError::FieldPathNotAbsolute { .. }
                | ContextError::FieldPathIsRoot
                | ContextError::ZeroWidthField { .. }
                | ContextError::BlankVariableName
        )
    }
}
