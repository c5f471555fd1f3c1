//! Schema compilation specific errors

use thiserror::Error;

/// Errors that can occur while compiling a block description.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A process entry names a deferred block that was not defined before
    /// it.
    #[error("no deferred block named '{name}' defined before this point")]
    UnknownDeferred { name: String },

    /// Two deferred blocks share a name.
    #[error("deferred block name '{name}' is already taken")]
    DuplicateDeferred { name: String },

    /// A path template has an unterminated `{` placeholder.
    #[error("unterminated placeholder in path template '{template}'")]
    UnterminatedPlaceholder { template: String },
}
