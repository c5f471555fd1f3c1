//! Converter specific errors

use thiserror::Error;

/// Errors reported by value converters.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The bit width is outside what the converter can handle.
    #[error("converter does not support a width of {bits} bits")]
    WidthUnsupported { bits: u64 },

    /// The typed value has the wrong variant for this converter.
    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The typed value does not fit in the requested width.
    #[error("value {value} does not fit in {bits} bits")]
    ValueOutOfRange { value: String, bits: u64 },

    /// Text conversion needs whole bytes.
    #[error("width of {bits} bits is not byte aligned")]
    NotByteAligned { bits: u64 },

    /// The payload is not ASCII text.
    #[error("payload is not ASCII text")]
    NotAscii,

    /// No name is mapped to the decoded discriminant.
    #[error("no mapping for discriminant {value}")]
    UnknownDiscriminant { value: u64 },

    /// No discriminant is mapped to the encoded name.
    #[error("no mapping for name '{name}'")]
    UnknownName { name: String },
}

impl ConvertError {
    /// Check if this error indicates a value/width mismatch rather than an
    /// unsupported conversion.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, ConvertError::ValueOutOfRange { .. })
    }
}
