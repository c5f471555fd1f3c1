//! Bidirectional converters between raw bit strings and typed values.
//!
//! A [`Converter`] interprets a raw [`BitValue`] as a typed [`Value`] during
//! decoding and renders a typed value back into bits during encoding. The
//! evaluation context is passed through so converters can depend on
//! previously decoded state (an enumeration discriminator, a version field).
//!
//! The standard set covers packed integers and the small leaf types most
//! formats need: [`Unsigned`], [`Signed`], [`Ascii`], [`Flag`], and the
//! enumeration converter [`Mapped`]. All integer assembly is MSB-first.

mod errors;
pub use errors::ConvertError;

use std::collections::HashMap;

use crate::context::Context;
use crate::value::{BitValue, Value};
use crate::Result;

/// A bidirectional interpretation of raw bits.
pub trait Converter: Send + Sync {
    /// Interprets a raw bit string as a typed value.
    fn decode(&self, ctx: &dyn Context, raw: &BitValue) -> Result<Value>;

    /// Renders a typed value as a bit string of exactly `bits` bits.
    fn encode(&self, ctx: &dyn Context, value: &Value, bits: u64) -> Result<BitValue>;
}

/// Unsigned integer converter, MSB-first, up to 64 bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsigned;

impl Converter for Unsigned {
    fn decode(&self, _ctx: &dyn Context, raw: &BitValue) -> Result<Value> {
        if raw.bit_len() == 0 || raw.bit_len() > 64 {
            return Err(ConvertError::WidthUnsupported {
                bits: raw.bit_len(),
            }
            .into());
        }
        Ok(Value::UInt(raw.to_u64()?))
    }

    fn encode(&self, _ctx: &dyn Context, value: &Value, bits: u64) -> Result<BitValue> {
        if bits == 0 || bits > 64 {
            return Err(ConvertError::WidthUnsupported { bits }.into());
        }
        let v = value.as_uint().ok_or(ConvertError::TypeMismatch {
            expected: "uint",
            found: value.kind(),
        })?;
        if bits < 64 && v >= 1u64 << bits {
            return Err(ConvertError::ValueOutOfRange {
                value: v.to_string(),
                bits,
            }
            .into());
        }
        Ok(BitValue::from_u64(v, bits)?)
    }
}

/// Two's-complement signed integer converter, MSB-first, up to 64 bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Signed;

impl Converter for Signed {
    fn decode(&self, _ctx: &dyn Context, raw: &BitValue) -> Result<Value> {
        let bits = raw.bit_len();
        if bits == 0 || bits > 64 {
            return Err(ConvertError::WidthUnsupported { bits }.into());
        }
        let shift = 64 - bits;
        let extended = ((raw.to_u64()? << shift) as i64) >> shift;
        Ok(Value::Int(extended))
    }

    fn encode(&self, _ctx: &dyn Context, value: &Value, bits: u64) -> Result<BitValue> {
        if bits == 0 || bits > 64 {
            return Err(ConvertError::WidthUnsupported { bits }.into());
        }
        let v = value.as_int().ok_or(ConvertError::TypeMismatch {
            expected: "int",
            found: value.kind(),
        })?;
        if bits < 64 {
            let min = -(1i64 << (bits - 1));
            let max = (1i64 << (bits - 1)) - 1;
            if v < min || v > max {
                return Err(ConvertError::ValueOutOfRange {
                    value: v.to_string(),
                    bits,
                }
                .into());
            }
        }
        let mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
        Ok(BitValue::from_u64((v as u64) & mask, bits)?)
    }
}

/// ASCII text converter over whole bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ascii;

impl Converter for Ascii {
    fn decode(&self, _ctx: &dyn Context, raw: &BitValue) -> Result<Value> {
        if raw.bit_len() % 8 != 0 {
            return Err(ConvertError::NotByteAligned {
                bits: raw.bit_len(),
            }
            .into());
        }
        let bytes = raw.bytes();
        if !bytes.is_ascii() {
            return Err(ConvertError::NotAscii.into());
        }
        Ok(Value::Text(
            String::from_utf8(bytes.to_vec()).map_err(|_| ConvertError::NotAscii)?,
        ))
    }

    fn encode(&self, _ctx: &dyn Context, value: &Value, bits: u64) -> Result<BitValue> {
        if bits % 8 != 0 {
            return Err(ConvertError::NotByteAligned { bits }.into());
        }
        let text = value.as_text().ok_or(ConvertError::TypeMismatch {
            expected: "text",
            found: value.kind(),
        })?;
        if !text.is_ascii() {
            return Err(ConvertError::NotAscii.into());
        }
        if (text.len() as u64) * 8 != bits {
            return Err(ConvertError::ValueOutOfRange {
                value: text.to_string(),
                bits,
            }
            .into());
        }
        Ok(BitValue::new(text.as_bytes().to_vec(), bits)?)
    }
}

/// Single-bit boolean converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flag;

impl Converter for Flag {
    fn decode(&self, _ctx: &dyn Context, raw: &BitValue) -> Result<Value> {
        if raw.bit_len() != 1 {
            return Err(ConvertError::WidthUnsupported {
                bits: raw.bit_len(),
            }
            .into());
        }
        Ok(Value::Bool(raw.bit(0) == 1))
    }

    fn encode(&self, _ctx: &dyn Context, value: &Value, bits: u64) -> Result<BitValue> {
        if bits != 1 {
            return Err(ConvertError::WidthUnsupported { bits }.into());
        }
        let v = value.as_bool().ok_or(ConvertError::TypeMismatch {
            expected: "bool",
            found: value.kind(),
        })?;
        Ok(BitValue::from_u64(v as u64, 1)?)
    }
}

/// Enumeration converter: packed discriminants to and from their names.
///
/// Decodes an unsigned discriminant into its mapped name and encodes a name
/// back into its discriminant. Unknown discriminants and names are
/// conversion errors, so a field using this converter can fall back to a
/// default for out-of-profile values.
#[derive(Debug, Clone, Default)]
pub struct Mapped {
    names: HashMap<u64, String>,
    discriminants: HashMap<String, u64>,
}

impl Mapped {
    /// Builds the mapping from `(discriminant, name)` pairs.
    pub fn new<N: Into<String>>(entries: impl IntoIterator<Item = (u64, N)>) -> Self {
        let mut names = HashMap::new();
        let mut discriminants = HashMap::new();
        for (value, name) in entries {
            let name = name.into();
            names.insert(value, name.clone());
            discriminants.insert(name, value);
        }
        Self {
            names,
            discriminants,
        }
    }
}

impl Converter for Mapped {
    fn decode(&self, ctx: &dyn Context, raw: &BitValue) -> Result<Value> {
        let discriminant = match Unsigned.decode(ctx, raw)? {
            Value::UInt(v) => v,
            other => {
                return Err(ConvertError::TypeMismatch {
                    expected: "uint",
                    found: other.kind(),
                }
                .into());
            }
        };
        let name = self
            .names
            .get(&discriminant)
            .ok_or(ConvertError::UnknownDiscriminant {
                value: discriminant,
            })?;
        Ok(Value::Text(name.clone()))
    }

    fn encode(&self, ctx: &dyn Context, value: &Value, bits: u64) -> Result<BitValue> {
        let name = value.as_text().ok_or(ConvertError::TypeMismatch {
            expected: "text",
            found: value.kind(),
        })?;
        let discriminant = self
            .discriminants
            .get(name)
            .ok_or_else(|| ConvertError::UnknownName {
                name: name.to_string(),
            })?;
        Unsigned.encode(ctx, &Value::UInt(*discriminant), bits)
    }
}
