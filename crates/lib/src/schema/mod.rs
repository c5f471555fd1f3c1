//! Declarative block descriptions.
//!
//! A [`BlockDef`] is the serializable form of a codec description: a plain
//! data tree that can live in a JSON or TOML file and be compiled into the
//! executable [`Block`] tree with [`compile`]. Late-bound parameters are
//! expressed as tagged expression values ([`ValueExprDef`], [`WidthDef`],
//! [`CondDef`]) instead of closures, and paths are templates where
//! `{name}` substitutes the variable `name` at processing time.
//!
//! Deferred definitions are connected by name: a `Deferred` entry labels its
//! capture, and a later `Process` entry referring to the same label executes
//! it. Labels resolve in pre-order, so the deferred definition must appear
//! before the process entry that runs it.
//!
//! ```
//! use bitweave::schema::{BlockDef, compile};
//!
//! let def: BlockDef = serde_json::from_str(
//!     r#"{
//!         "group": { "children": [
//!             { "field": { "path": "/len", "width": 8, "converter": "unsigned" } },
//!             { "field": { "path": "/body", "width": { "field": "/len" },
//!                          "converter": "unsigned" } }
//!         ] }
//!     }"#,
//! )?;
//! let schema = compile(&def)?;
//! # let _ = schema;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod errors;
pub use errors::SchemaError;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::block::{
    Block, BlockError, BufferBlock, ChoiceBlock, ChoiceCase, ConditionalBlock,
    ConditionalElseBlock, ContainerBlock, DeferredBlock, Expr, FieldBlock, FillBlock, GroupBlock,
    OffsetBlock, ProcessBlock, RepeatBlock, lit, var,
};
use crate::context::Context;
use crate::convert::{Ascii, Converter, Flag, Mapped, Signed, Unsigned};
use crate::path::NodePath;
use crate::value::Value;
use crate::Result;

/// The serializable form of a block tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockDef {
    /// A field leaf.
    Field {
        path: String,
        width: WidthDef,
        converter: ConverterDef,
        #[serde(default)]
        default: Option<Value>,
    },
    /// An ordered sequence.
    Group { children: Vec<BlockDef> },
    /// A cursor move.
    Offset { bits: i64 },
    /// A path re-root around its inner block.
    Container { path: String, inner: Box<BlockDef> },
    /// A bounded window around its inner block.
    Buffer {
        length: WidthDef,
        inner: Box<BlockDef>,
    },
    /// A conditional with an optional else arm.
    Conditional {
        condition: CondDef,
        inner: Box<BlockDef>,
        #[serde(default)]
        otherwise: Option<Box<BlockDef>>,
    },
    /// A multi-way dispatch; every matching case runs.
    Choice {
        switch: ValueExprDef,
        cases: Vec<CaseDef>,
    },
    /// A counted repetition exposing `index` as a variable.
    Repeat {
        count: WidthDef,
        index: String,
        inner: Box<BlockDef>,
    },
    /// Repeat-until-error.
    Fill { inner: Box<BlockDef> },
    /// A named deferred definition.
    Deferred { name: String, inner: Box<BlockDef> },
    /// Executes the deferred definition labeled `name`.
    Process { name: String },
}

/// One arm of a choice description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDef {
    pub values: Vec<Value>,
    pub body: BlockDef,
}

/// A late-bound typed value: a literal, a variable read, or a field read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueExprDef {
    Var { var: String },
    Field { field: String },
    Lit(Value),
}

/// A late-bound bit width: a literal, a variable read, or a field read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidthDef {
    Lit(u64),
    Var { var: String },
    Field { field: String },
}

/// A late-bound condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CondDef {
    /// A constant condition.
    Always { value: bool },
    /// A comparison between two late-bound values.
    Compare {
        left: ValueExprDef,
        op: CompareOp,
        right: ValueExprDef,
    },
}

/// Comparison operators for [`CondDef::Compare`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// The standard converters by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterDef {
    Unsigned,
    Signed,
    Ascii,
    Flag,
    /// Enumeration mapping from names to discriminants.
    Mapped { entries: HashMap<String, u64> },
}

/// Compiles a description into an executable block tree.
pub fn compile(def: &BlockDef) -> Result<Arc<dyn Block>> {
    let mut deferred = HashMap::new();
    compile_block(def, &mut deferred)
}

fn compile_block(
    def: &BlockDef,
    deferred: &mut HashMap<String, Arc<DeferredBlock>>,
) -> Result<Arc<dyn Block>> {
    Ok(match def {
        BlockDef::Field {
            path,
            width,
            converter,
            default,
        } => Arc::new(
            FieldBlock::new(
                compile_path(path)?,
                compile_width(width),
                lit(compile_converter(converter)),
            )
            .with_default(lit(default.clone())),
        ),
        BlockDef::Group { children } => {
            let children = children
                .iter()
                .map(|child| compile_block(child, deferred))
                .collect::<Result<Vec<_>>>()?;
            Arc::new(GroupBlock::new(children))
        }
        BlockDef::Offset { bits } => Arc::new(OffsetBlock::new(lit(*bits))),
        BlockDef::Container { path, inner } => Arc::new(ContainerBlock::new(
            compile_path(path)?,
            compile_block(inner, deferred)?,
        )),
        BlockDef::Buffer { length, inner } => Arc::new(BufferBlock::new(
            compile_width(length),
            compile_block(inner, deferred)?,
        )),
        BlockDef::Conditional {
            condition,
            inner,
            otherwise,
        } => {
            let condition = compile_cond(condition);
            let inner = compile_block(inner, deferred)?;
            match otherwise {
                Some(otherwise) => Arc::new(ConditionalElseBlock::new(
                    condition,
                    inner,
                    compile_block(otherwise, deferred)?,
                )),
                None => Arc::new(ConditionalBlock::new(condition, inner)),
            }
        }
        BlockDef::Choice { switch, cases } => {
            let cases = cases
                .iter()
                .map(|case| {
                    let tests = case.values.iter().cloned().map(lit).collect();
                    Ok(ChoiceCase::new(tests, compile_block(&case.body, deferred)?))
                })
                .collect::<Result<Vec<_>>>()?;
            Arc::new(ChoiceBlock::new(compile_value(switch), cases))
        }
        BlockDef::Repeat {
            count,
            index,
            inner,
        } => {
            let count = compile_width(count);
            let index_name = index.clone();
            let condition: Expr<bool> = Arc::new(move |ctx: &dyn Context| {
                let index = ctx.get_variable(&index_name)?.as_uint().unwrap_or(0);
                Ok(index < count.as_ref()(ctx)?)
            });
            Arc::new(RepeatBlock::new(
                condition,
                lit(index.clone()),
                compile_block(inner, deferred)?,
            ))
        }
        BlockDef::Fill { inner } => Arc::new(FillBlock::new(compile_block(inner, deferred)?)),
        BlockDef::Deferred { name, inner } => {
            if deferred.contains_key(name) {
                return Err(SchemaError::DuplicateDeferred { name: name.clone() }.into());
            }
            let block = Arc::new(DeferredBlock::new(compile_block(inner, deferred)?));
            deferred.insert(name.clone(), block.clone());
            block
        }
        BlockDef::Process { name } => {
            let target = deferred
                .get(name)
                .ok_or_else(|| SchemaError::UnknownDeferred { name: name.clone() })?;
            Arc::new(ProcessBlock::new(target.clone()))
        }
    })
}

/// Compiles a path template into an expression.
///
/// A template without placeholders becomes a constant; `{name}` segments are
/// substituted from variables at processing time.
fn compile_path(template: &str) -> Result<Expr<NodePath>> {
    if !template.contains('{') {
        return Ok(lit(NodePath::from(template)));
    }
    // Validate the template once at compile time.
    for piece in template.split('{').skip(1) {
        if !piece.contains('}') {
            return Err(SchemaError::UnterminatedPlaceholder {
                template: template.to_string(),
            }
            .into());
        }
    }
    let template = template.to_string();
    Ok(Arc::new(move |ctx: &dyn Context| {
        let mut rendered = String::with_capacity(template.len());
        let mut rest = template.as_str();
        while let Some(open) = rest.find('{') {
            rendered.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            // Validated at compile time; the fallback keeps this total.
            let Some(close) = after.find('}') else {
                rest = after;
                break;
            };
            let name = &after[..close];
            let value = ctx.get_variable(name)?;
            rendered.push_str(&value.to_string());
            rest = &after[close + 1..];
        }
        rendered.push_str(rest);
        Ok(NodePath::from(rendered))
    }))
}

fn compile_value(def: &ValueExprDef) -> Expr<Value> {
    match def {
        ValueExprDef::Lit(value) => lit(value.clone()),
        ValueExprDef::Var { var: name } => var(name.clone()),
        ValueExprDef::Field { field } => crate::block::field(field.as_str()),
    }
}

fn compile_width(def: &WidthDef) -> Expr<u64> {
    let value = match def {
        WidthDef::Lit(width) => return lit(*width),
        WidthDef::Var { var: name } => compile_value(&ValueExprDef::Var { var: name.clone() }),
        WidthDef::Field { field } => compile_value(&ValueExprDef::Field {
            field: field.clone(),
        }),
    };
    Arc::new(move |ctx: &dyn Context| {
        let value = value.as_ref()(ctx)?;
        value.as_uint().ok_or_else(|| {
            crate::convert::ConvertError::TypeMismatch {
                expected: "uint",
                found: value.kind(),
            }
            .into()
        })
    })
}

fn compile_cond(def: &CondDef) -> Expr<bool> {
    match def {
        CondDef::Always { value } => lit(*value),
        CondDef::Compare { left, op, right } => {
            let left = compile_value(left);
            let right = compile_value(right);
            let op = *op;
            Arc::new(move |ctx: &dyn Context| {
                let left = left.as_ref()(ctx)?;
                let right = right.as_ref()(ctx)?;
                compare(&left, op, &right)
            })
        }
    }
}

fn compare(left: &Value, op: CompareOp, right: &Value) -> Result<bool> {
    // Equality is structural and defined for every pair of kinds.
    match op {
        CompareOp::Eq => return Ok(left == right),
        CompareOp::Ne => return Ok(left != right),
        _ => {}
    }

    let ordering = match (left, right) {
        (Value::UInt(l), Value::UInt(r)) => l.cmp(r),
        (Value::Int(l), Value::Int(r)) => l.cmp(r),
        (Value::UInt(l), Value::Int(r)) => (*l as i128).cmp(&(*r as i128)),
        (Value::Int(l), Value::UInt(r)) => (*l as i128).cmp(&(*r as i128)),
        (Value::Text(l), Value::Text(r)) => l.cmp(r),
        _ => {
            return Err(BlockError::IncomparableValues {
                left: left.kind().to_string(),
                right: right.kind().to_string(),
            }
            .into());
        }
    };

    Ok(match op {
        CompareOp::Lt => ordering.is_lt(),
        CompareOp::Le => ordering.is_le(),
        CompareOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    })
}

fn compile_converter(def: &ConverterDef) -> Arc<dyn Converter> {
    match def {
        ConverterDef::Unsigned => Arc::new(Unsigned),
        ConverterDef::Signed => Arc::new(Signed),
        ConverterDef::Ascii => Arc::new(Ascii),
        ConverterDef::Flag => Arc::new(Flag),
        ConverterDef::Mapped { entries } => Arc::new(Mapped::new(
            entries.iter().map(|(name, value)| (*value, name.clone())),
        )),
    }
}
