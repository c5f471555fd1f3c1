use std::sync::Arc;

use bitweave::block::{Block, BlockId, FieldBlock, lit};
use bitweave::context::{Context, DecodeContext, EncodeContext};
use bitweave::convert::{Converter, Unsigned};
use bitweave::fields::{FieldMapping, MemoryFieldTree};
use bitweave::path::NodePath;
use bitweave::stream::{MemoryBitReader, MemoryBitWriter};
use bitweave::value::Value;

/// Creates a decoding context over `bytes`, returning the shared sink tree
/// for inspection after commits.
pub fn setup_decode(bytes: Vec<u8>) -> (DecodeContext, MemoryFieldTree) {
    let tree = MemoryFieldTree::new();
    let ctx = DecodeContext::new(
        Box::new(MemoryBitReader::from_bytes(bytes)),
        Box::new(tree.clone()),
    );
    (ctx, tree)
}

/// Creates a decoding context over the first `bit_len` bits of `bytes`.
pub fn setup_decode_bits(bytes: Vec<u8>, bit_len: u64) -> (DecodeContext, MemoryFieldTree) {
    let tree = MemoryFieldTree::new();
    let ctx = DecodeContext::new(
        Box::new(MemoryBitReader::with_bit_len(bytes, bit_len)),
        Box::new(tree.clone()),
    );
    (ctx, tree)
}

/// Creates an encoding context over a source tree built from `entries`,
/// returning the shared bit sink for inspection after commits.
pub fn setup_encode(
    entries: impl IntoIterator<Item = (&'static str, Value)>,
) -> (EncodeContext, MemoryBitWriter) {
    let source = MemoryFieldTree::from_entries(
        entries
            .into_iter()
            .map(|(path, value)| (NodePath::from(path), value)),
    );
    let sink = MemoryBitWriter::new();
    let ctx = EncodeContext::new(Box::new(sink.clone()), Box::new(source));
    (ctx, sink)
}

/// A fixed-path unsigned field of `bits` bits.
pub fn uint_field(path: &str, bits: u64) -> Arc<dyn Block> {
    Arc::new(FieldBlock::new(
        lit(NodePath::from(path)),
        lit(bits),
        lit(Arc::new(Unsigned) as Arc<dyn Converter>),
    ))
}

/// An unsigned field whose last path segment is the value of variable `var`.
pub fn indexed_uint_field(prefix: &'static str, var: &'static str, bits: u64) -> Arc<dyn Block> {
    Arc::new(FieldBlock::new(
        Arc::new(move |ctx: &dyn Context| {
            let index = ctx.get_variable(var)?.as_uint().unwrap_or(0);
            Ok(NodePath::from(format!("{prefix}/{index}")))
        }),
        lit(bits),
        lit(Arc::new(Unsigned) as Arc<dyn Converter>),
    ))
}

/// The complete observable state of a decoding context, for bit-for-bit
/// before/after comparisons around transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Observed {
    pub path: NodePath,
    pub position: u64,
    pub mappings: Vec<FieldMapping>,
    pub variables: Vec<(String, Value)>,
    pub scratch: Vec<BlockId>,
}

pub fn observe(ctx: &DecodeContext) -> Observed {
    Observed {
        path: ctx.path(),
        position: ctx.position(),
        mappings: ctx.mappings(),
        variables: ctx.variables(),
        scratch: ctx.scratch_keys(),
    }
}
