//! Tests for context state layering and rollback fidelity.

use std::sync::Arc;

use bitweave::block::{
    Block, BufferBlock, ChoiceBlock, ChoiceCase, ConditionalBlock, ConditionalElseBlock,
    ContainerBlock, DeferredBlock, FillBlock, GroupBlock, OffsetBlock, ProcessBlock, RepeatBlock,
    lit,
};
use bitweave::context::{Context, EncodeContext};
use bitweave::fields::MemoryFieldTree;
use bitweave::path::NodePath;
use bitweave::stream::MemoryBitWriter;
use bitweave::value::Value;

use crate::helpers::{indexed_uint_field, observe, setup_decode, uint_field};

/// Builds one schema of every combinator for the fidelity sweep.
fn sample_schemas() -> Vec<(&'static str, Arc<dyn Block>)> {
    let deferred = Arc::new(DeferredBlock::new(uint_field("/deferred", 8)));
    vec![
        ("field", uint_field("/f", 8)),
        (
            "group",
            Arc::new(GroupBlock::new(vec![uint_field("/a", 4), uint_field("/b", 4)])),
        ),
        ("offset", Arc::new(OffsetBlock::new(lit(5)))),
        (
            "container",
            Arc::new(ContainerBlock::new(
                lit(NodePath::from("/nested")),
                uint_field("/c", 8),
            )),
        ),
        ("buffer", Arc::new(BufferBlock::new(lit(8), uint_field("/w", 8)))),
        (
            "conditional",
            Arc::new(ConditionalBlock::new(lit(true), uint_field("/t", 8))),
        ),
        (
            "conditional-else",
            Arc::new(ConditionalElseBlock::new(
                lit(false),
                uint_field("/t", 8),
                uint_field("/e", 8),
            )),
        ),
        (
            "choice",
            Arc::new(ChoiceBlock::new(
                lit(Value::UInt(1)),
                vec![ChoiceCase::new(vec![lit(Value::UInt(1))], uint_field("/c1", 8))],
            )),
        ),
        (
            "repeat",
            Arc::new(RepeatBlock::new(
                Arc::new(|ctx: &dyn Context| {
                    Ok(ctx.get_variable("i")?.as_uint().unwrap_or(0) < 2)
                }),
                lit("i".to_string()),
                indexed_uint_field("/r", "i", 4),
            )),
        ),
        ("fill", Arc::new(FillBlock::new(uint_field("/fill", 64)))),
        (
            "deferred-and-process",
            Arc::new(GroupBlock::new(vec![
                deferred.clone(),
                Arc::new(OffsetBlock::new(lit(8))),
                Arc::new(ProcessBlock::new(deferred)),
            ])),
        ),
    ]
}

#[test]
fn rollback_restores_observable_state_for_every_block() {
    for (name, schema) in sample_schemas() {
        let (mut ctx, tree) = setup_decode(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        ctx.set_variable("seed", Value::UInt(1)).unwrap();
        ctx.change_path(&NodePath::from("/origin")).unwrap();

        let before = observe(&ctx);
        let mut txn = ctx.begin_transaction().unwrap();
        // Some schemas fail against this stream; fidelity must hold anyway.
        let _ = schema.process(&mut ctx);
        txn.rollback().unwrap();

        assert_eq!(observe(&ctx), before, "block {name} broke rollback fidelity");
        assert!(tree.is_empty(), "block {name} leaked into the sink");
    }
}

#[test]
fn committed_layers_survive_and_flush() {
    let (mut ctx, tree) = setup_decode(vec![0x2A]);
    let mut txn = ctx.begin_transaction().unwrap();
    ctx.set_variable("n", Value::UInt(1)).unwrap();
    uint_field("/x", 8).process(&mut ctx).unwrap();
    txn.commit().unwrap();

    assert_eq!(ctx.get_variable("n").unwrap(), Value::UInt(1));
    assert_eq!(tree.get(&NodePath::from("/x")), Some(Value::UInt(0x2A)));
    assert_eq!(ctx.position(), 8);
}

#[test]
fn inner_commit_is_contained_by_outer_rollback() {
    let (mut ctx, tree) = setup_decode(vec![0x2A, 0x3B]);

    let mut outer = ctx.begin_transaction().unwrap();
    {
        let mut inner = ctx.begin_transaction().unwrap();
        uint_field("/kept-then-dropped", 8).process(&mut ctx).unwrap();
        inner.commit().unwrap();
    }
    assert_eq!(ctx.mappings().len(), 1);
    outer.rollback().unwrap();

    assert!(ctx.mappings().is_empty());
    assert_eq!(ctx.position(), 0);
    assert!(tree.is_empty());
}

#[test]
fn encode_rollback_restores_cursor_and_queue() {
    let source = MemoryFieldTree::from_entries([
        (NodePath::from("/a"), Value::UInt(3)),
        (NodePath::from("/b"), Value::UInt(5)),
    ]);
    let sink = MemoryBitWriter::new();
    let mut ctx = EncodeContext::new(Box::new(sink.clone()), Box::new(source));

    let mut txn = ctx.begin_transaction().unwrap();
    uint_field("/a", 4).process(&mut ctx).unwrap();
    uint_field("/b", 4).process(&mut ctx).unwrap();
    assert_eq!(ctx.position(), 8);
    txn.rollback().unwrap();

    assert_eq!(ctx.position(), 0);
    assert!(ctx.mappings().is_empty());
    assert_eq!(sink.bit_len(), 0);

    // The same fields can be encoded again afterwards.
    let mut txn = ctx.begin_transaction().unwrap();
    uint_field("/a", 4).process(&mut ctx).unwrap();
    txn.commit().unwrap();
    assert_eq!(sink.bytes(), vec![0b0011_0000]);
}
