//! Tests for block combinators driven through full runs.

use std::sync::Arc;

use bitweave::block::{BufferBlock, FillBlock, GroupBlock, lit};
use bitweave::context::Context;
use bitweave::path::NodePath;
use bitweave::value::Value;

use crate::helpers::{setup_decode, setup_encode, uint_field};

#[test]
fn run_commits_on_success() {
    let (mut ctx, tree) = setup_decode(vec![0x12, 0x34]);
    let schema = GroupBlock::new(vec![uint_field("/a", 8), uint_field("/b", 8)]);
    ctx.run(&schema).unwrap();

    assert_eq!(tree.get(&NodePath::from("/a")), Some(Value::UInt(0x12)));
    assert_eq!(tree.get(&NodePath::from("/b")), Some(Value::UInt(0x34)));
}

#[test]
fn run_rolls_back_on_failure() {
    let (mut ctx, tree) = setup_decode(vec![0x12]);
    let schema = GroupBlock::new(vec![uint_field("/a", 8), uint_field("/b", 8)]);
    let err = ctx.run(&schema).unwrap_err();
    assert!(err.is_stream_error());

    // Nothing reached the sink and the context is back at its start state.
    assert!(tree.is_empty());
    assert!(ctx.mappings().is_empty());
    assert_eq!(ctx.position(), 0);
}

#[test]
fn run_flushes_fill_iterations_that_committed() {
    let (mut ctx, tree) = setup_decode(vec![0x01, 0x02, 0x03]);
    let item = Arc::new(bitweave::block::FieldBlock::new(
        Arc::new(|ctx: &dyn Context| Ok(NodePath::from(format!("/item/{}", ctx.position() / 8)))),
        lit(8),
        lit(Arc::new(bitweave::convert::Unsigned) as Arc<dyn bitweave::convert::Converter>),
    ));
    let schema = FillBlock::new(item);
    ctx.run(&schema).unwrap();

    assert_eq!(tree.len(), 3);
    assert_eq!(tree.get(&NodePath::from("/item/2")), Some(Value::UInt(3)));
}

#[test]
fn buffer_failure_aborts_the_whole_run() {
    let (mut ctx, tree) = setup_decode(vec![0xAB, 0xCD]);
    let schema = BufferBlock::new(
        lit(8),
        Arc::new(GroupBlock::new(vec![uint_field("/x", 8), uint_field("/y", 1)])),
    );
    let err = ctx.run(&schema).unwrap_err();
    assert!(err.is_out_of_window());
    assert!(tree.is_empty());
    assert!(ctx.mappings().is_empty());
}

#[test]
fn encode_run_writes_the_stream() {
    let (mut ctx, sink) = setup_encode([("/hi", Value::UInt(0x5)), ("/lo", Value::UInt(0x9))]);
    let schema = GroupBlock::new(vec![uint_field("/hi", 4), uint_field("/lo", 4)]);
    ctx.run(&schema).unwrap();
    assert_eq!(sink.bytes(), vec![0x59]);
}

#[test]
fn encode_run_failure_leaves_the_sink_untouched() {
    let (mut ctx, sink) = setup_encode([("/hi", Value::UInt(0x5))]);
    let schema = GroupBlock::new(vec![uint_field("/hi", 4), uint_field("/missing", 4)]);
    let err = ctx.run(&schema).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(sink.bit_len(), 0);
}
