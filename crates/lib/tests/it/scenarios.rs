//! End-to-end scenarios over small formats.

use std::sync::Arc;

use bitweave::block::{
    Block, BufferBlock, ChoiceBlock, ChoiceCase, DeferredBlock, FieldBlock, FillBlock, GroupBlock,
    OffsetBlock, ProcessBlock, RepeatBlock, field, lit,
};
use bitweave::context::{Context, DecodeContext};
use bitweave::convert::{Converter, Unsigned};
use bitweave::fields::MemoryFieldTree;
use bitweave::path::NodePath;
use bitweave::stream::MemoryBitReader;
use bitweave::value::Value;

use crate::helpers::{setup_decode, setup_decode_bits, setup_encode, uint_field};

/// An 8-bit item whose name is derived from the cursor, for fills.
fn cursor_item(prefix: &'static str) -> Arc<dyn Block> {
    Arc::new(FieldBlock::new(
        Arc::new(move |ctx: &dyn Context| {
            Ok(NodePath::from(format!("{prefix}/{}", ctx.position() / 8)))
        }),
        lit(8),
        lit(Arc::new(Unsigned) as Arc<dyn Converter>),
    ))
}

#[test]
fn tagged_record_decodes_through_choice() {
    let (mut ctx, tree) = setup_decode(vec![0b0000_0010, 0b0000_1010]);
    let schema = GroupBlock::new(vec![
        uint_field("/type", 8),
        Arc::new(ChoiceBlock::new(
            field("/type"),
            vec![
                ChoiceCase::new(vec![lit(Value::UInt(1))], uint_field("/len", 8)),
                ChoiceCase::new(vec![lit(Value::UInt(2))], uint_field("/len", 8)),
            ],
        )),
    ]);
    ctx.run(&schema).unwrap();

    assert_eq!(tree.get(&NodePath::from("/type")), Some(Value::UInt(2)));
    assert_eq!(tree.get(&NodePath::from("/len")), Some(Value::UInt(10)));
    assert_eq!(ctx.position(), 16);
}

#[test]
fn window_stops_a_fill_before_the_stream_ends() {
    let (mut ctx, tree) = setup_decode(vec![0x01, 0x02, 0x03, 0x04]);
    let schema = BufferBlock::new(lit(24), Arc::new(FillBlock::new(cursor_item("/items"))));
    ctx.run(&schema).unwrap();

    // Three items fit the 24-bit window; the fourth failed the window check
    // and rolled back.
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.get(&NodePath::from("/items/0")), Some(Value::UInt(1)));
    assert_eq!(tree.get(&NodePath::from("/items/2")), Some(Value::UInt(3)));
    assert_eq!(ctx.position(), 24);
}

#[test]
fn window_underrun_is_permitted() {
    let (mut ctx, tree) = setup_decode_bits(vec![0x01, 0x02, 0xFF], 20);
    let schema = BufferBlock::new(lit(24), Arc::new(FillBlock::new(cursor_item("/items"))));
    ctx.run(&schema).unwrap();

    // The stream ran dry at bit 20, inside the window: two whole items, no
    // padding, cursor parked where the failed attempt began.
    assert_eq!(tree.len(), 2);
    assert_eq!(ctx.position(), 16);
}

#[test]
fn deferred_definition_executes_at_its_captured_site() {
    let (mut ctx, tree) = setup_decode(vec![0xAB, 0x00, 0x00]);
    let deferred = Arc::new(DeferredBlock::new(uint_field("/x", 8)));
    let schema = GroupBlock::new(vec![
        deferred.clone(),
        Arc::new(OffsetBlock::new(lit(16))),
        Arc::new(ProcessBlock::new(deferred)),
    ]);
    ctx.run(&schema).unwrap();

    assert_eq!(tree.get(&NodePath::from("/x")), Some(Value::UInt(0xAB)));
    // Deferred execution is position-neutral: the cursor ends where the
    // offset left it.
    assert_eq!(ctx.position(), 16);
}

#[test]
fn repeat_decodes_an_indexed_array() {
    let (mut ctx, tree) = setup_decode_bits(vec![0xAB, 0xC0], 12);
    let item = Arc::new(FieldBlock::new(
        Arc::new(|ctx: &dyn Context| {
            let i = ctx.get_variable("i")?.as_uint().unwrap_or(0);
            Ok(NodePath::from(format!("/a/{i}")))
        }),
        lit(4),
        lit(Arc::new(Unsigned) as Arc<dyn Converter>),
    ));
    let schema = RepeatBlock::new(
        Arc::new(|ctx: &dyn Context| Ok(ctx.get_variable("i")?.as_uint().unwrap_or(0) < 3)),
        lit("i".to_string()),
        item,
    );
    ctx.run(&schema).unwrap();

    assert_eq!(tree.get(&NodePath::from("/a/0")), Some(Value::UInt(0xA)));
    assert_eq!(tree.get(&NodePath::from("/a/1")), Some(Value::UInt(0xB)));
    assert_eq!(tree.get(&NodePath::from("/a/2")), Some(Value::UInt(0xC)));
    assert_eq!(ctx.position(), 12);
    // The index variable held nothing before the repeat and holds nothing
    // after it.
    assert!(ctx.get_variable("i").unwrap_err().is_not_found());
}

#[test]
fn encode_then_decode_round_trips() {
    let schema = GroupBlock::new(vec![uint_field("/a", 4), uint_field("/b", 4)]);

    let (mut encode, sink) = setup_encode([("/a", Value::UInt(5)), ("/b", Value::UInt(9))]);
    encode.run(&schema).unwrap();
    assert_eq!(sink.bytes(), vec![0x59]);

    let tree = MemoryFieldTree::new();
    let mut decode = DecodeContext::new(
        Box::new(MemoryBitReader::with_bit_len(sink.bytes(), sink.bit_len())),
        Box::new(tree.clone()),
    );
    decode.run(&schema).unwrap();

    assert_eq!(tree.get(&NodePath::from("/a")), Some(Value::UInt(5)));
    assert_eq!(tree.get(&NodePath::from("/b")), Some(Value::UInt(9)));
}

#[test]
fn window_overflow_rolls_back_the_enclosing_transaction() {
    let (mut ctx, _) = setup_decode(vec![0xAB, 0xCD]);
    let schema = BufferBlock::new(
        lit(8),
        Arc::new(GroupBlock::new(vec![uint_field("/x", 8), uint_field("/y", 1)])),
    );

    let mut txn = ctx.begin_transaction().unwrap();
    let err = schema.process(&mut ctx).unwrap_err();
    assert!(err.is_out_of_window());
    // The first field is bound until the transaction unwinds it.
    assert!(ctx.get_field_mapping(&NodePath::from("/x")).is_ok());
    txn.rollback().unwrap();

    assert!(ctx.get_field_mapping(&NodePath::from("/x")).unwrap_err().is_not_found());
    assert_eq!(ctx.position(), 0);
}
