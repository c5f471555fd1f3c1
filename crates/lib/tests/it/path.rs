//! Tests for the logical path algebra.

use bitweave::path::NodePath;

#[test]
fn normalize_is_idempotent_over_many_inputs() {
    let inputs = [
        "", ".", "..", "/", "//", "/.", "/..", "a", "/a", "./a", "a/.", "a/..", "a/../b",
        "/a/b/../c", "x/y/z/../../../w", "../../a", "/a//b///c", "a/b/c/..",
    ];
    for raw in inputs {
        let once = NodePath::from(raw);
        assert_eq!(NodePath::from(once.as_str()), once, "input {raw:?}");
    }
}

#[test]
fn normalize_worked_examples() {
    assert_eq!(NodePath::from("/a/b/../c").as_str(), "/a/c");
    assert_eq!(NodePath::from("./a").as_str(), "a");
    assert_eq!(NodePath::from("/").as_str(), "/");
    assert_eq!(NodePath::from("").as_str(), ".");
}

#[test]
fn combine_absoluteness_laws() {
    let cases = [
        ("/a", "/b"),
        ("/a", "b"),
        ("a", "/b"),
        ("a", "b"),
        ("/", "x/y"),
        (".", ".."),
    ];
    for (left, right) in cases {
        let a = NodePath::from(left);
        let b = NodePath::from(right);
        let combined = a.combine(&b);
        assert_eq!(
            combined.is_absolute(),
            b.is_absolute() || a.is_absolute(),
            "{left} / {right}"
        );
    }
    // An absolute right operand replaces the left entirely.
    assert_eq!(
        NodePath::from("/deep/tree").combine(&NodePath::root()),
        NodePath::root()
    );
}

#[test]
fn comparison_orders_by_segments() {
    let mut paths = vec![
        NodePath::from("/b"),
        NodePath::from("/a/b"),
        NodePath::from("/a"),
        NodePath::from("/ab"),
    ];
    paths.sort_by(|a, b| a.try_cmp(b).unwrap());
    let sorted: Vec<&str> = paths.iter().map(NodePath::as_str).collect();
    assert_eq!(sorted, vec!["/a", "/a/b", "/ab", "/b"]);
}

#[test]
fn cross_kind_comparison_fails() {
    assert!(NodePath::from("/a").try_cmp(&NodePath::from("a")).is_err());
    assert!(
        NodePath::from("/a")
            .relative_to(&NodePath::from("a"))
            .is_err()
    );
}

#[test]
fn relative_to_inverts_combine() {
    let from = NodePath::from("/pkt/header/flags");
    let to = NodePath::from("/pkt/payload");
    let rel = from.relative_to(&to).unwrap();
    assert_eq!(rel.as_str(), "../../payload");
    assert_eq!(from.combine(&rel), to);
}
