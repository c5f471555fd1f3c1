//! Tests for transaction handle composition.

use std::cell::RefCell;
use std::rc::Rc;

use bitweave::Transaction;

#[test]
fn resolution_is_idempotent_in_every_order() {
    let commits = Rc::new(RefCell::new(0));
    let rollbacks = Rc::new(RefCell::new(0));
    let finalizes = Rc::new(RefCell::new(0));

    let c = Rc::clone(&commits);
    let r = Rc::clone(&rollbacks);
    let f = Rc::clone(&finalizes);
    let mut txn = Transaction::new()
        .on_commit(move || {
            *c.borrow_mut() += 1;
            Ok(())
        })
        .on_rollback(move || {
            *r.borrow_mut() += 1;
            Ok(())
        })
        .on_finalize(move || {
            *f.borrow_mut() += 1;
            Ok(())
        });

    txn.commit().unwrap();
    txn.commit().unwrap();
    txn.rollback().unwrap();
    drop(txn);

    assert_eq!(*commits.borrow(), 1);
    assert_eq!(*rollbacks.borrow(), 0);
    assert_eq!(*finalizes.borrow(), 1);
}

#[test]
fn parent_resolution_drives_grandchildren() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));

    let push = |label: &str| {
        let log = Rc::clone(&log);
        let label = label.to_string();
        move || {
            log.borrow_mut().push(label);
            Ok(())
        }
    };

    let leaf = Transaction::new().on_commit(push("leaf"));
    let mut middle = Transaction::new().on_commit(push("middle"));
    middle.register(leaf);
    let mut root = Transaction::new().on_commit(push("root"));
    root.register(middle);

    root.commit().unwrap();
    assert_eq!(*log.borrow(), vec!["root", "middle", "leaf"]);
}
