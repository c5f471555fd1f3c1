//! The multi-way dispatch combinator.

use std::sync::Arc;

use crate::context::Context;
use crate::value::Value;
use crate::Result;

use super::{Block, BlockId, Expr, eval};

/// One arm of a [`ChoiceBlock`]: a list of test values guarding a body.
pub struct ChoiceCase {
    tests: Vec<Expr<Value>>,
    body: Arc<dyn Block>,
}

impl ChoiceCase {
    /// Creates a case whose body runs when any test value equals the switch
    /// value.
    pub fn new(tests: Vec<Expr<Value>>, body: Arc<dyn Block>) -> Self {
        Self { tests, body }
    }
}

/// Dispatches on a late-bound switch value.
///
/// The switch expression is evaluated once, then the cases are walked in
/// list order. Every case with a structurally equal test value runs; the
/// walk does not stop at the first match, so several cases can fire in one
/// pass. The first error from a body aborts the walk.
pub struct ChoiceBlock {
    id: BlockId,
    switch: Expr<Value>,
    cases: Vec<ChoiceCase>,
}

impl ChoiceBlock {
    /// Creates a choice over `cases`.
    pub fn new(switch: Expr<Value>, cases: Vec<ChoiceCase>) -> Self {
        Self {
            id: BlockId::next(),
            switch,
            cases,
        }
    }
}

impl Block for ChoiceBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        let switch = eval(&self.switch, &*ctx)?;
        for case in &self.cases {
            let mut matched = false;
            for test in &case.tests {
                if eval(test, &*ctx)? == switch {
                    matched = true;
                    break;
                }
            }
            if matched {
                case.body.process(ctx)?;
            }
        }
        Ok(())
    }
}
