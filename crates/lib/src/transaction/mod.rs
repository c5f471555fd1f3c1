//! Transaction handles for atomic multi-layer state changes.
//!
//! A [`Transaction`] bundles the three callbacks of one reversible scope:
//! `rollback` undoes staged changes, `commit` makes them permanent, and
//! `finalize` runs after either outcome. A transaction starts in rollback
//! mode: dropping it unresolved rolls it back, and only an explicit
//! [`Transaction::commit`] makes the staged changes stick.
//!
//! Transactions compose. A coding context snapshots several independent state
//! layers at once (variables, field map, scratch, deferred writers, cursor)
//! and registers each layer's transaction as a child of a single outer
//! handle, so committing or rolling back the outer handle deterministically
//! resolves every layer.

mod errors;
pub use errors::TransactionError;

use tracing::debug;

use crate::Result;

type Action = Box<dyn FnOnce() -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Committed,
    RolledBack,
}

/// A disposable handle over one atomic scope of staged state changes.
///
/// Resolution is idempotent: committing twice is a no-op, rolling back after
/// a commit is a no-op, and dropping an already-resolved transaction does
/// nothing. Dropping an open transaction rolls it back.
#[derive(Default)]
pub struct Transaction {
    on_rollback: Vec<Action>,
    on_commit: Vec<Action>,
    on_finalize: Vec<Action>,
    children: Vec<Transaction>,
    resolution: Option<Resolution>,
}

impl Transaction {
    /// Creates an empty transaction with no actions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an action to run when this transaction rolls back.
    pub fn on_rollback(mut self, action: impl FnOnce() -> Result<()> + 'static) -> Self {
        self.on_rollback.push(Box::new(action));
        self
    }

    /// Adds an action to run when this transaction commits.
    pub fn on_commit(mut self, action: impl FnOnce() -> Result<()> + 'static) -> Self {
        self.on_commit.push(Box::new(action));
        self
    }

    /// Adds an action to run after the transaction resolves either way.
    pub fn on_finalize(mut self, action: impl FnOnce() -> Result<()> + 'static) -> Self {
        self.on_finalize.push(Box::new(action));
        self
    }

    /// Registers a sub-transaction driven by this one.
    ///
    /// Children commit in registration order and roll back in reverse
    /// registration order.
    pub fn register(&mut self, child: Transaction) {
        self.children.push(child);
    }

    /// Returns `true` while the transaction is neither committed nor rolled
    /// back.
    pub fn is_open(&self) -> bool {
        self.resolution.is_none()
    }

    /// Returns `true` once the transaction has committed.
    pub fn is_committed(&self) -> bool {
        self.resolution == Some(Resolution::Committed)
    }

    /// Makes the staged changes permanent.
    ///
    /// Runs this transaction's commit actions, then commits every child in
    /// registration order, then finalizes. Committing an already-committed
    /// transaction is a no-op; committing after a rollback is an error.
    pub fn commit(&mut self) -> Result<()> {
        match self.resolution {
            Some(Resolution::Committed) => return Ok(()),
            Some(Resolution::RolledBack) => {
                return Err(TransactionError::AlreadyRolledBack.into());
            }
            None => {}
        }
        self.resolution = Some(Resolution::Committed);

        let mut first_error = None;
        for action in self.on_commit.drain(..) {
            if let Err(err) = action() {
                first_error.get_or_insert(err);
            }
        }
        for child in &mut self.children {
            if let Err(err) = child.commit() {
                first_error.get_or_insert(err);
            }
        }
        self.finalize(&mut first_error);

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Undoes the staged changes.
    ///
    /// Rolls back every child in reverse registration order, then runs this
    /// transaction's rollback actions, then finalizes. All actions run even
    /// if one fails; the first error is returned. Rolling back after a
    /// commit, or twice, is a no-op.
    pub fn rollback(&mut self) -> Result<()> {
        if self.resolution.is_some() {
            return Ok(());
        }
        self.resolution = Some(Resolution::RolledBack);

        let mut first_error = None;
        for child in self.children.iter_mut().rev() {
            if let Err(err) = child.rollback() {
                first_error.get_or_insert(err);
            }
        }
        for action in self.on_rollback.drain(..) {
            if let Err(err) = action() {
                first_error.get_or_insert(err);
            }
        }
        self.finalize(&mut first_error);

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn finalize(&mut self, first_error: &mut Option<crate::Error>) {
        for action in self.on_finalize.drain(..) {
            if let Err(err) = action() {
                first_error.get_or_insert(err);
            }
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(err) = self.rollback() {
                debug!("rollback during transaction drop failed: {err}");
            }
        }
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("rollback_actions", &self.on_rollback.len())
            .field("commit_actions", &self.on_commit.len())
            .field("finalize_actions", &self.on_finalize.len())
            .field("children", &self.children)
            .field("resolution", &self.resolution)
            .finish()
    }
}
