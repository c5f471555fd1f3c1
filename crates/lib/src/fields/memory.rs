//! In-memory logical field tree.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::path::NodePath;
use crate::value::Value;
use crate::Result;

use super::{FieldError, FieldRead, FieldWrite};

/// An in-memory field tree keyed by absolute path.
///
/// Handles are cheap clones over one shared mapping, so a caller can hand
/// one handle to a coding context and keep another for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryFieldTree {
    entries: Rc<RefCell<HashMap<NodePath, Value>>>,
}

impl MemoryFieldTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree pre-populated from `(path, value)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (NodePath, Value)>) -> Self {
        Self {
            entries: Rc::new(RefCell::new(entries.into_iter().collect())),
        }
    }

    /// Looks a path up, cloning the value out.
    pub fn get(&self, path: &NodePath) -> Option<Value> {
        self.entries.borrow().get(path).cloned()
    }

    /// Number of bound fields.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if no field is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Clones the entries out, sorted by path for stable inspection.
    pub fn entries(&self) -> Vec<(NodePath, Value)> {
        let mut entries: Vec<_> = self
            .entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        entries
    }
}

impl FieldRead for MemoryFieldTree {
    fn read_field(&self, path: &NodePath) -> Result<Value> {
        self.get(path).ok_or_else(|| {
            FieldError::NotFound {
                path: path.to_string(),
            }
            .into()
        })
    }
}

impl FieldWrite for MemoryFieldTree {
    fn write_field(&mut self, path: &NodePath, value: Value) -> Result<()> {
        self.entries.borrow_mut().insert(path.clone(), value);
        Ok(())
    }
}
