//! An in-memory node store without comment support.

use std::sync::Arc;

use parking_lot::RwLock;
use toml::{Table, Value};

use crate::error::ConfbindError;
use crate::node::ConfigNode;

/// A node over a shared [`toml::Table`].
///
/// Clones share the same tree. Comments are not supported, so
/// [`set_comment`](ConfigNode::set_comment) is a no-op.
#[derive(Debug, Clone, Default)]
pub struct MemoryNode {
    root: Arc<RwLock<Table>>,
    path: Vec<String>,
}

impl MemoryNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: Table) -> Self {
        Self {
            root: Arc::new(RwLock::new(table)),
            path: Vec::new(),
        }
    }

    /// A copy of the whole tree, regardless of which node this is.
    pub fn snapshot(&self) -> Table {
        self.root.read().clone()
    }
}

impl ConfigNode for MemoryNode {
    fn child(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.push(name.to_string());
        Self {
            root: Arc::clone(&self.root),
            path,
        }
    }

    fn path(&self) -> &[String] {
        &self.path
    }

    fn raw_value(&self) -> Result<Option<Value>, ConfbindError> {
        let guard = self.root.read();
        let Some((leaf, parents)) = self.path.split_last() else {
            return Ok(Some(Value::Table(guard.clone())));
        };

        let mut current: &Table = &guard;
        for (depth, segment) in parents.iter().enumerate() {
            current = match current.get(segment) {
                None => return Ok(None),
                Some(Value::Table(t)) => t,
                Some(_) => {
                    return Err(ConfbindError::NotATable {
                        path: parents[..=depth].join("."),
                    });
                }
            };
        }
        Ok(current.get(leaf).cloned())
    }

    fn set_raw_value(&self, value: Value) -> Result<(), ConfbindError> {
        let mut guard = self.root.write();
        let Some((leaf, parents)) = self.path.split_last() else {
            return match value {
                Value::Table(t) => {
                    *guard = t;
                    Ok(())
                }
                _ => Err(ConfbindError::NotATable {
                    path: self.dotted_path(),
                }),
            };
        };

        let mut current: &mut Table = &mut guard;
        for (depth, segment) in parents.iter().enumerate() {
            let entry = current
                .entry(segment.clone())
                .or_insert(Value::Table(Table::new()));
            current = match entry {
                Value::Table(t) => t,
                _ => {
                    return Err(ConfbindError::NotATable {
                        path: parents[..=depth].join("."),
                    });
                }
            };
        }
        current.insert(leaf.clone(), value);
        Ok(())
    }
}
