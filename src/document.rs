//! A commented TOML store backed by `toml_edit`.
//!
//! [`TomlDocument`] is a cloneable handle onto one shared document.
//! [`TomlNode`]s address positions in it and support comments, which are
//! rendered as `#` lines above the key (for values) or the table header
//! (for sections). Formatting and comments already present in a parsed
//! document are preserved across writes.
//!
//! A comment set on a node that has no value yet is remembered and applied
//! as soon as something is written there.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use toml_edit::{DocumentMut, InlineTable, Item, Table};

use crate::convert;
use crate::error::ConfbindError;
use crate::node::ConfigNode;

#[derive(Debug, Default)]
struct Inner {
    doc: DocumentMut,
    comments: HashMap<Vec<String>, String>,
}

impl Inner {
    fn apply_pending_comments(&mut self) {
        let root = self.doc.as_table_mut();
        for (path, comment) in &self.comments {
            apply_comment(root, path, comment);
        }
    }
}

/// Shared handle to a TOML document.
#[derive(Debug, Clone, Default)]
pub struct TomlDocument {
    inner: Arc<RwLock<Inner>>,
}

impl TomlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML string, keeping its formatting and comments.
    pub fn parse(content: &str) -> Result<Self, ConfbindError> {
        let doc: DocumentMut = content.parse()?;
        Ok(Self {
            inner: Arc::new(RwLock::new(Inner {
                doc,
                comments: HashMap::new(),
            })),
        })
    }

    pub fn root(&self) -> TomlNode {
        TomlNode {
            doc: self.clone(),
            path: Vec::new(),
        }
    }
}

impl FromStr for TomlDocument {
    type Err = ConfbindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TomlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.read().doc)
    }
}

/// A position in a [`TomlDocument`].
#[derive(Debug, Clone)]
pub struct TomlNode {
    doc: TomlDocument,
    path: Vec<String>,
}

impl TomlNode {
    pub fn document(&self) -> &TomlDocument {
        &self.doc
    }

    /// The comment last set on this node through [`ConfigNode::set_comment`].
    pub fn comment(&self) -> Option<String> {
        self.doc.inner.read().comments.get(&self.path).cloned()
    }
}

impl ConfigNode for TomlNode {
    fn child(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.push(name.to_string());
        Self {
            doc: self.doc.clone(),
            path,
        }
    }

    fn path(&self) -> &[String] {
        &self.path
    }

    fn raw_value(&self) -> Result<Option<toml::Value>, ConfbindError> {
        let inner = self.doc.inner.read();
        let Some((leaf, parents)) = self.path.split_last() else {
            return Ok(Some(toml::Value::Table(convert::from_edit_table(
                inner.doc.as_table(),
            ))));
        };

        let mut current: &Item = inner.doc.as_item();
        for (depth, segment) in parents.iter().enumerate() {
            current = match current.get(segment.as_str()) {
                None => return Ok(None),
                Some(item) if item.is_table_like() => item,
                Some(_) => {
                    return Err(ConfbindError::NotATable {
                        path: parents[..=depth].join("."),
                    });
                }
            };
        }
        Ok(current
            .get(leaf.as_str())
            .and_then(convert::from_edit_item))
    }

    fn set_raw_value(&self, value: toml::Value) -> Result<(), ConfbindError> {
        let mut guard = self.doc.inner.write();
        let inner = &mut *guard;

        let Some((leaf, parents)) = self.path.split_last() else {
            let toml::Value::Table(table) = value else {
                return Err(ConfbindError::NotATable {
                    path: self.dotted_path(),
                });
            };
            *inner.doc.as_table_mut() = convert::to_edit_table(&table);
            inner.apply_pending_comments();
            return Ok(());
        };

        let mut current: &mut Item = inner.doc.as_item_mut();
        for (depth, segment) in parents.iter().enumerate() {
            let segment = segment.as_str();
            match current.get(segment) {
                Some(item) if item.is_table_like() => {}
                Some(_) => {
                    return Err(ConfbindError::NotATable {
                        path: parents[..=depth].join("."),
                    });
                }
                None => {
                    // Inline tables can only nest inline tables.
                    let table = if current.is_inline_table() {
                        Item::Value(toml_edit::Value::InlineTable(InlineTable::new()))
                    } else {
                        Item::Table(Table::new())
                    };
                    current[segment] = table;
                }
            }
            current = &mut current[segment];
        }

        let leaf = leaf.as_str();
        let existing_decor = match current.get(leaf) {
            Some(Item::Table(t)) => Some(t.decor().clone()),
            _ => None,
        };
        let item = match (existing_decor, value) {
            (Some(decor), toml::Value::Table(table)) => {
                let mut table = convert::to_edit_table(&table);
                *table.decor_mut() = decor;
                Item::Table(table)
            }
            (_, value) => Item::Value(convert::to_edit_value(&value)),
        };
        current[leaf] = item;

        inner.apply_pending_comments();
        Ok(())
    }

    /// The document root cannot carry a comment; every other node can.
    fn set_comment(&self, comment: &str) -> bool {
        if self.path.is_empty() {
            return false;
        }
        let mut guard = self.doc.inner.write();
        let inner = &mut *guard;
        inner.comments.insert(self.path.clone(), comment.to_string());
        apply_comment(inner.doc.as_table_mut(), &self.path, comment);
        true
    }
}

/// `# `-prefix every line of a comment.
fn render_comment(comment: &str) -> String {
    comment
        .lines()
        .map(|line| {
            if line.is_empty() {
                "#\n".to_string()
            } else {
                format!("# {line}\n")
            }
        })
        .collect()
}

/// Whether `path` names an entry reachable through standard tables only.
fn is_commentable(root: &Table, path: &[String]) -> bool {
    let Some((leaf, parents)) = path.split_last() else {
        return false;
    };
    let mut current = root;
    for segment in parents {
        current = match current.get(segment).and_then(Item::as_table) {
            Some(t) => t,
            None => return false,
        };
    }
    current.contains_key(leaf)
}

/// Write `comment` into the decor of the entry at `path`, if it exists.
/// Entries inside inline tables cannot carry comments and are skipped.
///
/// Implicit tables (`[a.b]` with no `[a]`) and dotted tables (`a.b = 1`)
/// render no header of their own, so any such table on the path is made
/// standard first.
fn apply_comment(root: &mut Table, path: &[String], comment: &str) {
    if !is_commentable(root, path) {
        return;
    }
    let Some((leaf, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        current = match current.get_mut(segment).and_then(Item::as_table_mut) {
            Some(t) => t,
            None => return,
        };
        current.set_implicit(false);
        current.set_dotted(false);
    }

    let is_table = match current.get(leaf) {
        Some(item) => item.is_table(),
        None => return,
    };
    let prefix = render_comment(comment);
    if is_table {
        if let Some(t) = current.get_mut(leaf).and_then(Item::as_table_mut) {
            t.set_implicit(false);
            t.set_dotted(false);
            t.decor_mut().set_prefix(prefix);
        }
    } else if let Some(mut key) = current.key_mut(leaf) {
        key.leaf_decor_mut().set_prefix(prefix);
    }
}
