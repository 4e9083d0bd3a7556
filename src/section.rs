//! Section bindings: nested subtrees mapped onto caller-defined types.

use std::fmt;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::debug;

use crate::adapter::{NodeAdapter, resolve_child};
use crate::error::ConfbindError;
use crate::node::ConfigNode;

type InitFn<T, N> = Box<dyn FnOnce(&NodeAdapter<N>) -> T + Send>;

/// A lazily-built view of a child subtree.
///
/// On first access the child node is resolved (by key, else by name), the
/// comment is attached, and `init` runs once against a fresh
/// [`NodeAdapter`] over the child. The value it returns is cached; `init`
/// never runs again.
pub struct Section<T, N: ConfigNode> {
    parent: N,
    name: String,
    key: Option<String>,
    comment: Option<String>,
    init: Mutex<Option<InitFn<T, N>>>,
    node: OnceCell<N>,
    value: OnceCell<T>,
}

impl<T, N: ConfigNode> Section<T, N> {
    pub(crate) fn new(
        parent: N,
        name: &str,
        init: impl FnOnce(&NodeAdapter<N>) -> T + Send + 'static,
    ) -> Self {
        Self {
            parent,
            name: name.to_string(),
            key: None,
            comment: None,
            init: Mutex::new(Some(Box::new(init))),
            node: OnceCell::new(),
            value: OnceCell::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn segment(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    /// The section's node, once resolved.
    pub fn node(&self) -> Option<&N> {
        self.node.get()
    }

    /// The section value, built on first call.
    ///
    /// Fails with [`ConfbindError::Uninitialized`] only if an earlier call
    /// panicked inside `init`, leaving nothing to build the value from.
    pub fn get(&self) -> Result<&T, ConfbindError> {
        self.value.get_or_try_init(|| {
            let node = self.node.get_or_init(|| {
                resolve_child(&self.parent, self.segment(), self.comment.as_deref())
            });
            let init = self
                .init
                .lock()
                .take()
                .ok_or_else(|| ConfbindError::Uninitialized {
                    key: self.segment().to_string(),
                })?;
            debug!(path = %node.dotted_path(), "initializing config section");
            Ok(init(&NodeAdapter::new(node.clone())))
        })
    }

    pub fn into_inner(self) -> Result<T, ConfbindError> {
        self.get()?;
        let key = self.segment().to_string();
        self.value
            .into_inner()
            .ok_or(ConfbindError::Uninitialized { key })
    }
}

impl<T: fmt::Debug, N: ConfigNode + fmt::Debug> fmt::Debug for Section<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("comment", &self.comment)
            .field("node", &self.node.get())
            .field("value", &self.value.get())
            .finish_non_exhaustive()
    }
}
