//! Value bindings: lazily-resolved read/write handles onto one entry.

use std::fmt;

use once_cell::sync::OnceCell;
use tracing::trace;

use crate::adapter::resolve_child;
use crate::error::ConfbindError;
use crate::node::ConfigNode;

pub(crate) type ReadFn<T, N> = fn(&N) -> Result<Option<T>, ConfbindError>;
pub(crate) type WriteFn<T, N> = fn(&N, T) -> Result<(), ConfbindError>;

/// A typed handle onto one scalar, list, map or generic entry.
///
/// Nothing is looked up until the first [`get`](Self::get) or
/// [`set`](Self::set). At that point the backing node is resolved under the
/// parent node, by [`key`](Self::with_key) if one was given and by the
/// binding name otherwise, the comment (if any) is attached, and the node is
/// cached for the lifetime of the binding. Resolution happens exactly once,
/// even when several threads race on the first access.
///
/// `with_key`, `with_comment` and `with_default` are meant to be chained on
/// the declaration; changing the key or comment of a binding that has
/// already resolved does not move or re-annotate its node.
pub struct Value<T, N: ConfigNode> {
    parent: N,
    name: String,
    key: Option<String>,
    comment: Option<String>,
    default: Box<dyn Fn() -> T + Send + Sync>,
    read: ReadFn<T, N>,
    write: WriteFn<T, N>,
    node: OnceCell<N>,
}

impl<T, N: ConfigNode> Value<T, N> {
    pub(crate) fn new(
        parent: N,
        name: &str,
        default: impl Fn() -> T + Send + Sync + 'static,
        read: ReadFn<T, N>,
        write: WriteFn<T, N>,
    ) -> Self {
        Self {
            parent,
            name: name.to_string(),
            key: None,
            comment: None,
            default: Box::new(default),
            read,
            write,
            node: OnceCell::new(),
        }
    }

    /// Look the node up by `key` instead of the binding name.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Supplier used when the node holds no value. Called on every such read.
    pub fn with_default(mut self, default: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.default = Box::new(default);
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

    /// The path segment this binding resolves: the key, else the name.
    pub fn segment(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    /// The backing node, once resolved.
    pub fn node(&self) -> Option<&N> {
        self.node.get()
    }

    pub fn default_value(&self) -> T {
        (self.default)()
    }

    /// Read the stored value, or the default when nothing is stored.
    pub fn get(&self) -> Result<T, ConfbindError> {
        let node = self.backing()?;
        match (self.read)(node)? {
            Some(value) => {
                trace!(path = %node.dotted_path(), "read config value");
                Ok(value)
            }
            None => {
                trace!(path = %node.dotted_path(), "config value absent, using default");
                Ok(self.default_value())
            }
        }
    }

    pub fn set(&self, value: T) -> Result<(), ConfbindError> {
        let node = self.backing()?;
        trace!(path = %node.dotted_path(), "write config value");
        (self.write)(node, value)
    }

    fn backing(&self) -> Result<&N, ConfbindError> {
        self.node.get_or_init(|| {
            resolve_child(&self.parent, self.segment(), self.comment.as_deref())
        });
        self.node
            .get()
            .ok_or_else(|| ConfbindError::Uninitialized {
                key: self.segment().to_string(),
            })
    }
}

impl<T, N: ConfigNode + fmt::Debug> fmt::Debug for Value<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("comment", &self.comment)
            .field("node", &self.node.get())
            .finish_non_exhaustive()
    }
}
