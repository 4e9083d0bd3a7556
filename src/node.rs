//! The node abstraction bindings resolve against.
//!
//! A node is a positional handle: a path of segments from the root of a
//! shared, mutable tree. Looking up a child never touches the tree, so the
//! child may not exist yet. Values are read and written through the
//! dynamically-typed [`toml::Value`] representation; the typed getters and
//! setters are provided on top of that.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ConfbindError;
use crate::scalar::Scalar;

/// An addressable point in a hierarchical configuration tree.
pub trait ConfigNode: Clone + Send + Sync + 'static {
    /// Create-or-return the child addressed by `name`.
    fn child(&self, name: &str) -> Self;

    /// Segments from the root. Empty for the root itself.
    fn path(&self) -> &[String];

    /// The raw value held at this node, or `None` if nothing is stored.
    fn raw_value(&self) -> Result<Option<toml::Value>, ConfbindError>;

    /// Overwrite the value at this node, creating parent tables as needed.
    fn set_raw_value(&self, value: toml::Value) -> Result<(), ConfbindError>;

    /// Attach a comment to this node.
    ///
    /// Returns `false` when the node kind does not support comments, in which
    /// case the call does nothing.
    fn set_comment(&self, _comment: &str) -> bool {
        false
    }

    /// Dotted form of [`path`](Self::path), used in errors and logs.
    fn dotted_path(&self) -> String {
        if self.path().is_empty() {
            "<root>".to_string()
        } else {
            self.path().join(".")
        }
    }

    /// Read the value as `T`. A stored value of the wrong shape is an error.
    fn get_value<T: DeserializeOwned>(&self) -> Result<Option<T>, ConfbindError> {
        match self.raw_value()? {
            Some(raw) => raw
                .try_into()
                .map(Some)
                .map_err(|source| ConfbindError::Deserialize {
                    path: self.dotted_path(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn set_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), ConfbindError> {
        let raw = toml::Value::try_from(value).map_err(|source| ConfbindError::Serialize {
            path: self.dotted_path(),
            source,
        })?;
        self.set_raw_value(raw)
    }

    /// Read a primitive, applying the lenient [`Scalar`] coercions.
    fn get_scalar<S: Scalar>(&self) -> Result<Option<S>, ConfbindError> {
        match self.raw_value()? {
            Some(raw) => match S::coerce(&raw) {
                Some(v) => Ok(Some(v)),
                None => Err(ConfbindError::Coerce {
                    path: self.dotted_path(),
                    expected: S::TYPE_NAME,
                    found: raw.to_string(),
                }),
            },
            None => Ok(None),
        }
    }

    fn set_scalar<S: Scalar>(&self, value: S) -> Result<(), ConfbindError> {
        self.set_raw_value(value.into_raw())
    }
}
