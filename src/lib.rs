//! Typed, lazily-resolved bindings over hierarchical configuration trees.
//!
//! Declare what a section of configuration looks like, once, as ordinary
//! Rust:
//!
//! ```ignore
//! struct Net<N: ConfigNode> {
//!     host: Value<String, N>,
//!     port: Value<i32, N>,
//! }
//!
//! fn net<N: ConfigNode>(a: &NodeAdapter<N>) -> Net<N> {
//!     Net {
//!         host: a.string("host").with_default(|| "localhost".into()),
//!         port: a.int("port").with_comment("Listen port").with_default(|| 8080),
//!     }
//! }
//!
//! let doc: TomlDocument = std::fs::read_to_string("app.toml")?.parse()?;
//! let net = bind(doc.root().child("net"), net);
//! let port = net.port.get()?;
//! net.port.set(port + 1)?;
//! std::fs::write("app.toml", doc.to_string())?;
//! ```
//!
//! Each field is a handle, not a copy: reads and writes go straight to the
//! shared tree, so two bindings over the same path always agree.
//!
//! # Bindings are lazy
//!
//! Declaring a binding does no lookups. On the first [`Value::get`] or
//! [`Value::set`] the binding resolves its node under the parent (by its
//! explicit key if it has one, otherwise by its name), attaches its comment
//! if the node supports comments, and caches the node. Resolution happens
//! exactly once per binding, including under concurrent first access.
//!
//! Reading a value that is not stored returns the binding's default. The
//! default is never written back, so an untouched config file stays
//! untouched.
//!
//! # Sections
//!
//! [`ConfigAdapter::section`] maps a subtree onto any type. Its `init`
//! function receives a [`NodeAdapter`] over the child node and declares the
//! section's own values and sub-sections against it. `init` runs once, on
//! first access, and its result is cached. Sections nest to any depth.
//!
//! # Nodes
//!
//! Bindings work against anything implementing [`ConfigNode`]. Two stores
//! are provided:
//!
//! - [`TomlDocument`] keeps a `toml_edit` document. Existing formatting and
//!   comments survive edits, and binding comments render as `#` lines above
//!   keys and table headers.
//! - [`MemoryNode`] keeps a plain `toml::Table` and ignores comments.
//!
//! # Typed access
//!
//! The `string`, `boolean`, `int`, `long`, `float` and `double` declarations
//! coerce leniently (`"8080"` reads as an integer, `"yes"` as `true`); see
//! [`Scalar`]. A stored value they cannot coerce reads as the default.
//! [`ConfigAdapter::value`], `list` and `map` go through serde, accept exactly
//! what the type deserializes from, and report anything else as an error.
//!
//! # Error handling
//!
//! Every access returns [`ConfbindError`]. Store errors (values that do not
//! deserialize into a generic binding's type, paths that run through a
//! scalar) propagate unchanged. With the `rich-errors` feature the error
//! also implements `miette::Diagnostic`.
//!
//! # Logging
//!
//! Node resolution, comment attachment and section initialization are
//! reported through `tracing` at `debug` level; individual reads and writes
//! at `trace`. The crate never installs a subscriber.

pub mod error;
pub mod scalar;

mod adapter;
mod convert;
mod document;
mod memory;
mod node;
mod section;
mod value;

#[cfg(test)]
mod fixtures;

pub use adapter::{ConfigAdapter, NodeAdapter, bind};
pub use document::{TomlDocument, TomlNode};
pub use error::ConfbindError;
pub use memory::MemoryNode;
pub use node::ConfigNode;
pub use scalar::Scalar;
pub use section::Section;
pub use value::Value;
