//! Declaring typed values and sections against a node.
//!
//! [`ConfigAdapter`] is the set of declarations available inside a section;
//! [`NodeAdapter`] implements it over any [`ConfigNode`]. Declarations never
//! touch the tree. They return [`Value`] and [`Section`] bindings that
//! resolve their node on first access.

use std::hash::Hash;

use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::ConfbindError;
use crate::node::ConfigNode;
use crate::scalar::Scalar;
use crate::section::Section;
use crate::value::Value;

/// Every way to declare a configuration entry under the current node.
///
/// `name` is the identifier the binding is stored under at the call site. It
/// doubles as the path segment unless the binding is given an explicit key
/// with `with_key`.
pub trait ConfigAdapter {
    type Node: ConfigNode;

    /// The node declarations resolve under.
    fn node(&self) -> &Self::Node;

    /// A value of any serde type. Stored values of the wrong shape are
    /// reported as
    /// [`ConfbindError::Deserialize`](crate::ConfbindError::Deserialize).
    fn value<T>(
        &self,
        name: &str,
        default: impl Fn() -> T + Send + Sync + 'static,
    ) -> Value<T, Self::Node>
    where
        T: Serialize + DeserializeOwned;

    /// Defaults to `""`. This and the other primitive declarations coerce
    /// stored values leniently and read their default when a stored value
    /// cannot be coerced.
    fn string(&self, name: &str) -> Value<String, Self::Node>;

    /// Defaults to `false`.
    fn boolean(&self, name: &str) -> Value<bool, Self::Node>;

    /// Defaults to `0`.
    fn int(&self, name: &str) -> Value<i32, Self::Node>;

    /// Defaults to `0`.
    fn long(&self, name: &str) -> Value<i64, Self::Node>;

    /// Defaults to `0.0`.
    fn float(&self, name: &str) -> Value<f32, Self::Node>;

    /// Defaults to `0.0`.
    fn double(&self, name: &str) -> Value<f64, Self::Node>;

    /// Defaults to an empty list.
    fn list<E>(&self, name: &str) -> Value<Vec<E>, Self::Node>
    where
        E: Serialize + DeserializeOwned + 'static;

    /// Defaults to an empty map. Entry order is kept as stored.
    fn map<K, V>(&self, name: &str) -> Value<IndexMap<K, V>, Self::Node>
    where
        K: Serialize + DeserializeOwned + Eq + Hash + 'static,
        V: Serialize + DeserializeOwned + 'static;

    /// A nested subtree. `init` runs once, on first access, with an adapter
    /// over the child node, and declares the section's contents there.
    fn section<T, F>(&self, name: &str, init: F) -> Section<T, Self::Node>
    where
        F: FnOnce(&NodeAdapter<Self::Node>) -> T + Send + 'static;
}

/// [`ConfigAdapter`] over a single node.
#[derive(Debug, Clone)]
pub struct NodeAdapter<N: ConfigNode> {
    node: N,
}

impl<N: ConfigNode> NodeAdapter<N> {
    pub fn new(node: N) -> Self {
        Self { node }
    }

    /// Run a declaration function directly against `node`.
    ///
    /// This is how a section value is derived from an existing node without
    /// going through a [`Section`] binding, e.g. for the document root.
    pub fn bind<T>(node: N, declare: impl FnOnce(&NodeAdapter<N>) -> T) -> T {
        declare(&Self::new(node))
    }

    pub fn into_node(self) -> N {
        self.node
    }

    fn scalar<S: Scalar>(&self, name: &str) -> Value<S, N> {
        Value::new(
            self.node.clone(),
            name,
            S::zero,
            |node: &N| match node.get_scalar::<S>() {
                // Typed getters fall back to the default on unusable values.
                Err(ConfbindError::Coerce {
                    path,
                    expected,
                    found,
                }) => {
                    trace!(%path, expected, %found, "config value not coercible, using default");
                    Ok(None)
                }
                other => other,
            },
            |node: &N, value: S| node.set_scalar(value),
        )
    }
}

impl<N: ConfigNode> ConfigAdapter for NodeAdapter<N> {
    type Node = N;

    fn node(&self) -> &N {
        &self.node
    }

    fn value<T>(&self, name: &str, default: impl Fn() -> T + Send + Sync + 'static) -> Value<T, N>
    where
        T: Serialize + DeserializeOwned,
    {
        Value::new(
            self.node.clone(),
            name,
            default,
            |node: &N| node.get_value::<T>(),
            |node: &N, value: T| node.set_value(&value),
        )
    }

    fn string(&self, name: &str) -> Value<String, N> {
        self.scalar(name)
    }

    fn boolean(&self, name: &str) -> Value<bool, N> {
        self.scalar(name)
    }

    fn int(&self, name: &str) -> Value<i32, N> {
        self.scalar(name)
    }

    fn long(&self, name: &str) -> Value<i64, N> {
        self.scalar(name)
    }

    fn float(&self, name: &str) -> Value<f32, N> {
        self.scalar(name)
    }

    fn double(&self, name: &str) -> Value<f64, N> {
        self.scalar(name)
    }

    fn list<E>(&self, name: &str) -> Value<Vec<E>, N>
    where
        E: Serialize + DeserializeOwned + 'static,
    {
        self.value(name, Vec::new)
    }

    fn map<K, V>(&self, name: &str) -> Value<IndexMap<K, V>, N>
    where
        K: Serialize + DeserializeOwned + Eq + Hash + 'static,
        V: Serialize + DeserializeOwned + 'static,
    {
        self.value(name, IndexMap::new)
    }

    fn section<T, F>(&self, name: &str, init: F) -> Section<T, N>
    where
        F: FnOnce(&NodeAdapter<N>) -> T + Send + 'static,
    {
        Section::new(self.node.clone(), name, init)
    }
}

/// Shorthand for [`NodeAdapter::bind`].
pub fn bind<N: ConfigNode, T>(node: N, declare: impl FnOnce(&NodeAdapter<N>) -> T) -> T {
    NodeAdapter::bind(node, declare)
}

/// Look up `segment` under `parent` and annotate it. Shared by both binding
/// kinds; callers memoize the result.
pub(crate) fn resolve_child<N: ConfigNode>(parent: &N, segment: &str, comment: Option<&str>) -> N {
    let node = parent.child(segment);
    debug!(path = %node.dotted_path(), "resolved config node");
    if let Some(comment) = comment
        && node.set_comment(comment)
    {
        debug!(path = %node.dotted_path(), "attached comment");
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TomlDocument;
    use crate::fixtures::test::{AppConfig, CountingNode, Endpoint, declare_app, declare_net};
    use crate::memory::MemoryNode;

    #[test]
    fn every_type_reads_its_default_on_empty_node() {
        let adapter = NodeAdapter::new(MemoryNode::new());
        assert_eq!(adapter.string("s").get().unwrap(), "");
        assert!(!adapter.boolean("b").get().unwrap());
        assert_eq!(adapter.int("i").get().unwrap(), 0);
        assert_eq!(adapter.long("l").get().unwrap(), 0);
        assert_eq!(adapter.float("f").get().unwrap(), 0.0);
        assert_eq!(adapter.double("d").get().unwrap(), 0.0);
        assert!(adapter.list::<String>("xs").get().unwrap().is_empty());
        assert!(adapter.map::<String, i64>("m").get().unwrap().is_empty());
        let endpoint = adapter
            .value("ep", || Endpoint {
                host: "localhost".into(),
                port: 80,
            })
            .get()
            .unwrap();
        assert_eq!(endpoint.host, "localhost");
    }

    #[test]
    fn custom_defaults_apply_when_absent() {
        let adapter = NodeAdapter::new(MemoryNode::new());
        assert_eq!(adapter.long("l").with_default(|| 7).get().unwrap(), 7);
        assert_eq!(
            adapter
                .list("xs")
                .with_default(|| vec![1_i64, 2])
                .get()
                .unwrap(),
            vec![1, 2]
        );
    }

    #[test]
    fn written_values_read_back() {
        let root = MemoryNode::new();
        let adapter = NodeAdapter::new(root.clone());

        let flag = adapter.boolean("flag");
        flag.set(true).unwrap();
        assert!(flag.get().unwrap());

        let ratio = adapter.float("ratio");
        ratio.set(0.25).unwrap();
        assert_eq!(ratio.get().unwrap(), 0.25);

        let big = adapter.long("big");
        big.set(i64::MAX).unwrap();
        assert_eq!(big.get().unwrap(), i64::MAX);

        let hosts = adapter.list::<String>("hosts");
        hosts.set(vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(hosts.get().unwrap(), vec!["a".to_string(), "b".to_string()]);

        let endpoint = Endpoint {
            host: "db".into(),
            port: 5432,
        };
        let ep = adapter.value("ep", || Endpoint {
            host: String::new(),
            port: 0,
        });
        ep.set(endpoint.clone()).unwrap();

        // A second binding over the same node sees the write.
        let again = NodeAdapter::new(root).value("ep", || Endpoint {
            host: String::new(),
            port: 0,
        });
        assert_eq!(again.get().unwrap(), endpoint);
    }

    #[test]
    fn map_keeps_insertion_order() {
        let doc = TomlDocument::new();
        let adapter = NodeAdapter::new(doc.root());
        let limits = adapter.map::<String, i64>("limits");

        let mut m = IndexMap::new();
        m.insert("zeta".to_string(), 1);
        m.insert("alpha".to_string(), 2);
        limits.set(m.clone()).unwrap();

        let read = limits.get().unwrap();
        assert_eq!(read, m);
        let keys: Vec<&String> = read.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        let rendered = doc.to_string();
        let zeta = rendered.find("zeta = 1").unwrap();
        let alpha = rendered.find("alpha = 2").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn generic_value_shape_mismatch_is_error() {
        let root = MemoryNode::from_table("ep = 3".parse().unwrap());
        let adapter = NodeAdapter::new(root);
        let ep = adapter.value("ep", || Endpoint {
            host: String::new(),
            port: 0,
        });
        assert!(matches!(ep.get(), Err(ConfbindError::Deserialize { .. })));
    }

    #[test]
    fn persistence_lives_in_the_node_not_the_binding() {
        let root = MemoryNode::new();
        let adapter = NodeAdapter::new(root.clone());

        let first = adapter.string("whoever").with_key("name").with_default(|| "anon".into());
        assert_eq!(first.get().unwrap(), "anon");
        first.set("alice".into()).unwrap();
        assert_eq!(first.get().unwrap(), "alice");

        let second = adapter.string("other").with_key("name").with_default(|| "anon".into());
        assert_eq!(second.get().unwrap(), "alice");
    }

    #[test]
    fn section_value_rederived_from_fresh_adapter() {
        let doc = TomlDocument::new();
        let adapter = NodeAdapter::new(doc.root());
        let net = adapter.section("network", declare_net).with_key("net");

        assert_eq!(net.get().unwrap().port.get().unwrap(), 8080);
        net.get().unwrap().port.set(9090).unwrap();

        let fresh = bind(doc.root().child("net"), declare_net);
        assert_eq!(fresh.port.get().unwrap(), 9090);
    }

    #[test]
    fn full_declaration_over_commented_document() {
        let doc = TomlDocument::parse("name = \"svc\"\n\n[net]\nport = 7000\n").unwrap();
        let app: AppConfig<_> = bind(doc.root(), declare_app);

        assert_eq!(app.name.get().unwrap(), "svc");
        assert_eq!(app.net.get().unwrap().port.get().unwrap(), 7000);
        assert_eq!(app.net.get().unwrap().host.get().unwrap(), "localhost");
        assert!(app.tags.get().unwrap().is_empty());

        app.tags.set(vec!["blue".into()]).unwrap();
        app.net.get().unwrap().host.set("0.0.0.0".into()).unwrap();

        let rendered = doc.to_string();
        assert!(rendered.contains("# Service name\nname = \"svc\""));
        assert!(rendered.contains("# Network settings\n[net]"));
        assert!(rendered.contains("# Bind address\nhost = \"0.0.0.0\""));
        assert!(rendered.contains("tags = [\"blue\"]"));
    }

    #[test]
    fn nested_lookups_counted_per_binding() {
        let root = CountingNode::new(true);
        let app = bind(root.clone(), declare_app);
        assert_eq!(root.lookups(), 0);

        app.net.get().unwrap().port.get().unwrap();
        app.net.get().unwrap().port.get().unwrap();
        app.net.get().unwrap().host.get().unwrap();
        // net, net.port, net.host
        assert_eq!(root.lookups(), 3);
    }

    #[test]
    fn adapter_exposes_its_node() {
        let root = MemoryNode::new().child("scope");
        let adapter = NodeAdapter::new(root.clone());
        assert_eq!(adapter.node().path(), root.path());
        assert_eq!(adapter.into_node().dotted_path(), "scope");
    }
}
