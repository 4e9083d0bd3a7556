#[cfg(test)]
pub mod test {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use serde::{Deserialize, Serialize};

    use crate::adapter::{ConfigAdapter, NodeAdapter};
    use crate::error::ConfbindError;
    use crate::memory::MemoryNode;
    use crate::node::ConfigNode;
    use crate::section::Section;
    use crate::value::Value;

    // -- Counting test double ---------------------------------------------------

    #[derive(Debug, Default)]
    struct Counters {
        lookups: AtomicUsize,
        comments: Mutex<Vec<(String, String)>>,
    }

    /// A [`MemoryNode`] that counts child lookups and records comments.
    ///
    /// Counters are shared by every node derived from the same root.
    #[derive(Debug, Clone)]
    pub struct CountingNode {
        inner: MemoryNode,
        counters: Arc<Counters>,
        commentable: bool,
    }

    impl CountingNode {
        pub fn new(commentable: bool) -> Self {
            Self {
                inner: MemoryNode::new(),
                counters: Arc::default(),
                commentable,
            }
        }

        pub fn lookups(&self) -> usize {
            self.counters.lookups.load(Ordering::SeqCst)
        }

        /// `(dotted path, comment)` in attachment order.
        pub fn comments(&self) -> Vec<(String, String)> {
            self.counters.comments.lock().clone()
        }
    }

    impl ConfigNode for CountingNode {
        fn child(&self, name: &str) -> Self {
            self.counters.lookups.fetch_add(1, Ordering::SeqCst);
            Self {
                inner: self.inner.child(name),
                counters: Arc::clone(&self.counters),
                commentable: self.commentable,
            }
        }

        fn path(&self) -> &[String] {
            self.inner.path()
        }

        fn raw_value(&self) -> Result<Option<toml::Value>, ConfbindError> {
            self.inner.raw_value()
        }

        fn set_raw_value(&self, value: toml::Value) -> Result<(), ConfbindError> {
            self.inner.set_raw_value(value)
        }

        fn set_comment(&self, comment: &str) -> bool {
            if !self.commentable {
                return false;
            }
            self.counters
                .comments
                .lock()
                .push((self.dotted_path(), comment.to_string()));
            true
        }
    }

    // -- Sample declarations ----------------------------------------------------

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct Endpoint {
        pub host: String,
        pub port: u16,
    }

    pub struct NetConfig<N: ConfigNode> {
        pub host: Value<String, N>,
        pub port: Value<i32, N>,
    }

    pub fn declare_net<N: ConfigNode>(a: &NodeAdapter<N>) -> NetConfig<N> {
        NetConfig {
            host: a
                .string("host")
                .with_comment("Bind address")
                .with_default(|| "localhost".into()),
            port: a
                .int("port")
                .with_comment("Listen port")
                .with_default(|| 8080),
        }
    }

    pub struct AppConfig<N: ConfigNode> {
        pub name: Value<String, N>,
        pub tags: Value<Vec<String>, N>,
        pub net: Section<NetConfig<N>, N>,
    }

    pub fn declare_app<N: ConfigNode>(a: &NodeAdapter<N>) -> AppConfig<N> {
        AppConfig {
            name: a.string("name").with_comment("Service name"),
            tags: a.list("tags"),
            net: a
                .section("net", declare_net)
                .with_comment("Network settings"),
        }
    }

    #[test]
    fn counting_node_counts_each_lookup() {
        let root = CountingNode::new(false);
        root.child("a").child("b");
        assert_eq!(root.lookups(), 2);
    }
}
