use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

/// A node of a feed's nested default-value tree.
///
/// The shape is fixed when configuration is loaded: mappings and sequences
/// become `Composite` (sequences keyed by their index), everything else a
/// `Leaf` holding its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "YamlValue")]
pub enum ConfigNode {
    Leaf(String),
    Composite(IndexMap<String, ConfigNode>),
}

impl Default for ConfigNode {
    fn default() -> Self {
        ConfigNode::Composite(IndexMap::new())
    }
}

impl ConfigNode {
    pub fn leaf(s: impl Into<String>) -> Self {
        ConfigNode::Leaf(s.into())
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, ConfigNode::Composite(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ConfigNode::Leaf(_) => false,
            ConfigNode::Composite(m) => m.is_empty(),
        }
    }

    /// Number of leaves reachable from this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            ConfigNode::Leaf(_) => 1,
            ConfigNode::Composite(m) => m.values().map(ConfigNode::leaf_count).sum(),
        }
    }
}

fn scalar_text(v: &YamlValue) -> Option<String> {
    match v {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Tagged(t) => scalar_text(&t.value),
        _ => None,
    }
}

impl From<YamlValue> for ConfigNode {
    fn from(v: YamlValue) -> Self {
        match v {
            YamlValue::Null => ConfigNode::default(),
            YamlValue::Sequence(items) => ConfigNode::Composite(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), ConfigNode::from(item)))
                    .collect(),
            ),
            YamlValue::Mapping(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, val) in map {
                    match scalar_text(&k) {
                        Some(key) => {
                            out.insert(key, ConfigNode::from(val));
                        }
                        None => tracing::warn!(key = ?k, "skipping form key that is not a scalar"),
                    }
                }
                ConfigNode::Composite(out)
            }
            YamlValue::Tagged(t) => ConfigNode::from(t.value),
            other => ConfigNode::leaf(scalar_text(&other).unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> ConfigNode {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn mappings_keep_insertion_order() {
        let node = parse("zeta: 1\nalpha: 2\nmid: 3\n");
        match node {
            ConfigNode::Composite(m) => {
                let keys: Vec<&str> = m.keys().map(|k| k.as_str()).collect();
                assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
            }
            _ => panic!("expected composite"),
        }
    }

    #[test]
    fn sequences_become_index_keyed_composites() {
        let node = parse("[a, b]");
        let ConfigNode::Composite(m) = node else {
            panic!("expected composite");
        };
        assert_eq!(m.get("0"), Some(&ConfigNode::leaf("a")));
        assert_eq!(m.get("1"), Some(&ConfigNode::leaf("b")));
    }

    #[test]
    fn numbers_and_bools_are_leaves() {
        let node = parse("port: 8080\nratio: 0.5\nenabled: true\n");
        let ConfigNode::Composite(m) = node else {
            panic!("expected composite");
        };
        assert_eq!(m["port"], ConfigNode::leaf("8080"));
        assert_eq!(m["ratio"], ConfigNode::leaf("0.5"));
        assert_eq!(m["enabled"], ConfigNode::leaf("true"));
    }

    #[test]
    fn null_is_an_empty_composite() {
        let node = parse("a: ~\nb: x\n");
        let ConfigNode::Composite(m) = node else {
            panic!("expected composite");
        };
        assert!(m["a"].is_empty());
        assert_eq!(node_leaf_count(&m), 1);
    }

    fn node_leaf_count(m: &IndexMap<String, ConfigNode>) -> usize {
        m.values().map(ConfigNode::leaf_count).sum()
    }

    #[test]
    fn numeric_mapping_keys_are_stringified() {
        let node = parse("0: first\n1: second\n");
        let ConfigNode::Composite(m) = node else {
            panic!("expected composite");
        };
        assert_eq!(m["0"], ConfigNode::leaf("first"));
        assert_eq!(m["1"], ConfigNode::leaf("second"));
    }
}
