//! Typed configuration tree and deep merge
//!
//! Option data arrives as loosely typed JSON/TOML. It is converted into a
//! closed set of node variants so that merging is an exhaustive match:
//!
//! | base \ override | Map | List | Scalar |
//! |-----------------|-----|------|--------|
//! | Map | recurse per key | override | override |
//! | List | override | override | override |
//! | Scalar | override | override | override |
//!
//! Lists are never merged element-wise or concatenated.

use std::collections::BTreeMap;
use std::fmt;

/// Leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Integer that fits in `i64`
    Integer(i64),
    /// Any other number
    Float(f64),
    /// Text
    String(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "\"{s}\""),
        }
    }
}

/// One node of the configuration tree
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    /// Keyed children
    Map(BTreeMap<String, ConfigNode>),
    /// Ordered children, replaced as a whole on merge
    List(Vec<ConfigNode>),
    /// Leaf
    Scalar(ScalarValue),
}

impl Default for ConfigNode {
    fn default() -> Self {
        Self::empty_map()
    }
}

impl ConfigNode {
    /// Empty map node
    pub fn empty_map() -> Self {
        Self::Map(BTreeMap::new())
    }

    /// String leaf
    pub fn string<S: Into<String>>(value: S) -> Self {
        Self::Scalar(ScalarValue::String(value.into()))
    }

    /// Variant name, used in warnings
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Map(_) => "map",
            Self::List(_) => "list",
            Self::Scalar(_) => "scalar",
        }
    }

    /// Child of a map node
    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        match self {
            Self::Map(map) => map.get(key),
            Self::List(_) | Self::Scalar(_) => None,
        }
    }

    /// Descendant of nested map nodes
    pub fn get_path(&self, path: &[&str]) -> Option<&ConfigNode> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Map children, if this is a map
    pub fn as_map(&self) -> Option<&BTreeMap<String, ConfigNode>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// List children, if this is a list
    pub fn as_list(&self) -> Option<&[ConfigNode]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Leaf value, if this is a scalar
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Text of a string leaf
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(ScalarValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// True for an explicit null leaf
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(ScalarValue::Null))
    }

    /// Merge `overlay` on top of `self`
    #[must_use]
    pub fn merged_with(&self, overlay: &ConfigNode) -> ConfigNode {
        deep_merge(self, overlay)
    }

    /// Convert back to JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(ConfigNode::to_json).collect())
            }
            Self::Scalar(ScalarValue::Null) => serde_json::Value::Null,
            Self::Scalar(ScalarValue::Bool(b)) => serde_json::Value::Bool(*b),
            Self::Scalar(ScalarValue::Integer(i)) => serde_json::Value::from(*i),
            Self::Scalar(ScalarValue::Float(x)) => serde_json::Number::from_f64(*x)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Scalar(ScalarValue::String(s)) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<&serde_json::Value> for ConfigNode {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), ConfigNode::from(v)))
                    .collect(),
            ),
            serde_json::Value::Array(items) => {
                Self::List(items.iter().map(ConfigNode::from).collect())
            }
            serde_json::Value::Null => Self::Scalar(ScalarValue::Null),
            serde_json::Value::Bool(b) => Self::Scalar(ScalarValue::Bool(*b)),
            serde_json::Value::Number(n) => Self::Scalar(match n.as_i64() {
                Some(i) => ScalarValue::Integer(i),
                None => ScalarValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            serde_json::Value::String(s) => Self::Scalar(ScalarValue::String(s.clone())),
        }
    }
}

impl From<serde_json::Value> for ConfigNode {
    fn from(value: serde_json::Value) -> Self {
        Self::from(&value)
    }
}

/// Merge `overlay` on top of `base`.
///
/// Total over every pair of node variants. Unmatched base keys survive.
pub fn deep_merge(base: &ConfigNode, overlay: &ConfigNode) -> ConfigNode {
    match (base, overlay) {
        (ConfigNode::Map(base_map), ConfigNode::Map(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, overlay_child) in overlay_map {
                let child = match base_map.get(key) {
                    Some(base_child) => deep_merge(base_child, overlay_child),
                    None => overlay_child.clone(),
                };
                merged.insert(key.clone(), child);
            }
            ConfigNode::Map(merged)
        }
        (ConfigNode::List(_), _) | (_, ConfigNode::List(_)) => overlay.clone(),
        (ConfigNode::Scalar(_), ConfigNode::Scalar(_)) => overlay.clone(),
        (ConfigNode::Map(_), ConfigNode::Scalar(_)) | (ConfigNode::Scalar(_), ConfigNode::Map(_)) => {
            overlay.clone()
        }
    }
}
