use crate::feed::node::ConfigNode;
use indexmap::IndexMap;

/// Field path -> default value, in display order.
pub type FieldTable = IndexMap<String, String>;

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(String),
}

/// Flatten a nested form tree into a field table.
pub fn flatten(node: &ConfigNode) -> FieldTable {
    let mut table = FieldTable::new();
    if node.is_composite() {
        populate(node, "", &mut table);
    } else {
        tracing::warn!(?node, "form root is a plain value; no fields extracted");
    }
    table
}

fn populate(node: &ConfigNode, prefix: &str, table: &mut FieldTable) {
    let ConfigNode::Composite(children) = node else {
        return;
    };
    for (key, child) in children {
        let p = extend_prefix(prefix, key);
        match child {
            ConfigNode::Composite(_) => populate(child, &p, table),
            ConfigNode::Leaf(v) => {
                table.insert(p, v.clone());
            }
        }
    }
}

/// Append `key` to a field path: `/key` for names, `[key]` for numeric keys.
pub fn extend_prefix(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else if !is_numeric_key(key) {
        format!("{prefix}/{key}")
    } else {
        format!("{prefix}[{key}]")
    }
}

/// True when `key` would convert to a number (anything but NaN) under
/// loose string-to-number rules: surrounding whitespace is ignored, the empty
/// string counts as zero, and hex/octal/binary literals are accepted.
pub fn is_numeric_key(key: &str) -> bool {
    let k = key.trim();
    if k.is_empty() {
        return true;
    }
    if matches!(k, "Infinity" | "+Infinity" | "-Infinity") {
        return true;
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = k.strip_prefix(prefix) {
            return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
        }
    }
    let plausible = k
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    plausible && k.parse::<f64>().is_ok()
}

#[cfg(test)]
/// Split a field path back into its segments.
///
/// The first segment is always a `Key`, even when numeric, mirroring how
/// `extend_prefix` treats an empty prefix.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut chars = path.chars();
    let mut in_index = false;
    let push_key = |cur: &mut String, out: &mut Vec<PathSegment>| {
        if !cur.is_empty() || out.is_empty() {
            out.push(PathSegment::Key(std::mem::take(cur)));
        }
    };
    while let Some(c) = chars.next() {
        match (c, in_index) {
            ('[', false) => {
                push_key(&mut cur, &mut out);
                in_index = true;
            }
            (']', true) => {
                out.push(PathSegment::Index(std::mem::take(&mut cur)));
                in_index = false;
            }
            ('/', false) => push_key(&mut cur, &mut out),
            (c, _) => cur.push(c),
        }
    }
    if in_index {
        // unterminated index: keep the text as a plain key
        cur.insert(0, '[');
    }
    if !cur.is_empty() || out.is_empty() {
        out.push(PathSegment::Key(cur));
    }
    out
}

#[cfg(test)]
/// Re-nest a field table. Index segments become composite children keyed
/// by the index text.
pub fn unflatten(table: &FieldTable) -> ConfigNode {
    let mut root = ConfigNode::default();
    for (path, value) in table {
        let segments = parse_path(path);
        insert_at(&mut root, &segments, value);
    }
    root
}

#[cfg(test)]
fn insert_at(node: &mut ConfigNode, segments: &[PathSegment], value: &str) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    let key = match head {
        PathSegment::Key(k) | PathSegment::Index(k) => k.clone(),
    };
    if !node.is_composite() {
        *node = ConfigNode::default();
    }
    let ConfigNode::Composite(children) = node else {
        return;
    };
    if rest.is_empty() {
        children.insert(key, ConfigNode::leaf(value));
    } else {
        let child = children.entry(key).or_default();
        insert_at(child, rest, value);
    }
}
