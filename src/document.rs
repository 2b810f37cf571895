//! Host document access.
//!
//! The table core never owns the document. It enumerates nodes and stamps or
//! clears attributes through [`DocumentHost`]. [`DocumentTree`] is a plain
//! in-memory implementation over the editor's JSON node tree, used by the
//! JSON entry points and by tests.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Cell, CellPath};

/// A node of the host document tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    /// Node type (`"table"`, `"table-cell"`, ...); empty for text leaves and the root
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rowspan: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colspan: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// Everything else the host stores on the node (text, marks, markers)
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Node {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_span(mut self, rowspan: i64, colspan: i64) -> Self {
        self.rowspan = Some(rowspan);
        self.colspan = Some(colspan);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Copy of this node without its children
    pub fn shallow(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            key: self.key.clone(),
            rowspan: self.rowspan,
            colspan: self.colspan,
            children: Vec::new(),
            attributes: self.attributes.clone(),
        }
    }

    /// The cell view of this node. Nodes without a key cannot be addressed as cells.
    pub fn to_cell(&self, marker: &str) -> Option<Cell> {
        let key = self.key.clone()?;
        Some(Cell {
            key,
            rowspan: self.rowspan.unwrap_or(1),
            colspan: self.colspan.unwrap_or(1),
            selection_color: self
                .attribute(marker)
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// Predicate over document nodes.
pub type NodeMatch<'a> = &'a dyn Fn(&Node) -> bool;

/// What the table core needs from the host document.
pub trait DocumentHost {
    /// Every node at or below `at` that matches, in document order, with its path.
    ///
    /// Returned nodes are shallow copies: children are not included.
    fn query_nodes(&self, at: &CellPath, matches: NodeMatch<'_>) -> Vec<(Node, CellPath)>;

    /// Set `key = value` on the node at `at` if it matches. Returns whether a node changed.
    fn set_attribute(&mut self, at: &CellPath, key: &str, value: Value, matches: NodeMatch<'_>)
        -> bool;

    /// Remove `key` from every matching node at or below `scope`. Returns how many changed.
    fn unset_attribute(&mut self, key: &str, matches: NodeMatch<'_>, scope: &CellPath) -> usize;
}

/// In-memory document: a root node whose children are the top-level blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentTree {
    root: Node,
}

impl DocumentTree {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Wrap top-level blocks in an anonymous root
    pub fn from_blocks(blocks: Vec<Node>) -> Self {
        Self {
            root: Node {
                children: blocks,
                ..Node::default()
            },
        }
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// Node at `path`
    pub fn node(&self, path: &CellPath) -> Option<&Node> {
        path.iter()
            .try_fold(&self.root, |node, &index| node.children.get(index))
    }

    pub fn node_mut(&mut self, path: &CellPath) -> Option<&mut Node> {
        path.iter()
            .try_fold(&mut self.root, |node, &index| node.children.get_mut(index))
    }
}

/// Pre-order walk of `node` (located at `path`), calling `visit` on every node.
fn walk<'a>(node: &'a Node, path: &CellPath, visit: &mut dyn FnMut(&'a Node, &CellPath)) {
    let mut stack: Vec<(&Node, CellPath)> = vec![(node, path.clone())];
    while let Some((node, path)) = stack.pop() {
        visit(node, &path);
        for (index, child) in node.children.iter().enumerate().rev() {
            stack.push((child, path.child(index)));
        }
    }
}

/// Pre-order walk of `node` and its descendants with mutable access.
fn walk_mut(node: &mut Node, visit: &mut dyn FnMut(&mut Node)) {
    let mut stack: Vec<&mut Node> = vec![node];
    while let Some(node) = stack.pop() {
        visit(node);
        stack.extend(node.children.iter_mut().rev());
    }
}

impl DocumentHost for DocumentTree {
    fn query_nodes(&self, at: &CellPath, matches: NodeMatch<'_>) -> Vec<(Node, CellPath)> {
        let Some(start) = self.node(at) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        walk(start, at, &mut |node, path| {
            if matches(node) {
                found.push((node.shallow(), path.clone()));
            }
        });
        found
    }

    fn set_attribute(
        &mut self,
        at: &CellPath,
        key: &str,
        value: Value,
        matches: NodeMatch<'_>,
    ) -> bool {
        match self.node_mut(at) {
            Some(node) if matches(node) => {
                node.attributes.insert(key.to_string(), value);
                true
            }
            _ => false,
        }
    }

    fn unset_attribute(&mut self, key: &str, matches: NodeMatch<'_>, scope: &CellPath) -> usize {
        let Some(start) = self.node_mut(scope) else {
            return 0;
        };
        let mut changed = 0;
        walk_mut(start, &mut |node| {
            if matches(node) && node.attributes.remove(key).is_some() {
                changed += 1;
            }
        });
        changed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DocumentTree {
        DocumentTree::from_blocks(vec![
            Node::new("paragraph").with_attribute("text", json!("intro")),
            Node::new("table").with_child(
                Node::new("table-row")
                    .with_child(Node::new("table-cell").with_key("a"))
                    .with_child(Node::new("table-cell").with_key("b").with_span(1, 2)),
            ),
        ])
    }

    #[test]
    fn test_node_lookup() {
        let doc = sample();
        let cell = doc.node(&CellPath::from(vec![1, 0, 1])).unwrap();
        assert_eq!(cell.key.as_deref(), Some("b"));
        assert!(doc.node(&CellPath::from(vec![1, 0, 5])).is_none());
        assert_eq!(doc.node(&CellPath::root()).unwrap().children.len(), 2);
    }

    #[test]
    fn test_query_in_document_order() {
        let doc = sample();
        let cells = doc.query_nodes(&CellPath::root(), &|n| n.kind == "table-cell");
        let keys: Vec<_> = cells.iter().map(|(n, _)| n.key.clone().unwrap()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(cells[1].1, CellPath::from(vec![1, 0, 1]));
        assert!(cells[0].0.children.is_empty());
    }

    #[test]
    fn test_query_scoped_to_subtree() {
        let doc = sample();
        let found = doc.query_nodes(&CellPath::from(vec![0]), &|n| n.kind == "table-cell");
        assert!(found.is_empty());
        let missing = doc.query_nodes(&CellPath::from(vec![9]), &|_| true);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_set_and_unset_attribute() {
        let mut doc = sample();
        let path = CellPath::from(vec![1, 0, 0]);
        assert!(doc.set_attribute(&path, "mark", json!(1), &|n| n.kind == "table-cell"));
        assert!(!doc.set_attribute(&CellPath::from(vec![0]), "mark", json!(1), &|n| {
            n.kind == "table-cell"
        }));
        assert!(doc.node(&path).unwrap().has_attribute("mark"));

        let removed = doc.unset_attribute("mark", &|n| n.has_attribute("mark"), &CellPath::root());
        assert_eq!(removed, 1);
        assert!(!doc.node(&path).unwrap().has_attribute("mark"));
    }

    #[test]
    fn test_unset_attribute_visits_deep_documents_in_order() {
        let depth = 3_000;
        let mut node = Node::new("leaf").with_attribute("mark", json!(depth));
        for level in (0..depth).rev() {
            node = Node::new("wrap").with_attribute("mark", json!(level)).with_child(node);
        }
        let mut doc = DocumentTree::from_blocks(vec![node]);

        let seen = std::cell::RefCell::new(Vec::new());
        let removed = doc.unset_attribute(
            "mark",
            &|n| {
                seen.borrow_mut().push(n.attribute("mark").cloned());
                true
            },
            &CellPath::from(vec![0]),
        );
        assert_eq!(removed, depth + 1);
        let expected: Vec<_> = (0..=depth).map(|level| Some(json!(level))).collect();
        assert_eq!(seen.into_inner(), expected);
    }

    #[test]
    fn test_json_round_trip_keeps_unknown_fields() {
        let json = r#"{"children":[{"type":"table","children":[{"type":"table-row","children":[{"type":"table-cell","key":"x","rowspan":2,"align":"left","children":[{"text":"hi"}]}]}]}]}"#;
        let doc = DocumentTree::from_json(json).unwrap();
        let cell = doc.node(&CellPath::from(vec![0, 0, 0])).unwrap();
        assert_eq!(cell.rowspan, Some(2));
        assert_eq!(cell.attribute("align"), Some(&json!("left")));
        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back, serde_json::from_str::<Value>(json).unwrap());
    }

    #[test]
    fn test_to_cell_reads_marker() {
        let node = Node::new("table-cell")
            .with_key("k")
            .with_attribute("selectionColor", json!("blue"));
        let cell = node.to_cell("selectionColor").unwrap();
        assert_eq!(cell.selection_color.as_deref(), Some("blue"));
        assert_eq!(cell.span(10), (1, 1));
        assert!(Node::new("table-cell").to_cell("selectionColor").is_none());
    }
}
