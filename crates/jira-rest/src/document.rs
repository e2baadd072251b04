//! Atlassian Document Format codec.
//!
//! Jira stores descriptions and comment bodies as a typed tree of nodes. Only
//! three node kinds matter here:
//!
//! - `doc`: the root, holding paragraphs
//! - `paragraph`: a block holding inline nodes
//! - `text`: a leaf carrying the actual characters
//!
//! Everything else (mentions, code blocks, tables, ...) is kept as an
//! [`Node::Opaque`] container so that decoding never fails on unfamiliar
//! content.
//!
//! [`encode`] and [`decode`] are deliberately asymmetric: `encode` builds the
//! smallest document Jira accepts, and `decode` flattens any document into a
//! single line of display text. `decode(&encode(s).into()) == s` holds for
//! every string; the opposite direction does not.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Document format version emitted by [`encode`].
pub const DOCUMENT_VERSION: u32 = 1;

/// A node in an Atlassian document tree.
///
/// Deserialization never fails on an object: a missing `type`, a non-string
/// `text` or a non-array `content` just leaves that part of the node empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "RawNode")]
pub enum Node {
    /// Root node.
    Document {
        /// Block-level children.
        content: Vec<Node>,
    },
    /// A paragraph block.
    Paragraph {
        /// Inline children.
        content: Vec<Node>,
    },
    /// A run of text.
    Text {
        /// The characters.
        text: String,
    },
    /// Any node kind without dedicated handling.
    Opaque {
        /// The node's `type` tag as sent by Jira; empty when absent.
        kind: String,
        /// Children, if the node has any.
        content: Option<Vec<Node>>,
        /// Text payload, if the node carries one.
        text: Option<String>,
    },
}

impl Node {
    /// The wire `type` tag of this node.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Document { .. } => "doc",
            Self::Paragraph { .. } => "paragraph",
            Self::Text { .. } => "text",
            Self::Opaque { kind, .. } => kind,
        }
    }

    /// Build a node from loosely typed JSON.
    ///
    /// Returns `None` unless `value` is an object. Child entries that are not
    /// objects are skipped, and nested arrays are flattened into their parent.
    /// The tree is built with an explicit stack, so depth is bounded only by
    /// memory.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let Value::Object(root) = value else {
            return None;
        };

        let mut stack = vec![Frame::new(root)];
        loop {
            let top = stack.last_mut()?;
            match top.pending.pop() {
                Some(Value::Object(child)) => stack.push(Frame::new(child)),
                Some(Value::Array(items)) => top.pending.extend(items.iter().rev()),
                Some(_) => {}
                None => {
                    let node = stack.pop()?.finish();
                    match stack.last_mut() {
                        Some(parent) => parent.built.push(node),
                        None => return Some(node),
                    }
                }
            }
        }
    }

    fn children(&self) -> &[Node] {
        match self {
            Self::Document { content } | Self::Paragraph { content } => content.as_slice(),
            Self::Opaque {
                content: Some(content),
                ..
            } => content.as_slice(),
            Self::Text { .. } | Self::Opaque { content: None, .. } => &[],
        }
    }

    /// Text contributed by this node itself, ignoring children.
    fn payload(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text.as_str()),
            // Unknown leaves still surface their text so nothing visible is lost.
            Self::Opaque {
                content: None,
                text: Some(text),
                ..
            } => Some(text.as_str()),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("document node must be a JSON object"))
    }
}

/// A node under construction in [`Node::from_value`].
struct Frame<'a> {
    kind: Option<String>,
    text: Option<String>,
    has_content: bool,
    /// Children still to visit; the next one is on top.
    pending: Vec<&'a Value>,
    built: Vec<Node>,
}

impl<'a> Frame<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        let content = object.get("content").and_then(Value::as_array);
        Self {
            kind: object.get("type").and_then(Value::as_str).map(str::to_string),
            text: object.get("text").and_then(Value::as_str).map(str::to_string),
            has_content: content.is_some(),
            pending: content.map(|items| items.iter().rev().collect()).unwrap_or_default(),
            built: Vec::new(),
        }
    }

    fn finish(self) -> Node {
        match self.kind.as_deref() {
            Some("doc") => Node::Document {
                content: self.built,
            },
            Some("paragraph") => Node::Paragraph {
                content: self.built,
            },
            Some("text") => Node::Text {
                text: self.text.unwrap_or_default(),
            },
            _ => Node::Opaque {
                kind: self.kind.unwrap_or_default(),
                content: self.has_content.then_some(self.built),
                text: self.text,
            },
        }
    }
}

/// Wire shape shared by every node kind.
#[derive(Debug, Clone, Serialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<Vec<RawNode>>,
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        let children = |content: Vec<Node>| Some(content.into_iter().map(RawNode::from).collect());
        let kind = node.kind().to_string();

        match node {
            Node::Document { content } => Self {
                kind,
                version: Some(DOCUMENT_VERSION),
                text: None,
                content: children(content),
            },
            Node::Paragraph { content } => Self {
                kind,
                version: None,
                text: None,
                content: children(content),
            },
            Node::Text { text } => Self {
                kind,
                version: None,
                text: Some(text),
                content: None,
            },
            Node::Opaque { content, text, .. } => Self {
                kind,
                version: None,
                text,
                content: content.and_then(children),
            },
        }
    }
}

/// A rich-text field as Jira may return it.
///
/// Descriptions and comment bodies usually arrive as documents, but older
/// endpoints and some integrations hand back plain strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RichText {
    /// Plain string.
    Plain(String),
    /// Structured document.
    Document(Node),
    /// Anything else, rendered through its JSON form.
    Other(Value),
}

impl RichText {
    /// Classify a JSON value. Every object is read as a document.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Plain(text),
            Value::Object(_) => match Node::from_value(&value) {
                Some(node) => Self::Document(node),
                None => Self::Other(value),
            },
            other => Self::Other(other),
        }
    }
}

impl<'de> Deserialize<'de> for RichText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl From<Node> for RichText {
    fn from(node: Node) -> Self {
        Self::Document(node)
    }
}

impl From<String> for RichText {
    fn from(text: String) -> Self {
        Self::Plain(text)
    }
}

/// Wrap plain text as a single-paragraph document.
///
/// The input is taken literally; no markup is interpreted.
#[must_use]
pub fn encode(plain: &str) -> Node {
    Node::Document {
        content: vec![Node::Paragraph {
            content: vec![Node::Text {
                text: plain.to_string(),
            }],
        }],
    }
}

/// Flatten a rich-text field into display text.
///
/// Plain strings are returned unchanged. Documents are walked depth-first in
/// pre-order and every text payload is joined with a single space.
#[must_use]
pub fn decode(field: &RichText) -> String {
    match field {
        RichText::Plain(text) => text.clone(),
        RichText::Document(node) => decode_node(node),
        RichText::Other(Value::String(text)) => text.clone(),
        RichText::Other(value) => value.to_string(),
    }
}

/// Flatten a document tree into display text.
///
/// The walk uses an explicit stack, so arbitrarily deep trees are safe.
#[must_use]
pub fn decode_node(root: &Node) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let mut stack: Vec<&Node> = vec![root];

    while let Some(node) = stack.pop() {
        if let Some(text) = node.payload() {
            parts.push(text);
        }
        // Reverse so the leftmost child is visited first.
        stack.extend(node.children().iter().rev());
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    fn text(s: &str) -> Node {
        Node::Text {
            text: s.to_string(),
        }
    }

    #[test]
    fn test_encode_shape() {
        let value = serde_json::to_value(encode("Hello")).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "doc",
                "version": 1,
                "content": [{
                    "type": "paragraph",
                    "content": [{"type": "text", "text": "Hello"}]
                }]
            })
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::simple("Fix the login page")]
    #[case::multiline("line one\nline two\n\nline four")]
    #[case::markup_is_literal("*bold* _em_ {code} <b>")]
    #[case::unicode("résumé ✓ 日本語")]
    fn test_round_trip(#[case] input: &str) {
        assert_eq!(decode(&encode(input).into()), input);
    }

    #[test]
    fn test_decode_plain_string_unchanged() {
        let field = RichText::Plain("  already text  ".to_string());
        assert_eq!(decode(&field), "  already text  ");
    }

    #[test]
    fn test_decode_joins_in_document_order() {
        let doc = Node::Document {
            content: vec![
                Node::Paragraph {
                    content: vec![text("first"), text("second")],
                },
                Node::Paragraph {
                    content: vec![Node::Opaque {
                        kind: "bulletList".to_string(),
                        content: Some(vec![Node::Opaque {
                            kind: "listItem".to_string(),
                            content: Some(vec![Node::Paragraph {
                                content: vec![text("nested")],
                            }]),
                            text: None,
                        }]),
                        text: None,
                    }],
                },
                Node::Paragraph {
                    content: vec![text("last")],
                },
            ],
        };

        assert_eq!(decode_node(&doc), "first second nested last");
    }

    #[test]
    fn test_decode_without_text_is_empty() {
        let doc = Node::Document {
            content: vec![Node::Paragraph { content: vec![] }],
        };
        assert_eq!(decode_node(&doc), "");
    }

    #[test]
    fn test_decode_tolerates_unknown_and_missing_content() {
        let field: RichText = serde_json::from_value(json!({
            "type": "doc",
            "version": 1,
            "content": [
                {"type": "rule"},
                {"type": "paragraph"},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "ping"},
                    {"type": "hardBreak"},
                    {"type": "mention", "attrs": {"id": "42"}, "text": "@dana"},
                    {"type": "text", "text": "pong"}
                ]}
            ]
        }))
        .unwrap();

        assert_eq!(decode(&field), "ping @dana pong");
    }

    #[test]
    fn test_decode_deeply_nested_document() {
        let mut node = text("deep");
        for _ in 0..10_000 {
            node = Node::Opaque {
                kind: "blockquote".to_string(),
                content: Some(vec![node]),
                text: None,
            };
        }

        assert_eq!(decode_node(&node), "deep");
        // Tear down iteratively; the derived Drop would recurse 10k levels.
        let mut current = Some(node);
        while let Some(Node::Opaque { content, .. }) = current.take() {
            current = content.and_then(|mut children| children.pop());
        }
    }

    #[test]
    fn test_rich_text_accepts_both_shapes() {
        let plain: RichText = serde_json::from_value(json!("plain body")).unwrap();
        let doc: RichText = serde_json::from_value(serde_json::to_value(encode("doc body")).unwrap())
            .unwrap();

        assert_eq!(plain, RichText::Plain("plain body".to_string()));
        assert!(matches!(doc, RichText::Document(Node::Document { .. })));
        assert_eq!(decode(&doc), "doc body");
    }

    #[test]
    fn test_rich_text_coerces_other_values() {
        let field: RichText = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(decode(&field), "42");
    }

    #[test]
    fn test_opaque_node_survives_reserialization() {
        let raw = json!({"type": "codeBlock", "content": [{"type": "text", "text": "fn main() {}"}]});
        let node: Node = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(node.kind(), "codeBlock");
        assert_eq!(serde_json::to_value(node).unwrap(), raw);
    }

    #[test]
    fn test_malformed_node_keeps_sibling_text() {
        let field: RichText = serde_json::from_value(json!({
            "type": "doc",
            "version": 1,
            "content": [{"type": "paragraph", "content": [
                {"type": "text", "text": "hello"},
                {"attrs": {"id": "x"}}
            ]}]
        }))
        .unwrap();

        assert!(matches!(field, RichText::Document(_)));
        assert_eq!(decode(&field), "hello");
    }

    #[rstest]
    #[case::missing_type(json!({"content": [{"type": "text", "text": "a"}]}), "a")]
    #[case::text_not_string(json!({"type": "doc", "content": [
        {"type": "text", "text": 7},
        {"type": "text", "text": "b"}
    ]}), " b")]
    #[case::content_not_array(json!({"type": "doc", "content": [
        {"type": "paragraph", "content": "oops"},
        {"type": "text", "text": "c"}
    ]}), "c")]
    #[case::scalar_children_skipped(json!({"type": "doc", "content": [1, null, "x", {"type": "text", "text": "d"}]}), "d")]
    #[case::nested_arrays_flattened(json!({"type": "doc", "content": [
        [{"type": "text", "text": "e"}, [{"type": "text", "text": "f"}]]
    ]}), "e f")]
    fn test_decode_tolerates_malformed_nodes(#[case] raw: Value, #[case] expected: &str) {
        let field: RichText = serde_json::from_value(raw).unwrap();
        assert_eq!(decode(&field), expected);
    }

    #[test]
    fn test_from_value_builds_deep_tree_without_recursion() {
        let mut raw = json!({"type": "text", "text": "bottom"});
        for _ in 0..2_000 {
            raw = json!({"type": "listItem", "content": [raw]});
        }

        let node = Node::from_value(&raw).unwrap();
        assert_eq!(decode_node(&node), "bottom");

        let mut current = Some(node);
        while let Some(Node::Opaque { content, .. }) = current.take() {
            current = content.and_then(|mut children| children.pop());
        }
    }

    #[test]
    fn test_node_rejects_non_object() {
        assert!(serde_json::from_value::<Node>(json!("text")).is_err());
        assert!(Node::from_value(&json!([1, 2])).is_none());
    }

    proptest! {
        #[test]
        fn prop_decode_encode_round_trip(s in any::<String>()) {
            prop_assert_eq!(decode(&encode(&s).into()), s);
        }
    }
}
