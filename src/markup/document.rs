//! Mutable HTML document arena
//!
//! Markup is parsed with `scraper` and copied into a flat arena of nodes
//! addressed by [`NodeId`]. Elements keep an ordered attribute list that can
//! be rewritten in place, and the arena serializes back to HTML through
//! html5ever's serializer.

use ego_tree::NodeRef;
use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::{LocalName, Namespace, QualName};
use scraper::node::Node as ParsedNode;
use scraper::Html;
use std::io::{self, Write};

/// Index of a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element's name and attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    name: QualName,
    attrs: Vec<(QualName, String)>,
}

impl ElementData {
    /// The element's local tag name, e.g. `img`
    pub fn tag(&self) -> &str {
        &self.name.local
    }

    /// Looks up an attribute value by local name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(qual, _)| &*qual.local == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over `(name, value)` pairs in source order
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs
            .iter()
            .map(|(qual, value)| (&*qual.local, value.as_str()))
    }
}

/// Payload of a single arena node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The document root
    Document,
    /// `<!DOCTYPE name>`
    Doctype { name: String },
    /// Character data
    Text(String),
    /// `<!-- comment -->`
    Comment(String),
    /// `<?target data>`
    ProcessingInstruction { target: String, data: String },
    /// An element with its attributes
    Element(ElementData),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    children: Vec<NodeId>,
}

/// An HTML document held as an arena of indexed nodes
///
/// Node 0 is always the document root. Nodes are never removed; the only
/// supported mutation is rewriting attribute values.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

const ROOT: NodeId = NodeId(0);

impl Document {
    /// Parses a full HTML document
    ///
    /// Parsing never fails: malformed markup is repaired the way browsers
    /// do it, so `<html></html>` becomes a document with empty `head` and
    /// `body` elements.
    pub fn parse(markup: &str) -> Self {
        let parsed = Html::parse_document(markup);
        let mut document = Self {
            nodes: vec![Node {
                data: NodeData::Document,
                children: Vec::new(),
            }],
        };

        let mut pending: Vec<(NodeRef<'_, ParsedNode>, NodeId)> = parsed
            .tree
            .root()
            .children()
            .map(|child| (child, ROOT))
            .collect();
        pending.reverse();

        while let Some((parsed_node, parent)) = pending.pop() {
            let id = match convert_node(parsed_node.value()) {
                Some(data) => document.push(parent, data),
                // Nested document or fragment roots are transparent
                None => parent,
            };

            let mut children: Vec<_> = parsed_node.children().map(|child| (child, id)).collect();
            children.reverse();
            pending.extend(children);
        }

        document
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// The document root
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Number of nodes in the arena, including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the document has nothing but its root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Returns the payload of a node
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).map(|node| &node.data)
    }

    /// Returns the children of a node in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Returns the element payload of a node, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.get(id)? {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns every node id in document (pre-)order, root first
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![ROOT];

        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }

        order
    }

    /// Finds elements named `tag` that carry a non-empty `attr`
    ///
    /// Results are in document order.
    pub fn find_elements(&self, tag: &str, attr: &str) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|&id| {
                self.element(id).is_some_and(|element| {
                    element.tag() == tag && element.attr(attr).is_some_and(|v| !v.is_empty())
                })
            })
            .collect()
    }

    /// Reads an attribute of an element node
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    /// Sets an attribute on an element node
    ///
    /// An existing attribute keeps its position; a new one is appended.
    /// Returns false if `id` is not an element.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let Some(Node {
            data: NodeData::Element(element),
            ..
        }) = self.nodes.get_mut(id.0)
        else {
            return false;
        };

        match element.attrs.iter_mut().find(|(qual, _)| &*qual.local == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element.attrs.push((attribute_name(name), value.to_string())),
        }

        true
    }

    /// Serializes the document as HTML into `writer`
    pub fn write_html<W: Write>(&self, writer: W) -> io::Result<()> {
        serialize(writer, self, SerializeOpts::default())
    }

    /// Serializes the document to an HTML string
    pub fn to_html(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_html(&mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn attribute_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(local))
}

fn convert_node(node: &ParsedNode) -> Option<NodeData> {
    let data = match node {
        ParsedNode::Document | ParsedNode::Fragment => return None,
        ParsedNode::Doctype(doctype) => NodeData::Doctype {
            name: doctype.name().to_string(),
        },
        ParsedNode::Comment(comment) => NodeData::Comment(comment.comment.to_string()),
        ParsedNode::Text(text) => NodeData::Text(text.text.to_string()),
        ParsedNode::ProcessingInstruction(pi) => NodeData::ProcessingInstruction {
            target: pi.target.to_string(),
            data: pi.data.to_string(),
        },
        ParsedNode::Element(element) => NodeData::Element(ElementData {
            name: element.name.clone(),
            attrs: element
                .attrs()
                .map(|(name, value)| (attribute_name(name), value.to_string()))
                .collect(),
        }),
    };

    Some(data)
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: &mut S, _traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let mut stack: Vec<Step> = self.children(ROOT).iter().rev().map(|&id| Step::Open(id)).collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Open(id) => match &self.nodes[id.0].data {
                    NodeData::Document => {
                        stack.extend(self.children(id).iter().rev().map(|&c| Step::Open(c)));
                    }
                    NodeData::Doctype { name } => serializer.write_doctype(name)?,
                    NodeData::Text(text) => serializer.write_text(text)?,
                    NodeData::Comment(text) => serializer.write_comment(text)?,
                    NodeData::ProcessingInstruction { target, data } => {
                        serializer.write_processing_instruction(target, data)?
                    }
                    NodeData::Element(element) => {
                        serializer.start_elem(
                            element.name.clone(),
                            element.attrs.iter().map(|(name, value)| (name, value.as_str())),
                        )?;
                        stack.push(Step::Close(id));
                        stack.extend(self.children(id).iter().rev().map(|&c| Step::Open(c)));
                    }
                },
                Step::Close(id) => {
                    if let NodeData::Element(element) = &self.nodes[id.0].data {
                        serializer.end_elem(element.name.clone())?;
                    }
                }
            }
        }

        Ok(())
    }
}
