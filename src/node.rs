//! The syntax tree.

use std::fmt;

use crate::visitor::{PathSupplier, Span, Visitor};
use crate::{ParseError, ParseErrorCode};

/// The kind of a syntax tree node.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum NodeType {
    /// The root, spanning the whole text.
    Message,
    /// The first line: type, scope, breaking mark, colon and description.
    Header,
    /// The commit type, e.g. `feat`.
    Type,
    /// `(` opening the scope.
    ScopeParenOpen,
    /// The text between the scope parentheses.
    Scope,
    /// `)` closing the scope.
    ScopeParenClose,
    /// `!` before the header colon.
    BreakingExclamationMark,
    /// The rest of the header line after the colon.
    Description,
    /// Free-form text between the header and the footers.
    Body,
    /// `BREAKING CHANGE` or `BREAKING-CHANGE` as a footer token.
    BreakingChangeLiteral,
    /// A `token: value` or `token #value` trailer.
    Footer,
    /// The token of a footer.
    FooterToken,
    /// One `-`-separated word of a footer token.
    FooterWordToken,
    /// One line of a footer value.
    FooterWord,
    /// A word of body text.
    Word,
    /// Spaces, tabs, line breaks and comment lines.
    Whitespace,
    /// A number of body text.
    Number,
    /// Any other character.
    Symbol,
}

impl NodeType {
    /// The name used in paths and serialized trees.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Header => "header",
            Self::Type => "type",
            Self::ScopeParenOpen => "scope-paren-open",
            Self::Scope => "scope",
            Self::ScopeParenClose => "scope-paren-close",
            Self::BreakingExclamationMark => "breaking-exclamation-mark",
            Self::Description => "description",
            Self::Body => "body",
            Self::BreakingChangeLiteral => "breaking-change-literal",
            Self::Footer => "footer",
            Self::FooterToken => "footer-token",
            Self::FooterWordToken => "footer-word-token",
            Self::FooterWord => "footer-word",
            Self::Word => "word",
            Self::Whitespace => "whitespace",
            Self::Number => "number",
            Self::Symbol => "symbol",
        }
    }

    /// The path segment a node of this type contributes, if any.
    ///
    /// Footers contribute an additional index segment.
    pub(crate) fn path_key(self) -> Option<&'static str> {
        match self {
            Self::Header
            | Self::Type
            | Self::ScopeParenOpen
            | Self::Scope
            | Self::ScopeParenClose
            | Self::BreakingExclamationMark
            | Self::Description
            | Self::Body
            | Self::Footer
            | Self::FooterToken
            | Self::FooterWord => Some(self.as_str()),
            Self::Message
            | Self::BreakingChangeLiteral
            | Self::FooterWordToken
            | Self::Word
            | Self::Whitespace
            | Self::Number
            | Self::Symbol => None,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded literal of a leaf node.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum NodeValue<'a> {
    /// Source text of the leaf.
    Text(&'a str),
    /// Value of a [`NodeType::Number`] leaf.
    Number(u64),
}

impl<'a> NodeValue<'a> {
    /// The text, unless this is a number.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }

    /// The number, unless this is text.
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Self::Text(_) => None,
            Self::Number(n) => Some(*n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct NodeData<'a> {
    node_type: NodeType,
    value: Option<NodeValue<'a>>,
    offset: usize,
    length: usize,
    colon_offset: Option<usize>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// A parsed commit message.
///
/// Nodes live in an arena owned by the tree; [`Node`] handles borrow it.
/// Trees compare equal when they have the same text and the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree<'a> {
    text: &'a str,
    nodes: Vec<NodeData<'a>>,
}

impl<'a> SyntaxTree<'a> {
    /// The text the tree was parsed from.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// The `message` node.
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            index: 0,
        }
    }
}

/// A handle to a node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree<'t>,
    index: usize,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData<'t> {
        &self.tree.nodes[self.index]
    }

    /// The type of the node.
    pub fn node_type(&self) -> NodeType {
        self.data().node_type
    }

    /// The literal of a leaf. `None` for composites and placeholders.
    pub fn value(&self) -> Option<NodeValue<'t>> {
        self.data().value
    }

    /// Byte offset of the node.
    pub fn offset(&self) -> usize {
        self.data().offset
    }

    /// Byte length of the node.
    pub fn length(&self) -> usize {
        self.data().length
    }

    /// Offset one past the last byte of the node.
    pub fn end(&self) -> usize {
        self.offset() + self.length()
    }

    /// Offset of the `:` owned by a header or a footer token.
    pub fn colon_offset(&self) -> Option<usize> {
        self.data().colon_offset
    }

    /// Source text covered by the node.
    pub fn text(&self) -> &'t str {
        &self.tree.text[self.offset()..self.end()]
    }

    /// The enclosing node, `None` for the root.
    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|index| self.at(index))
    }

    /// Child nodes in document order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = Node<'t>> + ExactSizeIterator + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&index| Node { tree, index })
    }

    /// The first child of the given type.
    pub fn child(&self, node_type: NodeType) -> Option<Node<'t>> {
        self.children().find(|c| c.node_type() == node_type)
    }

    /// The sibling right before this node.
    pub fn previous_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let siblings = &parent.data().children;
        let position = siblings.iter().position(|&index| index == self.index)?;
        let index = *siblings.get(position.checked_sub(1)?)?;
        Some(self.at(index))
    }

    /// Leaf nodes below this node, in document order.
    pub fn leaves(&self) -> impl Iterator<Item = Node<'t>> + 't {
        let mut stack = vec![*self];
        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                if node.data().children.is_empty() {
                    return Some(node);
                }
                stack.extend(node.children().rev());
            }
            None
        })
    }

    fn at(&self, index: usize) -> Node<'t> {
        Node {
            tree: self.tree,
            index,
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("type", &self.node_type())
            .field("offset", &self.offset())
            .field("length", &self.length());
        if let Some(value) = self.value() {
            s.field("value", &value);
        }
        if let Some(colon_offset) = self.colon_offset() {
            s.field("colon_offset", &colon_offset);
        }
        if self.data().children.is_empty() {
            s.finish()
        } else {
            s.field("children", &self.children().collect::<Vec<_>>())
                .finish()
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Node<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.node_type())?;
        map.serialize_entry("offset", &self.offset())?;
        map.serialize_entry("length", &self.length())?;
        if let Some(value) = self.value() {
            map.serialize_entry("value", &value)?;
        }
        if let Some(colon_offset) = self.colon_offset() {
            map.serialize_entry("colonOffset", &colon_offset)?;
        }
        if !self.data().children.is_empty() {
            map.serialize_entry("children", &self.children().collect::<Vec<_>>())?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SyntaxTree<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.root().serialize(serializer)
    }
}

/// Find the innermost node containing `offset`.
///
/// A node contains the offsets `[offset, offset + length)`. With
/// `include_right_bound`, a node ending exactly at `offset` matches as well,
/// which resolves a cursor right after a token to that token. The first
/// matching child in document order wins.
pub fn find_node_at_offset<'t>(
    root: Node<'t>,
    offset: usize,
    include_right_bound: bool,
) -> Option<Node<'t>> {
    let contains = |node: &Node<'_>| {
        (node.offset() <= offset && offset < node.end())
            || (include_right_bound && offset == node.end())
    };
    if !contains(&root) {
        return None;
    }

    let mut node = root;
    'descend: loop {
        for child in node.children() {
            if child.offset() > offset {
                break;
            }
            if contains(&child) {
                node = child;
                continue 'descend;
            }
        }
        return Some(node);
    }
}

/// Builds a [`SyntaxTree`] out of visitor callbacks.
pub(crate) struct TreeBuilder<'a, 'e> {
    text: &'a str,
    nodes: Vec<NodeData<'a>>,
    open: Vec<usize>,
    errors: &'e mut Vec<ParseError>,
}

impl<'a, 'e> TreeBuilder<'a, 'e> {
    pub(crate) fn new(text: &'a str, errors: &'e mut Vec<ParseError>) -> Self {
        Self {
            text,
            nodes: Vec::new(),
            open: Vec::new(),
            errors,
        }
    }

    pub(crate) fn finish(self) -> SyntaxTree<'a> {
        debug_assert!(self.open.is_empty(), "unbalanced nodes: {:?}", self.open);
        SyntaxTree {
            text: self.text,
            nodes: self.nodes,
        }
    }

    fn push(&mut self, node_type: NodeType, value: Option<NodeValue<'a>>, span: Span) -> usize {
        let index = self.nodes.len();
        let parent = self.open.last().copied();
        self.nodes.push(NodeData {
            node_type,
            value,
            offset: span.offset,
            length: span.length,
            colon_offset: None,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(index);
        }
        index
    }
}

impl<'a> Visitor<'a> for TreeBuilder<'a, '_> {
    fn on_node_begin(
        &mut self,
        node_type: NodeType,
        offset: usize,
        start_line: usize,
        start_character: usize,
        _path: PathSupplier<'_>,
    ) {
        let span = Span {
            offset,
            length: 0,
            start_line,
            start_character,
        };
        let index = self.push(node_type, None, span);
        self.open.push(index);
    }

    fn on_node_end(&mut self, _node_type: NodeType, span: Span, colon_offset: Option<usize>) {
        if let Some(index) = self.open.pop() {
            let node = &mut self.nodes[index];
            node.length = span.length;
            node.colon_offset = colon_offset;
        }
    }

    fn on_literal_value(
        &mut self,
        node_type: NodeType,
        value: Option<NodeValue<'a>>,
        span: Span,
        _path: PathSupplier<'_>,
    ) {
        self.push(node_type, value, span);
    }

    fn on_error(&mut self, code: ParseErrorCode, span: Span) {
        self.errors.push(ParseError {
            code,
            offset: span.offset,
            length: span.length,
        });
    }
}
