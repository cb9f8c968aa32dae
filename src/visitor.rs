//! Streaming access to the grammar without building a tree.

use crate::location::{Path, Segment};
use crate::{NodeType, NodeValue, ParseErrorCode};

/// Source range of a node, leaf or diagnostic.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first byte.
    pub offset: usize,
    /// Length in bytes.
    pub length: usize,
    /// Zero-based line of `offset`.
    pub start_line: usize,
    /// Zero-based byte column of `offset`.
    pub start_character: usize,
}

impl Span {
    /// Offset one past the last byte.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Gives access to the structural path of the construct a callback reports.
///
/// The path is only materialized when [`PathSupplier::path`] is called.
#[derive(Debug, Clone, Copy)]
pub struct PathSupplier<'p> {
    segments: &'p [Segment],
}

impl<'p> PathSupplier<'p> {
    pub(crate) fn new(segments: &'p [Segment]) -> Self {
        Self { segments }
    }

    /// The path of the current construct, including its own segment.
    pub fn path(&self) -> Path {
        self.segments.to_vec()
    }

    /// Number of segments in the path.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

/// Callbacks invoked by [`visit`][crate::visit] while parsing.
///
/// Composite constructs are reported through a begin/end pair, leaves through
/// [`Visitor::on_literal_value`], in document order. Every callback has an
/// empty default implementation.
#[allow(unused_variables)]
pub trait Visitor<'a> {
    /// A composite node starts at `offset`.
    fn on_node_begin(
        &mut self,
        node_type: NodeType,
        offset: usize,
        start_line: usize,
        start_character: usize,
        path: PathSupplier<'_>,
    ) {
    }

    /// The composite node opened by the matching [`Visitor::on_node_begin`]
    /// ends. `colon_offset` is set for headers and footer tokens followed by
    /// a colon.
    fn on_node_end(&mut self, node_type: NodeType, span: Span, colon_offset: Option<usize>) {}

    /// A leaf node. Placeholders for missing constructs are zero-length and
    /// carry no value.
    fn on_literal_value(
        &mut self,
        node_type: NodeType,
        value: Option<NodeValue<'a>>,
        span: Span,
        path: PathSupplier<'_>,
    ) {
    }

    /// A syntax problem.
    fn on_error(&mut self, code: ParseErrorCode, span: Span) {}
}
