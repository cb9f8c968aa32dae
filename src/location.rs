//! Structural paths and point-in-document queries.

use std::fmt;

use crate::{parse_tree, Node, NodeType, NodeValue, ParseOptions};

/// One step of a [`Path`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Segment {
    /// A singular construct, named after its node type (`"header"`,
    /// `"scope"`, `"footer-word"`, ...).
    Key(&'static str),
    /// Position among repeated constructs, e.g. the n-th footer.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => index.fmt(f),
        }
    }
}

/// Structural position in a commit message, from the root down.
pub type Path = Vec<Segment>;

/// One element of a pattern for [`Location::matches`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PathPattern<'p> {
    /// Matches [`Segment::Key`] with the same name.
    Key(&'p str),
    /// Matches [`Segment::Index`] with the same value.
    Index(usize),
    /// `*`: exactly one segment.
    AnySegment,
    /// `**`: zero or more segments.
    AnyDepth,
}

impl<'p> From<&'p str> for PathPattern<'p> {
    fn from(s: &'p str) -> Self {
        match s {
            "*" => Self::AnySegment,
            "**" => Self::AnyDepth,
            key => Self::Key(key),
        }
    }
}

impl From<usize> for PathPattern<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl PathPattern<'_> {
    fn matches_segment(&self, segment: &Segment) -> bool {
        match (self, segment) {
            (Self::Key(key), Segment::Key(other)) => key == other,
            (Self::Index(index), Segment::Index(other)) => index == other,
            (Self::AnySegment, _) => true,
            _ => false,
        }
    }
}

fn matches_path(pattern: &[PathPattern<'_>], path: &[Segment]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((PathPattern::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| matches_path(rest, &path[skip..]))
        }
        Some((head, rest)) => match path.split_first() {
            Some((segment, tail)) => head.matches_segment(segment) && matches_path(rest, tail),
            None => false,
        },
    }
}

/// Snapshot of a node reported by [`Location::previous_node`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct LocationNode<'a> {
    /// Type of the node.
    pub node_type: NodeType,
    /// Byte offset of the node.
    pub offset: usize,
    /// Byte length of the node.
    pub length: usize,
    /// Literal of the node, for leaves.
    pub value: Option<NodeValue<'a>>,
}

impl<'a> LocationNode<'a> {
    /// Text values are re-sliced from `text` so the snapshot outlives the tree.
    fn new(node: Node<'_>, text: &'a str) -> Self {
        let (offset, length) = (node.offset(), node.length());
        let value = node.value().map(|value| match value {
            NodeValue::Text(_) => NodeValue::Text(&text[offset..offset + length]),
            NodeValue::Number(n) => NodeValue::Number(n),
        });
        Self {
            node_type: node.node_type(),
            offset,
            length,
            value,
        }
    }
}

/// Where an offset lies in the structure of a commit message.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Location<'a> {
    previous_node: Option<LocationNode<'a>>,
    path: Path,
}

impl<'a> Location<'a> {
    /// The sibling preceding the innermost node at the offset.
    pub fn previous_node(&self) -> Option<LocationNode<'a>> {
        self.previous_node
    }

    /// Path from the root to the innermost node at the offset.
    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    /// Match the path against a pattern.
    ///
    /// Segments are compared positionally; `"*"` matches any one segment and
    /// `"**"` any number of segments.
    ///
    /// ```rust
    /// use git_conventional_syntax::get_location;
    ///
    /// let text = "fix(core): x\n\nRefs: 12";
    /// assert!(get_location(text, 5).matches(["header", "scope"]));
    /// assert!(get_location(text, 21).matches(["footer", "**"]));
    /// assert!(get_location(text, 21).matches(["footer", "*", "footer-word"]));
    /// ```
    pub fn matches<'p, I>(&self, pattern: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<PathPattern<'p>>,
    {
        let pattern: Vec<PathPattern<'p>> = pattern.into_iter().map(Into::into).collect();
        matches_path(&pattern, &self.path)
    }
}

/// Preference of a child when descending towards `offset`, lower wins.
///
/// Nodes that own a path segment beat trivia, an empty placeholder at the
/// offset beats a node ending at the offset, which beats a node starting
/// there.
fn rank(node: &Node<'_>, offset: usize) -> Option<u8> {
    let (start, end) = (node.offset(), node.end());
    let rank = if start == offset && end == offset {
        0
    } else if start < offset && offset <= end {
        1
    } else if start == offset {
        2
    } else {
        return None;
    };
    Some(if node.node_type().path_key().is_some() {
        rank
    } else {
        rank + 3
    })
}

/// Compute the structural location of `offset` in `text`.
///
/// The text is parsed, then the tree is descended from the root to the
/// innermost node at the offset, collecting one segment per structural level.
pub fn get_location(text: &str, offset: usize) -> Location<'_> {
    let mut errors = Vec::new();
    let Some(tree) = parse_tree(text, &mut errors, ParseOptions::default()) else {
        return Location {
            previous_node: None,
            path: Path::new(),
        };
    };

    let mut path = Path::new();
    let mut node = tree.root();
    while let Some(child) = node
        .children()
        .filter_map(|child| Some((rank(&child, offset)?, child)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, child)| child)
    {
        if let Some(key) = child.node_type().path_key() {
            path.push(Segment::Key(key));
        }
        if child.node_type() == NodeType::Footer {
            let index = node
                .children()
                .take_while(|sibling| *sibling != child)
                .filter(|sibling| sibling.node_type() == NodeType::Footer)
                .count();
            path.push(Segment::Index(index));
        }
        node = child;
    }

    let previous_node = node
        .previous_sibling()
        .map(|previous| LocationNode::new(previous, text));
    Location {
        previous_node,
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn path(text: &str, offset: usize) -> Vec<String> {
        get_location(text, offset)
            .path()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_header_paths() {
        let text = "feat(core)!: add x";
        assert_eq!(path(text, 2), vec!["header", "type"]);
        assert_eq!(path(text, 4), vec!["header", "type"]);
        assert_eq!(path(text, 6), vec!["header", "scope"]);
        assert_eq!(path(text, 9), vec!["header", "scope"]);
        assert_eq!(path(text, 10), vec!["header", "scope-paren-close"]);
        assert_eq!(path(text, 11), vec!["header", "breaking-exclamation-mark"]);
        assert_eq!(path(text, 15), vec!["header", "description"]);
        assert_eq!(path(text, 18), vec!["header", "description"]);
    }

    #[test]
    fn test_placeholder_paths() {
        assert_eq!(path("fix()", 4), vec!["header", "scope"]);
        assert_eq!(path("fix: ", 5), vec!["header", "description"]);
    }

    #[test]
    fn test_footer_paths() {
        let text = indoc! {"
            fix: x

            Refs: 12
            Reviewed-by: Z
        "};
        assert_eq!(path(text, 10), vec!["footer", "0", "footer-token"]);
        assert_eq!(path(text, 16), vec!["footer", "0", "footer-word"]);
        assert_eq!(path(text, 20), vec!["footer", "1", "footer-token"]);
        assert_eq!(path(text, 31), vec!["footer", "1", "footer-word"]);

        let location = get_location(text, 31);
        assert!(location.matches(["footer", "**"]));
        assert!(location.matches([PathPattern::from("footer"), PathPattern::Index(1), "*".into()]));
        assert!(!location.matches([PathPattern::from("footer"), PathPattern::Index(0), "**".into()]));
        assert!(!location.matches(["header", "**"]));
    }

    #[test]
    fn test_body_path() {
        let text = "fix: x\n\nsome body";
        assert_eq!(path(text, 12), vec!["body"]);
        assert!(get_location(text, 12).matches(["body"]));
        assert!(get_location(text, 12).matches(["**"]));
        assert!(!get_location(text, 12).matches(["*", "*"]));
    }

    #[test]
    fn test_empty_text() {
        let location = get_location("", 0);
        assert!(location.path().is_empty());
        assert_eq!(location.previous_node(), None);
        assert!(location.matches(Vec::<&str>::new()));
        assert!(location.matches(["**"]));
    }

    #[test]
    fn test_previous_node() {
        let location = get_location("fix(core): x", 6);
        let previous = location.previous_node().unwrap();
        assert_eq!(previous.node_type, NodeType::ScopeParenOpen);
        assert_eq!(previous.offset, 3);
        assert_eq!(previous.value, Some(NodeValue::Text("(")));

        let location = get_location("fix(core): x", 12);
        let previous = location.previous_node().unwrap();
        assert_eq!(previous.node_type, NodeType::Whitespace);
    }

    #[test]
    fn test_matches_patterns() {
        let path = vec![Segment::Key("footer"), Segment::Index(2), Segment::Key("footer-word")];
        let check = |pattern: &[PathPattern<'_>]| matches_path(pattern, &path);

        assert!(check(&["footer".into(), "**".into()]));
        assert!(check(&["**".into(), "footer-word".into()]));
        assert!(check(&["footer".into(), "*".into(), "footer-word".into()]));
        assert!(check(&[
            "footer".into(),
            PathPattern::Index(2),
            "**".into(),
            "footer-word".into()
        ]));
        assert!(!check(&["footer".into(), "*".into()]));
        assert!(!check(&["footer".into(), "footer-word".into()]));
        assert!(!check(&["footer".into(), PathPattern::Index(1), "**".into()]));
    }
}
