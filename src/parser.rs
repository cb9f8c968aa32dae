use unicase::UniCase;
use winnow::ascii::space1;
use winnow::combinator::{alt, separated, trace};
use winnow::token::take_while;
use winnow::{ModalResult, Parser as _};

use crate::location::Segment;
use crate::node::TreeBuilder;
use crate::scanner::{is_word_char, ScanError, Scanner, SyntaxKind};
use crate::visitor::{PathSupplier, Span, Visitor};
use crate::{FooterSeparator, NodeType, NodeValue, ParseError, ParseErrorCode, SyntaxTree};

pub(crate) const BREAKING_PHRASE: &str = "BREAKING CHANGE";
pub(crate) const BREAKING_TOKEN: &str = "BREAKING-CHANGE";

/// Knobs for [`parse_tree`] and [`visit`].
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct ParseOptions {
    /// Report [`ParseErrorCode::InvalidCommentToken`] for `#` comment lines.
    pub disallow_comments: bool,
    /// Report [`ParseErrorCode::TypeExpected`] when the message has nothing
    /// but whitespace and comments.
    pub disallow_empty_content: bool,
}

/// Parse `text` into a syntax tree.
///
/// Problems are appended to `errors`; a best-effort tree is returned for any
/// text that is not blank. Blank text yields `None`.
///
/// ```rust
/// use git_conventional_syntax::{parse_tree, NodeType, ParseOptions};
///
/// let mut errors = Vec::new();
/// let tree = parse_tree("feat add x", &mut errors, ParseOptions::default()).unwrap();
/// assert_eq!(tree.root().length(), 10);
/// assert_eq!(errors[0].offset, 4);
/// ```
pub fn parse_tree<'a>(
    text: &'a str,
    errors: &mut Vec<ParseError>,
    options: ParseOptions,
) -> Option<SyntaxTree<'a>> {
    let mut builder = TreeBuilder::new(text, errors);
    visit(text, &mut builder, options);
    let tree = builder.finish();
    (!text.trim().is_empty()).then_some(tree)
}

/// Parse `text`, reporting every construct to `visitor` instead of building a
/// tree.
pub fn visit<'a, V: Visitor<'a>>(text: &'a str, visitor: &mut V, options: ParseOptions) {
    Parser::new(text, visitor, options).parse_message();
}

/// Where a footer starts on a line, as recognized by [`footer_start`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct FooterStart {
    pub(crate) token_len: usize,
    pub(crate) breaking: bool,
    pub(crate) separator: FooterSeparator,
}

// <footer-start>    ::= "BREAKING CHANGE", <separator>
//                    |  <token>, <separator>
pub(crate) fn footer_start(line: &str) -> Option<FooterStart> {
    let (_, (token, separator)) = trace(
        "footer_start",
        alt(((BREAKING_PHRASE, separator), (token, separator))),
    )
    .parse_peek(line)
    .ok()?;
    Some(FooterStart {
        token_len: token.len(),
        breaking: token == BREAKING_PHRASE || UniCase::new(token) == UniCase::new(BREAKING_TOKEN),
        separator,
    })
}

// <token>           ::= <word>, ("-", <word>)*
pub(crate) fn token<'i>(i: &mut &'i str) -> ModalResult<&'i str> {
    trace(
        "token",
        separated::<_, _, (), _, _, _, _>(1.., take_while(1.., is_word_char), '-').take(),
    )
    .parse_next(i)
}

// <separator>       ::= ":", <whitespace>+ | " #"
fn separator(i: &mut &str) -> ModalResult<FooterSeparator> {
    trace(
        "separator",
        alt((
            (':', space1).value(FooterSeparator::Value),
            (' ', '#').value(FooterSeparator::Ref),
        )),
    )
    .parse_next(i)
}

#[derive(Debug)]
struct OpenNode {
    node_type: NodeType,
    offset: usize,
    line: usize,
    character: usize,
    segments: usize,
}

struct Parser<'a, 'v, V> {
    text: &'a str,
    scanner: Scanner<'a>,
    visitor: &'v mut V,
    options: ParseOptions,
    path: Vec<Segment>,
    open: Vec<OpenNode>,
    footers: usize,
}

impl<'a, 'v, V: Visitor<'a>> Parser<'a, 'v, V> {
    fn new(text: &'a str, visitor: &'v mut V, options: ParseOptions) -> Self {
        Self {
            text,
            scanner: Scanner::new(text),
            visitor,
            options,
            path: Vec::new(),
            open: Vec::new(),
            footers: 0,
        }
    }

    // <message>         ::= <trivia>*, [<header>, [<newline>, [<body>], <footer>*]], <trivia>*
    fn parse_message(&mut self) {
        self.begin(NodeType::Message, &[]);
        self.scan_next();
        self.parse_trivia_lines();

        if self.token() == SyntaxKind::Eof {
            if self.options.disallow_empty_content {
                self.error(ParseErrorCode::TypeExpected, self.here());
            }
        } else {
            self.parse_header();
            self.parse_trailer();
        }
        self.end(None);
    }

    // <header>          ::= <type>, [<scope>], ["!"], ":", <whitespace>*, <description>
    fn parse_header(&mut self) {
        self.begin(NodeType::Header, &[Segment::Key("header")]);

        if self.token() == SyntaxKind::WordLiteral {
            self.single_leaf(NodeType::Type);
        } else {
            self.missing(ParseErrorCode::TypeExpected, NodeType::Type);
        }

        if self.token() == SyntaxKind::WhiteSpace && self.peek() == SyntaxKind::OpenParenToken {
            self.token_leaf();
        }
        if self.token() == SyntaxKind::OpenParenToken {
            self.parse_scope();
        }

        if self.token() == SyntaxKind::ExclamationMarkToken
            && self.peek() == SyntaxKind::ColonToken
        {
            self.single_leaf(NodeType::BreakingExclamationMark);
        }

        let colon_offset = self.parse_header_colon();

        if self.token() == SyntaxKind::WhiteSpace {
            self.token_leaf();
        }
        if !self.span_leaf(NodeType::Description, |_| false) {
            self.missing(ParseErrorCode::DescriptionExpected, NodeType::Description);
        }

        self.end(colon_offset);
    }

    // <scope>           ::= "(", <any UTF8-octets except newline or parens or ":">+, ")"
    fn parse_scope(&mut self) {
        self.single_leaf(NodeType::ScopeParenOpen);
        let scope_end = |kind: SyntaxKind| {
            matches!(
                kind,
                SyntaxKind::CloseParenToken | SyntaxKind::OpenParenToken | SyntaxKind::ColonToken
            )
        };
        if !self.span_leaf(NodeType::Scope, scope_end) {
            self.missing(ParseErrorCode::ScopeExpected, NodeType::Scope);
        }
        if self.token() == SyntaxKind::CloseParenToken {
            self.single_leaf(NodeType::ScopeParenClose);
        } else {
            self.missing(ParseErrorCode::CloseParenExpected, NodeType::ScopeParenClose);
        }
    }

    fn parse_header_colon(&mut self) -> Option<usize> {
        if self.token() != SyntaxKind::ColonToken {
            self.error(ParseErrorCode::ColonExpected, self.here());
            if !self.colon_ahead() {
                self.leaf(NodeType::Symbol, None, self.here());
                return None;
            }
            while self.token() != SyntaxKind::ColonToken {
                self.token_leaf();
            }
        }
        let offset = self.scanner.token_offset();
        self.token_leaf();
        Some(offset)
    }

    /// Everything after the header line: body, footers and blank lines.
    fn parse_trailer(&mut self) {
        if self.token() == SyntaxKind::Eof {
            return;
        }
        self.token_leaf();

        let blank = self.parse_trivia_lines();
        if self.token() != SyntaxKind::Eof && !blank {
            self.error(ParseErrorCode::BlankLineExpected, self.here());
        }

        while self.token() != SyntaxKind::Eof {
            match self.footer_start_here() {
                Some(start) => self.parse_footer(start),
                None => self.parse_body(),
            }
            self.parse_trivia_lines();
        }
    }

    /// Consume blank and comment lines. Returns whether a blank line was
    /// among them.
    fn parse_trivia_lines(&mut self) -> bool {
        let mut blank = false;
        let mut line_has_comment = false;
        loop {
            match self.token() {
                SyntaxKind::LineBreakToken => {
                    blank |= !line_has_comment;
                    line_has_comment = false;
                }
                SyntaxKind::Comment => line_has_comment = true,
                SyntaxKind::WhiteSpace if self.at_line_end_after_token() => {}
                _ => return blank,
            }
            self.token_leaf();
        }
    }

    // <body>            ::= <any UTF8-octets>* until a <footer-start> line
    fn parse_body(&mut self) {
        self.begin(NodeType::Body, &[Segment::Key("body")]);
        loop {
            self.line_leaves();
            let Some(next_line) = self.next_content_line() else {
                break;
            };
            while self.scanner.token_offset() < next_line {
                self.token_leaf();
            }
        }
        self.end(None);
    }

    // <footer>          ::= <token>, <separator>, <whitespace>*, <value>
    fn parse_footer(&mut self, start: FooterStart) {
        let index = self.footers;
        self.footers += 1;
        self.begin(
            NodeType::Footer,
            &[Segment::Key("footer"), Segment::Index(index)],
        );

        self.begin(NodeType::FooterToken, &[Segment::Key("footer-token")]);
        let token_end = self.scanner.token_offset() + start.token_len;
        if start.breaking {
            let mut span = self.token_span();
            while self.scanner.token_offset() < token_end {
                self.scan_next();
            }
            span.length = token_end - span.offset;
            let value = NodeValue::Text(&self.text[span.offset..token_end]);
            self.leaf(NodeType::BreakingChangeLiteral, Some(value), span);
        } else {
            while self.scanner.token_offset() < token_end {
                match self.token() {
                    SyntaxKind::WordLiteral | SyntaxKind::NumericLiteral => {
                        self.single_leaf(NodeType::FooterWordToken);
                    }
                    _ => self.token_leaf(),
                }
            }
        }
        let colon_offset =
            (self.token() == SyntaxKind::ColonToken).then(|| self.scanner.token_offset());
        debug_assert_eq!(
            colon_offset.is_some(),
            start.separator == FooterSeparator::Value
        );
        self.end(colon_offset);

        // `: ` or ` #`, as recognized by `footer_start`
        self.token_leaf();
        self.token_leaf();

        let mut lines = 0;
        loop {
            if self.span_leaf(NodeType::FooterWord, |_| false) {
                lines += 1;
            } else if lines == 0 {
                self.missing(ParseErrorCode::FooterValueExpected, NodeType::FooterWord);
            }
            let Some(next_line) = self.next_content_line() else {
                break;
            };
            while self.scanner.token_offset() < next_line {
                self.token_leaf();
            }
            if self.token() == SyntaxKind::WhiteSpace {
                self.token_leaf();
            }
        }

        self.end(None);
    }

    /// Emit the rest of the current line as generic leaves.
    fn line_leaves(&mut self) {
        while !matches!(
            self.token(),
            SyntaxKind::LineBreakToken | SyntaxKind::Eof
        ) {
            self.token_leaf();
        }
    }

    /// Offset of the next line with content, when that line continues the
    /// current body or footer rather than starting a footer.
    fn next_content_line(&self) -> Option<usize> {
        let mut probe = self.scanner.clone();
        let mut line_start = probe.token_offset();
        loop {
            match probe.token() {
                SyntaxKind::Eof => return None,
                SyntaxKind::LineBreakToken => line_start = probe.position(),
                SyntaxKind::WhiteSpace | SyntaxKind::Comment => {}
                _ => {
                    return footer_start(self.line_at(line_start))
                        .is_none()
                        .then_some(line_start)
                }
            }
            probe.scan();
        }
    }

    fn footer_start_here(&self) -> Option<FooterStart> {
        footer_start(self.line_at(self.scanner.token_offset()))
    }

    fn line_at(&self, offset: usize) -> &'a str {
        let rest = &self.text[offset..];
        let end = rest.find(['\n', '\r']).unwrap_or(rest.len());
        &rest[..end]
    }

    fn at_line_end_after_token(&self) -> bool {
        let rest = &self.text[self.scanner.position()..];
        rest.is_empty() || rest.starts_with(['\n', '\r'])
    }

    /// Whether a `:` follows on the current line.
    fn colon_ahead(&self) -> bool {
        let mut probe = self.scanner.clone();
        loop {
            match probe.token() {
                SyntaxKind::ColonToken => return true,
                SyntaxKind::LineBreakToken | SyntaxKind::Eof => return false,
                _ => {
                    probe.scan();
                }
            }
        }
    }

    fn peek(&self) -> SyntaxKind {
        self.scanner.clone().scan()
    }

    fn token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    fn scan_next(&mut self) {
        self.scanner.scan();
        let code = match self.scanner.token_error() {
            ScanError::None => None,
            ScanError::InvalidUnicode => Some(ParseErrorCode::InvalidUnicode),
            ScanError::InvalidCharacter => Some(ParseErrorCode::InvalidCharacter),
        };
        if let Some(code) = code {
            self.error(code, self.token_span());
        }
    }

    fn token_span(&self) -> Span {
        Span {
            offset: self.scanner.token_offset(),
            length: self.scanner.token_length(),
            start_line: self.scanner.token_start_line(),
            start_character: self.scanner.token_start_character(),
        }
    }

    /// Empty span at the current token.
    fn here(&self) -> Span {
        Span {
            length: 0,
            ..self.token_span()
        }
    }

    fn error(&mut self, code: ParseErrorCode, span: Span) {
        self.visitor.on_error(code, span);
    }

    fn begin(&mut self, node_type: NodeType, segments: &[Segment]) {
        let span = self.here();
        self.path.extend_from_slice(segments);
        self.visitor.on_node_begin(
            node_type,
            span.offset,
            span.start_line,
            span.start_character,
            PathSupplier::new(&self.path),
        );
        self.open.push(OpenNode {
            node_type,
            offset: span.offset,
            line: span.start_line,
            character: span.start_character,
            segments: segments.len(),
        });
    }

    /// Close the innermost open node at the start of the current token.
    fn end(&mut self, colon_offset: Option<usize>) {
        let Some(node) = self.open.pop() else {
            return;
        };
        let span = Span {
            offset: node.offset,
            length: self.scanner.token_offset() - node.offset,
            start_line: node.line,
            start_character: node.character,
        };
        self.visitor.on_node_end(node.node_type, span, colon_offset);
        self.path.truncate(self.path.len() - node.segments);
    }

    fn leaf(&mut self, node_type: NodeType, value: Option<NodeValue<'a>>, span: Span) {
        let key = node_type.path_key();
        if let Some(key) = key {
            self.path.push(Segment::Key(key));
        }
        self.visitor
            .on_literal_value(node_type, value, span, PathSupplier::new(&self.path));
        if key.is_some() {
            self.path.pop();
        }
    }

    /// Zero-length placeholder for a construct that is missing.
    fn missing(&mut self, code: ParseErrorCode, node_type: NodeType) {
        let span = self.here();
        self.error(code, span);
        self.leaf(node_type, None, span);
    }

    /// Emit the current token as a leaf of `node_type` and advance.
    fn single_leaf(&mut self, node_type: NodeType) {
        let span = self.token_span();
        let value = NodeValue::Text(self.scanner.token_value());
        self.leaf(node_type, Some(value), span);
        self.scan_next();
    }

    /// Emit tokens up to the end of the line, or a token matching `stop`, as
    /// one leaf. Returns `false` when there was nothing to emit.
    fn span_leaf(&mut self, node_type: NodeType, stop: impl Fn(SyntaxKind) -> bool) -> bool {
        let mut span = self.token_span();
        while !matches!(
            self.token(),
            SyntaxKind::LineBreakToken | SyntaxKind::Eof
        ) && !stop(self.token())
        {
            self.scan_next();
        }
        let end = self.scanner.token_offset();
        if end == span.offset {
            return false;
        }
        span.length = end - span.offset;
        let value = NodeValue::Text(&self.text[span.offset..end]);
        self.leaf(node_type, Some(value), span);
        true
    }

    /// Emit the current token as a word, number, symbol or whitespace leaf
    /// and advance.
    fn token_leaf(&mut self) {
        let span = self.token_span();
        let text = self.scanner.token_value();
        let (node_type, value) = match self.token() {
            SyntaxKind::Eof => return,
            SyntaxKind::WordLiteral => (NodeType::Word, Some(NodeValue::Text(text))),
            SyntaxKind::NumericLiteral => match self.scanner.token_number() {
                Some(n) => (NodeType::Number, Some(NodeValue::Number(n))),
                None => {
                    self.error(ParseErrorCode::InvalidNumberFormat, span);
                    (NodeType::Number, None)
                }
            },
            SyntaxKind::Comment => {
                if self.options.disallow_comments {
                    self.error(ParseErrorCode::InvalidCommentToken, span);
                }
                (NodeType::Whitespace, Some(NodeValue::Text(text)))
            }
            SyntaxKind::WhiteSpace | SyntaxKind::LineBreakToken => {
                (NodeType::Whitespace, Some(NodeValue::Text(text)))
            }
            SyntaxKind::OpenParenToken
            | SyntaxKind::CloseParenToken
            | SyntaxKind::ExclamationMarkToken
            | SyntaxKind::ColonToken
            | SyntaxKind::HashMarkToken
            | SyntaxKind::Symbol => (NodeType::Symbol, Some(NodeValue::Text(text))),
        };
        self.leaf(node_type, value, span);
        self.scan_next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;
    use indoc::indoc;

    fn parse(text: &str) -> (SyntaxTree<'_>, Vec<ParseError>) {
        let mut errors = Vec::new();
        let tree = parse_tree(text, &mut errors, ParseOptions::default()).unwrap();
        (tree, errors)
    }

    fn codes(errors: &[ParseError]) -> Vec<(ParseErrorCode, usize)> {
        errors.iter().map(|e| (e.code, e.offset)).collect()
    }

    fn shape(node: Node<'_>) -> Vec<(NodeType, &str)> {
        node.children().map(|c| (c.node_type(), c.text())).collect()
    }

    fn round_trip(text: &str) {
        let mut errors = Vec::new();
        let Some(tree) = parse_tree(text, &mut errors, ParseOptions::default()) else {
            assert!(text.trim().is_empty());
            return;
        };
        let root = tree.root();
        assert_eq!(root.node_type(), NodeType::Message);
        assert_eq!((root.offset(), root.length()), (0, text.len()));
        let leaves: String = root.leaves().map(|leaf| leaf.text()).collect();
        assert_eq!(leaves, text);
    }

    mod footer_start {
        use super::*;

        #[test]
        fn test_footer_start() {
            let start = |line| footer_start(line).map(|s| (s.token_len, s.breaking, s.separator));

            // valid
            assert_eq!(start("hello: world"), Some((5, false, FooterSeparator::Value)));
            assert_eq!(start("BREAKING CHANGE: woops!"), Some((15, true, FooterSeparator::Value)));
            assert_eq!(start("BREAKING-CHANGE: broken"), Some((15, true, FooterSeparator::Value)));
            assert_eq!(
                start("Co-Authored-By: Marge Simpson <marge@simpsons.com>"),
                Some((14, false, FooterSeparator::Value))
            );
            assert_eq!(start("Closes #12"), Some((6, false, FooterSeparator::Ref)));
            assert_eq!(start("Issue-42:\tfoo"), Some((8, false, FooterSeparator::Value)));

            // invalid
            assert_eq!(start(""), None);
            assert_eq!(start(" "), None);
            assert_eq!(start("foo"), None);
            assert_eq!(start("foo:"), None);
            assert_eq!(start("foo:bar"), None);
            assert_eq!(start("foo "), None);
            assert_eq!(start(" foo: bar"), None);
            assert_eq!(start("foo bar: baz"), None);
            assert_eq!(start("Foo-: bar"), None);
            assert_eq!(start("BREAKING CHANGE"), None);
            assert_eq!(start("BREAKING CHANGE:"), None);
            assert_eq!(start("feat(core): x"), None);
        }

        #[test]
        fn test_token() {
            let p = |i| token.parse_peek(i);

            assert_eq!(p("foo"), Ok(("", "foo")));
            assert_eq!(p("foo-bar: x"), Ok((": x", "foo-bar")));
            assert_eq!(p("foo-: x"), Ok(("-: x", "foo")));
            assert_eq!(p("x86 #1"), Ok((" #1", "x86")));
            assert!(p("-foo").is_err());
            assert!(p("").is_err());
        }
    }

    mod header {
        use super::*;

        #[test]
        fn test_well_formed_header() {
            let (tree, errors) = parse("feat(core)!: add x");
            assert_eq!(errors, vec![]);

            let header = tree.root().child(NodeType::Header).unwrap();
            assert_eq!(header.colon_offset(), Some(11));
            assert_eq!(
                shape(header),
                vec![
                    (NodeType::Type, "feat"),
                    (NodeType::ScopeParenOpen, "("),
                    (NodeType::Scope, "core"),
                    (NodeType::ScopeParenClose, ")"),
                    (NodeType::BreakingExclamationMark, "!"),
                    (NodeType::Symbol, ":"),
                    (NodeType::Whitespace, " "),
                    (NodeType::Description, "add x"),
                ]
            );
            let ty = header.child(NodeType::Type).unwrap();
            assert_eq!(ty.value(), Some(NodeValue::Text("feat")));
            let description = header.child(NodeType::Description).unwrap();
            assert_eq!(description.value(), Some(NodeValue::Text("add x")));
        }

        #[test]
        fn test_missing_colon() {
            let (tree, errors) = parse("feat add x");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::ColonExpected, 4)]);

            let root = tree.root();
            assert_eq!((root.offset(), root.length()), (0, 10));
            let header = root.child(NodeType::Header).unwrap();
            assert_eq!(header.colon_offset(), None);
            assert_eq!(
                shape(header),
                vec![
                    (NodeType::Type, "feat"),
                    (NodeType::Symbol, ""),
                    (NodeType::Whitespace, " "),
                    (NodeType::Description, "add x"),
                ]
            );
        }

        #[test]
        fn test_colon_later_on_line() {
            let (tree, errors) = parse("feat bar: baz");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::ColonExpected, 4)]);
            let header = tree.root().child(NodeType::Header).unwrap();
            assert_eq!(header.colon_offset(), Some(8));
            assert_eq!(
                shape(header),
                vec![
                    (NodeType::Type, "feat"),
                    (NodeType::Whitespace, " "),
                    (NodeType::Word, "bar"),
                    (NodeType::Symbol, ":"),
                    (NodeType::Whitespace, " "),
                    (NodeType::Description, "baz"),
                ]
            );

            let (_, errors) = parse("foo : bar");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::ColonExpected, 3)]);
        }

        #[test]
        fn test_exclamation_mark_only_before_colon() {
            let (tree, errors) = parse("feat!x: y");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::ColonExpected, 4)]);
            let header = tree.root().child(NodeType::Header).unwrap();
            assert_eq!(header.child(NodeType::BreakingExclamationMark), None);

            let (tree, errors) = parse("fix: wow!: really");
            assert_eq!(errors, vec![]);
            let header = tree.root().child(NodeType::Header).unwrap();
            assert_eq!(header.child(NodeType::BreakingExclamationMark), None);
            assert_eq!(
                header.child(NodeType::Description).unwrap().text(),
                "wow!: really"
            );

            // Without a colon the `!` is ordinary description text.
            let (tree, errors) = parse("feat!");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::ColonExpected, 4)]);
            let header = tree.root().child(NodeType::Header).unwrap();
            assert_eq!(header.child(NodeType::BreakingExclamationMark), None);
            assert_eq!(header.child(NodeType::Description).unwrap().text(), "!");

            let (tree, _) = parse("feat!\n\nbody");
            let header = tree.root().child(NodeType::Header).unwrap();
            assert_eq!(header.child(NodeType::BreakingExclamationMark), None);
        }

        #[test]
        fn test_scope_errors() {
            let (tree, errors) = parse("fix(): x");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::ScopeExpected, 4)]);
            let scope = tree
                .root()
                .child(NodeType::Header)
                .unwrap()
                .child(NodeType::Scope)
                .unwrap();
            assert_eq!((scope.offset(), scope.length(), scope.value()), (4, 0, None));

            let (tree, errors) = parse("fix(core: x");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::CloseParenExpected, 8)]);
            let header = tree.root().child(NodeType::Header).unwrap();
            assert_eq!(header.child(NodeType::Scope).unwrap().text(), "core");
            assert_eq!(header.child(NodeType::ScopeParenClose).unwrap().length(), 0);
            assert_eq!(header.colon_offset(), Some(8));

            let (tree, errors) = parse("fix (core): x");
            assert_eq!(errors, vec![]);
            let header = tree.root().child(NodeType::Header).unwrap();
            assert_eq!(header.child(NodeType::Scope).unwrap().text(), "core");

            let (tree, errors) = parse("feat(my scope): x");
            assert_eq!(errors, vec![]);
            let header = tree.root().child(NodeType::Header).unwrap();
            assert_eq!(header.child(NodeType::Scope).unwrap().text(), "my scope");
        }

        #[test]
        fn test_missing_type_and_description() {
            let (tree, errors) = parse("(core): x");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::TypeExpected, 0)]);
            let header = tree.root().child(NodeType::Header).unwrap();
            let ty = header.child(NodeType::Type).unwrap();
            assert_eq!((ty.offset(), ty.length()), (0, 0));

            let (_, errors) = parse("feat:");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::DescriptionExpected, 5)]);

            let (_, errors) = parse("feat:  ");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::DescriptionExpected, 7)]);

            let (tree, errors) = parse("f");
            assert_eq!(
                codes(&errors),
                vec![
                    (ParseErrorCode::ColonExpected, 1),
                    (ParseErrorCode::DescriptionExpected, 1)
                ]
            );
            assert_eq!(tree.root().length(), 1);
        }

        #[test]
        fn test_description_keeps_special_characters() {
            let (tree, errors) = parse("type: hello world (#1)");
            assert_eq!(errors, vec![]);
            let header = tree.root().child(NodeType::Header).unwrap();
            assert_eq!(
                header.child(NodeType::Description).unwrap().text(),
                "hello world (#1)"
            );
        }
    }

    mod message {
        use super::*;

        #[test]
        fn test_footer_extraction() {
            let (tree, errors) = parse("fix(core): correct bug\n\nBREAKING CHANGE: old API removed");
            assert_eq!(errors, vec![]);
            let root = tree.root();
            assert_eq!(root.child(NodeType::Body), None);

            let footers: Vec<_> = root
                .children()
                .filter(|c| c.node_type() == NodeType::Footer)
                .collect();
            assert_eq!(footers.len(), 1);
            let token = footers[0].child(NodeType::FooterToken).unwrap();
            assert_eq!(token.text(), "BREAKING CHANGE");
            assert_eq!(token.colon_offset(), Some(39));
            let literal = token.child(NodeType::BreakingChangeLiteral).unwrap();
            assert_eq!(literal.value(), Some(NodeValue::Text("BREAKING CHANGE")));
            let word = footers[0].child(NodeType::FooterWord).unwrap();
            assert_eq!(word.value(), Some(NodeValue::Text("old API removed")));
        }

        #[test]
        fn test_body_and_footers() {
            let text = indoc! {"
                docs(example)!: add tested usage example

                This example is tested. Having this
                example helps people.

                BREAKING CHANGE: Going from nothing to something,
                meaning anyone doing nothing before

                suddenly has something to do.
                Co-Authored-By: Lisa Simpson <lisa@simpsons.fam>
                Closes #12
            "};
            let (tree, errors) = parse(text);
            assert_eq!(errors, vec![]);
            let root = tree.root();

            assert_eq!(
                root.child(NodeType::Body).unwrap().text(),
                "This example is tested. Having this\nexample helps people."
            );

            let footers: Vec<_> = root
                .children()
                .filter(|c| c.node_type() == NodeType::Footer)
                .collect();
            assert_eq!(footers.len(), 3);

            let words: Vec<_> = footers[0]
                .children()
                .filter(|c| c.node_type() == NodeType::FooterWord)
                .map(|c| c.text())
                .collect();
            assert_eq!(
                words,
                vec![
                    "Going from nothing to something,",
                    "meaning anyone doing nothing before",
                    "suddenly has something to do.",
                ]
            );

            let token = footers[1].child(NodeType::FooterToken).unwrap();
            assert_eq!(
                shape(token),
                vec![
                    (NodeType::FooterWordToken, "Co"),
                    (NodeType::Symbol, "-"),
                    (NodeType::FooterWordToken, "Authored"),
                    (NodeType::Symbol, "-"),
                    (NodeType::FooterWordToken, "By"),
                ]
            );

            let token = footers[2].child(NodeType::FooterToken).unwrap();
            assert_eq!(token.text(), "Closes");
            assert_eq!(token.colon_offset(), None);
            assert_eq!(footers[2].child(NodeType::FooterWord).unwrap().text(), "12");
            assert_eq!(footers[2].text(), "Closes #12");
        }

        #[test]
        fn test_footer_errors_do_not_block_later_footers() {
            let text = "fix: x\n\nRefs: \nAcked-by: Bart";
            let (tree, errors) = parse(text);
            assert_eq!(codes(&errors), vec![(ParseErrorCode::FooterValueExpected, 14)]);
            let footers: Vec<_> = tree
                .root()
                .children()
                .filter(|c| c.node_type() == NodeType::Footer)
                .collect();
            assert_eq!(footers.len(), 2);
            assert_eq!(footers[1].child(NodeType::FooterWord).unwrap().text(), "Bart");
        }

        #[test]
        fn test_blank_line_expected() {
            let (tree, errors) = parse("fix: x\nbody right away");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::BlankLineExpected, 7)]);
            assert_eq!(
                tree.root().child(NodeType::Body).unwrap().text(),
                "body right away"
            );
        }

        #[test]
        fn test_trailing_newlines() {
            for text in [
                "type: hello world\n",
                "type: hello world\n\n",
                "type: hello world\n\n\n",
                "type: hello world\r\n\r\n",
            ] {
                let (tree, errors) = parse(text);
                assert_eq!(errors, vec![], "{text:?}");
                assert_eq!(tree.root().child(NodeType::Body), None, "{text:?}");
                round_trip(text);
            }
        }

        #[test]
        fn test_comments() {
            let text = "# leading comment\nfix: x\n\n# Please enter the message\nbody\n# more\n";
            let (tree, errors) = parse(text);
            assert_eq!(errors, vec![]);
            let root = tree.root();
            assert_eq!(root.child(NodeType::Header).unwrap().offset(), 18);
            assert_eq!(root.child(NodeType::Body).unwrap().text(), "body");

            let mut errors = Vec::new();
            let options = ParseOptions {
                disallow_comments: true,
                ..ParseOptions::default()
            };
            parse_tree(text, &mut errors, options).unwrap();
            assert_eq!(
                codes(&errors),
                vec![
                    (ParseErrorCode::InvalidCommentToken, 0),
                    (ParseErrorCode::InvalidCommentToken, 26),
                    (ParseErrorCode::InvalidCommentToken, 58),
                ]
            );
        }

        #[test]
        fn test_empty_content() {
            let mut errors = Vec::new();
            assert!(parse_tree("", &mut errors, ParseOptions::default()).is_none());
            assert!(parse_tree(" \n\t\n", &mut errors, ParseOptions::default()).is_none());
            assert_eq!(errors, vec![]);

            let options = ParseOptions {
                disallow_empty_content: true,
                ..ParseOptions::default()
            };
            assert!(parse_tree("", &mut errors, options).is_none());
            assert_eq!(codes(&errors), vec![(ParseErrorCode::TypeExpected, 0)]);

            let mut errors = Vec::new();
            let tree = parse_tree("# only a comment", &mut errors, ParseOptions::default()).unwrap();
            assert_eq!(errors, vec![]);
            assert_eq!(tree.root().child(NodeType::Header), None);
        }

        #[test]
        fn test_scan_errors_are_reported() {
            let (tree, errors) = parse("fix: a\u{7}b\n\nbody \u{FFFD}");
            assert_eq!(
                codes(&errors),
                vec![
                    (ParseErrorCode::InvalidCharacter, 6),
                    (ParseErrorCode::InvalidUnicode, 15),
                ]
            );
            let header = tree.root().child(NodeType::Header).unwrap();
            assert_eq!(header.child(NodeType::Description).unwrap().text(), "a\u{7}b");
        }

        #[test]
        fn test_number_overflow() {
            let (tree, errors) = parse("fix: x\n\n123456789012345678901234567890");
            assert_eq!(codes(&errors), vec![(ParseErrorCode::InvalidNumberFormat, 8)]);
            let body = tree.root().child(NodeType::Body).unwrap();
            assert_eq!(body.child(NodeType::Number).unwrap().value(), None);
        }
    }

    mod properties {
        use super::*;

        const SAMPLES: &[&str] = &[
            "feat(core)!: add x",
            "feat add x",
            "fix(core): x",
            "fix(core): correct bug\n\nBREAKING CHANGE: old API removed",
            "(",
            ")",
            "!",
            ":",
            "#",
            " feat: x",
            "feat(: x",
            "feat(a(b)): x",
            "feat!x: y",
            "a\r\nb\rc\n",
            "fix: x\n\n\n  indented body\n\tand tabs\n\nCloses #1\nRefs:  a\n  b\n",
            "fix: x\nRefs: 1",
            "Refs: 1",
            "fix: \u{0}\u{FFFD}\n\n# c\n#\n",
            "fix: 99999999999999999999999 items",
            "héllo(wörld): ünïcode\n\nbödy\n\nSigned-off-by: Ä <a@b>",
        ];

        #[test]
        fn test_leaves_reproduce_text() {
            for text in SAMPLES {
                round_trip(text);
            }
        }

        fn check_structure(node: Node<'_>) {
            let mut previous_end = node.offset();
            for child in node.children() {
                assert_eq!(child.parent(), Some(node));
                assert!(previous_end <= child.offset(), "{child:?} overlaps");
                assert!(child.end() <= node.end(), "{child:?} exceeds {node:?}");
                assert!(child.value().is_none() || child.children().len() == 0);
                previous_end = child.end();
                check_structure(child);
            }
        }

        #[test]
        fn test_malformed_trees_are_well_formed() {
            for text in SAMPLES {
                let (tree, _) = parse(text);
                let root = tree.root();
                assert_eq!(root.parent(), None);
                assert_eq!((root.offset(), root.length()), (0, text.len()), "{text:?}");
                check_structure(root);
            }
        }

        #[test]
        fn test_idempotent() {
            for text in SAMPLES {
                let (first, first_errors) = parse(text);
                let (second, second_errors) = parse(text);
                assert_eq!(first, second);
                assert_eq!(first_errors, second_errors);
            }
        }

        #[derive(Default)]
        struct Recorder {
            events: Vec<(NodeType, usize, usize, Option<u64>, usize)>,
            depth: usize,
            errors: usize,
            paths: Vec<Vec<Segment>>,
        }

        impl<'a> Visitor<'a> for Recorder {
            fn on_node_begin(
                &mut self,
                _node_type: NodeType,
                _offset: usize,
                _start_line: usize,
                _start_character: usize,
                path: PathSupplier<'_>,
            ) {
                self.depth += 1;
                self.paths.push(path.path());
            }

            fn on_node_end(&mut self, node_type: NodeType, span: Span, _colon_offset: Option<usize>) {
                self.depth -= 1;
                self.events
                    .push((node_type, span.offset, span.length, None, self.depth));
            }

            fn on_literal_value(
                &mut self,
                node_type: NodeType,
                value: Option<NodeValue<'a>>,
                span: Span,
                _path: PathSupplier<'_>,
            ) {
                let number = value.and_then(|v| v.as_number());
                self.events
                    .push((node_type, span.offset, span.length, number, self.depth));
            }

            fn on_error(&mut self, _code: ParseErrorCode, _span: Span) {
                self.errors += 1;
            }
        }

        fn post_order(
            node: Node<'_>,
            depth: usize,
            out: &mut Vec<(NodeType, usize, usize, Option<u64>, usize)>,
        ) {
            for child in node.children() {
                post_order(child, depth + 1, out);
            }
            let number = node.value().and_then(|v| v.as_number());
            out.push((node.node_type(), node.offset(), node.length(), number, depth));
        }

        #[test]
        fn test_visitor_matches_tree() {
            for text in SAMPLES {
                let mut recorder = Recorder::default();
                visit(text, &mut recorder, ParseOptions::default());
                assert_eq!(recorder.depth, 0);

                let (tree, errors) = parse(text);
                let mut expected = Vec::new();
                post_order(tree.root(), 0, &mut expected);
                assert_eq!(recorder.events, expected, "{text:?}");
                assert_eq!(recorder.errors, errors.len());
            }
        }

        #[test]
        fn test_visitor_paths() {
            let mut recorder = Recorder::default();
            visit("fix: x\n\nRefs: 1\nAcked-by: Y", &mut recorder, ParseOptions::default());
            let paths: Vec<String> = recorder
                .paths
                .iter()
                .map(|path| path.iter().map(ToString::to_string).collect::<Vec<_>>().join("/"))
                .collect();
            assert_eq!(
                paths,
                vec![
                    "",
                    "header",
                    "footer/0",
                    "footer/0/footer-token",
                    "footer/1",
                    "footer/1/footer-token",
                ]
            );
        }
    }
}
