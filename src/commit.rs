//! The conventional commit components, read off a [`SyntaxTree`].

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use winnow::Parser as _;

use crate::parser::{token, BREAKING_PHRASE, BREAKING_TOKEN};
use crate::scanner::{Scanner, SyntaxKind};
use crate::{parse_tree, Error, ErrorKind, Node, NodeType, ParseOptions, SyntaxTree};

/// A conventional commit.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Commit<'a> {
    ty: Type<'a>,
    scope: Option<Scope<'a>>,
    description: &'a str,
    body: Option<&'a str>,
    breaking: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    breaking_mark: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    breaking_description: Option<&'a str>,
    footers: Vec<Footer<'a>>,
}

impl<'a> Commit<'a> {
    /// Create a new Conventional Commit based on the provided commit message
    /// string.
    ///
    /// # Errors
    ///
    /// This function returns an error if the commit does not conform to the
    /// Conventional Commit specification. The error carries the first
    /// diagnostic reported by [`parse_tree`].
    pub fn parse(string: &'a str) -> Result<Self, Error> {
        let mut errors = Vec::new();
        let tree = parse_tree(string, &mut errors, ParseOptions::default());
        if let Some(err) = errors.first() {
            return Err(Error::with_diagnostic(*err));
        }
        tree.as_ref()
            .and_then(Self::from_tree)
            .ok_or_else(|| Error::new(ErrorKind::MissingType))
    }

    /// Read the components off a tree, whatever diagnostics it was parsed
    /// with.
    ///
    /// Missing components come out empty. Returns `None` when the message has
    /// no header at all.
    ///
    /// ```rust
    /// use git_conventional_syntax::{parse_tree, Commit, ParseOptions};
    ///
    /// let mut errors = Vec::new();
    /// let tree = parse_tree("fix(parser) handle eof", &mut errors, ParseOptions::default()).unwrap();
    /// assert_eq!(errors.len(), 1);
    ///
    /// let commit = Commit::from_tree(&tree).unwrap();
    /// assert_eq!(commit.scope().unwrap(), "parser");
    /// assert_eq!(commit.description(), "handle eof");
    /// ```
    pub fn from_tree(tree: &SyntaxTree<'a>) -> Option<Self> {
        let text = tree.text();
        let root = tree.root();
        let header = root.child(NodeType::Header)?;
        let component = |node_type| header.child(node_type).map(|node| slice(text, node));

        let ty = component(NodeType::Type).unwrap_or_default();
        let scope = component(NodeType::Scope).filter(|scope| !scope.is_empty());
        let breaking_mark = header.child(NodeType::BreakingExclamationMark).is_some();
        let description = component(NodeType::Description).unwrap_or_default();
        let body = root
            .child(NodeType::Body)
            .map(|body| slice(text, body).trim())
            .filter(|body| !body.is_empty());
        let footers: Vec<_> = root
            .children()
            .filter(|node| node.node_type() == NodeType::Footer)
            .filter_map(|node| Footer::from_node(text, node))
            .collect();

        let breaking_description = footers
            .iter()
            .find(|footer| footer.breaking())
            .map(|footer| footer.value())
            .or_else(|| breaking_mark.then_some(description));

        Some(Self {
            ty: Type::new_unchecked(ty),
            scope: scope.map(Scope::new_unchecked),
            description,
            body,
            breaking: breaking_description.is_some(),
            breaking_mark,
            breaking_description,
            footers,
        })
    }

    /// The type of the commit.
    pub fn type_(&self) -> Type<'a> {
        self.ty
    }

    /// The optional scope of the commit.
    pub fn scope(&self) -> Option<Scope<'a>> {
        self.scope
    }

    /// The commit description.
    pub fn description(&self) -> &'a str {
        self.description
    }

    /// The commit body, containing a more detailed explanation of the commit
    /// changes.
    pub fn body(&self) -> Option<&'a str> {
        self.body
    }

    /// A flag to signal that the commit contains breaking changes.
    ///
    /// This flag is set either when the commit has an exclamation mark after
    /// the message type and scope, e.g.:
    /// ```text
    /// feat(scope)!: this is a breaking change
    /// ```
    ///
    /// Or when the `BREAKING CHANGE: ` footer is defined:
    /// ```text
    /// feat: my commit description
    ///
    /// BREAKING CHANGE: this is a breaking change
    /// ```
    pub fn breaking(&self) -> bool {
        self.breaking
    }

    /// Explanation for the breaking change.
    ///
    /// Note: if no `BREAKING CHANGE` footer is provided, the `description` is expected to describe
    /// the breaking change.
    pub fn breaking_description(&self) -> Option<&'a str> {
        self.breaking_description
    }

    /// Any footer.
    ///
    /// A footer is similar to a Git trailer, with the exception of not
    /// requiring whitespace before newlines.
    ///
    /// See: <https://git-scm.com/docs/git-interpret-trailers>
    pub fn footers(&self) -> &[Footer<'a>] {
        &self.footers
    }
}

impl fmt::Display for Commit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_().as_str())?;

        if let Some(scope) = &self.scope() {
            write!(f, "({scope})")?;
        }
        if self.breaking_mark {
            f.write_str("!")?;
        }

        write!(f, ": {}", self.description())?;

        if let Some(body) = &self.body() {
            write!(f, "\n\n{body}")?;
        }

        for (i, footer) in self.footers().iter().enumerate() {
            let sep = if i == 0 { "\n\n" } else { "\n" };
            write!(f, "{sep}{footer}")?;
        }

        Ok(())
    }
}

fn slice<'a>(text: &'a str, node: Node<'_>) -> &'a str {
    &text[node.offset()..node.end()]
}

/// A single footer.
///
/// A footer is similar to a Git trailer, with the exception of not requiring
/// whitespace before newlines.
///
/// See: <https://git-scm.com/docs/git-interpret-trailers>
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Footer<'a> {
    token: FooterToken<'a>,
    sep: FooterSeparator,
    value: &'a str,
}

impl<'a> Footer<'a> {
    /// Piece together a footer.
    pub const fn new(token: FooterToken<'a>, sep: FooterSeparator, value: &'a str) -> Self {
        Self { token, sep, value }
    }

    fn from_node(text: &'a str, node: Node<'_>) -> Option<Self> {
        let token = node.child(NodeType::FooterToken)?;
        let sep = if token.colon_offset().is_some() {
            FooterSeparator::Value
        } else {
            FooterSeparator::Ref
        };

        // Multi-line values span from the first line to the end of the last.
        let mut words = node
            .children()
            .filter(|child| child.node_type() == NodeType::FooterWord && child.value().is_some());
        let value = match (words.next(), words.last()) {
            (Some(first), Some(last)) => &text[first.offset()..last.end()],
            (Some(first), None) => slice(text, first),
            _ => "",
        };

        Some(Self::new(
            FooterToken::new_unchecked(slice(text, token)),
            sep,
            value,
        ))
    }

    /// The token of the footer.
    pub const fn token(&self) -> FooterToken<'a> {
        self.token
    }

    /// The separator between the footer token and its value.
    pub const fn separator(&self) -> FooterSeparator {
        self.sep
    }

    /// The value of the footer.
    pub const fn value(&self) -> &'a str {
        self.value
    }

    /// A flag to signal that the footer describes a breaking change.
    pub fn breaking(&self) -> bool {
        self.token.breaking()
    }
}

impl fmt::Display for Footer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sep {
            FooterSeparator::Value => write!(f, "{}: {}", self.token, self.value),
            FooterSeparator::Ref => write!(f, "{} #{}", self.token, self.value),
        }
    }
}

/// The type of separator between the footer token and value.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum FooterSeparator {
    /// ":"
    Value,

    /// " #"
    Ref,
}

impl FooterSeparator {
    /// Access `str` representation of `FooterSeparator`
    pub fn as_str(self) -> &'static str {
        match self {
            FooterSeparator::Value => ":",
            FooterSeparator::Ref => " #",
        }
    }
}

impl Deref for FooterSeparator {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl PartialEq<&'_ str> for FooterSeparator {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for FooterSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

impl FromStr for FooterSeparator {
    type Err = Error;

    fn from_str(sep: &str) -> Result<Self, Self::Err> {
        match sep {
            ":" => Ok(FooterSeparator::Value),
            " #" => Ok(FooterSeparator::Ref),
            _ => Err(Error::new(ErrorKind::InvalidFooter)),
        }
    }
}

macro_rules! unicase_components {
    ($($ty:ident),+) => (
        $(
            /// A component of the conventional commit.
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $ty<'a>(unicase::UniCase<&'a str>);

            impl<'a> $ty<'a> {
                /// See `parse` for ensuring the data is valid.
                pub const fn new_unchecked(value: &'a str) -> Self {
                    $ty(unicase::UniCase::unicode(value))
                }

                /// Access `str` representation
                pub fn as_str(&self) -> &'a str {
                    self.0.into_inner()
                }
            }

            impl Deref for $ty<'_> {
                type Target = str;

                fn deref(&self) -> &Self::Target {
                    self.as_str()
                }
            }

            impl PartialEq<&'_ str> for $ty<'_> {
                fn eq(&self, other: &&str) -> bool {
                    *self == $ty::new_unchecked(*other)
                }
            }

            impl fmt::Display for $ty<'_> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            #[cfg(feature = "serde")]
            impl serde::Serialize for $ty<'_> {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    serializer.serialize_str(self)
                }
            }
        )+
    )
}

unicase_components![Type, Scope, FooterToken];

impl<'a> Type<'a> {
    /// Parse a `str` into a `Type`.
    ///
    /// A type is a single word: letters, digits and `_`.
    pub fn parse(ty: &'a str) -> Result<Self, Error> {
        let mut scanner = Scanner::new(ty);
        match (scanner.scan(), scanner.scan()) {
            (SyntaxKind::WordLiteral, SyntaxKind::Eof) => Ok(Type::new_unchecked(ty)),
            (SyntaxKind::Eof, _) => Err(Error::new(ErrorKind::MissingType)),
            _ => Err(Error::new(ErrorKind::InvalidFormat)),
        }
    }
}

/// Common commit types
impl Type<'static> {
    /// Commit type when introducing new features (correlates with `minor` in semver)
    pub const FEAT: Type<'static> = Type::new_unchecked("feat");
    /// Commit type when patching a bug (correlates with `patch` in semver)
    pub const FIX: Type<'static> = Type::new_unchecked("fix");
    /// Possible commit type when reverting changes.
    pub const REVERT: Type<'static> = Type::new_unchecked("revert");
    /// Possible commit type for changing documentation.
    pub const DOCS: Type<'static> = Type::new_unchecked("docs");
    /// Possible commit type for changing code style.
    pub const STYLE: Type<'static> = Type::new_unchecked("style");
    /// Possible commit type for refactoring code structure.
    pub const REFACTOR: Type<'static> = Type::new_unchecked("refactor");
    /// Possible commit type for performance optimizations.
    pub const PERF: Type<'static> = Type::new_unchecked("perf");
    /// Possible commit type for addressing tests.
    pub const TEST: Type<'static> = Type::new_unchecked("test");
    /// Possible commit type for other things.
    pub const CHORE: Type<'static> = Type::new_unchecked("chore");
}

impl<'a> Scope<'a> {
    /// Parse a `str` into a `Scope`.
    ///
    /// Anything but parentheses, `:` and line breaks is allowed.
    pub fn parse(scope: &'a str) -> Result<Self, Error> {
        if scope.is_empty() || scope.contains(['(', ')', ':', '\n', '\r']) {
            return Err(Error::new(ErrorKind::InvalidScope));
        }
        Ok(Scope::new_unchecked(scope))
    }
}

impl<'a> FooterToken<'a> {
    /// Parse a `str` into a `FooterToken`.
    pub fn parse(value: &'a str) -> Result<Self, Error> {
        if value == BREAKING_PHRASE || token.parse(value).is_ok() {
            Ok(FooterToken::new_unchecked(value))
        } else {
            Err(Error::new(ErrorKind::InvalidFooter))
        }
    }

    /// A flag to signal that the footer describes a breaking change.
    pub fn breaking(&self) -> bool {
        self == &BREAKING_PHRASE || self == &BREAKING_TOKEN
    }
}
