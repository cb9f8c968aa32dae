//! A fault-tolerant syntax library for the [Conventional Commit] specification.
//!
//! [conventional commit]: https://www.conventionalcommits.org
//!
//! Commit messages are parsed into a position-accurate [`SyntaxTree`] whose
//! leaves reproduce the input byte for byte. Malformed messages still yield a
//! tree; problems are reported as [`ParseError`]s next to it. This makes the
//! crate suited to editors and linters that need to point at a location in a
//! half-written message.
//!
//! # Example
//!
//! ```rust
//! use indoc::indoc;
//!
//! let message = indoc!("
//!     docs(example)!: add tested usage example
//!
//!     This example is tested using Rust's doctest capabilities. Having this
//!     example helps people understand how to use the parser.
//!
//!     BREAKING CHANGE: Going from nothing to something, meaning anyone doing
//!     nothing before suddenly has something to do. That sounds like a change
//!     in your break.
//!
//!     Co-Authored-By: Lisa Simpson <lisa@simpsons.fam>
//!     Closes #12
//! ");
//!
//! let commit = git_conventional_syntax::Commit::parse(message).unwrap();
//!
//! // You can access all components of the subject.
//! assert_eq!(commit.type_(), git_conventional_syntax::DOCS);
//! assert_eq!(commit.scope().unwrap(), "example");
//! assert_eq!(commit.description(), "add tested usage example");
//!
//! // And the free-form commit body.
//! assert!(commit.body().unwrap().contains("helps people understand"));
//!
//! // If a commit is marked with a bang (`!`) OR has a footer with the key
//! // "BREAKING CHANGE", it is considered a "breaking" commit.
//! assert!(commit.breaking());
//!
//! // You can access each footer individually.
//! assert!(commit.footers()[0].value().contains("That sounds like a change"));
//!
//! // Footers provide access to their token and value.
//! assert_eq!(commit.footers()[1].token(), "Co-Authored-By");
//! assert_eq!(commit.footers()[1].value(), "Lisa Simpson <lisa@simpsons.fam>");
//!
//! // Two types of separators are supported, regular ": ", and " #":
//! assert_eq!(commit.footers()[2].separator(), " #");
//! assert_eq!(commit.footers()[2].value(), "12");
//! ```
//!
//! # Syntax tree
//!
//! ```rust
//! use git_conventional_syntax::{find_node_at_offset, get_location, parse_tree};
//! use git_conventional_syntax::{NodeType, ParseErrorCode, ParseOptions};
//!
//! let text = "feat(core) add x";
//! let mut errors = Vec::new();
//! let tree = parse_tree(text, &mut errors, ParseOptions::default()).unwrap();
//!
//! // The header lacks its colon, the rest is still there.
//! assert_eq!(errors[0].code, ParseErrorCode::ColonExpected);
//! let node = find_node_at_offset(tree.root(), 6, false).unwrap();
//! assert_eq!(node.node_type(), NodeType::Scope);
//! assert_eq!(node.text(), "core");
//!
//! assert!(get_location(text, 6).matches(["header", "scope"]));
//! ```

#![warn(missing_docs)]

mod commit;
mod error;
mod location;
mod node;
mod parser;
mod scanner;
mod visitor;

pub use commit::{Commit, Footer, FooterSeparator, FooterToken, Scope, Type};
pub use error::{print_parse_error_code, Error, ErrorKind, ParseError, ParseErrorCode};
pub use location::{get_location, Location, LocationNode, Path, PathPattern, Segment};
pub use node::{find_node_at_offset, Node, NodeType, NodeValue, SyntaxTree};
pub use parser::{parse_tree, visit, ParseOptions};
pub use scanner::{create_scanner, ScanError, Scanner, SyntaxKind};
pub use visitor::{PathSupplier, Span, Visitor};

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
