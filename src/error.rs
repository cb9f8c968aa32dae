//! Diagnostics produced while parsing commit messages.

use std::fmt;

/// Closed set of syntax problems the parser reports.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ParseErrorCode {
    /// A character that cannot appear at this position.
    InvalidSymbol,
    /// A number that does not fit in a `u64`.
    InvalidNumberFormat,
    /// The header does not start with a commit type.
    TypeExpected,
    /// The parentheses of the scope are empty.
    ScopeExpected,
    /// The `:` after the type, scope or footer token is missing.
    ColonExpected,
    /// The scope is not closed before the end of the line or the colon.
    CloseParenExpected,
    /// Nothing follows the header colon.
    DescriptionExpected,
    /// The line after the header is not blank.
    BlankLineExpected,
    /// A footer token is not followed by a value.
    FooterValueExpected,
    /// Content after the end of the message.
    EndOfFileExpected,
    /// A comment line while comments are disallowed.
    InvalidCommentToken,
    /// A comment that is not terminated.
    UnexpectedEndOfComment,
    /// A string that is not terminated.
    UnexpectedEndOfString,
    /// A number that is cut short.
    UnexpectedEndOfNumber,
    /// A replacement character left behind by invalid UTF-8 or UTF-16.
    InvalidUnicode,
    /// An escape sequence that is not recognized.
    InvalidEscapeCharacter,
    /// A disallowed control character.
    InvalidCharacter,
}

impl ParseErrorCode {
    /// The name of the code, stable for telemetry.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidSymbol => "InvalidSymbol",
            Self::InvalidNumberFormat => "InvalidNumberFormat",
            Self::TypeExpected => "TypeExpected",
            Self::ScopeExpected => "ScopeExpected",
            Self::ColonExpected => "ColonExpected",
            Self::CloseParenExpected => "CloseParenExpected",
            Self::DescriptionExpected => "DescriptionExpected",
            Self::BlankLineExpected => "BlankLineExpected",
            Self::FooterValueExpected => "FooterValueExpected",
            Self::EndOfFileExpected => "EndOfFileExpected",
            Self::InvalidCommentToken => "InvalidCommentToken",
            Self::UnexpectedEndOfComment => "UnexpectedEndOfComment",
            Self::UnexpectedEndOfString => "UnexpectedEndOfString",
            Self::UnexpectedEndOfNumber => "UnexpectedEndOfNumber",
            Self::InvalidUnicode => "InvalidUnicode",
            Self::InvalidEscapeCharacter => "InvalidEscapeCharacter",
            Self::InvalidCharacter => "InvalidCharacter",
        }
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidSymbol => "invalid symbol",
            Self::InvalidNumberFormat => "invalid number format",
            Self::TypeExpected => "commit type expected",
            Self::ScopeExpected => "scope expected",
            Self::ColonExpected => "colon expected",
            Self::CloseParenExpected => "closing parenthesis expected",
            Self::DescriptionExpected => "commit description expected",
            Self::BlankLineExpected => "blank line expected after the header",
            Self::FooterValueExpected => "footer value expected",
            Self::EndOfFileExpected => "end of message expected",
            Self::InvalidCommentToken => "comments are not permitted",
            Self::UnexpectedEndOfComment => "unexpected end of comment",
            Self::UnexpectedEndOfString => "unexpected end of string",
            Self::UnexpectedEndOfNumber => "unexpected end of number",
            Self::InvalidUnicode => "invalid unicode sequence",
            Self::InvalidEscapeCharacter => "invalid escape character",
            Self::InvalidCharacter => "invalid character",
        })
    }
}

/// Human-readable label of a [`ParseErrorCode`].
pub fn print_parse_error_code(code: ParseErrorCode) -> &'static str {
    code.as_str()
}

/// A non-fatal syntax diagnostic.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct ParseError {
    /// What went wrong.
    pub code: ParseErrorCode,
    /// Byte offset of the problem.
    pub offset: usize,
    /// Byte length of the offending text, `0` when something is missing.
    pub length: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.code, self.offset)
    }
}

/// The error returned by [`Commit::parse`][crate::Commit::parse] when a
/// message is not a valid conventional commit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,

    diagnostic: Option<ParseError>,
}

impl Error {
    /// Create a new error from a `ErrorKind`.
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            diagnostic: None,
        }
    }

    pub(crate) fn with_diagnostic(err: ParseError) -> Self {
        use ParseErrorCode::{
            BlankLineExpected, CloseParenExpected, DescriptionExpected, FooterValueExpected,
            ScopeExpected, TypeExpected,
        };

        let kind = match err.code {
            TypeExpected => ErrorKind::MissingType,
            ScopeExpected | CloseParenExpected => ErrorKind::InvalidScope,
            DescriptionExpected => ErrorKind::MissingDescription,
            BlankLineExpected => ErrorKind::InvalidBody,
            FooterValueExpected => ErrorKind::InvalidFooter,
            _ => ErrorKind::InvalidFormat,
        };

        Self {
            kind,
            diagnostic: Some(err),
        }
    }

    /// The kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The first syntax diagnostic, when the message was not empty.
    pub fn diagnostic(&self) -> Option<ParseError> {
        self.diagnostic
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)?;
        if let Some(diagnostic) = &self.diagnostic {
            write!(f, ": {diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// All possible error kinds returned when parsing a conventional commit.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The commit type is missing from the commit message.
    MissingType,

    /// The scope has an invalid format.
    InvalidScope,

    /// The description of the commit is missing.
    MissingDescription,

    /// The body of the commit has an invalid format.
    InvalidBody,

    /// A footer has an invalid format.
    InvalidFooter,

    /// Any other part of the commit does not conform to the conventional commit
    /// spec.
    InvalidFormat,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingType => f.write_str("missing type definition"),
            Self::InvalidScope => f.write_str("invalid scope format"),
            Self::MissingDescription => f.write_str("missing commit description"),
            Self::InvalidBody => f.write_str("invalid body format"),
            Self::InvalidFooter => f.write_str("invalid footer format"),
            Self::InvalidFormat => f.write_str("invalid commit format"),
        }
    }
}
