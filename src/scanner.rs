//! Tokenizer for commit message text.

/// The kind of token produced by [`Scanner::scan`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SyntaxKind {
    /// A run of non line-breaking whitespace.
    WhiteSpace,
    /// A run of letters, digits or `_`, containing at least one non-digit.
    WordLiteral,
    /// A run of ASCII digits.
    NumericLiteral,
    /// `(`
    OpenParenToken,
    /// `)`
    CloseParenToken,
    /// `!`
    ExclamationMarkToken,
    /// `:`
    ColonToken,
    /// `#` anywhere but the start of a line.
    HashMarkToken,
    /// `\n`, `\r\n` or a lone `\r`.
    LineBreakToken,
    /// A line starting with `#`, up to (excluding) its line break.
    Comment,
    /// Any other single character.
    Symbol,
    /// End of input.
    Eof,
}

/// Lexical problem attached to the last scanned token.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum ScanError {
    /// The token is well formed.
    #[default]
    None,
    /// The token is a U+FFFD replacement character, left behind by lossy
    /// decoding of invalid UTF-8 or UTF-16.
    InvalidUnicode,
    /// The token is a control character other than tab, CR or LF.
    InvalidCharacter,
}

/// Characters that make up words, numbers and footer tokens.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_line_ending(c: char) -> bool {
    c == '\n' || c == '\r'
}

fn is_whitespace(c: char) -> bool {
    c.is_whitespace() && !is_line_ending(c)
}

/// Create a [`Scanner`] over `text`.
pub fn create_scanner(text: &str) -> Scanner<'_> {
    Scanner::new(text)
}

/// A stateful cursor producing one token per [`Scanner::scan`] call.
///
/// Offsets are UTF-8 byte offsets into the scanned text. Lines and characters
/// are zero based, the character being the byte column within the line.
///
/// ```rust
/// use git_conventional_syntax::{create_scanner, SyntaxKind};
///
/// let mut scanner = create_scanner("feat(core)");
/// assert_eq!(scanner.scan(), SyntaxKind::WordLiteral);
/// assert_eq!(scanner.token_value(), "feat");
/// assert_eq!(scanner.scan(), SyntaxKind::OpenParenToken);
/// assert_eq!(scanner.token_offset(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
    line_start: usize,

    token: SyntaxKind,
    token_offset: usize,
    token_line: usize,
    token_character: usize,
    scan_error: ScanError,
}

impl<'a> Scanner<'a> {
    /// Create a scanner positioned at the start of `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 0,
            line_start: 0,
            token: SyntaxKind::Eof,
            token_offset: 0,
            token_line: 0,
            token_character: 0,
            scan_error: ScanError::None,
        }
    }

    /// The text being scanned.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Move the cursor to `pos` (clamped to the text, rounded down to a char
    /// boundary, and back onto the `\r` of a `\r\n` pair).
    ///
    /// The last token is discarded: until the next [`Scanner::scan`], the
    /// accessors describe an empty [`SyntaxKind::Eof`] token at `pos`.
    pub fn set_position(&mut self, pos: usize) {
        let mut pos = pos.min(self.text.len());
        while !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        // Never split a CRLF pair.
        if self.text[..pos].ends_with('\r') && self.text[pos..].starts_with('\n') {
            pos -= 1;
        }
        let before = &self.text[..pos];
        let mut line = 0;
        let mut line_start = 0;
        let mut chars = before.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '\n' => {
                    line += 1;
                    line_start = i + 1;
                }
                '\r' => {
                    if chars.peek().map(|&(_, c)| c) == Some('\n') {
                        continue;
                    }
                    line += 1;
                    line_start = i + 1;
                }
                _ => {}
            }
        }

        self.pos = pos;
        self.line = line;
        self.line_start = line_start;
        self.token = SyntaxKind::Eof;
        self.token_offset = pos;
        self.token_line = line;
        self.token_character = pos - line_start;
        self.scan_error = ScanError::None;
    }

    /// The cursor position, i.e. the end of the last scanned token.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read the next token and return its kind.
    ///
    /// Always makes progress unless the input is exhausted, in which case
    /// every further call returns [`SyntaxKind::Eof`].
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_offset = self.pos;
        self.token_line = self.line;
        self.token_character = self.pos - self.line_start;
        self.scan_error = ScanError::None;
        self.token = self.scan_next();
        self.token
    }

    fn scan_next(&mut self) -> SyntaxKind {
        let rest = &self.text[self.pos..];
        let Some(c) = rest.chars().next() else {
            return SyntaxKind::Eof;
        };

        match c {
            '\n' => {
                self.pos += 1;
                self.new_line();
                SyntaxKind::LineBreakToken
            }
            '\r' => {
                self.pos += if rest.starts_with("\r\n") { 2 } else { 1 };
                self.new_line();
                SyntaxKind::LineBreakToken
            }
            '(' => self.single(c, SyntaxKind::OpenParenToken),
            ')' => self.single(c, SyntaxKind::CloseParenToken),
            '!' => self.single(c, SyntaxKind::ExclamationMarkToken),
            ':' => self.single(c, SyntaxKind::ColonToken),
            '#' if self.pos == self.line_start => {
                self.pos += rest.find(is_line_ending).unwrap_or(rest.len());
                SyntaxKind::Comment
            }
            '#' => self.single(c, SyntaxKind::HashMarkToken),
            c if is_whitespace(c) => {
                self.pos += run_length(rest, is_whitespace);
                SyntaxKind::WhiteSpace
            }
            c if is_word_char(c) => {
                let len = run_length(rest, is_word_char);
                self.pos += len;
                if rest[..len].bytes().all(|b| b.is_ascii_digit()) {
                    SyntaxKind::NumericLiteral
                } else {
                    SyntaxKind::WordLiteral
                }
            }
            char::REPLACEMENT_CHARACTER => {
                self.scan_error = ScanError::InvalidUnicode;
                self.single(c, SyntaxKind::Symbol)
            }
            c if c.is_control() => {
                self.scan_error = ScanError::InvalidCharacter;
                self.single(c, SyntaxKind::Symbol)
            }
            c => self.single(c, SyntaxKind::Symbol),
        }
    }

    fn single(&mut self, c: char, kind: SyntaxKind) -> SyntaxKind {
        self.pos += c.len_utf8();
        kind
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.line_start = self.pos;
    }

    /// Kind of the last scanned token.
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Source text of the last scanned token.
    pub fn token_value(&self) -> &'a str {
        &self.text[self.token_offset..self.pos]
    }

    /// Numeric value of the last token, if it is a [`SyntaxKind::NumericLiteral`]
    /// that fits in a `u64`.
    pub fn token_number(&self) -> Option<u64> {
        match self.token {
            SyntaxKind::NumericLiteral => self.token_value().parse().ok(),
            _ => None,
        }
    }

    /// Start offset of the last scanned token.
    pub fn token_offset(&self) -> usize {
        self.token_offset
    }

    /// Length in bytes of the last scanned token.
    pub fn token_length(&self) -> usize {
        self.pos - self.token_offset
    }

    /// Zero-based line the last token starts on.
    pub fn token_start_line(&self) -> usize {
        self.token_line
    }

    /// Zero-based byte column the last token starts at.
    pub fn token_start_character(&self) -> usize {
        self.token_character
    }

    /// Lexical error of the last scanned token.
    pub fn token_error(&self) -> ScanError {
        self.scan_error
    }
}

fn run_length(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.find(|c: char| !pred(c)).unwrap_or(s.len())
}
