//! Tokenizer for interface definitions.
//!
//! The [`Scanner`] hands out one [`Token`] per call and never fails: every character either
//! belongs to one of the delimiter classes or extends a word. Whitespace, line ends and comments
//! are reported as tokens too; skipping them is up to the caller.

use std::fmt;

const WHITESPACE: [char; 11] = [
    '\t', ' ', '\u{00A0}', '\u{FEFF}', '\u{1680}', '\u{180E}', '\u{2000}', '\u{200A}', '\u{202F}',
    '\u{205F}', '\u{3000}',
];

const END_OF_LINE: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    EndOfLine,
    Comment,
    GroupStart,
    GroupEnd,
    Separator,
    Colon,
    Arrow,
    Word,
    EndOfInput,
}

impl TokenKind {
    /// Tokens the parser skips between significant tokens.
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::EndOfLine | Self::Comment)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Whitespace => "whitespace",
            Self::EndOfLine => "end of line",
            Self::Comment => "comment",
            Self::GroupStart => "`(`",
            Self::GroupEnd => "`)`",
            Self::Separator => "`,`",
            Self::Colon => "`:`",
            Self::Arrow => "`->`",
            Self::Word => "word",
            Self::EndOfInput => "end of input",
        })
    }
}

/// A classified slice of the source buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of `text` within the source.
    pub offset: usize,
}

/// A human-readable position within a source text, 1-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Computes the location of the byte `offset` in `source`.
    pub fn of(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        let mut chars = source[..offset.min(source.len())].chars().peekable();
        while let Some(c) = chars.next() {
            let line_end = match c {
                '\r' => chars.peek() != Some(&'\n'),
                c => END_OF_LINE.contains(&c),
            };
            if line_end {
                line += 1;
                column = 1;
            } else if c != '\r' {
                column += 1;
            }
        }
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

pub struct Scanner<'a> {
    source: &'a str,
    offset: usize,
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            finished: false,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Reads the token starting at the cursor and advances past it. Once the end of the source is
    /// reached, every further call returns an empty [`TokenKind::EndOfInput`] token.
    pub fn read_next_token(&mut self) -> Token<'a> {
        let start = self.offset;
        let (kind, mut end) = classify(self.source, start);
        if kind == TokenKind::Word {
            // A word is the maximal run of characters that classify as word starts.
            loop {
                let (next_kind, next_end) = classify(self.source, end);
                if next_kind != TokenKind::Word {
                    break;
                }
                end = next_end;
            }
        }
        self.offset = end;
        Token {
            kind,
            text: &self.source[start..end],
            offset: start,
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    /// Yields every token including the final [`TokenKind::EndOfInput`], then stops.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.read_next_token();
        self.finished = token.kind == TokenKind::EndOfInput;
        Some(token)
    }
}

/// Classifies the character at `offset`, returning the kind and the end offset of the
/// (single-character, or for words: single-character prefix of the) token.
fn classify(source: &str, offset: usize) -> (TokenKind, usize) {
    let rest = &source[offset..];
    let Some(c) = rest.chars().next() else {
        return (TokenKind::EndOfInput, offset);
    };
    let end = offset + c.len_utf8();
    let kind = match c {
        c if WHITESPACE.contains(&c) => TokenKind::Whitespace,
        '\r' if source[end..].starts_with('\n') => return (TokenKind::EndOfLine, end + 1),
        c if END_OF_LINE.contains(&c) => TokenKind::EndOfLine,
        '#' => {
            let len = source[end..]
                .find(|c: char| END_OF_LINE.contains(&c))
                .unwrap_or(source.len() - end);
            return (TokenKind::Comment, end + len);
        }
        '(' => TokenKind::GroupStart,
        ')' => TokenKind::GroupEnd,
        ',' => TokenKind::Separator,
        ':' => TokenKind::Colon,
        '-' if source[end..].starts_with('>') => return (TokenKind::Arrow, end + 1),
        _ => TokenKind::Word,
    };
    (kind, end)
}
