use std::fmt;

use thiserror::Error;

use crate::scanner::{Location, TokenKind};

/// The set of token kinds a parser step was willing to accept.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Expected(pub &'static [TokenKind]);

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            [] => f.write_str("nothing"),
            [only] => write!(f, "{only}"),
            [init @ .., last] => {
                for (i, kind) in init.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{kind}")?;
                }
                write!(f, " or {last}")
            }
        }
    }
}

/// Whether a parenthesized group was committed to struct or enum interpretation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GroupKind {
    Struct,
    Enum,
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct => f.write_str("struct"),
            Self::Enum => f.write_str("enum"),
        }
    }
}

/// Errors raised while turning the token stream into a [`Document`](crate::ast::Document).
///
/// The scanner is total, so there is no lexical error kind.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{location}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: Expected,
        found: TokenKind,
        location: Location,
    },
    #[error("{location}: expected {expected}, found `{found}`")]
    UnexpectedWord {
        expected: &'static str,
        found: String,
        location: Location,
    },
    #[error("{location}: member `{member}` does not fit into a group already read as {committed}")]
    AmbiguousGroup {
        member: String,
        committed: GroupKind,
        location: Location,
    },
    #[error("{location}: {context} must be a {expected}")]
    UnexpectedKind {
        context: String,
        expected: GroupKind,
        location: Location,
    },
    #[error("{location}: types nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize, location: Location },
}

/// Errors raised while resolving aliases and naming anonymous types.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unresolved type reference `{name}`")]
    UnresolvedTypeReference { name: String },
    #[error("type `{name}` is declared more than once")]
    DuplicateTypedef { name: String },
    #[error("synthesized type name `{name}` collides with another type")]
    NameCollision { name: String },
    #[error("{context} must be a struct, but `{name}` is not")]
    ExpectedStruct { name: String, context: String },
    #[error("type `{name}` must be declared as a struct or an enum")]
    InvalidTypedef { name: String },
    #[error("types nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IdlError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
