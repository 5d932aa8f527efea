//! Recursive-descent parser with one token of lookahead.
//!
//! ```text
//! document    := "interface" WORD member*
//! member      := "method" WORD unnamedType "->" unnamedType
//!              | "type" WORD unnamedType
//!              | "error" WORD unnamedType
//! unnamedType := group | typeWord
//! typeWord    := "?" typeWord | "[]" typeWord | "[string]" typeWord
//!              | "bool" | "int" | "float" | "string" | "object" | WORD
//! ```

use tracing::trace;

use crate::ast::{Document, ErrorDefinition, Field, MethodDefinition, Type, TypeDefinition};
use crate::error::{Expected, GroupKind, ParseError};
use crate::scanner::{Location, Scanner, Token, TokenKind};

/// Deepest nesting of groups and modifiers accepted in a single type expression.
pub const MAX_NESTING: usize = 256;

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    /// Groups and modifiers enclosing the type expression being read.
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            scanner: Scanner::new(source),
            depth: 0,
        }
    }

    /// Parses a complete interface definition into an unresolved [`Document`].
    pub fn parse(source: &'a str) -> Result<Document, ParseError> {
        Self::new(source).read_document()
    }

    fn read_document(&mut self) -> Result<Document, ParseError> {
        self.read_keyword("interface")?;
        let name = self.read_word()?.text.to_string();

        let mut document = Document {
            name,
            methods: Vec::new(),
            typedefs: Vec::new(),
            errors: Vec::new(),
        };
        loop {
            let token = self.read_next(&[TokenKind::EndOfInput, TokenKind::Word])?;
            match (token.kind, token.text) {
                (TokenKind::EndOfInput, _) => break,
                (_, "method") => document.methods.push(self.read_method()?),
                (_, "type") => document.typedefs.push(self.read_typedef()?),
                (_, "error") => document.errors.push(self.read_error()?),
                (_, other) => {
                    return Err(ParseError::UnexpectedWord {
                        expected: "`method`, `type` or `error`",
                        found: other.to_string(),
                        location: self.location(token),
                    })
                }
            }
        }
        Ok(document)
    }

    fn read_method(&mut self) -> Result<MethodDefinition, ParseError> {
        let name = self.read_word()?.text.to_string();
        let parameters = self.read_struct(|| format!("parameters of method `{name}`"))?;
        self.read_next(&[TokenKind::Arrow])?;
        let results = self.read_struct(|| format!("results of method `{name}`"))?;
        trace!(method = %name, "parsed method");
        Ok(MethodDefinition {
            name,
            parameters,
            results,
        })
    }

    fn read_typedef(&mut self) -> Result<TypeDefinition, ParseError> {
        let name = self.read_word()?.text.to_string();
        let type_ = self.read_unnamed_type()?;
        trace!(typedef = %name, "parsed type");
        Ok(TypeDefinition { name, type_ })
    }

    fn read_error(&mut self) -> Result<ErrorDefinition, ParseError> {
        let name = self.read_word()?.text.to_string();
        let parameters = self.read_struct(|| format!("parameters of error `{name}`"))?;
        trace!(error = %name, "parsed error");
        Ok(ErrorDefinition { name, parameters })
    }

    /// Reads the body of a method or error: a struct group or the name of a typedef, which has to
    /// be checked for being a struct once it is resolved.
    fn read_struct(&mut self, context: impl FnOnce() -> String) -> Result<Type, ParseError> {
        let token = self.read_next(&[TokenKind::GroupStart, TokenKind::Word])?;
        match self.read_type(token)? {
            type_ @ (Type::Struct(_) | Type::Alias(_)) => Ok(type_),
            _ => Err(ParseError::UnexpectedKind {
                context: context(),
                expected: GroupKind::Struct,
                location: self.location(token),
            }),
        }
    }

    fn read_unnamed_type(&mut self) -> Result<Type, ParseError> {
        let token = self.read_next(&[TokenKind::GroupStart, TokenKind::Word])?;
        self.read_type(token)
    }

    /// Reads the type expression starting with `token`.
    fn read_type(&mut self, token: Token<'a>) -> Result<Type, ParseError> {
        match token.kind {
            TokenKind::GroupStart => self.read_group(token),
            _ => self.parse_type_word(token),
        }
    }

    /// Accounts for `levels` more enclosing groups or modifiers.
    fn nest(&mut self, levels: usize, token: Token<'a>) -> Result<(), ParseError> {
        self.depth += levels;
        if self.depth > MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING,
                location: self.location(token),
            });
        }
        Ok(())
    }

    /// Parses the remainder of a group whose `(` has been consumed.
    ///
    /// Whether the group is a struct or an enum is decided by the token following the first
    /// member name: `:` makes it a struct, `,` or `)` an enum. Later members have to agree.
    fn read_group(&mut self, open: Token<'a>) -> Result<Type, ParseError> {
        self.nest(1, open)?;
        let mut name = match self.read_next(&[TokenKind::GroupEnd, TokenKind::Word])? {
            token if token.kind == TokenKind::GroupEnd => {
                self.depth -= 1;
                return Ok(Type::Struct(Vec::new()));
            }
            token => token,
        };

        let mut committed = None;
        let mut fields = Vec::new();
        let mut variants = Vec::new();
        loop {
            let delimiter = self.read_next(&[
                TokenKind::Colon,
                TokenKind::Separator,
                TokenKind::GroupEnd,
            ])?;
            let kind = *committed.get_or_insert(if delimiter.kind == TokenKind::Colon {
                GroupKind::Struct
            } else {
                GroupKind::Enum
            });

            let at_end = match (kind, delimiter.kind) {
                (GroupKind::Struct, TokenKind::Colon) => {
                    let type_ = self.read_unnamed_type()?;
                    fields.push(Field {
                        name: name.text.to_string(),
                        type_,
                    });
                    let next = self.read_next(&[TokenKind::Separator, TokenKind::GroupEnd])?;
                    next.kind == TokenKind::GroupEnd
                }
                (GroupKind::Enum, TokenKind::Separator | TokenKind::GroupEnd) => {
                    variants.push(name.text.to_string());
                    delimiter.kind == TokenKind::GroupEnd
                }
                (committed, _) => {
                    return Err(ParseError::AmbiguousGroup {
                        member: name.text.to_string(),
                        committed,
                        location: self.location(name),
                    })
                }
            };
            if at_end {
                break;
            }
            name = self.read_word()?;
        }

        trace!(offset = open.offset, ?committed, "parsed group");
        self.depth -= 1;
        Ok(match committed {
            Some(GroupKind::Enum) => Type::Enum(variants),
            _ => Type::Struct(fields),
        })
    }

    /// Parses a type word. Modifier prefixes apply left to right, so `[]?string` is an array of
    /// optional strings. A modifier with nothing after it takes the next type expression.
    fn parse_type_word(&mut self, token: Token<'a>) -> Result<Type, ParseError> {
        let mut modifiers: Vec<fn(Box<Type>) -> Type> = Vec::new();
        let mut rest = token.text;
        loop {
            let modifier: fn(Box<Type>) -> Type = if let Some(inner) = rest.strip_prefix('?') {
                rest = inner;
                Type::Maybe
            } else if let Some(inner) = rest.strip_prefix("[]") {
                rest = inner;
                Type::Array
            } else if let Some(inner) = rest.strip_prefix("[string]") {
                rest = inner;
                Type::Dictionary
            } else {
                break;
            };
            modifiers.push(modifier);
        }

        self.nest(modifiers.len(), token)?;
        let mut type_ = match rest {
            "" => self.read_unnamed_type()?,
            "bool" => Type::Bool,
            "int" => Type::Int,
            "float" => Type::Float,
            "string" => Type::String,
            "object" => Type::Object,
            alias => Type::Alias(alias.to_string()),
        };
        self.depth -= modifiers.len();

        for modifier in modifiers.into_iter().rev() {
            type_ = modifier(Box::new(type_));
        }
        Ok(type_)
    }

    fn read_keyword(&mut self, keyword: &'static str) -> Result<(), ParseError> {
        let token = self.read_word()?;
        if token.text != keyword {
            return Err(ParseError::UnexpectedWord {
                expected: keyword,
                found: token.text.to_string(),
                location: self.location(token),
            });
        }
        Ok(())
    }

    fn read_word(&mut self) -> Result<Token<'a>, ParseError> {
        self.read_next(&[TokenKind::Word])
    }

    /// Reads the next significant token, failing if its kind is not in `expected`.
    fn read_next(&mut self, expected: &'static [TokenKind]) -> Result<Token<'a>, ParseError> {
        loop {
            let token = self.scanner.read_next_token();
            if token.kind.is_trivia() {
                continue;
            }
            if !expected.contains(&token.kind) {
                return Err(ParseError::UnexpectedToken {
                    expected: Expected(expected),
                    found: token.kind,
                    location: self.location(token),
                });
            }
            return Ok(token);
        }
    }

    fn location(&self, token: Token<'_>) -> Location {
        Location::of(self.scanner.source(), token.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_type(source: &str) -> Result<Type, ParseError> {
        Parser::new(source).read_unnamed_type()
    }

    fn field(name: &str, type_: Type) -> Field {
        Field {
            name: name.to_string(),
            type_,
        }
    }

    #[test]
    fn struct_group() {
        assert_eq!(
            parse_type("(a: int, b: string)").unwrap(),
            Type::Struct(vec![field("a", Type::Int), field("b", Type::String)])
        );
    }

    #[test]
    fn enum_group() {
        assert_eq!(
            parse_type("(a, b, c)").unwrap(),
            Type::Enum(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(parse_type("(single)").unwrap(), Type::Enum(vec!["single".into()]));
    }

    #[test]
    fn empty_group_is_struct() {
        assert_eq!(parse_type("( )").unwrap(), Type::Struct(vec![]));
    }

    #[test]
    fn mixed_group_is_rejected() {
        let err = parse_type("(a: int, b)").unwrap_err();
        assert!(matches!(
            err,
            ParseError::AmbiguousGroup { ref member, committed: GroupKind::Struct, .. } if member == "b"
        ));

        let err = parse_type("(a, b: int)").unwrap_err();
        assert!(matches!(
            err,
            ParseError::AmbiguousGroup { committed: GroupKind::Enum, .. }
        ));
    }

    #[test]
    fn trailing_separator_is_rejected() {
        let err = parse_type("(a: int,)").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                found: TokenKind::GroupEnd,
                ..
            }
        ));
    }

    #[test]
    fn modifiers_compose_left_to_right() {
        assert_eq!(
            parse_type("[]?string").unwrap(),
            Type::Array(Box::new(Type::Maybe(Box::new(Type::String))))
        );
        assert_eq!(
            parse_type("?[]string").unwrap(),
            Type::Maybe(Box::new(Type::Array(Box::new(Type::String))))
        );
        assert_eq!(
            parse_type("[string][]?Point").unwrap(),
            Type::Dictionary(Box::new(Type::Array(Box::new(Type::Maybe(Box::new(
                Type::Alias("Point".into())
            ))))))
        );
    }

    #[test]
    fn modifier_before_group() {
        assert_eq!(
            parse_type("[]?(x: float)").unwrap(),
            Type::Array(Box::new(Type::Maybe(Box::new(Type::Struct(vec![field(
                "x",
                Type::Float
            )])))))
        );
        assert_eq!(
            parse_type("? object").unwrap(),
            Type::Maybe(Box::new(Type::Object))
        );
    }

    #[test]
    fn document_members() {
        let document = Parser::parse(
            "interface org.example.test
             type Point (x: int, y: int)
             method Move(dx: int, dy: int) -> (ok: bool)
             error Failed ()",
        )
        .unwrap();
        assert_eq!(document.name, "org.example.test");
        assert_eq!(document.typedefs.len(), 1);
        assert_eq!(document.methods[0].name, "Move");
        assert_eq!(
            document.methods[0].results,
            Type::Struct(vec![field("ok", Type::Bool)])
        );
        assert_eq!(document.errors[0].parameters, Type::Struct(vec![]));
    }

    #[test]
    fn unknown_member_keyword() {
        let err = Parser::parse("interface a\nfunction Foo () -> ()").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedWord {
                expected: "`method`, `type` or `error`",
                found: "function".into(),
                location: Location { line: 2, column: 1 },
            }
        );
    }

    #[test]
    fn missing_interface_keyword() {
        let err = Parser::parse("type Foo (a)").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedWord { expected: "interface", .. }));
    }

    #[test]
    fn method_needs_struct_parameters() {
        let err = Parser::parse("interface a method Foo (x, y) -> ()").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedKind {
                expected: GroupKind::Struct,
                ..
            }
        ));

        let err = Parser::parse("interface a method Foo string -> ()").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedKind {
                context: "parameters of method `Foo`".into(),
                expected: GroupKind::Struct,
                location: Location { line: 1, column: 24 },
            }
        );

        let err = Parser::parse("interface a error Bad ?(x: int)").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedKind { .. }));
    }

    #[test]
    fn named_bodies_are_kept_as_aliases() {
        let document = Parser::parse(
            "interface a
             type Point (x: int, y: int)
             method Draw Point -> ()
             error Off Point",
        )
        .unwrap();
        assert_eq!(document.methods[0].parameters, Type::Alias("Point".into()));
        assert_eq!(document.methods[0].results, Type::Struct(vec![]));
        assert_eq!(document.errors[0].parameters, Type::Alias("Point".into()));
    }

    #[test]
    fn typedef_body_is_any_type() {
        let document = Parser::parse("interface a type Name string").unwrap();
        assert_eq!(document.typedefs[0].type_, Type::String);
    }

    #[test]
    fn nesting_is_limited() {
        let source = format!("{}int", "?".repeat(MAX_NESTING));
        assert!(parse_type(&source).is_ok());

        let err = parse_type(&format!("?{source}")).unwrap_err();
        assert_eq!(
            err,
            ParseError::NestingTooDeep {
                limit: MAX_NESTING,
                location: Location { line: 1, column: 1 },
            }
        );

        let groups = format!("{}int{}", "(a: ".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        assert!(matches!(
            parse_type(&groups).unwrap_err(),
            ParseError::NestingTooDeep { limit: MAX_NESTING, .. }
        ));

        let mixed = format!("{}int", "[]? ".repeat(MAX_NESTING));
        assert!(matches!(
            parse_type(&mixed).unwrap_err(),
            ParseError::NestingTooDeep { .. }
        ));
    }

    #[test]
    fn missing_arrow() {
        let err = Parser::parse("interface a method Foo () ()").unwrap_err();
        assert_eq!(
            err.to_string(),
            "1:27: expected `->`, found `(`"
        );
    }

    #[test]
    fn unexpected_end_of_input() {
        let err = Parser::parse("interface a type Foo (a: int").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                found: TokenKind::EndOfInput,
                ..
            }
        ));
    }
}
