//! Parser and type model for Varlink interface definitions.
//!
//! [`parse`] runs the whole pipeline: the [`Scanner`](scanner::Scanner) splits the text into
//! tokens, the [`Parser`](parser::Parser) builds an unresolved [`ast::Document`], and
//! [`resolve`](resolve::resolve) links aliases to their typedefs and names every anonymous type.

pub mod ast;
pub mod error;
pub mod parser;
pub mod resolve;
pub mod scanner;

mod components;
mod display;
mod model;
mod naming;

use tracing::debug;

pub use components::{Builtins, Component, ComponentTable, Ref, TypeRef, TypeTable};
pub use display::TypeDisplay;
pub use error::{IdlError, ParseError, ResolveError};
pub use model::{ErrorDeclaration, Interface, Member, Method, Origin, Type, TypeKind};

/// Parses and resolves an interface definition.
pub fn parse(source: &str) -> Result<Interface, IdlError> {
    let document = parser::Parser::parse(source)?;
    debug!(
        interface = %document.name,
        methods = document.methods.len(),
        typedefs = document.typedefs.len(),
        errors = document.errors.len(),
        "parsed interface"
    );
    Ok(resolve::resolve(document)?)
}
