//! Turns a parsed [`Document`] into a resolved [`Interface`].
//!
//! Typedef slots are reserved before any type body is built, so an alias (including one appearing
//! inside the typedef it names) resolves to the typedef's [`TypeRef`] directly. Afterwards the
//! [`Namer`] names every anonymous struct and enum.

use std::collections::HashMap;

use tracing::debug;

use crate::ast::{self, Document};
use crate::components::{ComponentTable, ConstructionTable, TypeRef};
use crate::error::ResolveError;
use crate::model::{ErrorDeclaration, Interface, Member, Method, Origin, Type, TypeKind};
use crate::naming::Namer;
use crate::parser::MAX_NESTING;

pub(crate) struct ResolveContext {
    table: ConstructionTable,
    typedefs: HashMap<String, TypeRef>,
    /// Type expressions enclosing the one being lowered.
    depth: usize,
}

impl ResolveContext {
    pub(crate) fn new() -> Self {
        Self {
            table: ConstructionTable::new(),
            typedefs: HashMap::new(),
            depth: 0,
        }
    }

    /// Reserves the slot for a top-level typedef and makes it available for lookup.
    fn register(&mut self, name: &str) -> Result<TypeRef, ResolveError> {
        if self.typedefs.contains_key(name) {
            return Err(ResolveError::DuplicateTypedef {
                name: name.to_string(),
            });
        }
        let ref_ = self.table.reserve();
        self.typedefs.insert(name.to_string(), ref_);
        Ok(ref_)
    }

    fn resolve(&self, name: &str) -> Result<TypeRef, ResolveError> {
        self.typedefs
            .get(name)
            .copied()
            .ok_or_else(|| ResolveError::UnresolvedTypeReference {
                name: name.to_string(),
            })
    }

    /// Builds `type_` into the table, returning a ref to it. Aliases resolve to the typedef's
    /// reserved ref; leaf kinds resolve to the shared builtins.
    fn lower(&mut self, type_: &ast::Type) -> Result<TypeRef, ResolveError> {
        // Leaves sit one level below the deepest modifier or group.
        if self.depth > MAX_NESTING {
            return Err(ResolveError::NestingTooDeep { limit: MAX_NESTING });
        }
        self.depth += 1;
        let lowered = self.lower_nested(type_);
        self.depth -= 1;
        lowered
    }

    fn lower_nested(&mut self, type_: &ast::Type) -> Result<TypeRef, ResolveError> {
        let builtins = self.table.builtins();
        let kind = match type_ {
            ast::Type::Alias(name) => return self.resolve(name),
            ast::Type::Bool => return Ok(builtins.bool),
            ast::Type::Int => return Ok(builtins.int),
            ast::Type::Float => return Ok(builtins.float),
            ast::Type::String => return Ok(builtins.string),
            ast::Type::Object => return Ok(builtins.object),
            ast::Type::Struct(fields) => TypeKind::Struct(self.lower_fields(fields)?),
            ast::Type::Enum(variants) => TypeKind::Enum(Self::lower_variants(variants)),
            ast::Type::Maybe(inner) => TypeKind::Maybe(self.lower(inner)?),
            ast::Type::Array(inner) => TypeKind::Array(self.lower(inner)?),
            ast::Type::Dictionary(inner) => TypeKind::Dictionary(self.lower(inner)?),
        };
        Ok(self.table.create(Type {
            name: None,
            kind,
            origin: Origin::Anonymous,
        }))
    }

    fn lower_fields(&mut self, fields: &[ast::Field]) -> Result<Vec<Member>, ResolveError> {
        fields
            .iter()
            .map(|field| {
                Ok(Member {
                    name: field.name.clone(),
                    type_: Some(self.lower(&field.type_)?),
                })
            })
            .collect()
    }

    fn lower_variants(variants: &[String]) -> Vec<Member> {
        variants
            .iter()
            .map(|name| Member {
                name: name.clone(),
                type_: None,
            })
            .collect()
    }

    fn lower_typedef(
        &mut self,
        ref_: TypeRef,
        typedef: &ast::TypeDefinition,
    ) -> Result<(), ResolveError> {
        let kind = match &typedef.type_ {
            ast::Type::Struct(fields) => TypeKind::Struct(self.lower_fields(fields)?),
            ast::Type::Enum(variants) => TypeKind::Enum(Self::lower_variants(variants)),
            _ => {
                return Err(ResolveError::InvalidTypedef {
                    name: typedef.name.clone(),
                })
            }
        };
        self.table.insert(
            ref_,
            Type {
                name: Some(typedef.name.clone()),
                kind,
                origin: Origin::Typedef,
            },
        );
        Ok(())
    }

    /// Lowers the body of a method or error. A struct group becomes a wrapper to be named after
    /// the call; a typedef name is used as it is, provided it names a struct.
    fn lower_signature(
        &mut self,
        type_: &ast::Type,
        context: impl FnOnce() -> String,
    ) -> Result<TypeRef, ResolveError> {
        match type_ {
            ast::Type::Struct(fields) => {
                self.depth += 1;
                let members = self.lower_fields(fields);
                self.depth -= 1;
                Ok(self.table.create(Type {
                    name: None,
                    kind: TypeKind::Struct(members?),
                    origin: Origin::Wrapper,
                }))
            }
            ast::Type::Alias(name) => {
                let ref_ = self.resolve(name)?;
                match self.table.get(ref_).kind {
                    TypeKind::Struct(_) => Ok(ref_),
                    _ => Err(ResolveError::ExpectedStruct {
                        name: name.clone(),
                        context: context(),
                    }),
                }
            }
            // Only reachable for documents built by hand.
            other => Err(ResolveError::ExpectedStruct {
                name: format!("{other:?}"),
                context: context(),
            }),
        }
    }
}

/// Resolves all aliases in `document` and names all anonymous types.
pub fn resolve(document: Document) -> Result<Interface, ResolveError> {
    let mut context = ResolveContext::new();

    let typedefs = document
        .typedefs
        .iter()
        .map(|typedef| context.register(&typedef.name))
        .collect::<Result<Vec<_>, _>>()?;
    for (ref_, typedef) in typedefs.iter().copied().zip(&document.typedefs) {
        context.lower_typedef(ref_, typedef)?;
    }

    let methods = document
        .methods
        .iter()
        .map(|method| {
            Ok(Method {
                name: method.name.clone(),
                parameter_type: context.lower_signature(&method.parameters, || {
                    format!("parameters of method `{}`", method.name)
                })?,
                return_type: context.lower_signature(&method.results, || {
                    format!("results of method `{}`", method.name)
                })?,
            })
        })
        .collect::<Result<Vec<_>, ResolveError>>()?;

    let errors = document
        .errors
        .iter()
        .map(|error| {
            Ok(ErrorDeclaration {
                name: error.name.clone(),
                type_: context.lower_signature(&error.parameters, || {
                    format!("parameters of error `{}`", error.name)
                })?,
            })
        })
        .collect::<Result<Vec<_>, ResolveError>>()?;

    let mut table = context.table;
    let mut namer = Namer::new(&mut table, &typedefs);
    namer.name_typedefs(&typedefs)?;
    for method in &methods {
        namer.name_wrapper(method.parameter_type, format!("{}Args", method.name))?;
        namer.name_wrapper(method.return_type, format!("{}Result", method.name))?;
    }
    for error in &errors {
        namer.name_wrapper(error.type_, format!("{}Args", error.name))?;
    }
    let synthesized = namer.into_registered();
    debug!(
        interface = %document.name,
        declared = typedefs.len(),
        synthesized = synthesized.len(),
        "resolved interface"
    );

    let types = table
        .into_type_table()
        .expect("every reserved typedef slot is filled");
    Ok(Interface {
        name: document.name,
        methods,
        typedefs: typedefs.into_iter().chain(synthesized).collect(),
        errors,
        types,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn resolve_source(source: &str) -> Result<Interface, ResolveError> {
        resolve(Parser::parse(source).expect("valid syntax"))
    }

    #[test]
    fn alias_resolves_to_the_declaration() {
        let interface = resolve_source(
            "interface a
             method Draw (at: Point) -> ()
             type Point (x: int, y: int)",
        )
        .unwrap();
        let point = interface.typedef("Point").unwrap();
        let args = interface.get(interface.methods[0].parameter_type);
        assert_eq!(args.members()[0].type_, Some(point));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let interface = resolve_source("interface a type Node (next: ?Node)").unwrap();
        let node = interface.typedef("Node").unwrap();
        let next = interface.get(node).members()[0].type_.unwrap();
        assert_eq!(interface.get(next).kind, TypeKind::Maybe(node));
    }

    #[test]
    fn leaf_types_are_shared() {
        let interface = resolve_source("interface a type P (x: int, y: int, z: []int)").unwrap();
        let p = interface.get(interface.typedef("P").unwrap());
        let builtins = interface.types.builtins();
        assert_eq!(p.members()[0].type_, Some(builtins.int));
        assert_eq!(p.members()[1].type_, Some(builtins.int));
        let z = interface.get(p.members()[2].type_.unwrap());
        assert_eq!(z.kind, TypeKind::Array(builtins.int));
    }

    #[test]
    fn unresolved_alias_fails() {
        let err = resolve_source("interface a method Foo (x: Unknown) -> ()").unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnresolvedTypeReference {
                name: "Unknown".into()
            }
        );
    }

    #[test]
    fn duplicate_typedef_fails() {
        let err = resolve_source("interface a type A (x) type A (y: int)").unwrap_err();
        assert_eq!(err, ResolveError::DuplicateTypedef { name: "A".into() });
    }

    #[test]
    fn typedef_signature_keeps_the_declaration() {
        let interface = resolve_source(
            "interface a
             type Point (x: int, y: int)
             method Draw Point -> Point
             error Off Point",
        )
        .unwrap();
        let point = interface.typedef("Point").unwrap();
        assert_eq!(interface.methods[0].parameter_type, point);
        assert_eq!(interface.methods[0].return_type, point);
        assert_eq!(interface.errors[0].type_, point);
        assert_eq!(interface.get(point).origin, Origin::Typedef);
    }

    #[test]
    fn enum_signature_fails() {
        let err = resolve_source("interface a type E (a, b) method M () -> E").unwrap_err();
        assert_eq!(
            err,
            ResolveError::ExpectedStruct {
                name: "E".into(),
                context: "results of method `M`".into(),
            }
        );
    }

    #[test]
    fn typedef_must_be_a_group() {
        let err = resolve_source("interface a type A []string").unwrap_err();
        assert_eq!(err, ResolveError::InvalidTypedef { name: "A".into() });
    }

    #[test]
    fn deep_documents_are_rejected() {
        let mut type_ = ast::Type::Int;
        for _ in 0..=MAX_NESTING {
            type_ = ast::Type::Maybe(Box::new(type_));
        }
        let document = Document {
            name: "a".into(),
            methods: Vec::new(),
            typedefs: vec![ast::TypeDefinition {
                name: "A".into(),
                type_: ast::Type::Struct(vec![ast::Field {
                    name: "x".into(),
                    type_,
                }]),
            }],
            errors: Vec::new(),
        };
        assert_eq!(
            resolve(document).unwrap_err(),
            ResolveError::NestingTooDeep { limit: MAX_NESTING }
        );
    }
}
