use crate::components::{Component, ComponentTable, TypeRef, TypeTable};

/// A fully resolved interface definition.
///
/// All types, including the anonymous ones, live in [`Interface::types`]; the other fields refer
/// to them via [`TypeRef`]s. After resolution, every struct and enum reachable from the interface
/// carries a name, and no alias is left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub methods: Vec<Method>,
    /// Declared typedefs in source order, followed by all synthesized types in the order they were
    /// first discovered. This is the flat list of declarations emitted by code generators.
    pub typedefs: Vec<TypeRef>,
    pub errors: Vec<ErrorDeclaration>,
    pub types: TypeTable,
}

impl Interface {
    pub fn get(&self, ref_: TypeRef) -> &Type {
        self.types.get(ref_)
    }

    /// Looks up a registered typedef (declared or synthesized) by name.
    pub fn typedef(&self, name: &str) -> Option<TypeRef> {
        self.typedefs
            .iter()
            .copied()
            .find(|&typedef| self.get(typedef).name() == Some(name))
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// The typedefs declared with `type` in the source, without synthesized ones.
    pub fn declared_typedefs(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.typedefs
            .iter()
            .copied()
            .filter(|&typedef| self.get(typedef).origin == Origin::Typedef)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    /// Always a struct, possibly without members. Either a wrapper or a declared typedef.
    pub parameter_type: TypeRef,
    /// Always a struct, possibly without members.
    pub return_type: TypeRef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorDeclaration {
    pub name: String,
    /// Always a struct, possibly without members.
    pub type_: TypeRef,
}

/// Where a [`Type`] came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// One of the shared leaf types.
    Builtin,
    /// Declared with `type` at the top level.
    Typedef,
    /// Written inline as a member type, or a modifier application.
    Anonymous,
    /// The parameters or results of a method, or the parameters of an error.
    Wrapper,
    /// A [`Origin::Wrapper`] without members. Code generators treat it as "no arguments" or "no
    /// result"; it is never registered as a typedef.
    SuppressedWrapper,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Type {
    pub name: Option<String>,
    pub kind: TypeKind,
    pub origin: Origin,
}

impl Component for Type {
    const DISPLAY_NAME: &'static str = "type";
}

impl Type {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_suppressed(&self) -> bool {
        self.origin == Origin::SuppressedWrapper
    }

    /// Members of a struct or enum; empty for all other kinds.
    pub fn members(&self) -> &[Member] {
        match &self.kind {
            TypeKind::Struct(members) | TypeKind::Enum(members) => members,
            _ => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Struct(Vec<Member>),
    Enum(Vec<Member>),
    Bool,
    Int,
    Float,
    String,
    Object,
    Maybe(TypeRef),
    Array(TypeRef),
    /// A mapping with string keys.
    Dictionary(TypeRef),
}

impl TypeKind {
    pub fn is_declaration(&self) -> bool {
        matches!(self, Self::Struct(_) | Self::Enum(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    /// Present for struct fields, absent for enum variants.
    pub type_: Option<TypeRef>,
}
