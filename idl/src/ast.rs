//! Unresolved syntax tree, as produced by the [parser](crate::parser).
//!
//! Type references are still plain names ([`Type::Alias`]) and inline structs/enums are still
//! anonymous; both are dealt with when the document is [resolved](crate::resolve).

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub methods: Vec<MethodDefinition>,
    pub typedefs: Vec<TypeDefinition>,
    pub errors: Vec<ErrorDefinition>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A `method` member. Parameters and results are each a [`Type::Struct`] or a [`Type::Alias`].
pub struct MethodDefinition {
    pub name: String,
    pub parameters: Type,
    pub results: Type,
}

/// A `type` member. Only a [`Type::Struct`] or a [`Type::Enum`] body resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub type_: Type,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorDefinition {
    pub name: String,
    /// A [`Type::Struct`] or a [`Type::Alias`].
    pub parameters: Type,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub type_: Type,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Alias(String),
    Struct(Vec<Field>),
    Enum(Vec<String>),
    Bool,
    Int,
    Float,
    String,
    Object,
    Maybe(Box<Type>),
    Array(Box<Type>),
    Dictionary(Box<Type>),
}
