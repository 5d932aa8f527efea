//! Synthesizes names for anonymous structs and enums.
//!
//! - a member `m` of type `T` whose type is anonymous gets `{T}{Capitalized m}`, also when the
//!   anonymous type is wrapped in `?`, `[]` or `[string]`
//! - method parameters and results get `{Method}Args` and `{Method}Result`, error parameters get
//!   `{Error}Args`; if they have no members they are marked as suppressed and not registered
//!
//! Types that already have a name keep it. Newly named types are registered in first-discovery
//! order: depth-first, members in declaration order.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::components::{ComponentTable, ConstructionTable, TypeRef};
use crate::error::ResolveError;
use crate::model::{Origin, TypeKind};

pub(crate) struct Namer<'t> {
    table: &'t mut ConstructionTable,
    names: HashMap<String, TypeRef>,
    visited: HashSet<TypeRef>,
    registered: Vec<TypeRef>,
}

impl<'t> Namer<'t> {
    pub(crate) fn new(table: &'t mut ConstructionTable, typedefs: &[TypeRef]) -> Self {
        let names = typedefs
            .iter()
            .filter_map(|&typedef| {
                let name = table.get(typedef).name.clone()?;
                Some((name, typedef))
            })
            .collect();
        Self {
            table,
            names,
            visited: HashSet::new(),
            registered: Vec::new(),
        }
    }

    /// Names everything nested in the declared typedefs.
    pub(crate) fn name_typedefs(&mut self, typedefs: &[TypeRef]) -> Result<(), ResolveError> {
        for &typedef in typedefs {
            self.visit_members(typedef)?;
        }
        Ok(())
    }

    /// Names a method or error wrapper struct, suppressing it if it has no members.
    pub(crate) fn name_wrapper(
        &mut self,
        wrapper: TypeRef,
        name: String,
    ) -> Result<(), ResolveError> {
        let type_ = self.table.get(wrapper);
        if type_.name.is_some() {
            return Ok(());
        }
        if type_.members().is_empty() {
            let type_ = self.table.get_mut(wrapper);
            type_.name = Some(name);
            type_.origin = Origin::SuppressedWrapper;
            return Ok(());
        }
        self.name_type(wrapper, name)
    }

    /// The newly named types, in discovery order.
    pub(crate) fn into_registered(self) -> Vec<TypeRef> {
        self.registered
    }

    /// Gives `ref_` the name `suggested` unless it already has one, then names its members.
    fn name_type(&mut self, ref_: TypeRef, suggested: String) -> Result<(), ResolveError> {
        if self.table.get(ref_).name.is_none() {
            if self.names.contains_key(&suggested) {
                return Err(ResolveError::NameCollision { name: suggested });
            }
            debug!(name = %suggested, "synthesized type name");
            self.names.insert(suggested.clone(), ref_);
            self.table.get_mut(ref_).name = Some(suggested);
            self.registered.push(ref_);
        }
        self.visit_members(ref_)
    }

    fn visit_members(&mut self, ref_: TypeRef) -> Result<(), ResolveError> {
        if !self.visited.insert(ref_) {
            return Ok(());
        }
        let type_ = self.table.get(ref_);
        let Some(parent) = type_.name.clone() else {
            return Ok(());
        };
        let members = type_
            .members()
            .iter()
            .filter_map(|member| Some((member.name.clone(), member.type_?)))
            .collect::<Vec<_>>();
        for (member, member_type) in members {
            let suggested = format!("{parent}{}", capitalize(&member));
            self.visit_member_type(member_type, suggested)?;
        }
        Ok(())
    }

    fn visit_member_type(&mut self, ref_: TypeRef, suggested: String) -> Result<(), ResolveError> {
        let inner = match self.table.get(ref_).kind {
            TypeKind::Maybe(inner) | TypeKind::Array(inner) | TypeKind::Dictionary(inner) => {
                Some(inner)
            }
            TypeKind::Struct(_) | TypeKind::Enum(_) => None,
            TypeKind::Bool
            | TypeKind::Int
            | TypeKind::Float
            | TypeKind::String
            | TypeKind::Object => return Ok(()),
        };
        match inner {
            Some(inner) => self.visit_member_type(inner, suggested),
            None => self.name_type(ref_, suggested),
        }
    }
}

/// Uppercases the first character, leaving the rest untouched.
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize("address"), "Address");
        assert_eq!(capitalize("home_address"), "Home_address");
        assert_eq!(capitalize("iPhone"), "IPhone");
        assert_eq!(capitalize(""), "");
    }
}
