use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::num::{NonZeroU32, NonZeroUsize};

use crate::model::{Origin, Type, TypeKind};

/// Trait implemented by everything that is stored in a component table.
pub trait Component {
    const DISPLAY_NAME: &'static str;
}

/// A reference to a [`Component`] stored in a [`ComponentTable`].
pub struct Ref<R: Component>(NonZeroU32, PhantomData<R>);

impl<R: Component> Ref<R> {
    const fn from_inner(inner: NonZeroU32) -> Self {
        Self(inner, PhantomData)
    }

    fn index(self) -> usize {
        let size: NonZeroUsize = self
            .0
            .try_into()
            .expect("type ID does not fit into usize");
        usize::from(size) - 1
    }
}

impl Ref<Type> {
    pub fn get(self, table: &impl ComponentTable) -> &Type {
        table.get(self)
    }
}

// Derives would require the same traits of `R`, which only appears in the PhantomData.

impl<R: Component> Copy for Ref<R> {}

impl<R: Component> Clone for Ref<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Component> fmt::Debug for Ref<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{} #{}>", R::DISPLAY_NAME, self.0)
    }
}

impl<R: Component> PartialEq for Ref<R> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<R: Component> Eq for Ref<R> {}

impl<R: Component> Hash for Ref<R> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

pub type TypeRef = Ref<Type>;

/// An arena-like container for [`Type`]s.
pub trait ComponentTable {
    /// Retrieves a type by reference. Panics if the slot is empty or out of bounds.
    fn get(&self, ref_: TypeRef) -> &Type;
}

/// Refs to the shared leaf types, which are registered first in every table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Builtins {
    pub bool: TypeRef,
    pub int: TypeRef,
    pub float: TypeRef,
    pub string: TypeRef,
    pub object: TypeRef,
}

/// The table used while an interface is being resolved.
///
/// Slots are `Option`s, since typedefs are reserved up front so that references to them (including
/// references from their own members) can be handed out before their bodies are built.
pub(crate) struct ConstructionTable {
    types: Vec<Option<Type>>,
    builtins: Builtins,
}

impl ComponentTable for ConstructionTable {
    fn get(&self, ref_: TypeRef) -> &Type {
        self.types
            .get(ref_.index())
            .expect("Invalid type reference (out-of-bounds)")
            .as_ref()
            .expect("Type is not present")
    }
}

impl ConstructionTable {
    pub(crate) fn new() -> Self {
        let mut table = Self {
            types: Vec::new(),
            builtins: Builtins {
                // Placeholders, overwritten right below.
                bool: Ref::from_inner(NonZeroU32::MIN),
                int: Ref::from_inner(NonZeroU32::MIN),
                float: Ref::from_inner(NonZeroU32::MIN),
                string: Ref::from_inner(NonZeroU32::MIN),
                object: Ref::from_inner(NonZeroU32::MIN),
            },
        };
        table.builtins = Builtins {
            bool: table.create(Type::builtin(TypeKind::Bool)),
            int: table.create(Type::builtin(TypeKind::Int)),
            float: table.create(Type::builtin(TypeKind::Float)),
            string: table.create(Type::builtin(TypeKind::String)),
            object: table.create(Type::builtin(TypeKind::Object)),
        };
        table
    }

    pub(crate) fn builtins(&self) -> Builtins {
        self.builtins
    }

    /// Creates a [`Ref`] which points to an absent, reserved slot in the table.
    pub(crate) fn reserve(&mut self) -> TypeRef {
        self.types.push(None);

        // IDs are 1-based slot indices
        let size = NonZeroUsize::new(self.types.len()).expect("table is non-empty after push");
        let id: NonZeroU32 = size.try_into().expect("ID did not fit into 32-bit integer");

        Ref::from_inner(id)
    }

    /// Inserts the `value` into the slot pointed to by `ref_`. Returns `ref_` for convenience.
    pub(crate) fn insert(&mut self, ref_: TypeRef, value: Type) -> TypeRef {
        let slot = self
            .types
            .get_mut(ref_.index())
            .expect("Invalid type reference (out-of-bounds)");
        *slot = Some(value);
        ref_
    }

    /// Shorthand for `insert(reserve(), value)`
    pub(crate) fn create(&mut self, value: Type) -> TypeRef {
        let ref_ = self.reserve();
        self.insert(ref_, value)
    }

    pub(crate) fn get_mut(&mut self, ref_: TypeRef) -> &mut Type {
        self.types
            .get_mut(ref_.index())
            .expect("Invalid type reference (out-of-bounds)")
            .as_mut()
            .expect("Type is not present")
    }

    /// Converts this table into a read-only [`TypeTable`]. Returns `None` if a reserved slot was
    /// never filled.
    pub(crate) fn into_type_table(self) -> Option<TypeTable> {
        let types = self.types.into_iter().collect::<Option<Vec<_>>>()?;
        Some(TypeTable {
            types: types.into_boxed_slice(),
            builtins: self.builtins,
        })
    }
}

/// The read-only table owned by a resolved [`Interface`](crate::Interface).
///
/// Every [`Ref`] handed out for this table points to a present type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeTable {
    types: Box<[Type]>,
    builtins: Builtins,
}

impl ComponentTable for TypeTable {
    fn get(&self, ref_: TypeRef) -> &Type {
        self.types
            .get(ref_.index())
            .expect("Invalid type reference (out-of-bounds)")
    }
}

impl TypeTable {
    pub fn builtins(&self) -> Builtins {
        self.builtins
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over all types together with their refs, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeRef, &Type)> + '_ {
        self.types.iter().enumerate().map(|(index, type_)| {
            let id = u32::try_from(index + 1).expect("ID did not fit into 32-bit integer");
            let id = NonZeroU32::new(id).expect("index + 1 is non-zero");
            (Ref::from_inner(id), type_)
        })
    }
}

impl Type {
    fn builtin(kind: TypeKind) -> Self {
        Self {
            name: None,
            kind,
            origin: Origin::Builtin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered_first() {
        let table = ConstructionTable::new();
        let builtins = table.builtins();
        assert_eq!(table.get(builtins.bool).kind, TypeKind::Bool);
        assert_eq!(table.get(builtins.object).kind, TypeKind::Object);
        assert_ne!(builtins.int, builtins.float);
        assert_eq!(format!("{:?}", builtins.bool), "<type #1>");
    }

    #[test]
    fn reserved_slot_must_be_filled() {
        let mut table = ConstructionTable::new();
        let reserved = table.reserve();
        let element = table.create(Type {
            name: None,
            kind: TypeKind::Array(reserved),
            origin: Origin::Anonymous,
        });
        assert_eq!(table.get(element).kind, TypeKind::Array(reserved));

        let mut filled = ConstructionTable::new();
        let slot = filled.reserve();
        filled.insert(
            slot,
            Type {
                name: Some("Empty".into()),
                kind: TypeKind::Struct(Vec::new()),
                origin: Origin::Typedef,
            },
        );

        assert!(table.into_type_table().is_none());
        let filled = filled.into_type_table().unwrap();
        assert_eq!(filled.len(), 6);
        assert_eq!(filled.get(slot).name.as_deref(), Some("Empty"));
        assert_eq!(filled.iter().nth(5).map(|(r, _)| r), Some(slot));
    }
}
