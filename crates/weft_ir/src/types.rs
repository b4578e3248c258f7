//! Structurally canonicalized hardware types.
//!
//! Every [`Type`] lives once in a [`TypeDb`] and is referred to by [`TypeId`],
//! so two independently built descriptions of the same structure compare equal
//! by ID. Direction changes are normalized on construction: flipping a record
//! flips its fields, flipping a bit yields the input bit, and only opaque
//! named types keep an explicit `Flip`/`In`/`Out` wrapper.

use crate::arena::Arena;
use crate::ids::{ArgsId, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use weft_common::Symbol;

/// A hardware type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// Unconstrained; connects to anything and has no direction.
    Any,
    /// A single output bit.
    Bit,
    /// A single input bit.
    BitIn,
    /// A fixed-length bus. `len` may be zero.
    Array {
        /// Number of elements.
        len: u32,
        /// Element type.
        element: TypeId,
    },
    /// Ordered named fields. May be empty.
    Record {
        /// Fields in declaration order.
        fields: Vec<(Symbol, TypeId)>,
    },
    /// A type registered by name in a namespace.
    Named {
        /// Namespace the name lives in.
        namespace: Symbol,
        /// The type's name.
        name: Symbol,
        /// Type-generator arguments, if any.
        args: Option<ArgsId>,
    },
    /// The flipped view of an opaque named type.
    Flip(TypeId),
    /// The input view of an opaque named type.
    In(TypeId),
    /// The output view of an opaque named type.
    Out(TypeId),
}

/// Which direction a direction-normalization pass pushes toward.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Direction {
    Flip,
    In,
    Out,
}

/// The type cache.
#[derive(Debug, Clone, Default)]
pub struct TypeDb {
    types: Arena<TypeId, Type>,
    lookup: HashMap<Type, TypeId>,
}

impl TypeDb {
    /// Creates an empty type cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical ID for `ty`, allocating it on first sight.
    ///
    /// Callers must pass already-normalized structure; the direction
    /// constructors below take care of that.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.lookup.get(&ty) {
            return id;
        }
        let id = self.types.alloc(ty.clone());
        self.lookup.insert(ty, id);
        id
    }

    /// Returns the type for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from another cache.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id]
    }

    /// Number of distinct types cached.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The flipped type. `flip(flip(t)) == t` for every `t`.
    pub fn flip(&mut self, id: TypeId) -> TypeId {
        self.redirect(id, Direction::Flip)
    }

    /// The input view of `id`.
    pub fn input(&mut self, id: TypeId) -> TypeId {
        self.redirect(id, Direction::In)
    }

    /// The output view of `id`.
    pub fn output(&mut self, id: TypeId) -> TypeId {
        self.redirect(id, Direction::Out)
    }

    fn redirect(&mut self, id: TypeId, dir: Direction) -> TypeId {
        match self.get(id).clone() {
            Type::Any => id,
            Type::Bit => match dir {
                Direction::Flip | Direction::In => self.intern(Type::BitIn),
                Direction::Out => id,
            },
            Type::BitIn => match dir {
                Direction::Flip | Direction::Out => self.intern(Type::Bit),
                Direction::In => id,
            },
            Type::Array { len, element } => {
                let element = self.redirect(element, dir);
                self.intern(Type::Array { len, element })
            }
            Type::Record { fields } => {
                let fields = fields
                    .into_iter()
                    .map(|(name, ty)| (name, self.redirect(ty, dir)))
                    .collect();
                self.intern(Type::Record { fields })
            }
            Type::Named { .. } => self.intern(wrap(dir, id)),
            Type::Flip(inner) => match dir {
                Direction::Flip => inner,
                _ => self.intern(wrap(dir, inner)),
            },
            Type::In(inner) => match dir {
                Direction::Flip => self.intern(Type::Out(inner)),
                _ => self.intern(wrap(dir, inner)),
            },
            Type::Out(inner) => match dir {
                Direction::Flip => self.intern(Type::In(inner)),
                _ => self.intern(wrap(dir, inner)),
            },
        }
    }

    /// Splits a type into its direction wrapper (if any) and the wrapped type.
    pub fn unwrap_direction(&self, id: TypeId) -> (Option<DirectionWrapper>, TypeId) {
        match *self.get(id) {
            Type::Flip(inner) => (Some(DirectionWrapper::Flip), inner),
            Type::In(inner) => (Some(DirectionWrapper::In), inner),
            Type::Out(inner) => (Some(DirectionWrapper::Out), inner),
            _ => (None, id),
        }
    }

    /// Re-applies a wrapper obtained from [`unwrap_direction`](Self::unwrap_direction).
    pub fn apply_direction(&mut self, wrapper: DirectionWrapper, id: TypeId) -> TypeId {
        match wrapper {
            DirectionWrapper::Flip => self.flip(id),
            DirectionWrapper::In => self.input(id),
            DirectionWrapper::Out => self.output(id),
        }
    }
}

/// One of the three direction wrappers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DirectionWrapper {
    /// `Flip(_)`
    Flip,
    /// `In(_)`
    In,
    /// `Out(_)`
    Out,
}

fn wrap(dir: Direction, inner: TypeId) -> Type {
    match dir {
        Direction::Flip => Type::Flip(inner),
        Direction::In => Type::In(inner),
        Direction::Out => Type::Out(inner),
    }
}
