//! Flattening of grouped parameter and result lists.
//!
//! `(a, b string, c int)` is three positional slots `0: a string`,
//! `1: b string`, `2: c int`. The index runs across all groups and across
//! all names within a group.

use fm_core::{Field, TypeExpr};

/// One positional parameter or result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot<'a> {
    pub index: usize,
    /// `None` for an anonymous entry.
    pub name: Option<&'a str>,
    pub ty: &'a TypeExpr,
}

impl Slot<'_> {
    /// Anonymous or blank: the entry cannot be referenced by name.
    pub fn is_unnamed(&self) -> bool {
        matches!(self.name, None | Some("_"))
    }
}

pub fn flatten(fields: &[Field]) -> Vec<Slot<'_>> {
    let mut slots = Vec::new();
    for field in fields {
        if field.names.is_empty() {
            slots.push(Slot {
                index: slots.len(),
                name: None,
                ty: &field.ty,
            });
            continue;
        }
        for name in &field.names {
            slots.push(Slot {
                index: slots.len(),
                name: Some(name.as_str()),
                ty: &field.ty,
            });
        }
    }
    slots
}

/// Type of the field that stores a captured value: a variadic `...T`
/// arrives as `[]T`.
pub fn captured_type(ty: &TypeExpr) -> TypeExpr {
    match ty {
        TypeExpr::Ellipsis(elem) => TypeExpr::Slice(elem.clone()),
        other => other.clone(),
    }
}
