//! Contract selection: which declarations get spies.

use fm_core::{Decl, InterfaceType, TypeDecl, TypeSpec};

/// A type declaration group whose every spec declares an interface
/// literal. Aliases, struct types, functions, var/const groups and groups
/// that mix interfaces with other types are not contracts.
pub fn as_contract_decl(decl: &Decl) -> Option<&TypeDecl> {
    match decl {
        Decl::Type(td)
            if !td.specs.is_empty() && td.specs.iter().all(|s| s.as_interface().is_some()) =>
        {
            Some(td)
        }
        _ => None,
    }
}

pub fn is_contract_decl(decl: &Decl) -> bool {
    as_contract_decl(decl).is_some()
}

/// The interfaces of a contract declaration, in declaration order.
pub fn contracts(decl: &TypeDecl) -> impl Iterator<Item = (&TypeSpec, &InterfaceType)> {
    decl.specs
        .iter()
        .filter_map(|spec| spec.as_interface().map(|iface| (spec, iface)))
}
